//! Structured events for the satisfaction contract.
//!
//! Rating events carry the insertion index and the (public) agent id only.
//! No score, clear or encrypted, is ever published.

#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env};

/// Fired once per accepted submission.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RatingSubmittedEvent {
    pub index: u64,
    pub service_agent_id: BytesN<32>,
    pub total_ratings: u64,
    pub timestamp: u64,
}

/// Fired when an admin flag changes.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminChangedEvent {
    pub account: Address,
    pub is_admin: bool,
    pub changed_by: Address,
    pub timestamp: u64,
}

/// Fired when a viewer is granted access to the current aggregate handles.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StatsAuthorizedEvent {
    pub viewer: Address,
    pub total_ratings: u64,
    pub timestamp: u64,
}

pub fn emit_rating_submitted(env: &Env, index: u64, service_agent_id: BytesN<32>, total_ratings: u64) {
    env.events().publish(
        (symbol_short!("CSAT"), symbol_short!("RATED")),
        RatingSubmittedEvent {
            index,
            service_agent_id,
            total_ratings,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn emit_admin_changed(env: &Env, account: Address, is_admin: bool, changed_by: Address) {
    env.events().publish(
        (symbol_short!("CSAT"), symbol_short!("ADMIN")),
        AdminChangedEvent {
            account,
            is_admin,
            changed_by,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn emit_stats_authorized(env: &Env, viewer: Address, total_ratings: u64) {
    env.events().publish(
        (symbol_short!("CSAT"), symbol_short!("STAT_AUTH")),
        StatsAuthorizedEvent {
            viewer,
            total_ratings,
            timestamp: env.ledger().timestamp(),
        },
    );
}
