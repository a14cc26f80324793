//! Events emitted by the executor, one per produced or shared handle.
//!
//! Payloads never carry a clear value.

#![allow(deprecated)]

use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env, Symbol};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HandleProducedEvent {
    pub op: Symbol,
    pub caller: Address,
    pub result: BytesN<32>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccessGrantedEvent {
    pub handle: BytesN<32>,
    pub account: Address,
    pub granted_by: Address,
}

pub fn emit_handle_produced(env: &Env, op: Symbol, caller: Address, result: BytesN<32>) {
    env.events().publish(
        (symbol_short!("FHE"), op.clone()),
        HandleProducedEvent { op, caller, result },
    );
}

pub fn emit_access_granted(env: &Env, handle: BytesN<32>, account: Address, granted_by: Address) {
    env.events().publish(
        (symbol_short!("FHE"), symbol_short!("ALLOW")),
        AccessGrantedEvent {
            handle,
            account,
            granted_by,
        },
    );
}
