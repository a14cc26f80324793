//! # State Space Explorer
//!
//! Replays action sequences against a `SatisfactionHarness`, decrypting the
//! aggregate after every transition and checking it against the invariant
//! set and the clear-text model.
//!
//! ## Complexity
//!
//! Every step performs one full authorize → sign → decrypt round (five
//! handle decryptions), so runs are bounded by `max_steps`.

extern crate std;

use soroban_sdk::Address;
use std::collections::HashSet;
use std::string::String;
use std::vec::Vec;

use cipher_satisfaction::scoring::{meets_threshold, weighted_score};
use cipher_satisfaction::StatsAccess;

use super::generators::{RatingAction, AGENT_POOL};
use super::invariants::{
    AppendOnly, InvariantSet, SubmissionDelta, TransitionInvariantSet, Unchanged,
};
use super::{ActionOutcome, SatisfactionHarness, SatisfactionSnapshot, TestRunSummary};

// ── Explorer Configuration ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    /// Maximum number of actions to execute in a single exploration run.
    pub max_steps: usize,
    /// Whether to halt on the first invariant violation.
    pub fail_fast: bool,
    /// Whether to record snapshots for later analysis.
    pub record_snapshots: bool,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            max_steps: 40,
            fail_fast: true,
            record_snapshots: false,
        }
    }
}

// ── Exploration Result ───────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ExplorationResult {
    pub summary: TestRunSummary,
    pub snapshots: Vec<SatisfactionSnapshot>,
    pub action_log: Vec<(RatingAction, ActionOutcome)>,
}

impl ExplorationResult {
    pub fn passed(&self) -> bool {
        self.summary.passed()
    }
}

// ── State Space Explorer ─────────────────────────────────────────────────────

/// Executes action sequences against the rating contract, checking
/// invariants after every transition.
pub struct StateExplorer<'h, 'a> {
    harness: &'h SatisfactionHarness<'a>,
    invariants: InvariantSet,
    config: ExplorerConfig,
    users: Vec<Address>,
    /// Users currently holding the admin role, as the explorer believes.
    admins: HashSet<usize>,
    access: StatsAccess,
}

impl<'h, 'a> StateExplorer<'h, 'a> {
    pub fn new(
        harness: &'h SatisfactionHarness<'a>,
        invariants: InvariantSet,
        config: ExplorerConfig,
        users: Vec<Address>,
    ) -> Self {
        let access = harness.client.get_stats_access();
        Self {
            harness,
            invariants,
            config,
            users,
            admins: HashSet::new(),
            access,
        }
    }

    /// Create an explorer with default configuration and built-in invariants.
    pub fn with_defaults(harness: &'h SatisfactionHarness<'a>, users: Vec<Address>) -> Self {
        Self::new(
            harness,
            InvariantSet::satisfaction_defaults(),
            ExplorerConfig::default(),
            users,
        )
    }

    /// Execute a sequence of actions, checking invariants after each.
    pub fn explore(&mut self, actions: &[RatingAction]) -> ExplorationResult {
        let mut summary = TestRunSummary::new();
        let mut snapshots = Vec::new();
        let mut action_log = Vec::new();

        let mut before = self.harness.snapshot(AGENT_POOL);
        if self.config.record_snapshots {
            snapshots.push(before.clone());
        }

        let steps = actions.len().min(self.config.max_steps);

        for action in actions.iter().take(steps) {
            let outcome = self.execute_action(action);
            summary.entry_points_hit.insert(action_entry_point(action));
            summary.actions_executed += 1;
            summary.transitions_observed += 1;

            let after = self.harness.snapshot(AGENT_POOL);
            let mut violations = self.invariants.check_all(&after);
            violations.extend(
                self.transition_checks(action, &outcome)
                    .check_all(&before, &after),
            );
            if let ActionOutcome::UnexpectedError(msg) = &outcome {
                violations.push(("expected outcome".into(), msg.clone()));
            }
            summary.invariant_checks += 1;
            action_log.push((action.clone(), outcome));

            let failed = !violations.is_empty();
            for (name, msg) in violations {
                summary.invariant_violations.push(std::format!(
                    "After action #{} ({:?}): [{}] {}",
                    summary.actions_executed,
                    action,
                    name,
                    msg
                ));
            }

            if self.config.record_snapshots {
                snapshots.push(after.clone());
            }
            if failed && self.config.fail_fast {
                break;
            }
            before = after;
        }

        ExplorationResult {
            summary,
            snapshots,
            action_log,
        }
    }

    fn transition_checks(
        &self,
        action: &RatingAction,
        outcome: &ActionOutcome,
    ) -> TransitionInvariantSet {
        let mut set = TransitionInvariantSet::new();
        set.add(Box::new(AppendOnly));
        match (action, outcome) {
            (RatingAction::Submit { scores, .. }, ActionOutcome::Ok) => {
                let w = weighted_score(scores.0, scores.1, scores.2);
                set.add(Box::new(SubmissionDelta {
                    weighted_score: u64::from(w),
                    meets_threshold: meets_threshold(w),
                }));
            }
            (RatingAction::Submit { .. }, _) | (RatingAction::SubmitInvalid { .. }, _) => {
                set.add(Box::new(Unchanged));
            }
            _ => {}
        }
        set
    }

    fn user(&self, index: usize) -> &Address {
        &self.users[index % self.users.len()]
    }

    fn execute_action(&mut self, action: &RatingAction) -> ActionOutcome {
        match action {
            RatingAction::Submit {
                user_index,
                agent_index,
                scores,
            } => {
                let agent = AGENT_POOL[agent_index % AGENT_POOL.len()];
                match self.harness.submit(self.user(*user_index), agent, *scores) {
                    Ok(()) => ActionOutcome::Ok,
                    Err(e) => ActionOutcome::UnexpectedError(std::format!("{e}")),
                }
            }
            RatingAction::SubmitInvalid { user_index, scores } => {
                match self.harness.submit(self.user(*user_index), AGENT_POOL[0], *scores) {
                    Ok(()) => ActionOutcome::UnexpectedError(std::format!(
                        "out-of-range scores {scores:?} were accepted"
                    )),
                    Err(e) => ActionOutcome::Rejected(e),
                }
            }
            RatingAction::Authorize { user_index } => {
                let slot = user_index % self.users.len();
                let permitted =
                    self.access == StatsAccess::Anyone || self.admins.contains(&slot);
                match (self.harness.authorize(self.user(slot)), permitted) {
                    (Ok(()), true) => ActionOutcome::Ok,
                    (Err(code), false) => ActionOutcome::ExpectedError(code),
                    (Ok(()), false) => ActionOutcome::UnexpectedError(
                        "non-admin was authorized on the aggregate".into(),
                    ),
                    (Err(code), true) => ActionOutcome::UnexpectedError(std::format!(
                        "permitted viewer was refused with code {code}"
                    )),
                }
            }
            RatingAction::GrantAdmin { user_index } => {
                let slot = user_index % self.users.len();
                match self.harness.set_admin(self.user(slot), true) {
                    Ok(()) => {
                        self.admins.insert(slot);
                        ActionOutcome::Ok
                    }
                    Err(code) => ActionOutcome::UnexpectedError(std::format!(
                        "admin grant refused with code {code}"
                    )),
                }
            }
            RatingAction::RevokeAdmin { user_index } => {
                let slot = user_index % self.users.len();
                match self.harness.set_admin(self.user(slot), false) {
                    Ok(()) => {
                        self.admins.remove(&slot);
                        ActionOutcome::Ok
                    }
                    Err(code) => ActionOutcome::UnexpectedError(std::format!(
                        "admin revoke refused with code {code}"
                    )),
                }
            }
            RatingAction::AdvanceTime { delta } => {
                self.harness.env.advance_time(*delta);
                ActionOutcome::Ok
            }
        }
    }
}

/// Map an action to its entry point name for coverage tracking.
fn action_entry_point(action: &RatingAction) -> String {
    match action {
        RatingAction::Submit { .. } => "submit_rating".into(),
        RatingAction::SubmitInvalid { .. } => "client_validation".into(),
        RatingAction::Authorize { .. } => "authorize_statistics_decryption".into(),
        RatingAction::GrantAdmin { .. } | RatingAction::RevokeAdmin { .. } => "set_admin".into(),
        RatingAction::AdvanceTime { .. } => "advance_time".into(),
    }
}

/// Contract entry points the explorer can reach.
pub const SATISFACTION_ENTRY_POINTS: &[&str] = &[
    "submit_rating",
    "authorize_statistics_decryption",
    "set_admin",
];
