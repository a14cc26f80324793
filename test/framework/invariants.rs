//! # Aggregate Invariant Definitions & Verification
//!
//! Invariants that must hold after every transition of the rating contract.
//! Each works on a `SatisfactionSnapshot`, whose aggregate has already been
//! decrypted through the client protocol, and can be composed via
//! `InvariantSet`.

extern crate std;

use std::string::String;
use std::vec::Vec;

use cipher_satisfaction::scoring::{ATTITUDE_WEIGHT, PROFESSIONALISM_WEIGHT, SPEED_WEIGHT};

use super::SatisfactionSnapshot;

// ── Invariant Trait ──────────────────────────────────────────────────────────

/// A named invariant that can be verified against a state snapshot.
pub trait Invariant {
    /// Human-readable name for error messages.
    fn name(&self) -> &str;

    /// Check the invariant. Returns `Ok(())` on success, `Err(description)` on violation.
    fn check(&self, snapshot: &SatisfactionSnapshot) -> Result<(), String>;
}

// ── Built-in Invariants ──────────────────────────────────────────────────────

/// **Count Consistency**: the on-chain rating count, the count carried
/// with the aggregate and the model all agree.
pub struct TotalMatchesModel;

impl Invariant for TotalMatchesModel {
    fn name(&self) -> &str {
        "total_ratings == model.ratings"
    }

    fn check(&self, snapshot: &SatisfactionSnapshot) -> Result<(), String> {
        if snapshot.total_ratings != snapshot.model.ratings {
            return Err(std::format!(
                "Contract holds {} ratings, model accepted {}",
                snapshot.total_ratings,
                snapshot.model.ratings
            ));
        }
        if snapshot.decrypted.total_ratings != snapshot.total_ratings {
            return Err(std::format!(
                "Aggregate snapshot reports {} ratings, contract {}",
                snapshot.decrypted.total_ratings,
                snapshot.total_ratings
            ));
        }
        Ok(())
    }
}

/// **Homomorphic Correctness**: every decrypted sum equals the clear-text
/// sum over accepted ratings.
pub struct SumsMatchModel;

impl Invariant for SumsMatchModel {
    fn name(&self) -> &str {
        "decrypted sums == model sums"
    }

    fn check(&self, snapshot: &SatisfactionSnapshot) -> Result<(), String> {
        let d = &snapshot.decrypted;
        let m = &snapshot.model;
        let pairs = [
            ("sum_attitude", d.sum_attitude, m.sum_attitude),
            ("sum_speed", d.sum_speed, m.sum_speed),
            ("sum_professionalism", d.sum_professionalism, m.sum_professionalism),
            ("sum_weighted_score", d.sum_weighted_score, m.sum_weighted_score),
            ("count_meets_threshold", d.count_meets_threshold, m.count_meets_threshold),
        ];
        for (field, decrypted, expected) in pairs {
            if decrypted != expected {
                return Err(std::format!(
                    "{} decrypted to {}, expected {}",
                    field, decrypted, expected
                ));
            }
        }
        Ok(())
    }
}

/// **Weighting**: the weighted sum is the weighted combination of the three
/// dimension sums, since weighting is linear.
pub struct WeightedSumConsistency;

impl Invariant for WeightedSumConsistency {
    fn name(&self) -> &str {
        "sum_weighted == 30*sum_att + 30*sum_speed + 40*sum_prof"
    }

    fn check(&self, snapshot: &SatisfactionSnapshot) -> Result<(), String> {
        let d = &snapshot.decrypted;
        let expected = u64::from(ATTITUDE_WEIGHT) * d.sum_attitude
            + u64::from(SPEED_WEIGHT) * d.sum_speed
            + u64::from(PROFESSIONALISM_WEIGHT) * d.sum_professionalism;
        if d.sum_weighted_score != expected {
            return Err(std::format!(
                "Weighted sum {} != {} recomputed from dimension sums",
                d.sum_weighted_score, expected
            ));
        }
        Ok(())
    }
}

/// **Score Range**: with every score in 1..=5, each dimension sum lies in
/// `[total, 5 * total]`.
pub struct SumsWithinScoreRange;

impl Invariant for SumsWithinScoreRange {
    fn name(&self) -> &str {
        "total <= sum_dimension <= 5 * total"
    }

    fn check(&self, snapshot: &SatisfactionSnapshot) -> Result<(), String> {
        let d = &snapshot.decrypted;
        let total = d.total_ratings;
        for (field, sum) in [
            ("sum_attitude", d.sum_attitude),
            ("sum_speed", d.sum_speed),
            ("sum_professionalism", d.sum_professionalism),
        ] {
            if sum < total || sum > total * 5 {
                return Err(std::format!(
                    "{} = {} outside [{}, {}]",
                    field,
                    sum,
                    total,
                    total * 5
                ));
            }
        }
        Ok(())
    }
}

/// **Threshold Count**: no more ratings can pass than exist.
pub struct ThresholdCountBounded;

impl Invariant for ThresholdCountBounded {
    fn name(&self) -> &str {
        "count_meets_threshold <= total_ratings"
    }

    fn check(&self, snapshot: &SatisfactionSnapshot) -> Result<(), String> {
        let d = &snapshot.decrypted;
        if d.count_meets_threshold > d.total_ratings {
            return Err(std::format!(
                "{} ratings pass but only {} exist",
                d.count_meets_threshold, d.total_ratings
            ));
        }
        Ok(())
    }
}

/// **Agent Attribution**: when every rated agent is sampled, the per-agent
/// counters add up to the total.
pub struct AgentCountsSumToTotal;

impl Invariant for AgentCountsSumToTotal {
    fn name(&self) -> &str {
        "sum(agent counts) == total_ratings"
    }

    fn check(&self, snapshot: &SatisfactionSnapshot) -> Result<(), String> {
        let sum = snapshot.sum_agent_counts();
        if sum != snapshot.total_ratings {
            return Err(std::format!(
                "Agent counters sum to {}, contract holds {} ratings",
                sum, snapshot.total_ratings
            ));
        }
        Ok(())
    }
}

/// **Monotonic Time**: the timestamp in a snapshot must not decrease between
/// consecutive checks.
pub struct MonotonicTime;

impl MonotonicTime {
    pub fn check_transition(
        before: &SatisfactionSnapshot,
        after: &SatisfactionSnapshot,
    ) -> Result<(), String> {
        if after.timestamp < before.timestamp {
            return Err(std::format!(
                "Time went backwards: {} -> {}",
                before.timestamp, after.timestamp
            ));
        }
        Ok(())
    }
}

// ── Invariant Set ────────────────────────────────────────────────────────────

/// A composable set of invariants that are checked together.
pub struct InvariantSet {
    invariants: Vec<Box<dyn Invariant>>,
}

impl InvariantSet {
    /// Create an empty invariant set.
    pub fn new() -> Self {
        Self {
            invariants: Vec::new(),
        }
    }

    /// Every built-in aggregate invariant. `AgentCountsSumToTotal` is only
    /// meaningful when all agents are sampled, which the explorer does.
    pub fn satisfaction_defaults() -> Self {
        let mut set = Self::new();
        set.add(Box::new(TotalMatchesModel));
        set.add(Box::new(SumsMatchModel));
        set.add(Box::new(WeightedSumConsistency));
        set.add(Box::new(SumsWithinScoreRange));
        set.add(Box::new(ThresholdCountBounded));
        set.add(Box::new(AgentCountsSumToTotal));
        set
    }

    /// Add a custom invariant.
    pub fn add(&mut self, invariant: Box<dyn Invariant>) {
        self.invariants.push(invariant);
    }

    /// Verify all invariants against a snapshot.
    /// Returns a list of (invariant_name, violation_message) for all failures.
    pub fn check_all(&self, snapshot: &SatisfactionSnapshot) -> Vec<(String, String)> {
        let mut violations = Vec::new();
        for inv in &self.invariants {
            if let Err(msg) = inv.check(snapshot) {
                violations.push((inv.name().to_string(), msg));
            }
        }
        violations
    }

    /// Assert all invariants hold, panicking with details on violation.
    pub fn assert_all(&self, snapshot: &SatisfactionSnapshot) {
        let violations = self.check_all(snapshot);
        if !violations.is_empty() {
            let mut report = String::from("Invariant violations detected:\n");
            for (name, msg) in &violations {
                report.push_str(&std::format!("  ✗ [{}]: {}\n", name, msg));
            }
            panic!("{}", report);
        }
    }

    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

impl Default for InvariantSet {
    fn default() -> Self {
        Self::new()
    }
}

// ── Transition Invariants ────────────────────────────────────────────────────

/// Invariants that verify the relationship between two consecutive snapshots
/// (before and after an action).
pub trait TransitionInvariant {
    fn name(&self) -> &str;
    fn check(&self, before: &SatisfactionSnapshot, after: &SatisfactionSnapshot)
        -> Result<(), String>;
}

/// **Append Only**: ratings are never removed and sums never shrink.
pub struct AppendOnly;

impl TransitionInvariant for AppendOnly {
    fn name(&self) -> &str {
        "ratings and sums never decrease"
    }

    fn check(
        &self,
        before: &SatisfactionSnapshot,
        after: &SatisfactionSnapshot,
    ) -> Result<(), String> {
        let (b, a) = (&before.decrypted, &after.decrypted);
        if a.total_ratings < b.total_ratings
            || a.sum_attitude < b.sum_attitude
            || a.sum_speed < b.sum_speed
            || a.sum_professionalism < b.sum_professionalism
            || a.sum_weighted_score < b.sum_weighted_score
            || a.count_meets_threshold < b.count_meets_threshold
        {
            return Err(std::format!("Aggregate shrank: {:?} -> {:?}", b, a));
        }
        Ok(())
    }
}

/// **Submission Delta**: one accepted rating with weighted score `w` adds
/// exactly one to the count and `w` to the weighted sum.
pub struct SubmissionDelta {
    pub weighted_score: u64,
    pub meets_threshold: bool,
}

impl TransitionInvariant for SubmissionDelta {
    fn name(&self) -> &str {
        "submission adds exactly one rating and its weighted score"
    }

    fn check(
        &self,
        before: &SatisfactionSnapshot,
        after: &SatisfactionSnapshot,
    ) -> Result<(), String> {
        let (b, a) = (&before.decrypted, &after.decrypted);
        if a.total_ratings != b.total_ratings + 1 {
            return Err(std::format!(
                "Count went {} -> {}, expected +1",
                b.total_ratings, a.total_ratings
            ));
        }
        if a.sum_weighted_score != b.sum_weighted_score + self.weighted_score {
            return Err(std::format!(
                "Weighted sum went {} -> {}, expected +{}",
                b.sum_weighted_score, a.sum_weighted_score, self.weighted_score
            ));
        }
        let passed = u64::from(self.meets_threshold);
        if a.count_meets_threshold != b.count_meets_threshold + passed {
            return Err(std::format!(
                "Threshold count went {} -> {}, expected +{}",
                b.count_meets_threshold, a.count_meets_threshold, passed
            ));
        }
        Ok(())
    }
}

/// **Unchanged**: a rejected action leaves the observable state as it was.
pub struct Unchanged;

impl TransitionInvariant for Unchanged {
    fn name(&self) -> &str {
        "rejected action leaves state unchanged"
    }

    fn check(
        &self,
        before: &SatisfactionSnapshot,
        after: &SatisfactionSnapshot,
    ) -> Result<(), String> {
        if before.decrypted != after.decrypted || before.agent_counts != after.agent_counts {
            return Err(std::format!(
                "State changed: {:?} -> {:?}",
                before.decrypted, after.decrypted
            ));
        }
        Ok(())
    }
}

/// Composite checker for transition invariants.
pub struct TransitionInvariantSet {
    invariants: Vec<Box<dyn TransitionInvariant>>,
}

impl TransitionInvariantSet {
    pub fn new() -> Self {
        Self {
            invariants: Vec::new(),
        }
    }

    pub fn add(&mut self, invariant: Box<dyn TransitionInvariant>) {
        self.invariants.push(invariant);
    }

    pub fn check_all(
        &self,
        before: &SatisfactionSnapshot,
        after: &SatisfactionSnapshot,
    ) -> Vec<(String, String)> {
        let mut violations = Vec::new();
        for inv in &self.invariants {
            if let Err(msg) = inv.check(before, after) {
                violations.push((inv.name().to_string(), msg));
            }
        }
        if let Err(msg) = MonotonicTime::check_transition(before, after) {
            violations.push(("monotonic time".to_string(), msg));
        }
        violations
    }

    pub fn assert_all(&self, before: &SatisfactionSnapshot, after: &SatisfactionSnapshot) {
        let violations = self.check_all(before, after);
        if !violations.is_empty() {
            let mut report = String::from("Transition invariant violations:\n");
            for (name, msg) in &violations {
                report.push_str(&std::format!("  ✗ [{}]: {}\n", name, msg));
            }
            panic!("{}", report);
        }
    }
}

impl Default for TransitionInvariantSet {
    fn default() -> Self {
        Self::new()
    }
}
