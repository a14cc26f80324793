//! Client-side statistics derived from decrypted aggregates.
//!
//! Every division is by the clear `total_ratings`; an empty aggregate yields
//! zeros rather than NaN.

use std::fmt;

/// Decrypted aggregate sums, as read back from the runtime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecryptedStatistics {
    pub total_ratings: u64,
    pub sum_attitude: u64,
    pub sum_speed: u64,
    pub sum_professionalism: u64,
    pub sum_weighted_score: u64,
    pub count_meets_threshold: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SatisfactionSummary {
    pub total_ratings: u64,
    pub average_attitude: f64,
    pub average_speed: f64,
    pub average_professionalism: f64,
    /// On the 1–5 scale.
    pub average_weighted_score: f64,
    /// Percentage of ratings whose weighted score reached the threshold.
    pub threshold_pass_rate: f64,
}

fn ratio(numerator: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    numerator as f64 / total as f64
}

impl DecryptedStatistics {
    pub fn summary(&self) -> SatisfactionSummary {
        let total = self.total_ratings;
        SatisfactionSummary {
            total_ratings: total,
            average_attitude: ratio(self.sum_attitude, total),
            average_speed: ratio(self.sum_speed, total),
            average_professionalism: ratio(self.sum_professionalism, total),
            average_weighted_score: ratio(self.sum_weighted_score, total) / 100.0,
            threshold_pass_rate: ratio(self.count_meets_threshold, total) * 100.0,
        }
    }
}

impl SatisfactionSummary {
    pub fn formatted_pass_rate(&self) -> String {
        format!("{:.2}%", self.threshold_pass_rate)
    }
}

impl fmt::Display for SatisfactionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "total ratings:           {}", self.total_ratings)?;
        writeln!(f, "average attitude:        {:.2}", self.average_attitude)?;
        writeln!(f, "average speed:           {:.2}", self.average_speed)?;
        writeln!(f, "average professionalism: {:.2}", self.average_professionalism)?;
        writeln!(f, "average weighted score:  {:.2}", self.average_weighted_score)?;
        write!(f, "threshold pass rate:     {}", self.formatted_pass_rate())
    }
}
