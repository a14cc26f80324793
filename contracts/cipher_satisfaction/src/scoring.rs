//! Weighted-score and threshold rules, evaluated on ciphertexts.
//!
//! The weights sum to 100, so a weighted score is the average rating scaled
//! by 100. Nothing here branches on an encrypted value: the threshold check
//! is a comparison ciphertext.

use fhe_executor::FheExecutorContractClient;
use soroban_sdk::{Address, BytesN};

pub const ATTITUDE_WEIGHT: u32 = 30;
pub const SPEED_WEIGHT: u32 = 30;
pub const PROFESSIONALISM_WEIGHT: u32 = 40;

/// 4.0 out of 5 on the ×100 scale.
pub const SATISFACTION_THRESHOLD: u32 = 400;

pub const MIN_SCORE: u32 = 1;
pub const MAX_SCORE: u32 = 5;

pub struct ScoredRating {
    pub weighted_score: BytesN<32>,
    pub meets_threshold: BytesN<32>,
}

pub fn score(
    fhe: &FheExecutorContractClient,
    this: &Address,
    attitude: &BytesN<32>,
    speed: &BytesN<32>,
    professionalism: &BytesN<32>,
) -> ScoredRating {
    let a = fhe.mul_scalar(this, attitude, &ATTITUDE_WEIGHT);
    let s = fhe.mul_scalar(this, speed, &SPEED_WEIGHT);
    let p = fhe.mul_scalar(this, professionalism, &PROFESSIONALISM_WEIGHT);

    let partial = fhe.add(this, &a, &s);
    let weighted_score = fhe.add(this, &partial, &p);
    let meets_threshold = fhe.ge_scalar(this, &weighted_score, &SATISFACTION_THRESHOLD);

    ScoredRating {
        weighted_score,
        meets_threshold,
    }
}

/// Pins an encrypted input into `MIN_SCORE..=MAX_SCORE`, without branching
/// on its value.
pub fn clamp(fhe: &FheExecutorContractClient, this: &Address, score: &BytesN<32>) -> BytesN<32> {
    let floored = fhe.max_scalar(this, score, &MIN_SCORE);
    fhe.min_scalar(this, &floored, &MAX_SCORE)
}

/// Clear-text reference of [`clamp`].
pub fn clamp_score(score: u32) -> u32 {
    score.clamp(MIN_SCORE, MAX_SCORE)
}

/// Clear-text reference of [`score`]'s weighted value.
pub fn weighted_score(attitude: u32, speed: u32, professionalism: u32) -> u32 {
    ATTITUDE_WEIGHT * attitude + SPEED_WEIGHT * speed + PROFESSIONALISM_WEIGHT * professionalism
}

pub fn meets_threshold(weighted: u32) -> bool {
    weighted >= SATISFACTION_THRESHOLD
}
