use fhe_executor::FheExecutorContractClient;
use soroban_sdk::{Address, BytesN, Env};

use crate::{AggregateStatistics, DataKey, Rating};

/// Zeroed aggregate: five trivial encryptions of 0 owned by this contract.
pub fn seed(fhe: &FheExecutorContractClient, this: &Address) -> AggregateStatistics {
    AggregateStatistics {
        total_ratings: 0,
        sum_attitude: fhe.trivial_encrypt(this, &0),
        sum_speed: fhe.trivial_encrypt(this, &0),
        sum_professionalism: fhe.trivial_encrypt(this, &0),
        sum_weighted_score: fhe.trivial_encrypt(this, &0),
        count_meets_threshold: fhe.trivial_encrypt(this, &0),
    }
}

/// Folds one rating into the aggregate. Every field gets a new handle.
pub fn accumulate(
    fhe: &FheExecutorContractClient,
    this: &Address,
    stats: &AggregateStatistics,
    rating: &Rating,
) -> AggregateStatistics {
    AggregateStatistics {
        total_ratings: stats.total_ratings.saturating_add(1),
        sum_attitude: fhe.add(this, &stats.sum_attitude, &rating.encrypted_attitude),
        sum_speed: fhe.add(this, &stats.sum_speed, &rating.encrypted_speed),
        sum_professionalism: fhe.add(
            this,
            &stats.sum_professionalism,
            &rating.encrypted_professionalism,
        ),
        sum_weighted_score: fhe.add(
            this,
            &stats.sum_weighted_score,
            &rating.encrypted_weighted_score,
        ),
        count_meets_threshold: fhe.add(this, &stats.count_meets_threshold, &rating.meets_threshold),
    }
}

pub fn handles(stats: &AggregateStatistics) -> [BytesN<32>; 5] {
    [
        stats.sum_attitude.clone(),
        stats.sum_speed.clone(),
        stats.sum_professionalism.clone(),
        stats.sum_weighted_score.clone(),
        stats.count_meets_threshold.clone(),
    ]
}

pub fn load(env: &Env) -> Option<AggregateStatistics> {
    env.storage().instance().get(&DataKey::Stats)
}

pub fn store(env: &Env, stats: &AggregateStatistics) {
    env.storage().instance().set(&DataKey::Stats, stats);
    env.storage()
        .instance()
        .extend_ttl(crate::TTL_THRESHOLD, crate::TTL_EXTEND_TO);
}
