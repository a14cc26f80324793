#![no_std]
#![allow(clippy::too_many_arguments)]

//! Anonymous customer-satisfaction ratings over FHE.
//!
//! Each submission carries three encrypted scores (attitude, speed,
//! professionalism). The contract derives an encrypted weighted score and an
//! encrypted threshold bit, appends the rating, and folds everything into a
//! running encrypted aggregate. All arithmetic runs on the FHE executor; this
//! contract never sees a clear score.

pub mod aggregate;
pub mod events;
pub mod scoring;


use fhe_executor::FheExecutorContractClient;
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, Address, Bytes, BytesN, Env, IntoVal,
    Val,
};

// TTL: ~60 days at 5s/ledger
pub(crate) const TTL_THRESHOLD: u32 = 1_036_800;
pub(crate) const TTL_EXTEND_TO: u32 = 2_073_600;

// ── Storage keys ────────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Executor,
    StatsAccess,
    Stats,
    Admin(Address),
    Rating(u64),
    AgentCount(BytesN<32>),
}

// ── Types ──────────────────────────────────────────────────────────────────────

/// One submission. Immutable once stored.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Rating {
    pub service_agent_id: BytesN<32>,
    pub encrypted_attitude: BytesN<32>,
    pub encrypted_speed: BytesN<32>,
    pub encrypted_professionalism: BytesN<32>,
    pub encrypted_weighted_score: BytesN<32>,
    pub meets_threshold: BytesN<32>,
    pub timestamp: u64,
}

/// Running aggregate over every stored rating.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AggregateStatistics {
    pub total_ratings: u64,
    pub sum_attitude: BytesN<32>,
    pub sum_speed: BytesN<32>,
    pub sum_professionalism: BytesN<32>,
    pub sum_weighted_score: BytesN<32>,
    pub count_meets_threshold: BytesN<32>,
}

/// Who may call `authorize_statistics_decryption`.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum StatsAccess {
    AdminsOnly = 0,
    Anyone = 1,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    Unauthorized = 3,
    InvalidProof = 4,
    IndexOutOfRange = 5,
}

// ── Contract ───────────────────────────────────────────────────────────────────

#[contract]
pub struct CipherSatisfactionContract;

#[contractimpl]
impl CipherSatisfactionContract {
    pub fn initialize(
        env: Env,
        admin: Address,
        executor: Address,
        stats_access: StatsAccess,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&DataKey::Executor) {
            return Err(ContractError::AlreadyInitialized);
        }
        admin.require_auth();

        env.storage().instance().set(&DataKey::Executor, &executor);
        env.storage().instance().set(&DataKey::StatsAccess, &stats_access);
        persist(&env, &DataKey::Admin(admin.clone()), &true);

        let fhe = FheExecutorContractClient::new(&env, &executor);
        let stats = aggregate::seed(&fhe, &env.current_contract_address());
        aggregate::store(&env, &stats);

        events::emit_admin_changed(&env, admin.clone(), true, admin);
        Ok(())
    }

    // ── Submissions ──────────────────────────────────────────────────────────

    pub fn submit_rating(
        env: Env,
        caller: Address,
        service_agent_id: BytesN<32>,
        enc_attitude: BytesN<32>,
        proof_attitude: Bytes,
        enc_speed: BytesN<32>,
        proof_speed: Bytes,
        enc_professionalism: BytesN<32>,
        proof_professionalism: Bytes,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        let fhe = Self::executor(&env)?;
        let stats = aggregate::load(&env).ok_or(ContractError::NotInitialized)?;
        let this = env.current_contract_address();

        let attitude = Self::verified(&fhe, &this, &caller, enc_attitude, proof_attitude)?;
        let speed = Self::verified(&fhe, &this, &caller, enc_speed, proof_speed)?;
        let professionalism =
            Self::verified(&fhe, &this, &caller, enc_professionalism, proof_professionalism)?;

        let attitude = scoring::clamp(&fhe, &this, &attitude);
        let speed = scoring::clamp(&fhe, &this, &speed);
        let professionalism = scoring::clamp(&fhe, &this, &professionalism);

        let scored = scoring::score(&fhe, &this, &attitude, &speed, &professionalism);

        let rating = Rating {
            service_agent_id: service_agent_id.clone(),
            encrypted_attitude: attitude,
            encrypted_speed: speed,
            encrypted_professionalism: professionalism,
            encrypted_weighted_score: scored.weighted_score,
            meets_threshold: scored.meets_threshold,
            timestamp: env.ledger().timestamp(),
        };

        let index = stats.total_ratings;
        persist(&env, &DataKey::Rating(index), &rating);

        let updated = aggregate::accumulate(&fhe, &this, &stats, &rating);
        aggregate::store(&env, &updated);

        let agent_key = DataKey::AgentCount(service_agent_id.clone());
        let agent_count: u64 = env.storage().persistent().get(&agent_key).unwrap_or(0);
        persist(&env, &agent_key, &agent_count.saturating_add(1));

        // The submitter may decrypt their own rating.
        for handle in [
            &rating.encrypted_attitude,
            &rating.encrypted_speed,
            &rating.encrypted_professionalism,
            &rating.encrypted_weighted_score,
            &rating.meets_threshold,
        ] {
            fhe.allow(&this, handle, &caller);
        }

        events::emit_rating_submitted(&env, index, service_agent_id, updated.total_ratings);
        Ok(())
    }

    // ── Reads ────────────────────────────────────────────────────────────────

    pub fn get_total_ratings(env: Env) -> u64 {
        aggregate::load(&env).map(|s| s.total_ratings).unwrap_or(0)
    }

    pub fn get_rating(env: Env, index: u64) -> Result<Rating, ContractError> {
        if index >= Self::get_total_ratings(env.clone()) {
            return Err(ContractError::IndexOutOfRange);
        }
        env.storage()
            .persistent()
            .get(&DataKey::Rating(index))
            .ok_or(ContractError::IndexOutOfRange)
    }

    pub fn get_statistics(env: Env) -> Result<AggregateStatistics, ContractError> {
        aggregate::load(&env).ok_or(ContractError::NotInitialized)
    }

    pub fn get_rating_count_for_agent(env: Env, service_agent_id: BytesN<32>) -> u64 {
        env.storage()
            .persistent()
            .get(&DataKey::AgentCount(service_agent_id))
            .unwrap_or(0)
    }

    pub fn get_executor(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&DataKey::Executor)
            .ok_or(ContractError::NotInitialized)
    }

    pub fn get_stats_access(env: Env) -> Result<StatsAccess, ContractError> {
        env.storage()
            .instance()
            .get(&DataKey::StatsAccess)
            .ok_or(ContractError::NotInitialized)
    }

    // ── Decryption authorization ─────────────────────────────────────────────

    /// Grants `caller` access to the aggregate handles as they are now. A
    /// later submission replaces every handle, so callers re-authorize before
    /// each decryption.
    pub fn authorize_statistics_decryption(env: Env, caller: Address) -> Result<(), ContractError> {
        caller.require_auth();
        let fhe = Self::executor(&env)?;
        let stats = aggregate::load(&env).ok_or(ContractError::NotInitialized)?;

        let access = Self::get_stats_access(env.clone())?;
        if access == StatsAccess::AdminsOnly && !Self::is_admin(env.clone(), caller.clone()) {
            return Err(ContractError::Unauthorized);
        }

        let this = env.current_contract_address();
        for handle in aggregate::handles(&stats).iter() {
            fhe.allow(&this, handle, &caller);
        }

        events::emit_stats_authorized(&env, caller, stats.total_ratings);
        Ok(())
    }

    // ── Admin set ────────────────────────────────────────────────────────────

    pub fn set_admin(
        env: Env,
        caller: Address,
        account: Address,
        is_admin: bool,
    ) -> Result<(), ContractError> {
        Self::require_admin(&env, &caller)?;
        let key = DataKey::Admin(account.clone());
        if is_admin {
            persist(&env, &key, &true);
        } else {
            env.storage().persistent().remove(&key);
        }
        events::emit_admin_changed(&env, account, is_admin, caller);
        Ok(())
    }

    pub fn is_admin(env: Env, account: Address) -> bool {
        env.storage()
            .persistent()
            .get(&DataKey::Admin(account))
            .unwrap_or(false)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn require_admin(env: &Env, caller: &Address) -> Result<(), ContractError> {
        caller.require_auth();
        if !env.storage().instance().has(&DataKey::Executor) {
            return Err(ContractError::NotInitialized);
        }
        if !Self::is_admin(env.clone(), caller.clone()) {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    fn executor(env: &Env) -> Result<FheExecutorContractClient<'_>, ContractError> {
        let address = Self::get_executor(env.clone())?;
        Ok(FheExecutorContractClient::new(env, &address))
    }

    fn verified(
        fhe: &FheExecutorContractClient,
        this: &Address,
        user: &Address,
        handle: BytesN<32>,
        proof: Bytes,
    ) -> Result<BytesN<32>, ContractError> {
        match fhe.try_verify_input(this, user, &handle, &proof) {
            Ok(Ok(verified)) => Ok(verified),
            _ => Err(ContractError::InvalidProof),
        }
    }
}

fn persist<V: IntoVal<Env, Val>>(env: &Env, key: &DataKey, value: &V) {
    env.storage().persistent().set(key, value);
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}
