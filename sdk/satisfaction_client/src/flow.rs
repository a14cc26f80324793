//! Authorize-then-decrypt protocol for the aggregate statistics.
//!
//! ```text
//! Idle ─start─▶ RequestingAuthorization ─▶ AwaitingSignature ─▶ Decrypting ─▶ Done
//!                        │                        │                  │
//!                        └────────────────────────┴──────────────────┴──▶ Failed
//! ```
//!
//! Each `step` runs exactly one stage, so a caller can interleave the flow
//! with UI work or abandon it with `cancel`. Nothing already sent to the
//! ledger is rolled back on cancel; a new `start` begins again from the
//! authorization call. The last successful result survives failures and
//! cancellations.

use cipher_satisfaction::AggregateStatistics;
use soroban_sdk::{Address, BytesN, Env};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::ledger::SatisfactionLedger;
use crate::runtime::{FheRuntime, HandleContractPair};
use crate::signature::{load_or_sign, DecryptionSignature, SignatureStore};
use crate::stats::{DecryptedStatistics, SatisfactionSummary};
use crate::wallet::WalletSigner;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecryptionState {
    Idle,
    RequestingAuthorization,
    AwaitingSignature,
    Decrypting,
    Done,
    Failed(ClientError),
}

impl DecryptionState {
    pub fn name(&self) -> &'static str {
        match self {
            DecryptionState::Idle => "idle",
            DecryptionState::RequestingAuthorization => "requesting-authorization",
            DecryptionState::AwaitingSignature => "awaiting-signature",
            DecryptionState::Decrypting => "decrypting",
            DecryptionState::Done => "done",
            DecryptionState::Failed(_) => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DecryptionState::Done | DecryptionState::Failed(_))
    }
}

pub struct StatisticsDecryption<'a, L: ?Sized, R: ?Sized, W: ?Sized, S: ?Sized> {
    env: Env,
    ledger: &'a L,
    runtime: &'a R,
    wallet: &'a W,
    store: &'a mut S,
    config: ClientConfig,
    state: DecryptionState,
    snapshot: Option<AggregateStatistics>,
    signature: Option<DecryptionSignature>,
    result: Option<DecryptedStatistics>,
}

impl<'a, L, R, W, S> StatisticsDecryption<'a, L, R, W, S>
where
    L: SatisfactionLedger + ?Sized,
    R: FheRuntime + ?Sized,
    W: WalletSigner + ?Sized,
    S: SignatureStore + ?Sized,
{
    pub fn new(
        env: &Env,
        ledger: &'a L,
        runtime: &'a R,
        wallet: &'a W,
        store: &'a mut S,
        config: ClientConfig,
    ) -> Self {
        Self {
            env: env.clone(),
            ledger,
            runtime,
            wallet,
            store,
            config,
            state: DecryptionState::Idle,
            snapshot: None,
            signature: None,
            result: None,
        }
    }

    pub fn state(&self) -> &DecryptionState {
        &self.state
    }

    /// The most recent successful decryption, if any.
    pub fn last_result(&self) -> Option<&DecryptedStatistics> {
        self.result.as_ref()
    }

    pub fn summary(&self) -> Option<SatisfactionSummary> {
        self.result.as_ref().map(DecryptedStatistics::summary)
    }

    pub fn start(&mut self) -> Result<()> {
        match self.state {
            DecryptionState::Idle | DecryptionState::Done | DecryptionState::Failed(_) => {
                self.snapshot = None;
                self.signature = None;
                self.transition(DecryptionState::RequestingAuthorization);
                Ok(())
            }
            _ => Err(ClientError::InvalidState(self.state.name())),
        }
    }

    /// Runs the current stage. Idle and terminal states are left unchanged.
    pub fn step(&mut self) -> &DecryptionState {
        let outcome = match self.state {
            DecryptionState::RequestingAuthorization => self.request_authorization(),
            DecryptionState::AwaitingSignature => self.obtain_signature(),
            DecryptionState::Decrypting => self.decrypt(),
            _ => return &self.state,
        };
        if let Err(err) = outcome {
            warn!(stage = self.state.name(), error = %err, "statistics decryption failed");
            self.snapshot = None;
            self.signature = None;
            self.transition(DecryptionState::Failed(err));
        }
        &self.state
    }

    /// Abandons the attempt in flight and returns to `Idle`.
    pub fn cancel(&mut self) {
        if self.state != DecryptionState::Idle {
            debug!(stage = self.state.name(), "statistics decryption cancelled");
        }
        self.snapshot = None;
        self.signature = None;
        self.state = DecryptionState::Idle;
    }

    /// Drives a fresh attempt to completion.
    pub fn run(&mut self) -> Result<SatisfactionSummary> {
        self.start()?;
        while !self.step().is_terminal() {}
        match &self.state {
            DecryptionState::Failed(err) => Err(err.clone()),
            _ => self
                .summary()
                .ok_or(ClientError::InvalidState(DecryptionState::Done.name())),
        }
    }

    fn request_authorization(&mut self) -> Result<()> {
        if !self.runtime.is_ready() {
            return Err(ClientError::DecryptionUnavailable);
        }
        let viewer = self.wallet.address();
        self.ledger.authorize_statistics_decryption(&viewer)?;
        let snapshot = self.ledger.statistics()?;
        debug!(total = snapshot.total_ratings, "aggregate authorized");
        self.snapshot = Some(snapshot);
        self.transition(DecryptionState::AwaitingSignature);
        Ok(())
    }

    fn obtain_signature(&mut self) -> Result<()> {
        let contracts = [self.ledger.contract_address()];
        let signature = load_or_sign(
            &self.env,
            self.runtime,
            self.wallet,
            &mut *self.store,
            &contracts,
            &self.config,
        )?;
        self.signature = Some(signature);
        self.transition(DecryptionState::Decrypting);
        Ok(())
    }

    fn decrypt(&mut self) -> Result<()> {
        let snapshot = self
            .snapshot
            .as_ref()
            .ok_or(ClientError::InvalidState(DecryptionState::Decrypting.name()))?;
        let signature = self
            .signature
            .as_ref()
            .ok_or(ClientError::InvalidState(DecryptionState::Decrypting.name()))?;
        let contract = self.ledger.contract_address();

        let decrypted = DecryptedStatistics {
            total_ratings: snapshot.total_ratings,
            sum_attitude: decrypt_handle(self.runtime, &contract, &snapshot.sum_attitude, signature)?,
            sum_speed: decrypt_handle(self.runtime, &contract, &snapshot.sum_speed, signature)?,
            sum_professionalism: decrypt_handle(
                self.runtime,
                &contract,
                &snapshot.sum_professionalism,
                signature,
            )?,
            sum_weighted_score: decrypt_handle(
                self.runtime,
                &contract,
                &snapshot.sum_weighted_score,
                signature,
            )?,
            count_meets_threshold: decrypt_handle(
                self.runtime,
                &contract,
                &snapshot.count_meets_threshold,
                signature,
            )?,
        };

        info!(total = decrypted.total_ratings, "statistics decrypted");
        self.result = Some(decrypted);
        self.snapshot = None;
        self.signature = None;
        self.transition(DecryptionState::Done);
        Ok(())
    }

    fn transition(&mut self, next: DecryptionState) {
        debug!(from = self.state.name(), to = next.name(), "decryption flow");
        self.state = next;
    }
}

/// One rating as its submitter sees it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecryptedRating {
    pub attitude: u64,
    pub speed: u64,
    pub professionalism: u64,
    pub weighted_score: u64,
    pub meets_threshold: bool,
}

/// Decrypts the rating at `index`. Only its submitter holds rights on the
/// handles, so nothing is authorized on-chain first.
pub fn decrypt_rating<L, R, W, S>(
    env: &Env,
    ledger: &L,
    runtime: &R,
    wallet: &W,
    store: &mut S,
    config: &ClientConfig,
    index: u64,
) -> Result<DecryptedRating>
where
    L: SatisfactionLedger + ?Sized,
    R: FheRuntime + ?Sized,
    W: WalletSigner + ?Sized,
    S: SignatureStore + ?Sized,
{
    if !runtime.is_ready() {
        return Err(ClientError::DecryptionUnavailable);
    }
    let rating = ledger.rating(index)?;
    let contract = ledger.contract_address();
    let signature = load_or_sign(env, runtime, wallet, store, &[contract.clone()], config)?;

    Ok(DecryptedRating {
        attitude: decrypt_handle(runtime, &contract, &rating.encrypted_attitude, &signature)?,
        speed: decrypt_handle(runtime, &contract, &rating.encrypted_speed, &signature)?,
        professionalism: decrypt_handle(
            runtime,
            &contract,
            &rating.encrypted_professionalism,
            &signature,
        )?,
        weighted_score: decrypt_handle(
            runtime,
            &contract,
            &rating.encrypted_weighted_score,
            &signature,
        )?,
        meets_threshold: decrypt_handle(runtime, &contract, &rating.meets_threshold, &signature)?
            == 1,
    })
}

fn decrypt_handle<R: FheRuntime + ?Sized>(
    runtime: &R,
    contract: &Address,
    handle: &BytesN<32>,
    signature: &DecryptionSignature,
) -> Result<u64> {
    let request = HandleContractPair {
        handle: handle.clone(),
        contract_address: contract.clone(),
    };
    let values = runtime.user_decrypt(&[request], signature)?;
    values
        .get(&handle.to_array())
        .copied()
        .ok_or_else(|| ClientError::AuthorizationRejected("handle missing from decryption".into()))
}
