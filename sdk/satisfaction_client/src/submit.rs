use soroban_sdk::Env;
use tracing::info;

use crate::agent::service_agent_id;
use crate::error::{ClientError, Result};
use crate::ledger::SatisfactionLedger;
use crate::runtime::FheRuntime;
use crate::wallet::WalletSigner;

pub const MIN_SCORE: u32 = 1;
pub const MAX_SCORE: u32 = 5;

/// Three clear scores, each checked to lie in 1..=5.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RatingInput {
    attitude: u32,
    speed: u32,
    professionalism: u32,
}

impl RatingInput {
    pub fn new(attitude: u32, speed: u32, professionalism: u32) -> Result<Self> {
        for (dimension, value) in [
            ("attitude", attitude),
            ("speed", speed),
            ("professionalism", professionalism),
        ] {
            if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
                return Err(ClientError::ScoreOutOfRange { dimension, value });
            }
        }
        Ok(Self {
            attitude,
            speed,
            professionalism,
        })
    }

    pub fn values(&self) -> [u32; 3] {
        [self.attitude, self.speed, self.professionalism]
    }
}

/// Encrypts `input` for the wallet's account and submits it for the agent
/// named `agent_label`.
pub fn submit_rating<L, R, W>(
    env: &Env,
    ledger: &L,
    runtime: &R,
    wallet: &W,
    agent_label: &str,
    input: RatingInput,
) -> Result<()>
where
    L: SatisfactionLedger + ?Sized,
    R: FheRuntime + ?Sized,
    W: WalletSigner + ?Sized,
{
    let agent_id = service_agent_id(env, agent_label)?;
    if !runtime.is_ready() {
        return Err(ClientError::DecryptionUnavailable);
    }

    let user = wallet.address();
    let contract = ledger.contract_address();
    let encrypted = runtime.encrypt(&contract, &user, &input.values())?;
    ledger.submit_rating(&user, &agent_id, &encrypted)?;

    info!(agent = agent_label, "rating submitted");
    Ok(())
}
