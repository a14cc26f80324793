//! Time-bounded decryption signatures and their process-local cache.
//!
//! A signature authorizes one account to decrypt handles governed by a fixed
//! set of contracts for `duration_days` starting at `start_timestamp`. The
//! runtime enforces the window; the cache only avoids re-prompting the wallet
//! while a stored signature is still usable.

use std::collections::HashMap;

use soroban_sdk::{xdr::ToXdr, Address, Bytes, BytesN, Env};
use tracing::{debug, info};

use crate::config::{ClientConfig, SECONDS_PER_DAY};
use crate::error::Result;
use crate::runtime::FheRuntime;
use crate::wallet::WalletSigner;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecryptionSignature {
    pub private_key: [u8; 32],
    pub public_key: BytesN<32>,
    pub signature: Bytes,
    pub contract_addresses: Vec<Address>,
    pub user_address: Address,
    pub start_timestamp: u64,
    pub duration_days: u32,
}

impl DecryptionSignature {
    pub fn expires_at(&self) -> u64 {
        self.start_timestamp
            .saturating_add(u64::from(self.duration_days).saturating_mul(SECONDS_PER_DAY))
    }

    pub fn is_valid_at(&self, now: u64) -> bool {
        now >= self.start_timestamp && now < self.expires_at()
    }

    /// The digest the wallet signed.
    pub fn digest(&self, env: &Env) -> BytesN<32> {
        signature_digest(
            env,
            &self.public_key,
            &self.contract_addresses,
            &self.user_address,
            self.start_timestamp,
            self.duration_days,
        )
    }

    pub fn covers(&self, contract: &Address) -> bool {
        self.contract_addresses.contains(contract)
    }
}

/// Typed digest over every field the runtime checks, so a signature cannot be
/// replayed against another keypair, contract set, account or window.
pub fn signature_digest(
    env: &Env,
    public_key: &BytesN<32>,
    contract_addresses: &[Address],
    user_address: &Address,
    start_timestamp: u64,
    duration_days: u32,
) -> BytesN<32> {
    let mut data = Bytes::new(env);
    data.extend_from_array(b"user-decrypt");
    data.extend_from_array(&public_key.to_array());
    data.extend_from_array(&(contract_addresses.len() as u32).to_be_bytes());
    for contract in contract_addresses {
        data.append(&contract.clone().to_xdr(env));
    }
    data.append(&user_address.clone().to_xdr(env));
    data.extend_from_array(&start_timestamp.to_be_bytes());
    data.extend_from_array(&duration_days.to_be_bytes());
    env.crypto().sha256(&data).into()
}

/// Cache key: (contract set, account, duration). Contract order is
/// irrelevant.
pub fn cache_key(
    env: &Env,
    contract_addresses: &[Address],
    user_address: &Address,
    duration_days: u32,
) -> [u8; 32] {
    let mut contracts = contract_addresses.to_vec();
    contracts.sort();
    contracts.dedup();

    let mut data = Bytes::new(env);
    data.extend_from_array(b"sig-cache");
    for contract in &contracts {
        data.append(&contract.clone().to_xdr(env));
    }
    data.append(&user_address.clone().to_xdr(env));
    data.extend_from_array(&duration_days.to_be_bytes());
    let digest: BytesN<32> = env.crypto().sha256(&data).into();
    digest.to_array()
}

pub trait SignatureStore {
    fn get(&self, key: &[u8; 32]) -> Option<DecryptionSignature>;
    fn put(&mut self, key: [u8; 32], signature: DecryptionSignature);
    fn remove(&mut self, key: &[u8; 32]);
}

#[derive(Default)]
pub struct InMemorySignatureStore {
    entries: HashMap<[u8; 32], DecryptionSignature>,
}

impl InMemorySignatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SignatureStore for InMemorySignatureStore {
    fn get(&self, key: &[u8; 32]) -> Option<DecryptionSignature> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: [u8; 32], signature: DecryptionSignature) {
        self.entries.insert(key, signature);
    }

    fn remove(&mut self, key: &[u8; 32]) {
        self.entries.remove(key);
    }
}

/// Returns a cached signature for (contracts, wallet account, duration) if it
/// is still valid, otherwise asks the wallet to sign a new one and caches it.
pub fn load_or_sign<R, W, S>(
    env: &Env,
    runtime: &R,
    wallet: &W,
    store: &mut S,
    contract_addresses: &[Address],
    config: &ClientConfig,
) -> Result<DecryptionSignature>
where
    R: FheRuntime + ?Sized,
    W: WalletSigner + ?Sized,
    S: SignatureStore + ?Sized,
{
    let user_address = wallet.address();
    let duration_days = config.signature_duration_days;
    let key = cache_key(env, contract_addresses, &user_address, duration_days);
    let now = runtime.now();

    if let Some(cached) = store.get(&key) {
        if cached.is_valid_at(now) {
            debug!(expires_at = cached.expires_at(), "reusing cached decryption signature");
            return Ok(cached);
        }
        store.remove(&key);
    }

    let keypair = runtime.generate_keypair()?;
    let digest = signature_digest(
        env,
        &keypair.public_key,
        contract_addresses,
        &user_address,
        now,
        duration_days,
    );
    let signature = wallet.sign_digest(&digest)?;

    let signed = DecryptionSignature {
        private_key: keypair.private_key,
        public_key: keypair.public_key,
        signature,
        contract_addresses: contract_addresses.to_vec(),
        user_address,
        start_timestamp: now,
        duration_days,
    };
    info!(
        contracts = contract_addresses.len(),
        duration_days, "signed new decryption signature"
    );
    store.put(key, signed.clone());
    Ok(signed)
}
