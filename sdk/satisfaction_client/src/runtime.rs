//! The FHE runtime seam: client-side encryption and user decryption.

use std::collections::BTreeMap;

use fhe_executor::EncryptedInput;
use soroban_sdk::{Address, BytesN};

use crate::error::Result;
use crate::signature::DecryptionSignature;

/// A handle paired with the contract whose ACL governs it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandleContractPair {
    pub handle: BytesN<32>,
    pub contract_address: Address,
}

/// Decrypted values keyed by raw handle bytes.
pub type DecryptedValues = BTreeMap<[u8; 32], u64>;

/// Reencryption keypair bound into a decryption signature. The private half
/// never leaves the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Keypair {
    pub public_key: BytesN<32>,
    pub private_key: [u8; 32],
}

pub trait FheRuntime {
    /// `false` until the runtime has loaded its keys and parameters.
    fn is_ready(&self) -> bool;

    /// Current time as the runtime sees it, in seconds.
    fn now(&self) -> u64;

    fn generate_keypair(&self) -> Result<Keypair>;

    /// Encrypts `values` as one input batch for (`contract`, `user`).
    fn encrypt(&self, contract: &Address, user: &Address, values: &[u32]) -> Result<EncryptedInput>;

    /// Resolves each handle to its plaintext, provided the signature is in its
    /// validity window and both the user and the contract hold ACL rights.
    fn user_decrypt(
        &self,
        requests: &[HandleContractPair],
        signature: &DecryptionSignature,
    ) -> Result<DecryptedValues>;
}
