use soroban_sdk::{Address, Bytes, BytesN};

use crate::error::Result;

/// The account holder. Signing may prompt the user and may be declined.
pub trait WalletSigner {
    fn address(&self) -> Address;

    fn sign_digest(&self, digest: &BytesN<32>) -> Result<Bytes>;
}
