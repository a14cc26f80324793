use soroban_sdk::{Bytes, BytesN, Env};

use crate::error::{ClientError, Result};

/// Hashes a user-supplied agent label into the on-chain identifier
/// (keccak-256 of the UTF-8 bytes as typed). A label that is blank after
/// trimming is rejected, but the hash covers the untrimmed label.
pub fn service_agent_id(env: &Env, label: &str) -> Result<BytesN<32>> {
    if label.trim().is_empty() {
        return Err(ClientError::EmptyAgentId);
    }
    Ok(env
        .crypto()
        .keccak256(&Bytes::from_slice(env, label.as_bytes()))
        .into())
}
