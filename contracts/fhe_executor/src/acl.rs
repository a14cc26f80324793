use soroban_sdk::{Address, BytesN, Env};

use crate::{DataKey, ExecError};

pub fn is_allowed(env: &Env, handle: &BytesN<32>, account: &Address) -> bool {
    env.storage()
        .persistent()
        .get(&DataKey::Allowed(handle.clone(), account.clone()))
        .unwrap_or(false)
}

pub fn grant(env: &Env, handle: &BytesN<32>, account: &Address) {
    crate::persist(env, &DataKey::Allowed(handle.clone(), account.clone()), &true);
}

/// Fails with `AccessDenied` unless `account` may use `handle`.
pub fn require_allowed(env: &Env, handle: &BytesN<32>, account: &Address) -> Result<(), ExecError> {
    if !is_allowed(env, handle, account) {
        return Err(ExecError::AccessDenied);
    }
    Ok(())
}
