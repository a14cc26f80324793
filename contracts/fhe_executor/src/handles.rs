use soroban_sdk::{xdr::ToXdr, Address, Bytes, BytesN, Env, Symbol};

use crate::DataKey;

const HANDLE_SEQ: Symbol = soroban_sdk::symbol_short!("H_SEQ");

/// Tag mixed into a handle so two ops never share a preimage.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum HandleOrigin {
    Input = 1,
    Trivial = 2,
    Add = 3,
    MulScalar = 4,
    GeScalar = 5,
    MinScalar = 6,
    MaxScalar = 7,
}

/// Derives a fresh handle: `sha256("fhe-handle" || seq || origin || owner)`.
///
/// The sequence lives in instance storage, so handles are unique per
/// executor deployment.
pub fn next_handle(env: &Env, origin: HandleOrigin, owner: &Address) -> BytesN<32> {
    let seq: u64 = env
        .storage()
        .instance()
        .get(&HANDLE_SEQ)
        .unwrap_or(0u64)
        .saturating_add(1);
    env.storage().instance().set(&HANDLE_SEQ, &seq);

    let mut data = Bytes::new(env);
    data.extend_from_array(b"fhe-handle");
    data.extend_from_array(&seq.to_be_bytes());
    data.extend_from_array(&(origin as u32).to_be_bytes());
    data.append(&owner.clone().to_xdr(env));
    env.crypto().sha256(&data).into()
}

/// Stores the clear value behind a handle. Values are `euint32`, so every
/// op wraps modulo 2^32.
pub fn store_value(env: &Env, handle: &BytesN<32>, value: u32) {
    crate::persist(env, &DataKey::Value(handle.clone()), &value);
}

pub fn load_value(env: &Env, handle: &BytesN<32>) -> Option<u32> {
    env.storage().persistent().get(&DataKey::Value(handle.clone()))
}

/// Binds an input proof to the handles it covers and to (contract, user).
pub fn input_proof(
    env: &Env,
    contract: &Address,
    user: &Address,
    handles: &soroban_sdk::Vec<BytesN<32>>,
) -> Bytes {
    let mut data = Bytes::new(env);
    data.extend_from_array(b"fhe-input");
    for h in handles.iter() {
        data.extend_from_array(&h.to_array());
    }
    data.append(&contract.clone().to_xdr(env));
    data.append(&user.clone().to_xdr(env));
    let digest: BytesN<32> = env.crypto().sha256(&data).into();
    Bytes::from_array(env, &digest.to_array())
}
