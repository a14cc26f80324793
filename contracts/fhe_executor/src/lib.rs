//! Mock FHE coprocessor for local deployments and tests.
//!
//! Every ciphertext is a `BytesN<32>` handle onto a `u32` kept in clear in
//! this contract's storage. Calling contracts see the same surface a real
//! coprocessor exposes: input-proof verification, homomorphic ops, and an
//! access-control list deciding who may compute on or decrypt a handle.
//! Two entry points exist only because the runtime is mocked:
//! [`FheExecutorContract::encrypt_input`] stands in for client-side
//! encryption and [`FheExecutorContract::plaintext_of`] is what the mock
//! decryption service reads.

#![no_std]

pub mod acl;
pub mod events;
pub mod handles;


use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, Address, Bytes, BytesN,
    Env, IntoVal, Val, Vec,
};

use crate::handles::HandleOrigin;

// TTL: ~60 days at 5s/ledger
const TTL_THRESHOLD: u32 = 1_036_800;
const TTL_EXTEND_TO: u32 = 2_073_600;

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Value(BytesN<32>),
    Allowed(BytesN<32>, Address),
    Proof(Bytes),
}

/// Result of encrypting a batch of values for one (contract, user) pair.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncryptedInput {
    pub handles: Vec<BytesN<32>>,
    pub proof: Bytes,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InputBinding {
    pub contract: Address,
    pub user: Address,
    pub handles: Vec<BytesN<32>>,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ExecError {
    InvalidInput = 1,
    InvalidProof = 2,
    AccessDenied = 3,
    UnknownHandle = 4,
}

#[contract]
pub struct FheExecutorContract;

#[contractimpl]
impl FheExecutorContract {
    /// Encrypts `values` as inputs destined for `contract`, submitted by `user`.
    /// One proof covers the whole batch.
    pub fn encrypt_input(
        env: Env,
        contract: Address,
        user: Address,
        values: Vec<u32>,
    ) -> Result<EncryptedInput, ExecError> {
        user.require_auth();
        if values.is_empty() {
            return Err(ExecError::InvalidInput);
        }

        let mut out = Vec::new(&env);
        for value in values.iter() {
            let handle = handles::next_handle(&env, HandleOrigin::Input, &user);
            handles::store_value(&env, &handle, value);
            out.push_back(handle);
        }

        let proof = handles::input_proof(&env, &contract, &user, &out);
        persist(
            &env,
            &DataKey::Proof(proof.clone()),
            &InputBinding {
                contract,
                user,
                handles: out.clone(),
            },
        );

        Ok(EncryptedInput {
            handles: out,
            proof,
        })
    }

    /// Checks that `handle` was encrypted for (`caller`, `user`) under `proof`
    /// and grants `caller` access to it.
    pub fn verify_input(
        env: Env,
        caller: Address,
        user: Address,
        handle: BytesN<32>,
        proof: Bytes,
    ) -> Result<BytesN<32>, ExecError> {
        caller.require_auth();
        let binding: InputBinding = env
            .storage()
            .persistent()
            .get(&DataKey::Proof(proof))
            .ok_or(ExecError::InvalidProof)?;

        if binding.contract != caller || binding.user != user || !binding.handles.contains(&handle) {
            return Err(ExecError::InvalidProof);
        }

        acl::grant(&env, &handle, &caller);
        Ok(handle)
    }

    pub fn trivial_encrypt(env: Env, caller: Address, value: u32) -> BytesN<32> {
        caller.require_auth();
        Self::produce(&env, &caller, HandleOrigin::Trivial, value)
    }

    pub fn add(
        env: Env,
        caller: Address,
        lhs: BytesN<32>,
        rhs: BytesN<32>,
    ) -> Result<BytesN<32>, ExecError> {
        caller.require_auth();
        let a = Self::operand(&env, &caller, &lhs)?;
        let b = Self::operand(&env, &caller, &rhs)?;
        Ok(Self::produce(&env, &caller, HandleOrigin::Add, a.wrapping_add(b)))
    }

    pub fn mul_scalar(
        env: Env,
        caller: Address,
        lhs: BytesN<32>,
        scalar: u32,
    ) -> Result<BytesN<32>, ExecError> {
        caller.require_auth();
        let a = Self::operand(&env, &caller, &lhs)?;
        Ok(Self::produce(
            &env,
            &caller,
            HandleOrigin::MulScalar,
            a.wrapping_mul(scalar),
        ))
    }

    /// Encrypted `lhs >= scalar`, as 1 or 0.
    pub fn ge_scalar(
        env: Env,
        caller: Address,
        lhs: BytesN<32>,
        scalar: u32,
    ) -> Result<BytesN<32>, ExecError> {
        caller.require_auth();
        let a = Self::operand(&env, &caller, &lhs)?;
        Ok(Self::produce(
            &env,
            &caller,
            HandleOrigin::GeScalar,
            u32::from(a >= scalar),
        ))
    }

    /// Encrypted `min(lhs, scalar)`.
    pub fn min_scalar(
        env: Env,
        caller: Address,
        lhs: BytesN<32>,
        scalar: u32,
    ) -> Result<BytesN<32>, ExecError> {
        caller.require_auth();
        let a = Self::operand(&env, &caller, &lhs)?;
        Ok(Self::produce(&env, &caller, HandleOrigin::MinScalar, a.min(scalar)))
    }

    /// Encrypted `max(lhs, scalar)`.
    pub fn max_scalar(
        env: Env,
        caller: Address,
        lhs: BytesN<32>,
        scalar: u32,
    ) -> Result<BytesN<32>, ExecError> {
        caller.require_auth();
        let a = Self::operand(&env, &caller, &lhs)?;
        Ok(Self::produce(&env, &caller, HandleOrigin::MaxScalar, a.max(scalar)))
    }

    /// Shares `handle` with `account`. Only an account already allowed on the
    /// handle can share it.
    pub fn allow(
        env: Env,
        caller: Address,
        handle: BytesN<32>,
        account: Address,
    ) -> Result<(), ExecError> {
        caller.require_auth();
        if handles::load_value(&env, &handle).is_none() {
            return Err(ExecError::UnknownHandle);
        }
        acl::require_allowed(&env, &handle, &caller)?;
        acl::grant(&env, &handle, &account);
        events::emit_access_granted(&env, handle, account, caller);
        Ok(())
    }

    pub fn is_allowed(env: Env, handle: BytesN<32>, account: Address) -> bool {
        acl::is_allowed(&env, &handle, &account)
    }

    /// Clear value behind `handle`. Only the mock decryption service reads this.
    pub fn plaintext_of(env: Env, handle: BytesN<32>) -> Option<u32> {
        handles::load_value(&env, &handle)
    }

    fn operand(env: &Env, caller: &Address, handle: &BytesN<32>) -> Result<u32, ExecError> {
        let value = handles::load_value(env, handle).ok_or(ExecError::UnknownHandle)?;
        acl::require_allowed(env, handle, caller)?;
        Ok(value)
    }

    fn produce(env: &Env, caller: &Address, origin: HandleOrigin, value: u32) -> BytesN<32> {
        let handle = handles::next_handle(env, origin, caller);
        handles::store_value(env, &handle, value);
        acl::grant(env, &handle, caller);

        let op = match origin {
            HandleOrigin::Input => symbol_short!("INPUT"),
            HandleOrigin::Trivial => symbol_short!("TRIVIAL"),
            HandleOrigin::Add => symbol_short!("ADD"),
            HandleOrigin::MulScalar => symbol_short!("MUL"),
            HandleOrigin::GeScalar => symbol_short!("GE"),
            HandleOrigin::MinScalar => symbol_short!("MIN"),
            HandleOrigin::MaxScalar => symbol_short!("MAX"),
        };
        events::emit_handle_produced(env, op, caller.clone(), handle.clone());
        handle
    }
}

/// Writes a persistent entry and extends its TTL.
pub(crate) fn persist<V: IntoVal<Env, Val>>(env: &Env, key: &DataKey, value: &V) {
    env.storage().persistent().set(key, value);
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}
