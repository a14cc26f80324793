#![no_main]

use arbitrary::Arbitrary;
use fhe_executor::{FheExecutorContract, FheExecutorContractClient};
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{testutils::Address as _, Address, BytesN, Env, Vec};

/// Operations on a pool of handles owned by one of two callers. Operand
/// indices select from the pool modulo its length.
#[derive(Arbitrary, Debug)]
pub enum FuzzOp {
    Input { owner: bool, value: u32 },
    Trivial { owner: bool, value: u32 },
    Add { owner: bool, lhs: u8, rhs: u8 },
    MulScalar { owner: bool, lhs: u8, scalar: u32 },
    GeScalar { owner: bool, lhs: u8, scalar: u32 },
    MinScalar { owner: bool, lhs: u8, scalar: u32 },
    MaxScalar { owner: bool, lhs: u8, scalar: u32 },
    Allow { owner: bool, handle: u8 },
}

fuzz_target!(|ops: std::vec::Vec<FuzzOp>| {
    let env = Env::default();
    env.mock_all_auths();

    let executor_id = env.register(FheExecutorContract, ());
    let fhe = FheExecutorContractClient::new(&env, &executor_id);
    let callers = [Address::generate(&env), Address::generate(&env)];
    let pick = |owner: bool| &callers[usize::from(owner)];

    // Every live handle with its expected clear value and its allowed callers.
    let mut pool: std::vec::Vec<(BytesN<32>, u32, [bool; 2])> = std::vec::Vec::new();

    for op in ops.into_iter().take(64) {
        match op {
            FuzzOp::Input { owner, value } => {
                let caller = pick(owner);
                let user = Address::generate(&env);
                let mut values = Vec::new(&env);
                values.push_back(value);
                let input = fhe.encrypt_input(caller, &user, &values);
                let handle = input.handles.get(0).unwrap();
                fhe.verify_input(caller, &user, &handle, &input.proof);
                let mut allowed = [false; 2];
                allowed[usize::from(owner)] = true;
                pool.push((handle, value, allowed));
            }
            FuzzOp::Trivial { owner, value } => {
                let handle = fhe.trivial_encrypt(pick(owner), &value);
                let mut allowed = [false; 2];
                allowed[usize::from(owner)] = true;
                pool.push((handle, value, allowed));
            }
            FuzzOp::Add { owner, lhs, rhs } => {
                if pool.is_empty() {
                    continue;
                }
                let l = &pool[usize::from(lhs) % pool.len()];
                let r = &pool[usize::from(rhs) % pool.len()];
                let permitted = l.2[usize::from(owner)] && r.2[usize::from(owner)];
                let expected = l.1.wrapping_add(r.1);
                let result = fhe.try_add(pick(owner), &l.0, &r.0);
                assert_eq!(result.is_ok(), permitted, "INVARIANT VIOLATION: ACL bypass on add");
                if let Ok(Ok(handle)) = result {
                    let mut allowed = [false; 2];
                    allowed[usize::from(owner)] = true;
                    pool.push((handle, expected, allowed));
                }
            }
            FuzzOp::MulScalar { owner, lhs, scalar } => {
                if pool.is_empty() {
                    continue;
                }
                let l = &pool[usize::from(lhs) % pool.len()];
                let permitted = l.2[usize::from(owner)];
                let expected = l.1.wrapping_mul(scalar);
                let result = fhe.try_mul_scalar(pick(owner), &l.0, &scalar);
                assert_eq!(result.is_ok(), permitted, "INVARIANT VIOLATION: ACL bypass on mul");
                if let Ok(Ok(handle)) = result {
                    let mut allowed = [false; 2];
                    allowed[usize::from(owner)] = true;
                    pool.push((handle, expected, allowed));
                }
            }
            FuzzOp::GeScalar { owner, lhs, scalar } => {
                if pool.is_empty() {
                    continue;
                }
                let l = &pool[usize::from(lhs) % pool.len()];
                let permitted = l.2[usize::from(owner)];
                let expected = u32::from(l.1 >= scalar);
                let result = fhe.try_ge_scalar(pick(owner), &l.0, &scalar);
                assert_eq!(result.is_ok(), permitted, "INVARIANT VIOLATION: ACL bypass on ge");
                if let Ok(Ok(handle)) = result {
                    let mut allowed = [false; 2];
                    allowed[usize::from(owner)] = true;
                    pool.push((handle, expected, allowed));
                }
            }
            FuzzOp::MinScalar { owner, lhs, scalar } => {
                if pool.is_empty() {
                    continue;
                }
                let l = &pool[usize::from(lhs) % pool.len()];
                let permitted = l.2[usize::from(owner)];
                let expected = l.1.min(scalar);
                let result = fhe.try_min_scalar(pick(owner), &l.0, &scalar);
                assert_eq!(result.is_ok(), permitted, "INVARIANT VIOLATION: ACL bypass on min");
                if let Ok(Ok(handle)) = result {
                    let mut allowed = [false; 2];
                    allowed[usize::from(owner)] = true;
                    pool.push((handle, expected, allowed));
                }
            }
            FuzzOp::MaxScalar { owner, lhs, scalar } => {
                if pool.is_empty() {
                    continue;
                }
                let l = &pool[usize::from(lhs) % pool.len()];
                let permitted = l.2[usize::from(owner)];
                let expected = l.1.max(scalar);
                let result = fhe.try_max_scalar(pick(owner), &l.0, &scalar);
                assert_eq!(result.is_ok(), permitted, "INVARIANT VIOLATION: ACL bypass on max");
                if let Ok(Ok(handle)) = result {
                    let mut allowed = [false; 2];
                    allowed[usize::from(owner)] = true;
                    pool.push((handle, expected, allowed));
                }
            }
            FuzzOp::Allow { owner, handle } => {
                if pool.is_empty() {
                    continue;
                }
                let idx = usize::from(handle) % pool.len();
                let grantee = usize::from(!owner);
                let permitted = pool[idx].2[usize::from(owner)];
                let result = fhe.try_allow(pick(owner), &pool[idx].0, &callers[grantee]);
                assert_eq!(result.is_ok(), permitted, "INVARIANT VIOLATION: ACL bypass on allow");
                if permitted {
                    pool[idx].2[grantee] = true;
                }
            }
        }

        // ── Post-op invariant checks ──
        for (handle, value, allowed) in &pool {
            assert_eq!(fhe.plaintext_of(handle), Some(*value), "INVARIANT VIOLATION: value drifted");
            for (i, caller) in callers.iter().enumerate() {
                assert_eq!(fhe.is_allowed(handle, caller), allowed[i]);
            }
        }
    }
});
