#![no_main]

use arbitrary::Arbitrary;
use cipher_satisfaction::scoring::{clamp_score, meets_threshold, weighted_score};
use cipher_satisfaction::{
    CipherSatisfactionContract, CipherSatisfactionContractClient, StatsAccess,
};
use fhe_executor::{FheExecutorContract, FheExecutorContractClient};
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{testutils::Address as _, testutils::Ledger as _, Address, BytesN, Env, Vec};

/// Actions covering every rating entry point. Raw scores go to the contract
/// unvalidated and are expected to be clamped into 1..=5; `foreign_proof`
/// submits handles under a proof issued to someone else.
#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Submit {
        user: u8,
        agent: u8,
        attitude: u8,
        speed: u8,
        professionalism: u8,
        foreign_proof: bool,
    },
    Authorize { user: u8 },
    SetAdmin { user: u8, is_admin: bool },
    AdvanceTime { delta: u16 },
}

fuzz_target!(|actions: std::vec::Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();

    let admin = Address::generate(&env);
    let executor_id = env.register(FheExecutorContract, ());
    let contract_id = env.register(CipherSatisfactionContract, ());
    let fhe = FheExecutorContractClient::new(&env, &executor_id);
    let client = CipherSatisfactionContractClient::new(&env, &contract_id);

    if client
        .try_initialize(&admin, &executor_id, &StatsAccess::AdminsOnly)
        .is_err()
    {
        return;
    }

    let users: std::vec::Vec<Address> = (0..4).map(|_| Address::generate(&env)).collect();
    let agents: std::vec::Vec<BytesN<32>> = (0u8..3)
        .map(|i| BytesN::from_array(&env, &[i; 32]))
        .collect();
    let mut admins = [false; 4];
    // Customers holding rights on the current aggregate handles.
    let mut viewers = [false; 4];

    // Clear-text model: (count, sum_att, sum_speed, sum_prof, sum_weighted, passed)
    let mut model = (0u64, 0u32, 0u32, 0u32, 0u32, 0u32);

    for action in actions.into_iter().take(64) {
        match action {
            FuzzAction::Submit {
                user,
                agent,
                attitude,
                speed,
                professionalism,
                foreign_proof,
            } => {
                let caller = &users[usize::from(user) % users.len()];
                let owner = if foreign_proof {
                    &users[(usize::from(user) + 1) % users.len()]
                } else {
                    caller
                };
                let mut values = Vec::new(&env);
                values.push_back(u32::from(attitude));
                values.push_back(u32::from(speed));
                values.push_back(u32::from(professionalism));
                let (a, s, p) = (
                    clamp_score(u32::from(attitude)),
                    clamp_score(u32::from(speed)),
                    clamp_score(u32::from(professionalism)),
                );
                let input = fhe.encrypt_input(&contract_id, owner, &values);
                let h = |i: u32| input.handles.get(i).unwrap();

                let result = client.try_submit_rating(
                    caller,
                    &agents[usize::from(agent) % agents.len()],
                    &h(0),
                    &input.proof,
                    &h(1),
                    &input.proof,
                    &h(2),
                    &input.proof,
                );

                if foreign_proof {
                    assert!(result.is_err(), "INVARIANT VIOLATION: foreign proof accepted");
                } else {
                    assert!(
                        result.is_ok(),
                        "INVARIANT VIOLATION: valid rating rejected: {:?}",
                        result
                    );
                    let w = weighted_score(a, s, p);
                    model.0 += 1;
                    model.1 += a;
                    model.2 += s;
                    model.3 += p;
                    model.4 += w;
                    model.5 += u32::from(meets_threshold(w));
                    viewers = [false; 4];
                }
            }
            FuzzAction::Authorize { user } => {
                let slot = usize::from(user) % users.len();
                let result = client.try_authorize_statistics_decryption(&users[slot]);
                assert_eq!(
                    result.is_ok(),
                    admins[slot],
                    "INVARIANT VIOLATION: authorization disagrees with admin set"
                );
                if admins[slot] {
                    viewers[slot] = true;
                }
            }
            FuzzAction::SetAdmin { user, is_admin } => {
                let slot = usize::from(user) % users.len();
                assert!(client.try_set_admin(&admin, &users[slot], &is_admin).is_ok());
                admins[slot] = is_admin;
            }
            FuzzAction::AdvanceTime { delta } => {
                let ts = env.ledger().timestamp().saturating_add(u64::from(delta));
                env.ledger().set_timestamp(ts);
            }
        }

        // ── Post-action invariant checks ──
        let stats = client.get_statistics();
        assert_eq!(stats.total_ratings, model.0, "INVARIANT VIOLATION: rating count drifted");
        assert_eq!(client.get_total_ratings(), model.0);

        let clear = |handle: &BytesN<32>| fhe.plaintext_of(handle).unwrap();
        assert_eq!(clear(&stats.sum_attitude), model.1);
        assert_eq!(clear(&stats.sum_speed), model.2);
        assert_eq!(clear(&stats.sum_professionalism), model.3);
        assert_eq!(clear(&stats.sum_weighted_score), model.4);
        assert_eq!(clear(&stats.count_meets_threshold), model.5);

        let per_agent: u64 = agents
            .iter()
            .map(|a| client.get_rating_count_for_agent(a))
            .sum();
        assert_eq!(per_agent, model.0, "INVARIANT VIOLATION: agent counts do not sum to total");

        // Only customers authorized since the last submission can read the aggregate.
        for (i, u) in users.iter().enumerate() {
            assert_eq!(
                fhe.is_allowed(&stats.sum_weighted_score, u),
                viewers[i],
                "INVARIANT VIOLATION: aggregate rights leaked"
            );
        }
    }
});
