//! Local deployment: register the executor and the rating contract in one
//! host and initialize the latter.

use cipher_satisfaction::{
    CipherSatisfactionContract, CipherSatisfactionContractClient, StatsAccess,
};
use fhe_executor::FheExecutorContract;
use soroban_sdk::{Address, Env};
use tracing::info;

use crate::error::{ClientError, Result};
use crate::mock::MockFheRuntime;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalDeployment {
    pub executor: Address,
    pub contract: Address,
    pub admin: Address,
    pub stats_access: StatsAccess,
}

impl LocalDeployment {
    pub fn client<'a>(&self, env: &Env) -> CipherSatisfactionContractClient<'a> {
        CipherSatisfactionContractClient::new(env, &self.contract)
    }

    pub fn runtime(&self, env: &Env) -> MockFheRuntime {
        MockFheRuntime::new(env, &self.executor)
    }
}

/// Deploys with the default policy, where only admins may view the aggregate.
pub fn deploy_local(env: &Env, admin: &Address) -> Result<LocalDeployment> {
    deploy_local_with(env, admin, StatsAccess::AdminsOnly)
}

pub fn deploy_local_with(
    env: &Env,
    admin: &Address,
    stats_access: StatsAccess,
) -> Result<LocalDeployment> {
    let executor = env.register(FheExecutorContract, ());
    let contract = env.register(CipherSatisfactionContract, ());

    let client = CipherSatisfactionContractClient::new(env, &contract);
    match client.try_initialize(admin, &executor, &stats_access) {
        Ok(Ok(())) => {}
        Err(Ok(err)) => return Err(ClientError::Contract(format!("{err:?}"))),
        Ok(Err(err)) => return Err(ClientError::Contract(format!("{err:?}"))),
        Err(Err(err)) => return Err(ClientError::Contract(format!("{err:?}"))),
    }

    info!(?contract, ?executor, ?stats_access, "cipher satisfaction deployed");
    Ok(LocalDeployment {
        executor,
        contract,
        admin: admin.clone(),
        stats_access,
    })
}
