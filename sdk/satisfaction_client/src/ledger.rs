//! The contract surface the client protocol drives.

use cipher_satisfaction::{AggregateStatistics, CipherSatisfactionContractClient, Rating};
use fhe_executor::EncryptedInput;
use soroban_sdk::{Address, BytesN};

use crate::error::{ClientError, Result};

pub trait SatisfactionLedger {
    fn contract_address(&self) -> Address;

    fn submit_rating(
        &self,
        caller: &Address,
        service_agent_id: &BytesN<32>,
        input: &EncryptedInput,
    ) -> Result<()>;

    fn authorize_statistics_decryption(&self, caller: &Address) -> Result<()>;

    fn statistics(&self) -> Result<AggregateStatistics>;

    fn total_ratings(&self) -> u64;

    fn rating(&self, index: u64) -> Result<Rating>;
}

impl SatisfactionLedger for CipherSatisfactionContractClient<'_> {
    fn contract_address(&self) -> Address {
        self.address.clone()
    }

    fn submit_rating(
        &self,
        caller: &Address,
        service_agent_id: &BytesN<32>,
        input: &EncryptedInput,
    ) -> Result<()> {
        if input.handles.len() != 3 {
            return Err(ClientError::Encryption(format!(
                "expected 3 handles, got {}",
                input.handles.len()
            )));
        }
        let handle = |i: u32| {
            input
                .handles
                .get(i)
                .ok_or_else(|| ClientError::Encryption(format!("missing handle {i}")))
        };
        let (attitude, speed, professionalism) = (handle(0)?, handle(1)?, handle(2)?);

        match self.try_submit_rating(
            caller,
            service_agent_id,
            &attitude,
            &input.proof,
            &speed,
            &input.proof,
            &professionalism,
            &input.proof,
        ) {
            Ok(Ok(())) => Ok(()),
            Err(Ok(err)) => Err(ClientError::Contract(format!("{err:?}"))),
            Ok(Err(err)) => Err(ClientError::Contract(format!("{err:?}"))),
            Err(Err(err)) => Err(ClientError::Contract(format!("{err:?}"))),
        }
    }

    fn authorize_statistics_decryption(&self, caller: &Address) -> Result<()> {
        match self.try_authorize_statistics_decryption(caller) {
            Ok(Ok(())) => Ok(()),
            Err(Ok(err)) => Err(ClientError::AuthorizationRejected(format!("{err:?}"))),
            Ok(Err(err)) => Err(ClientError::Contract(format!("{err:?}"))),
            Err(Err(err)) => Err(ClientError::Contract(format!("{err:?}"))),
        }
    }

    fn statistics(&self) -> Result<AggregateStatistics> {
        match self.try_get_statistics() {
            Ok(Ok(stats)) => Ok(stats),
            Err(Ok(err)) => Err(ClientError::Contract(format!("{err:?}"))),
            Ok(Err(err)) => Err(ClientError::Contract(format!("{err:?}"))),
            Err(Err(err)) => Err(ClientError::Contract(format!("{err:?}"))),
        }
    }

    fn total_ratings(&self) -> u64 {
        self.get_total_ratings()
    }

    fn rating(&self, index: u64) -> Result<Rating> {
        match self.try_get_rating(&index) {
            Ok(Ok(rating)) => Ok(rating),
            Err(Ok(err)) => Err(ClientError::Contract(format!("{err:?}"))),
            Ok(Err(err)) => Err(ClientError::Contract(format!("{err:?}"))),
            Err(Err(err)) => Err(ClientError::Contract(format!("{err:?}"))),
        }
    }
}
