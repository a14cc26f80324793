//! Runtime and wallet backed by the mock executor contract.
//!
//! `MockFheRuntime` answers user decryptions the way a KMS would: it checks
//! the signature window, the signature itself and the executor's ACL, then
//! reads the clear value the mock executor keeps behind each handle.
//! `MockWallet` signs with [`mock_signature`], a plain hash over the signer
//! address and the digest. It carries no secret, so anyone can produce a
//! valid signature for any account: the mock binds a signature to its fields
//! but does not authenticate the wallet. Neither type is suitable outside
//! local deployments and tests.

use std::cell::Cell;

use fhe_executor::{EncryptedInput, FheExecutorContractClient};
use soroban_sdk::{xdr::ToXdr, Address, Bytes, BytesN, Env, Vec as SorobanVec};
use tracing::{debug, warn};

use crate::error::{ClientError, Result};
use crate::runtime::{DecryptedValues, FheRuntime, HandleContractPair, Keypair};
use crate::signature::DecryptionSignature;
use crate::wallet::WalletSigner;

/// `sha256("mock-wallet" || signer || digest)`. Unkeyed; see the module docs.
pub fn mock_signature(env: &Env, signer: &Address, digest: &BytesN<32>) -> Bytes {
    let mut data = Bytes::new(env);
    data.extend_from_array(b"mock-wallet");
    data.append(&signer.clone().to_xdr(env));
    data.extend_from_array(&digest.to_array());
    let sig: BytesN<32> = env.crypto().sha256(&data).into();
    Bytes::from_array(env, &sig.to_array())
}

pub struct MockFheRuntime {
    env: Env,
    executor: Address,
    ready: Cell<bool>,
}

impl MockFheRuntime {
    pub fn new(env: &Env, executor: &Address) -> Self {
        Self {
            env: env.clone(),
            executor: executor.clone(),
            ready: Cell::new(true),
        }
    }

    /// Simulates a runtime whose SDK has not finished loading.
    pub fn set_ready(&self, ready: bool) {
        self.ready.set(ready);
    }

    fn executor(&self) -> FheExecutorContractClient<'_> {
        FheExecutorContractClient::new(&self.env, &self.executor)
    }

    fn check_signature(&self, signature: &DecryptionSignature) -> Result<()> {
        let now = self.now();
        if !signature.is_valid_at(now) {
            return Err(ClientError::AuthorizationRejected(format!(
                "decryption signature not valid at {now} (expires {})",
                signature.expires_at()
            )));
        }
        let digest = signature.digest(&self.env);
        if mock_signature(&self.env, &signature.user_address, &digest) != signature.signature {
            return Err(ClientError::AuthorizationRejected(
                "decryption signature does not match its fields".into(),
            ));
        }
        Ok(())
    }
}

impl FheRuntime for MockFheRuntime {
    fn is_ready(&self) -> bool {
        self.ready.get()
    }

    fn now(&self) -> u64 {
        self.env.ledger().timestamp()
    }

    fn generate_keypair(&self) -> Result<Keypair> {
        if !self.is_ready() {
            return Err(ClientError::DecryptionUnavailable);
        }
        let mut private_key = [0u8; 32];
        getrandom::fill(&mut private_key)
            .map_err(|e| ClientError::Encryption(format!("keypair entropy: {e}")))?;
        let public_key = self
            .env
            .crypto()
            .sha256(&Bytes::from_array(&self.env, &private_key))
            .into();
        Ok(Keypair {
            public_key,
            private_key,
        })
    }

    fn encrypt(&self, contract: &Address, user: &Address, values: &[u32]) -> Result<EncryptedInput> {
        if !self.is_ready() {
            return Err(ClientError::DecryptionUnavailable);
        }
        let mut batch = SorobanVec::new(&self.env);
        for value in values {
            batch.push_back(*value);
        }
        match self.executor().try_encrypt_input(contract, user, &batch) {
            Ok(Ok(input)) => Ok(input),
            Err(Ok(err)) => Err(ClientError::Encryption(format!("{err:?}"))),
            Ok(Err(err)) => Err(ClientError::Encryption(format!("{err:?}"))),
            Err(Err(err)) => Err(ClientError::Encryption(format!("{err:?}"))),
        }
    }

    fn user_decrypt(
        &self,
        requests: &[HandleContractPair],
        signature: &DecryptionSignature,
    ) -> Result<DecryptedValues> {
        if !self.is_ready() {
            return Err(ClientError::DecryptionUnavailable);
        }
        self.check_signature(signature)?;

        let executor = self.executor();
        let mut out = DecryptedValues::new();
        for request in requests {
            if !signature.covers(&request.contract_address) {
                return Err(ClientError::AuthorizationRejected(
                    "signature does not cover the handle's contract".into(),
                ));
            }
            let user_allowed = executor.is_allowed(&request.handle, &signature.user_address);
            let contract_allowed = executor.is_allowed(&request.handle, &request.contract_address);
            if !user_allowed || !contract_allowed {
                warn!(user_allowed, contract_allowed, "handle not decryptable by requester");
                return Err(ClientError::AuthorizationRejected(
                    "account is not allowed to decrypt this handle".into(),
                ));
            }
            let value = executor
                .plaintext_of(&request.handle)
                .ok_or_else(|| ClientError::AuthorizationRejected("unknown handle".into()))?;
            out.insert(request.handle.to_array(), u64::from(value));
        }
        debug!(count = out.len(), "user decryption served");
        Ok(out)
    }
}

pub struct MockWallet {
    env: Env,
    address: Address,
    declines: Cell<bool>,
    signatures: Cell<u32>,
}

impl MockWallet {
    pub fn new(env: &Env, address: &Address) -> Self {
        Self {
            env: env.clone(),
            address: address.clone(),
            declines: Cell::new(false),
            signatures: Cell::new(0),
        }
    }

    /// Makes the next signing prompts fail, as if the user clicked "reject".
    pub fn set_declines(&self, declines: bool) {
        self.declines.set(declines);
    }

    /// How many times the wallet has produced a signature.
    pub fn signatures_issued(&self) -> u32 {
        self.signatures.get()
    }
}

impl WalletSigner for MockWallet {
    fn address(&self) -> Address {
        self.address.clone()
    }

    fn sign_digest(&self, digest: &BytesN<32>) -> Result<Bytes> {
        if self.declines.get() {
            return Err(ClientError::SigningRejected);
        }
        self.signatures.set(self.signatures.get().saturating_add(1));
        Ok(mock_signature(&self.env, &self.address, digest))
    }
}
