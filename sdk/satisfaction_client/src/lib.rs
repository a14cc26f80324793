//! Client side of the encrypted satisfaction protocol.
//!
//! - [`submit`] validates, encrypts and submits a rating.
//! - [`flow`] drives the authorize → sign → decrypt state machine for the
//!   aggregate, and decrypts a submitter's own rating.
//! - [`signature`] builds and caches time-bounded decryption signatures.
//! - [`stats`] turns decrypted sums into averages and a pass rate.
//!
//! The ledger, FHE runtime and wallet are reached through the
//! [`SatisfactionLedger`], [`FheRuntime`] and [`WalletSigner`] traits.
//! [`mock`] implements the latter two over the mock executor contract, and
//! `deploy` (behind the `testutils` feature) stands up a local deployment.

pub mod agent;
pub mod config;
#[cfg(feature = "testutils")]
pub mod deploy;
pub mod error;
pub mod flow;
pub mod ledger;
pub mod mock;
pub mod runtime;
pub mod signature;
pub mod stats;
pub mod submit;
pub mod wallet;

pub use agent::service_agent_id;
pub use config::ClientConfig;
#[cfg(feature = "testutils")]
pub use deploy::{deploy_local, deploy_local_with, LocalDeployment};
pub use error::{ClientError, Result};
pub use flow::{decrypt_rating, DecryptedRating, DecryptionState, StatisticsDecryption};
pub use ledger::SatisfactionLedger;
pub use runtime::{DecryptedValues, FheRuntime, HandleContractPair, Keypair};
pub use signature::{
    load_or_sign, DecryptionSignature, InMemorySignatureStore, SignatureStore,
};
pub use stats::{DecryptedStatistics, SatisfactionSummary};
pub use submit::{submit_rating, RatingInput};
pub use wallet::WalletSigner;
