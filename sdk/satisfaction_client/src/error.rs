use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("FHE runtime is not initialized")]
    DecryptionUnavailable,

    #[error("authorization rejected: {0}")]
    AuthorizationRejected(String),

    #[error("{dimension} score {value} is outside 1..=5")]
    ScoreOutOfRange { dimension: &'static str, value: u32 },

    #[error("service agent id must not be empty")]
    EmptyAgentId,

    #[error("wallet declined to sign the decryption request")]
    SigningRejected,

    #[error("contract call failed: {0}")]
    Contract(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("flow cannot advance from {0}")]
    InvalidState(&'static str),
}

pub type Result<T> = std::result::Result<T, ClientError>;
