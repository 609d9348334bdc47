use thiserror::Error;

use crate::account::AccountName;

/// Errors that can occur in host-chain state operations
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("account {0} does not exist")]
    MissingAccount(AccountName),

    #[error("account {0} already exists")]
    DuplicateAccount(AccountName),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("deserialization failed for {key}: {message}")]
    Deserialization { key: String, message: String },

    #[error("no state transaction in progress")]
    NoTransaction,

    #[error("storage error: {0}")]
    Storage(String),
}

/// Result type for host-chain operations
pub type ChainResult<T> = Result<T, ChainError>;
