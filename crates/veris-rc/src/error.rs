use thiserror::Error;

use veris_chain::{AccountName, ChainError};

/// Errors raised by the resource-credit engine
#[derive(Debug, Error)]
pub enum RcError {
    #[error("account {account} needs {rc_needed} RC; wait for mana to regenerate or power up stake")]
    NotEnoughRc { account: AccountName, rc_needed: i64 },

    #[error("tried to execute transaction with no resource user")]
    NoResourceUser,

    #[error("account {account} max RC changed from {cached} to {derived} without triggering an operation, noticed on block {block}")]
    UnknownStakeDelta {
        account: AccountName,
        cached: i64,
        derived: i64,
        block: u32,
    },

    #[error("rc account {0} does not exist")]
    MissingRcAccount(AccountName),

    #[error("resource parameter seed is invalid: {0}")]
    SeedParse(String),

    #[error("arithmetic failure in {0}")]
    Arithmetic(String),

    #[error("resource credit state is not initialized")]
    NotInitialized,

    #[error("query names {requested} accounts, limit is {limit}")]
    QueryLimitExceeded { requested: usize, limit: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// Result type for resource-credit operations
pub type RcResult<T> = Result<T, RcError>;
