use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::AccountName;
use crate::operation::Operation;

/// A signed transaction as delivered by the host.
///
/// Signatures are opaque here; verification happens upstream of the RC
/// engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub ref_block_num: u16,
    pub ref_block_prefix: u32,
    pub expiration: DateTime<Utc>,
    pub operations: Vec<Operation>,
    #[serde(default)]
    pub signatures: Vec<String>,
}

impl SignedTransaction {
    pub fn new(operations: Vec<Operation>) -> Self {
        Self {
            ref_block_num: 0,
            ref_block_prefix: 0,
            expiration: DateTime::<Utc>::MIN_UTC,
            operations,
            signatures: Vec::new(),
        }
    }

    /// Serialized wire size in bytes, used for bandwidth accounting.
    pub fn serialized_size(&self) -> usize {
        serde_json::to_vec(self).map(|bytes| bytes.len()).unwrap_or(0)
    }
}

/// A block as delivered by the host after validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedBlock {
    pub timestamp: DateTime<Utc>,
    pub witness: AccountName,
    pub transactions: Vec<SignedTransaction>,
}

/// Notification payload for block-level handlers.
#[derive(Debug)]
pub struct BlockNotification<'a> {
    pub block_num: u32,
    pub block: &'a SignedBlock,
}

/// Notification payload for transaction-level handlers.
#[derive(Debug)]
pub struct TransactionNotification<'a> {
    pub transaction: &'a SignedTransaction,
}

/// Notification payload for operation-level handlers.
#[derive(Debug)]
pub struct OperationNotification<'a> {
    pub operation: &'a Operation,
}
