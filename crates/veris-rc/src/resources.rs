use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of resource kinds. Fixed at compile time; the genesis seed must
/// describe exactly this many kinds, in index order.
pub const NUM_RESOURCE_TYPES: usize = 4;

/// One axis of the transaction-cost space.
///
/// The declaration order is the pool/parameter array index order and the
/// genesis seed order; both are part of the external contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// Bandwidth: bytes a transaction adds to the chain history.
    ResourceHistoryBytes,
    /// Account-admission slots, fed by witness subsidies.
    ResourceNewAccounts,
    /// Bytes of chain state an operation allocates.
    ResourceStateBytes,
    /// Execution effort of applying an operation.
    ResourceExecutionTime,
}

impl ResourceType {
    /// All kinds in index order.
    pub const ALL: [ResourceType; NUM_RESOURCE_TYPES] = [
        ResourceType::ResourceHistoryBytes,
        ResourceType::ResourceNewAccounts,
        ResourceType::ResourceStateBytes,
        ResourceType::ResourceExecutionTime,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ResourceHistoryBytes => "resource_history_bytes",
            Self::ResourceNewAccounts => "resource_new_accounts",
            Self::ResourceStateBytes => "resource_state_bytes",
            Self::ResourceExecutionTime => "resource_execution_time",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-kind counters, indexed by [`ResourceType::index`].
pub type ResourceCount = [i64; NUM_RESOURCE_TYPES];
