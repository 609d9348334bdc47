/*!
# Veris Chain

The narrow host-chain surface consumed by the resource-credit engine: account
and asset records, the operation tagged union, signed transactions and blocks,
the dynamic global properties singleton, a synchronous transactional state
store, and the chain driver that delivers pre/post apply notifications to
registered observers.

Everything here is reference plumbing. Consensus proper (signature checks,
fork choice, full operation evaluation) lives outside this workspace; the
driver implements only the state transitions that feed stake-derived
quantities, which is all the RC engine observes.
*/

mod account;
mod chain;
mod database;
mod error;
mod operation;
mod properties;
mod store;
mod transaction;

pub use account::{
    AccountName, AccountObject, Asset, AssetSymbol, Authority, WITHDRAWAL_INACTIVE,
};
pub use chain::{
    apply_operation, Chain, ChainEventHandler, VESTING_WITHDRAW_INTERVALS,
    VESTING_WITHDRAW_INTERVAL_SECONDS,
};
pub use database::{Database, NULL_ACCOUNT};
pub use error::{ChainError, ChainResult};
pub use operation::{Operation, Pow2Input, Pow2Work};
pub use properties::DynamicGlobalProperties;
pub use store::{MemoryStore, StateStore};
pub use transaction::{
    BlockNotification, OperationNotification, SignedBlock, SignedTransaction,
    TransactionNotification,
};
