/*!
# Veris RC

Resource-credit metering for the Veris chain: every transaction is classified
into a vector of abstract resource usages, priced against global resource
pools, and charged to the billed account's regenerating mana bar. Accounts
without enough credits are rejected at block production time; replay stays
permissive so historical chains always apply.

The engine is non-consensus but deterministic: identical blocks, genesis
parameters and skip flags produce bit-identical RC state. It keeps no state
of its own — everything lives in the host's transactional store, so a rolled
back block reverts the engine with it.

The [`plugin::RcPlugin`] registers on a [`veris_chain::Chain`] and drives the
whole pipeline from the chain's pre/post apply notifications.
*/

pub mod config;
pub mod curve;
pub mod decay;
mod error;
pub mod export;
pub mod manabar;
pub mod params;
pub mod plugin;
pub mod resources;
pub mod state;
pub mod usage;

pub use config::{RcConfig, RcSkipFlags};
pub use error::{RcError, RcResult};
pub use export::{BufferedExportSink, RcBlockInfo, RcExportSink, RcTransactionInfo};
pub use manabar::{Manabar, ManabarParams};
pub use plugin::{
    validate_database, RcPlugin, ACCOUNT_SUBSIDY_PRECISION, HARDFORK_REGEN_ALL,
    RC_HARDFORK_REJECT, RC_REGEN_TIME,
};
pub use resources::{ResourceCount, ResourceType, NUM_RESOURCE_TYPES};
pub use state::{RcAccountObject, RcPoolObject, RcResourceParamObject};
