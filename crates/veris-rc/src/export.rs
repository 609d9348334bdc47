use std::sync::Mutex;

use serde::Serialize;

use veris_chain::AccountName;

use crate::resources::{ResourceCount, NUM_RESOURCE_TYPES};

/// Per-transaction costing snapshot published to an export sink.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RcTransactionInfo {
    pub resource_user: Option<AccountName>,
    /// Scaled usage per kind, in pool units.
    pub usage: ResourceCount,
    /// RC cost per kind.
    pub cost: ResourceCount,
}

/// Per-block pool-dynamics snapshot published to an export sink.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RcBlockInfo {
    /// Pool level per kind before this block's update.
    pub pool: ResourceCount,
    pub dt: [u32; NUM_RESOURCE_TYPES],
    pub decay: ResourceCount,
    pub budget: ResourceCount,
    pub usage: ResourceCount,
}

/// Receiver for RC costing snapshots.
///
/// Attached optionally; the engine never depends on a sink being present and
/// a sink must never fail the caller.
pub trait RcExportSink: Send + Sync {
    fn record_transaction(&self, info: &RcTransactionInfo);

    fn record_block(&self, info: &RcBlockInfo);
}

/// In-memory sink collecting every snapshot, for tests and tooling.
#[derive(Debug, Default)]
pub struct BufferedExportSink {
    transactions: Mutex<Vec<RcTransactionInfo>>,
    blocks: Mutex<Vec<RcBlockInfo>>,
}

impl BufferedExportSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transactions(&self) -> Vec<RcTransactionInfo> {
        self.transactions.lock().expect("sink poisoned").clone()
    }

    pub fn blocks(&self) -> Vec<RcBlockInfo> {
        self.blocks.lock().expect("sink poisoned").clone()
    }
}

impl RcExportSink for BufferedExportSink {
    fn record_transaction(&self, info: &RcTransactionInfo) {
        self.transactions
            .lock()
            .expect("sink poisoned")
            .push(info.clone());
    }

    fn record_block(&self, info: &RcBlockInfo) {
        self.blocks.lock().expect("sink poisoned").push(info.clone());
    }
}
