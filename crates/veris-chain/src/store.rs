use std::collections::BTreeMap;

use crate::error::{ChainError, ChainResult};

/// A synchronous transactional key-value object store.
///
/// All chain state, including plugin-owned records, lives behind this trait
/// so a rolled-back transaction reverts every mutation made inside it.
/// Implementations serialize nothing themselves; callers hand in encoded
/// bytes.
pub trait StateStore: Send {
    /// Retrieve a value by key.
    fn get_kv(&self, key: &str) -> ChainResult<Option<Vec<u8>>>;

    /// Store a value under a caller-provided key.
    fn put_kv(&mut self, key: &str, value: Vec<u8>) -> ChainResult<()>;

    /// Check if a key exists.
    fn contains_kv(&self, key: &str) -> ChainResult<bool>;

    /// Delete a value by key.
    fn delete_kv(&mut self, key: &str) -> ChainResult<()>;

    /// All entries whose key starts with `prefix`, in key order.
    fn scan_prefix(&self, prefix: &str) -> ChainResult<Vec<(String, Vec<u8>)>>;

    /// Start a transaction.
    fn begin_transaction(&mut self) -> ChainResult<()>;

    /// Commit the innermost transaction.
    fn commit_transaction(&mut self) -> ChainResult<()>;

    /// Roll back the innermost transaction, restoring the state at its
    /// matching begin.
    fn rollback_transaction(&mut self) -> ChainResult<()>;
}

/// In-memory [`StateStore`] with snapshot-based transactions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, Vec<u8>>,
    snapshots: Vec<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn get_kv(&self, key: &str) -> ChainResult<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put_kv(&mut self, key: &str, value: Vec<u8>) -> ChainResult<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn contains_kv(&self, key: &str) -> ChainResult<bool> {
        Ok(self.entries.contains_key(key))
    }

    fn delete_kv(&mut self, key: &str) -> ChainResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn scan_prefix(&self, prefix: &str) -> ChainResult<Vec<(String, Vec<u8>)>> {
        Ok(self
            .entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    fn begin_transaction(&mut self) -> ChainResult<()> {
        self.snapshots.push(self.entries.clone());
        Ok(())
    }

    fn commit_transaction(&mut self) -> ChainResult<()> {
        self.snapshots.pop().ok_or(ChainError::NoTransaction)?;
        Ok(())
    }

    fn rollback_transaction(&mut self) -> ChainResult<()> {
        self.entries = self.snapshots.pop().ok_or(ChainError::NoTransaction)?;
        Ok(())
    }
}
