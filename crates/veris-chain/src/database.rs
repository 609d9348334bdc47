use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::account::{AccountName, AccountObject};
use crate::error::{ChainError, ChainResult};
use crate::properties::DynamicGlobalProperties;
use crate::store::{MemoryStore, StateStore};

/// Name of the burn account whose balances the chain periodically clears.
pub const NULL_ACCOUNT: &str = "null";

const KEY_GLOBAL_PROPERTIES: &str = "chain/gpo";
const KEY_NEXT_ACCOUNT_ID: &str = "chain/next_account_id";
const KEY_LAST_HARDFORK: &str = "chain/last_hardfork";
const ACCOUNT_PREFIX: &str = "account/";

fn account_key(name: &AccountName) -> String {
    format!("{ACCOUNT_PREFIX}{name}")
}

/// Typed facade over the transactional state store.
///
/// Every read and write goes through the store so transaction rollback
/// covers the whole database, plugin records included. Plugins namespace
/// their own keys and use [`Database::get_object`] / [`Database::put_object`]
/// directly.
pub struct Database {
    store: Box<dyn StateStore>,
    producing: bool,
}

impl Database {
    pub fn new(store: Box<dyn StateStore>) -> ChainResult<Self> {
        let mut db = Self {
            store,
            producing: false,
        };
        if db.get_object::<DynamicGlobalProperties>(KEY_GLOBAL_PROPERTIES)?.is_none() {
            db.put_object(KEY_GLOBAL_PROPERTIES, &DynamicGlobalProperties::default())?;
        }
        Ok(db)
    }

    /// Fresh database over an in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new())).expect("in-memory store operations cannot fail")
    }

    pub fn store(&self) -> &dyn StateStore {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn StateStore {
        self.store.as_mut()
    }

    /// Whether this node is actively producing the block being applied.
    pub fn is_producing(&self) -> bool {
        self.producing
    }

    pub fn set_producing(&mut self, producing: bool) {
        self.producing = producing;
    }

    // --- Typed object access ---

    pub fn get_object<T: DeserializeOwned>(&self, key: &str) -> ChainResult<Option<T>> {
        match self.store.get_kv(key)? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes).map_err(|err| {
                    ChainError::Deserialization {
                        key: key.to_string(),
                        message: err.to_string(),
                    }
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub fn put_object<T: Serialize>(&mut self, key: &str, value: &T) -> ChainResult<()> {
        let bytes =
            serde_json::to_vec(value).map_err(|err| ChainError::Serialization(err.to_string()))?;
        self.store.put_kv(key, bytes)
    }

    pub fn contains_object(&self, key: &str) -> ChainResult<bool> {
        self.store.contains_kv(key)
    }

    /// All objects stored under `prefix`, in key order.
    pub fn scan_objects<T: DeserializeOwned>(&self, prefix: &str) -> ChainResult<Vec<T>> {
        let mut objects = Vec::new();
        for (key, bytes) in self.store.scan_prefix(prefix)? {
            let value =
                serde_json::from_slice(&bytes).map_err(|err| ChainError::Deserialization {
                    key,
                    message: err.to_string(),
                })?;
            objects.push(value);
        }
        Ok(objects)
    }

    // --- Global properties ---

    pub fn global_properties(&self) -> ChainResult<DynamicGlobalProperties> {
        self.get_object(KEY_GLOBAL_PROPERTIES)?
            .ok_or_else(|| ChainError::KeyNotFound(KEY_GLOBAL_PROPERTIES.to_string()))
    }

    pub fn modify_global_properties(
        &mut self,
        mutate: impl FnOnce(&mut DynamicGlobalProperties),
    ) -> ChainResult<()> {
        let mut gpo = self.global_properties()?;
        mutate(&mut gpo);
        self.put_object(KEY_GLOBAL_PROPERTIES, &gpo)
    }

    // --- Accounts ---

    pub fn find_account(&self, name: &AccountName) -> ChainResult<Option<AccountObject>> {
        self.get_object(&account_key(name))
    }

    pub fn account(&self, name: &AccountName) -> ChainResult<AccountObject> {
        self.find_account(name)?
            .ok_or_else(|| ChainError::MissingAccount(name.clone()))
    }

    pub fn create_account(
        &mut self,
        name: &AccountName,
        created: DateTime<Utc>,
    ) -> ChainResult<AccountObject> {
        if self.find_account(name)?.is_some() {
            return Err(ChainError::DuplicateAccount(name.clone()));
        }
        let id: u64 = self.get_object(KEY_NEXT_ACCOUNT_ID)?.unwrap_or(0);
        self.put_object(KEY_NEXT_ACCOUNT_ID, &(id + 1))?;
        let account = AccountObject::new(id, name.clone(), created);
        self.put_object(&account_key(name), &account)?;
        Ok(account)
    }

    pub fn modify_account(
        &mut self,
        name: &AccountName,
        mutate: impl FnOnce(&mut AccountObject),
    ) -> ChainResult<()> {
        let mut account = self.account(name)?;
        mutate(&mut account);
        self.put_object(&account_key(name), &account)
    }

    /// Every account, ordered by creation id.
    pub fn accounts_in_creation_order(&self) -> ChainResult<Vec<AccountObject>> {
        let mut accounts: Vec<AccountObject> = self.scan_objects(ACCOUNT_PREFIX)?;
        accounts.sort_by_key(|account| account.id);
        Ok(accounts)
    }

    // --- Hardforks ---

    pub fn has_hardfork(&self, hardfork: u32) -> ChainResult<bool> {
        let last: u32 = self.get_object(KEY_LAST_HARDFORK)?.unwrap_or(0);
        Ok(last >= hardfork)
    }

    pub fn apply_hardfork(&mut self, hardfork: u32) -> ChainResult<()> {
        let last: u32 = self.get_object(KEY_LAST_HARDFORK)?.unwrap_or(0);
        if hardfork > last {
            self.put_object(KEY_LAST_HARDFORK, &hardfork)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_account_assigns_sequential_ids() {
        let mut db = Database::in_memory();
        let now = Utc::now();
        let alice = db.create_account(&AccountName::from("alice"), now).expect("create");
        let bob = db.create_account(&AccountName::from("bob"), now).expect("create");
        assert_eq!(alice.id, 0);
        assert_eq!(bob.id, 1);

        let ordered = db.accounts_in_creation_order().expect("scan");
        let names: Vec<&str> = ordered.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob"]);
    }

    #[test]
    fn test_duplicate_account_is_rejected() {
        let mut db = Database::in_memory();
        let name = AccountName::from("alice");
        db.create_account(&name, Utc::now()).expect("create");
        assert!(matches!(
            db.create_account(&name, Utc::now()),
            Err(ChainError::DuplicateAccount(_))
        ));
    }

    #[test]
    fn test_hardfork_level_is_monotone() {
        let mut db = Database::in_memory();
        assert!(!db.has_hardfork(1).expect("query"));
        db.apply_hardfork(20).expect("apply");
        db.apply_hardfork(3).expect("apply");
        assert!(db.has_hardfork(20).expect("query"));
        assert!(db.has_hardfork(3).expect("query"));
        assert!(!db.has_hardfork(21).expect("query"));
    }
}
