/*!
# Veris RC API

Read-only projection of the resource-credit state: the genesis resource
parameters, the current pool levels and per-account RC records. Responses
serialize with lower_snake_case identifiers and human-readable resource kind
names; account lookups silently drop unknown names and are capped at
[`RC_API_SINGLE_QUERY_LIMIT`] per query.
*/

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use veris_chain::{AccountName, Asset, Database};
use veris_rc::params::ResourceParams;
use veris_rc::state;
use veris_rc::{Manabar, RcError, RcResult, ResourceType};

/// Maximum number of accounts a single query may name.
pub const RC_API_SINGLE_QUERY_LIMIT: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetResourceParamsResponse {
    pub resource_params: BTreeMap<String, ResourceParams>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePoolEntry {
    pub pool: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetResourcePoolResponse {
    pub resource_pool: BTreeMap<String, ResourcePoolEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindRcAccountsRequest {
    pub accounts: Vec<AccountName>,
}

/// Per-account projection; the internal cache fields stay private to the
/// engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RcAccountApiObject {
    pub account: AccountName,
    pub rc_manabar: Manabar,
    pub max_rc_creation_adjustment: Asset,
    pub max_rc: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindRcAccountsResponse {
    pub rc_accounts: Vec<RcAccountApiObject>,
}

/// Borrowed read-only view over a database.
pub struct RcApi<'a> {
    db: &'a Database,
}

impl<'a> RcApi<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// The immutable per-kind resource parameters, keyed by kind name.
    pub fn get_resource_params(&self) -> RcResult<GetResourceParamsResponse> {
        let params = state::params(self.db)?;
        let resource_params = ResourceType::ALL
            .into_iter()
            .map(|kind| {
                (
                    kind.to_string(),
                    params.resource_param_array[kind.index()],
                )
            })
            .collect();
        Ok(GetResourceParamsResponse { resource_params })
    }

    /// The current pool level of every resource kind.
    pub fn get_resource_pool(&self) -> RcResult<GetResourcePoolResponse> {
        let pool = state::pool(self.db)?;
        let resource_pool = ResourceType::ALL
            .into_iter()
            .map(|kind| {
                (
                    kind.to_string(),
                    ResourcePoolEntry {
                        pool: pool.pool_array[kind.index()],
                    },
                )
            })
            .collect();
        Ok(GetResourcePoolResponse { resource_pool })
    }

    /// RC records for the named accounts, in request order. Unknown names
    /// are dropped without error; naming more than
    /// [`RC_API_SINGLE_QUERY_LIMIT`] accounts is one.
    pub fn find_rc_accounts(
        &self,
        request: &FindRcAccountsRequest,
    ) -> RcResult<FindRcAccountsResponse> {
        if request.accounts.len() > RC_API_SINGLE_QUERY_LIMIT {
            return Err(RcError::QueryLimitExceeded {
                requested: request.accounts.len(),
                limit: RC_API_SINGLE_QUERY_LIMIT,
            });
        }

        let mut rc_accounts = Vec::new();
        for name in &request.accounts {
            if let Some(rc_account) = state::find_rc_account(self.db, name)? {
                rc_accounts.push(RcAccountApiObject {
                    account: rc_account.account,
                    rc_manabar: rc_account.rc_manabar,
                    max_rc_creation_adjustment: rc_account.max_rc_creation_adjustment,
                    max_rc: rc_account.max_rc,
                });
            }
        }
        Ok(FindRcAccountsResponse { rc_accounts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use veris_rc::params::{parse_genesis_params, DEFAULT_RESOURCE_PARAMETERS};
    use veris_rc::state::{save_params, save_pool, save_rc_account};
    use veris_rc::{RcAccountObject, RcPoolObject, RcResourceParamObject, NUM_RESOURCE_TYPES};

    fn initialized_db() -> Database {
        let mut db = Database::in_memory();
        let resource_param_array =
            parse_genesis_params(DEFAULT_RESOURCE_PARAMETERS).expect("parse seed");
        save_params(
            &mut db,
            &RcResourceParamObject {
                resource_param_array,
            },
        )
        .expect("save params");

        let mut pool = RcPoolObject {
            pool_array: [0; NUM_RESOURCE_TYPES],
            last_update: 100,
        };
        for kind in ResourceType::ALL {
            pool.pool_array[kind.index()] = resource_param_array[kind.index()].pool_eq;
        }
        save_pool(&mut db, &pool).expect("save pool");
        db
    }

    fn add_rc_account(db: &mut Database, name: &str, mana: i64) {
        db.create_account(&AccountName::from(name), Utc::now())
            .expect("create account");
        save_rc_account(
            db,
            &RcAccountObject {
                account: AccountName::from(name),
                rc_manabar: Manabar {
                    current_mana: mana,
                    last_update_time: 100,
                },
                max_rc_creation_adjustment: Asset::stake(3),
                max_rc: mana,
                last_max_rc: mana,
            },
        )
        .expect("save rc account");
    }

    #[test]
    fn test_params_round_trip_through_the_wire_format() {
        let db = initialized_db();
        let api = RcApi::new(&db);
        let response = api.get_resource_params().expect("params");
        assert_eq!(response.resource_params.len(), NUM_RESOURCE_TYPES);
        assert!(response.resource_params.contains_key("resource_history_bytes"));

        let wire = serde_json::to_string(&response).expect("serialize");
        let back: GetResourceParamsResponse = serde_json::from_str(&wire).expect("deserialize");
        assert_eq!(
            back.resource_params["resource_new_accounts"],
            response.resource_params["resource_new_accounts"]
        );
        assert_eq!(serde_json::to_string(&back).expect("reserialize"), wire);
    }

    #[test]
    fn test_pool_projection_uses_kind_names() {
        let db = initialized_db();
        let api = RcApi::new(&db);
        let response = api.get_resource_pool().expect("pool");
        assert_eq!(
            response.resource_pool["resource_state_bytes"],
            ResourcePoolEntry {
                pool: 85_254_731_776
            }
        );
    }

    #[test]
    fn test_queries_fail_before_initialization() {
        let db = Database::in_memory();
        let api = RcApi::new(&db);
        assert!(matches!(
            api.get_resource_params(),
            Err(RcError::NotInitialized)
        ));
        assert!(matches!(
            api.get_resource_pool(),
            Err(RcError::NotInitialized)
        ));
    }

    #[test]
    fn test_find_rc_accounts_drops_unknown_names() {
        let mut db = initialized_db();
        add_rc_account(&mut db, "alice", 500);
        add_rc_account(&mut db, "carol", 900);

        let api = RcApi::new(&db);
        let response = api
            .find_rc_accounts(&FindRcAccountsRequest {
                accounts: vec![
                    AccountName::from("carol"),
                    AccountName::from("nobody"),
                    AccountName::from("alice"),
                ],
            })
            .expect("find");

        let names: Vec<&str> = response
            .rc_accounts
            .iter()
            .map(|rc| rc.account.as_str())
            .collect();
        assert_eq!(names, vec!["carol", "alice"]);
        assert_eq!(response.rc_accounts[0].rc_manabar.current_mana, 900);
    }

    #[test]
    fn test_find_rc_accounts_enforces_the_query_limit() {
        let mut db = initialized_db();
        add_rc_account(&mut db, "alice", 500);
        let api = RcApi::new(&db);

        let at_limit = FindRcAccountsRequest {
            accounts: (0..RC_API_SINGLE_QUERY_LIMIT)
                .map(|i| AccountName::from(format!("ghost{i}").as_str()))
                .collect(),
        };
        assert!(api.find_rc_accounts(&at_limit).is_ok());

        let over_limit = FindRcAccountsRequest {
            accounts: (0..=RC_API_SINGLE_QUERY_LIMIT)
                .map(|i| AccountName::from(format!("ghost{i}").as_str()))
                .collect(),
        };
        assert!(matches!(
            api.find_rc_accounts(&over_limit),
            Err(RcError::QueryLimitExceeded { requested, limit })
                if requested == RC_API_SINGLE_QUERY_LIMIT + 1 && limit == RC_API_SINGLE_QUERY_LIMIT
        ));
    }
}
