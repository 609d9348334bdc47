use serde::{Deserialize, Serialize};

use veris_chain::{AccountName, AccountObject, Asset, Database, WITHDRAWAL_INACTIVE};

use crate::error::{RcError, RcResult};
use crate::manabar::Manabar;
use crate::params::ResourceParams;
use crate::resources::NUM_RESOURCE_TYPES;

const KEY_RC_PARAMS: &str = "rc/params";
const KEY_RC_POOL: &str = "rc/pool";
const RC_ACCOUNT_PREFIX: &str = "rc/account/";

fn rc_account_key(name: &AccountName) -> String {
    format!("{RC_ACCOUNT_PREFIX}{name}")
}

/// Singleton holding the immutable per-kind resource parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RcResourceParamObject {
    pub resource_param_array: [ResourceParams; NUM_RESOURCE_TYPES],
}

/// Singleton holding the current pool levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RcPoolObject {
    pub pool_array: [i64; NUM_RESOURCE_TYPES],
    /// Epoch seconds of the last pool update; the timestamp of the most
    /// recently applied block.
    pub last_update: u32,
}

/// Per-account resource-credit state, keyed by account name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RcAccountObject {
    pub account: AccountName,
    pub rc_manabar: Manabar,
    /// Stake-denominated bonus credited permanently from the creation fee.
    pub max_rc_creation_adjustment: Asset,
    /// Maximum mana observed at the last charge.
    pub max_rc: i64,
    /// Cached derived maximum, refreshed after every stake-touching
    /// operation; divergence signals an unaccounted stake change.
    pub last_max_rc: i64,
}

/// Shares released by the next step of an active withdrawal schedule.
pub fn next_vesting_withdrawal(account: &AccountObject) -> i64 {
    let total_left = account.to_withdraw.saturating_sub(account.withdrawn);
    let per_period = account.vesting_withdraw_rate.amount;
    let next_withdrawal = per_period.min(total_left);
    if account.next_vesting_withdrawal == WITHDRAWAL_INACTIVE {
        0
    } else {
        next_withdrawal
    }
}

/// The account's derived maximum RC.
///
/// Owned stake, minus outbound delegations, plus inbound delegations and the
/// creation adjustment, minus the imminent withdrawal step. Saturating
/// throughout so hostile stake values cannot wrap the maximum.
pub fn maximum_rc(account: &AccountObject, rc_account: &RcAccountObject) -> i64 {
    account
        .vesting_shares
        .amount
        .saturating_sub(account.delegated_vesting_shares.amount)
        .saturating_add(account.received_vesting_shares.amount)
        .saturating_add(rc_account.max_rc_creation_adjustment.amount)
        .saturating_sub(next_vesting_withdrawal(account))
}

// --- Store access ---

pub fn find_params(db: &Database) -> RcResult<Option<RcResourceParamObject>> {
    Ok(db.get_object(KEY_RC_PARAMS)?)
}

pub fn params(db: &Database) -> RcResult<RcResourceParamObject> {
    find_params(db)?.ok_or(RcError::NotInitialized)
}

pub fn save_params(db: &mut Database, params: &RcResourceParamObject) -> RcResult<()> {
    Ok(db.put_object(KEY_RC_PARAMS, params)?)
}

pub fn find_pool(db: &Database) -> RcResult<Option<RcPoolObject>> {
    Ok(db.get_object(KEY_RC_POOL)?)
}

pub fn pool(db: &Database) -> RcResult<RcPoolObject> {
    find_pool(db)?.ok_or(RcError::NotInitialized)
}

pub fn save_pool(db: &mut Database, pool: &RcPoolObject) -> RcResult<()> {
    Ok(db.put_object(KEY_RC_POOL, pool)?)
}

pub fn find_rc_account(db: &Database, name: &AccountName) -> RcResult<Option<RcAccountObject>> {
    Ok(db.get_object(&rc_account_key(name))?)
}

pub fn rc_account(db: &Database, name: &AccountName) -> RcResult<RcAccountObject> {
    find_rc_account(db, name)?.ok_or_else(|| RcError::MissingRcAccount(name.clone()))
}

pub fn save_rc_account(db: &mut Database, rc_account: &RcAccountObject) -> RcResult<()> {
    Ok(db.put_object(&rc_account_key(&rc_account.account), rc_account)?)
}

pub fn any_rc_account_exists(db: &Database) -> RcResult<bool> {
    Ok(!db.store().scan_prefix(RC_ACCOUNT_PREFIX)?.is_empty())
}

/// Every RC account, in name order.
pub fn all_rc_accounts(db: &Database) -> RcResult<Vec<RcAccountObject>> {
    Ok(db.scan_objects(RC_ACCOUNT_PREFIX)?)
}
