use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use veris_chain::{
    AccountName, AccountObject, Asset, BlockNotification, ChainError, ChainEventHandler,
    Database, Operation, OperationNotification, TransactionNotification, NULL_ACCOUNT,
};

use crate::config::{RcConfig, RcSkipFlags};
use crate::curve::compute_rc_cost;
use crate::decay::compute_pool_decay;
use crate::error::{RcError, RcResult};
use crate::export::{RcBlockInfo, RcExportSink, RcTransactionInfo};
use crate::manabar::{Manabar, ManabarParams};
use crate::params::{parse_genesis_params, TimeUnit, DEFAULT_RESOURCE_PARAMETERS};
use crate::resources::{ResourceCount, ResourceType};
use crate::state::{
    all_rc_accounts, any_rc_account_exists, find_params, find_rc_account, maximum_rc, params,
    pool, rc_account, save_params, save_pool, save_rc_account, RcPoolObject,
    RcResourceParamObject,
};
use crate::usage::{count_resources, get_resource_user};

/// Seconds over which a fully drained mana bar refills (five days).
pub const RC_REGEN_TIME: u32 = 60 * 60 * 24 * 5;

/// Fixed-point precision of the witness account-subsidy accumulator.
pub const ACCOUNT_SUBSIDY_PRECISION: i64 = 10_000;

/// Hardfork from which insufficient-RC transactions are rejected in
/// production.
pub const RC_HARDFORK_REJECT: u32 = 20;

/// The early one-time hardfork whose application touches every account's
/// stake and therefore regenerates all of them.
pub const HARDFORK_REGEN_ALL: u32 = 1;

/// Create the RC record for `account` if it does not exist yet.
///
/// Idempotent. `max_rc` and the initial mana are snapshotted before the
/// creation adjustment is recorded; `last_max_rc` after it.
pub fn create_rc_account(
    db: &mut Database,
    now: u32,
    account: &AccountObject,
    max_rc_creation_adjustment: Asset,
) -> RcResult<()> {
    if find_rc_account(db, &account.name)?.is_some() {
        return Ok(());
    }

    let mut rc_account = crate::state::RcAccountObject {
        account: account.name.clone(),
        rc_manabar: Manabar::default(),
        max_rc_creation_adjustment: Asset::stake(0),
        max_rc: 0,
        last_max_rc: 0,
    };
    let base_max = maximum_rc(account, &rc_account);
    rc_account.rc_manabar = Manabar {
        current_mana: base_max,
        last_update_time: now,
    };
    rc_account.max_rc = base_max;
    rc_account.max_rc_creation_adjustment = max_rc_creation_adjustment;
    rc_account.last_max_rc = maximum_rc(account, &rc_account);
    save_rc_account(db, &rc_account)
}

fn create_rc_account_by_name(
    db: &mut Database,
    now: u32,
    name: &AccountName,
    max_rc_creation_adjustment: Asset,
) -> RcResult<()> {
    let account = db.account(name)?;
    create_rc_account(db, now, &account, max_rc_creation_adjustment)
}

/// Regenerate and charge the billed account of a transaction.
fn use_account_rcs(
    db: &mut Database,
    resource_user: Option<&AccountName>,
    rc: i64,
    skip: RcSkipFlags,
) -> RcResult<()> {
    let Some(name) = resource_user else {
        if db.is_producing() && !skip.skip_reject_not_enough_rc {
            return Err(RcError::NoResourceUser);
        }
        return Ok(());
    };

    let gpo = db.global_properties()?;
    let account = db.account(name)?;
    let mut rc_account = rc_account(db, name)?;

    let mbparams = ManabarParams {
        max_mana: maximum_rc(&account, &rc_account),
        regen_time: RC_REGEN_TIME,
    };
    rc_account.rc_manabar.regenerate(mbparams, gpo.time_secs());
    rc_account.max_rc = mbparams.max_mana;

    let has_mana = rc_account.rc_manabar.has_mana(rc);
    if !has_mana
        && !skip.skip_reject_not_enough_rc
        && db.has_hardfork(RC_HARDFORK_REJECT)?
        && db.is_producing()
    {
        return Err(RcError::NotEnoughRc {
            account: name.clone(),
            rc_needed: rc,
        });
    }

    let deduct = !(!has_mana && skip.skip_negative_rc_balance) && !skip.skip_deduct_rc;
    if deduct {
        rc_account.rc_manabar.use_mana(rc);
    }
    save_rc_account(db, &rc_account)
}

/// Refresh `last_max_rc` for every account touched by an operation.
fn update_last_vesting(db: &mut Database, modified_accounts: &[AccountName]) -> RcResult<()> {
    for name in modified_accounts {
        let account = db.account(name)?;
        let mut rc_account = rc_account(db, name)?;
        rc_account.last_max_rc = maximum_rc(&account, &rc_account);
        save_rc_account(db, &rc_account)?;
    }
    Ok(())
}

/// Pre-operation dispatch: regenerate the mana bar of every account whose
/// stake the operation is about to change, and verify the cached maximum
/// still matches the derived one.
struct PreApplyContext<'a> {
    db: &'a mut Database,
    now: u32,
    block_num: u32,
    witness: AccountName,
    skip: RcSkipFlags,
}

impl PreApplyContext<'_> {
    fn regenerate(&mut self, name: &AccountName, account_may_not_exist: bool) -> RcResult<()> {
        let account = match self.db.find_account(name)? {
            Some(account) => account,
            None if account_may_not_exist => return Ok(()),
            None => return Err(ChainError::MissingAccount(name.clone()).into()),
        };
        let mut rc_account =
            find_rc_account(self.db, name)?.ok_or_else(|| RcError::MissingRcAccount(name.clone()))?;

        let mbparams = ManabarParams {
            max_mana: maximum_rc(&account, &rc_account),
            regen_time: RC_REGEN_TIME,
        };
        if mbparams.max_mana != rc_account.last_max_rc {
            if !self.skip.skip_reject_unknown_delta_vests {
                return Err(RcError::UnknownStakeDelta {
                    account: name.clone(),
                    cached: rc_account.last_max_rc,
                    derived: mbparams.max_mana,
                    block: self.block_num,
                });
            }
            warn!(
                account = %name,
                cached = rc_account.last_max_rc,
                derived = mbparams.max_mana,
                block = self.block_num,
                "max RC changed without a triggering operation"
            );
        }

        rc_account.rc_manabar.regenerate(mbparams, self.now);
        save_rc_account(self.db, &rc_account)
    }

    fn visit(&mut self, operation: &Operation) -> RcResult<()> {
        match operation {
            Operation::AccountCreateWithDelegation { creator, .. } => {
                self.regenerate(creator, false)
            }
            Operation::TransferToVesting { from, to, .. } => {
                let target = if to.is_empty() { from } else { to };
                self.regenerate(target, false)
            }
            Operation::WithdrawVesting { account, .. } => self.regenerate(account, false),
            Operation::SetWithdrawVestingRoute { from_account, .. } => {
                self.regenerate(from_account, false)
            }
            Operation::DelegateVestingShares {
                delegator,
                delegatee,
                ..
            } => {
                self.regenerate(delegator, false)?;
                self.regenerate(delegatee, false)
            }
            Operation::AuthorReward { author, .. } => self.regenerate(author, false),
            Operation::CurationReward { curator, .. } => self.regenerate(curator, false),
            Operation::CommentReward { author, .. } => self.regenerate(author, false),
            Operation::CommentBenefactorReward { benefactor, .. } => {
                self.regenerate(benefactor, false)
            }
            Operation::ProducerReward { producer, .. } => {
                // No RC state exists yet while block 1 is being applied.
                if self.block_num > 1 {
                    self.regenerate(producer, false)?;
                }
                Ok(())
            }
            Operation::FillVestingWithdraw {
                from_account,
                to_account,
                ..
            } => {
                self.regenerate(from_account, false)?;
                if to_account != from_account {
                    self.regenerate(to_account, false)?;
                }
                Ok(())
            }
            Operation::ClaimRewardBalance { account, .. } => self.regenerate(account, false),
            Operation::ReturnVestingDelegation { account, .. } => {
                self.regenerate(account, false)
            }
            Operation::ClearNullAccountBalance => {
                self.regenerate(&AccountName::from(NULL_ACCOUNT), false)
            }
            Operation::Hardfork { hardfork_id } => {
                if *hardfork_id == HARDFORK_REGEN_ALL {
                    for account in self.db.accounts_in_creation_order()? {
                        self.regenerate(&account.name, false)?;
                    }
                }
                Ok(())
            }
            Operation::Pow { worker_account, .. } => {
                self.regenerate(worker_account, true)?;
                let witness = self.witness.clone();
                self.regenerate(&witness, false)
            }
            Operation::Pow2 { work } => {
                let worker = work.worker_account().clone();
                self.regenerate(&worker, true)?;
                let witness = self.witness.clone();
                self.regenerate(&witness, false)
            }
            _ => Ok(()),
        }
    }
}

/// Post-operation dispatch: create RC records for freshly admitted accounts
/// and collect every account whose derived maximum may have changed.
struct PostApplyContext<'a> {
    db: &'a mut Database,
    now: u32,
    block_num: u32,
    witness: AccountName,
    modified_accounts: &'a mut Vec<AccountName>,
}

impl PostApplyContext<'_> {
    fn visit(&mut self, operation: &Operation) -> RcResult<()> {
        match operation {
            Operation::AccountCreate {
                new_account_name,
                fee,
                ..
            } => create_rc_account_by_name(self.db, self.now, new_account_name, *fee),
            Operation::AccountCreateWithDelegation {
                creator,
                new_account_name,
                fee,
                ..
            } => {
                create_rc_account_by_name(self.db, self.now, new_account_name, *fee)?;
                self.modified_accounts.push(creator.clone());
                Ok(())
            }
            Operation::Pow { worker_account, .. } => {
                create_rc_account_by_name(self.db, self.now, worker_account, Asset::native(0))?;
                self.modified_accounts.push(worker_account.clone());
                self.modified_accounts.push(self.witness.clone());
                Ok(())
            }
            Operation::Pow2 { work } => {
                let worker = work.worker_account().clone();
                create_rc_account_by_name(self.db, self.now, &worker, Asset::native(0))?;
                self.modified_accounts.push(worker);
                self.modified_accounts.push(self.witness.clone());
                Ok(())
            }
            Operation::TransferToVesting { from, to, .. } => {
                let target = if to.is_empty() { from } else { to };
                self.modified_accounts.push(target.clone());
                Ok(())
            }
            Operation::WithdrawVesting { account, .. }
            | Operation::ClaimRewardBalance { account, .. }
            | Operation::ReturnVestingDelegation { account, .. } => {
                self.modified_accounts.push(account.clone());
                Ok(())
            }
            Operation::DelegateVestingShares {
                delegator,
                delegatee,
                ..
            } => {
                self.modified_accounts.push(delegator.clone());
                self.modified_accounts.push(delegatee.clone());
                Ok(())
            }
            Operation::AuthorReward { author, .. }
            | Operation::CommentReward { author, .. } => {
                self.modified_accounts.push(author.clone());
                Ok(())
            }
            Operation::CurationReward { curator, .. } => {
                self.modified_accounts.push(curator.clone());
                Ok(())
            }
            Operation::CommentBenefactorReward { benefactor, .. } => {
                self.modified_accounts.push(benefactor.clone());
                Ok(())
            }
            Operation::ProducerReward { producer, .. } => {
                if self.block_num > 1 {
                    self.modified_accounts.push(producer.clone());
                }
                Ok(())
            }
            Operation::FillVestingWithdraw {
                from_account,
                to_account,
                ..
            } => {
                self.modified_accounts.push(from_account.clone());
                self.modified_accounts.push(to_account.clone());
                Ok(())
            }
            Operation::ClearNullAccountBalance => {
                self.modified_accounts.push(AccountName::from(NULL_ACCOUNT));
                Ok(())
            }
            Operation::Hardfork { hardfork_id } => {
                if *hardfork_id == HARDFORK_REGEN_ALL {
                    for account in self.db.accounts_in_creation_order()? {
                        self.modified_accounts.push(account.name);
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// The resource-credit engine, registered as a chain event handler.
///
/// Meters every transaction into per-kind resource usage, prices the usage
/// against the global pools and charges the billed account's regenerating
/// mana bar. Non-consensus: a divergence never forks the chain, but the
/// engine is deterministic given identical blocks, seed and skip flags.
pub struct RcPlugin {
    skip: RcSkipFlags,
    genesis_parameters: String,
    export_sink: Option<Arc<dyn RcExportSink>>,
    before_first_block_cached: bool,
}

impl RcPlugin {
    pub fn new(config: RcConfig) -> Self {
        Self {
            skip: RcSkipFlags {
                skip_reject_not_enough_rc: config.skip_reject_not_enough_rc,
                ..RcSkipFlags::default()
            },
            genesis_parameters: DEFAULT_RESOURCE_PARAMETERS.to_string(),
            export_sink: None,
            before_first_block_cached: true,
        }
    }

    /// Replace the shipped genesis parameter seed.
    pub fn with_genesis_parameters(mut self, seed: impl Into<String>) -> Self {
        self.genesis_parameters = seed.into();
        self
    }

    /// Attach a sink receiving per-transaction and per-block snapshots.
    pub fn with_export_sink(mut self, sink: Arc<dyn RcExportSink>) -> Self {
        self.export_sink = Some(sink);
        self
    }

    pub fn skip_flags(&self) -> RcSkipFlags {
        self.skip
    }

    pub fn set_skip_flags(&mut self, skip: RcSkipFlags) {
        self.skip = skip;
    }

    /// Whether the first-block initialization has not happened yet.
    ///
    /// A false result is cached forever; a true result is re-checked, so the
    /// per-operation store scan disappears once any RC account exists.
    fn before_first_block(&mut self, db: &Database) -> RcResult<bool> {
        if self.before_first_block_cached {
            self.before_first_block_cached = !any_rc_account_exists(db)?;
        }
        Ok(self.before_first_block_cached)
    }

    fn on_first_block(&self, db: &mut Database) -> RcResult<()> {
        let now = db.global_properties()?.time_secs();
        info!("initializing resource credit genesis state");

        let resource_param_array = parse_genesis_params(&self.genesis_parameters)?;
        let params_obj = RcResourceParamObject {
            resource_param_array,
        };
        save_params(db, &params_obj)?;
        debug!(params = ?params_obj, "genesis resource parameters created");

        let mut pool_obj = RcPoolObject {
            pool_array: [0; crate::resources::NUM_RESOURCE_TYPES],
            last_update: now,
        };
        for kind in ResourceType::ALL {
            pool_obj.pool_array[kind.index()] =
                resource_param_array[kind.index()].pool_eq;
        }
        save_pool(db, &pool_obj)?;
        debug!(pool = ?pool_obj, "genesis resource pools created");

        for account in db.accounts_in_creation_order()? {
            create_rc_account(db, now, &account, Asset::stake(0))?;
        }
        Ok(())
    }
}

impl ChainEventHandler for RcPlugin {
    fn on_post_apply_block(
        &mut self,
        db: &mut Database,
        note: &BlockNotification<'_>,
    ) -> Result<()> {
        let gpo = db.global_properties()?;
        if gpo.head_block_number == 1 {
            self.on_first_block(db)?;
        }

        if gpo.total_vesting_shares.amount <= 0 {
            return Ok(());
        }

        let mut count = ResourceCount::default();
        for transaction in &note.block.transactions {
            count_resources(transaction, &mut count);
        }

        let params_obj = params(db)?;
        let mut pool_obj = pool(db)?;
        let mut block_info = RcBlockInfo::default();
        let now = gpo.time_secs();

        for kind in ResourceType::ALL {
            let i = kind.index();
            let resource_params = &params_obj.resource_param_array[i];
            let dt: u32 = match resource_params.time_unit {
                TimeUnit::Blocks => 1,
                TimeUnit::Seconds => now.saturating_sub(pool_obj.last_update),
            };
            block_info.pool[i] = pool_obj.pool_array[i];
            block_info.dt[i] = dt;

            if kind == ResourceType::ResourceNewAccounts {
                let subsidized = i128::from(gpo.available_account_subsidies)
                    * i128::from(resource_params.resource_unit)
                    / i128::from(ACCOUNT_SUBSIDY_PRECISION);
                pool_obj.pool_array[i] =
                    subsidized.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64;
            } else {
                let decay =
                    compute_pool_decay(&resource_params.decay_params, pool_obj.pool_array[i], dt);
                let budget = resource_params.budget_per_time_unit.saturating_mul(dt as i64);
                let usage = count[i].saturating_mul(resource_params.resource_unit as i64);
                block_info.decay[i] = decay;
                block_info.budget[i] = budget;
                block_info.usage[i] = usage;

                pool_obj.pool_array[i] = pool_obj.pool_array[i]
                    .saturating_sub(decay)
                    .saturating_add(budget)
                    .saturating_sub(usage);
            }
        }
        pool_obj.last_update = now;
        save_pool(db, &pool_obj)?;

        if let Some(sink) = &self.export_sink {
            sink.record_block(&block_info);
        }
        Ok(())
    }

    fn on_post_apply_transaction(
        &mut self,
        db: &mut Database,
        note: &TransactionNotification<'_>,
    ) -> Result<()> {
        // Transactions cannot be charged before the genesis parameters exist.
        let Some(params_obj) = find_params(db)? else {
            return Ok(());
        };
        let pool_obj = pool(db)?;
        let gpo = db.global_properties()?;
        let rc_regen = gpo.total_vesting_shares.amount / i64::from(RC_REGEN_TIME);

        let mut tx_info = RcTransactionInfo::default();
        count_resources(note.transaction, &mut tx_info.usage);

        let mut total_cost: i64 = 0;
        if rc_regen > 0 {
            for kind in ResourceType::ALL {
                let i = kind.index();
                let resource_params = &params_obj.resource_param_array[i];
                tx_info.usage[i] =
                    tx_info.usage[i].saturating_mul(resource_params.resource_unit as i64);
                tx_info.cost[i] = compute_rc_cost(
                    &resource_params.curve_params,
                    pool_obj.pool_array[i],
                    tx_info.usage[i],
                    rc_regen,
                )?;
                total_cost = total_cost.saturating_add(tx_info.cost[i]);
            }
        }

        tx_info.resource_user = get_resource_user(note.transaction);
        use_account_rcs(db, tx_info.resource_user.as_ref(), total_cost, self.skip)?;
        debug!(
            user = ?tx_info.resource_user,
            total_cost,
            "priced and charged transaction"
        );

        if let Some(sink) = &self.export_sink {
            sink.record_transaction(&tx_info);
        }
        Ok(())
    }

    fn on_pre_apply_operation(
        &mut self,
        db: &mut Database,
        note: &OperationNotification<'_>,
    ) -> Result<()> {
        if self.before_first_block(db)? {
            return Ok(());
        }
        let gpo = db.global_properties()?;
        let mut ctx = PreApplyContext {
            db,
            now: gpo.time_secs(),
            block_num: gpo.head_block_number,
            witness: gpo.current_witness,
            skip: self.skip,
        };
        ctx.visit(note.operation)?;
        Ok(())
    }

    fn on_post_apply_operation(
        &mut self,
        db: &mut Database,
        note: &OperationNotification<'_>,
    ) -> Result<()> {
        if self.before_first_block(db)? {
            return Ok(());
        }
        let gpo = db.global_properties()?;
        let mut modified_accounts = Vec::new();
        {
            let mut ctx = PostApplyContext {
                db: &mut *db,
                now: gpo.time_secs(),
                block_num: gpo.head_block_number,
                witness: gpo.current_witness,
                modified_accounts: &mut modified_accounts,
            };
            ctx.visit(note.operation)?;
        }
        update_last_vesting(db, &modified_accounts)?;
        Ok(())
    }
}

/// Audit that every RC account's cached maximum matches the derived one.
pub fn validate_database(db: &Database) -> RcResult<()> {
    let head_block = db.global_properties()?.head_block_number;
    for rc_account in all_rc_accounts(db)? {
        let account = db.account(&rc_account.account)?;
        let derived = maximum_rc(&account, &rc_account);
        if derived != rc_account.last_max_rc {
            return Err(RcError::UnknownStakeDelta {
                account: rc_account.account,
                cached: rc_account.last_max_rc,
                derived,
                block: head_block,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn db_with_account(name: &str, vesting: i64) -> Database {
        let mut db = Database::in_memory();
        db.create_account(&AccountName::from(name), Utc::now())
            .expect("create account");
        db.modify_account(&AccountName::from(name), |account| {
            account.vesting_shares = Asset::stake(vesting);
        })
        .expect("modify account");
        db
    }

    #[test]
    fn test_create_rc_account_is_idempotent() {
        let mut db = db_with_account("alice", 1_000);
        let account = db.account(&AccountName::from("alice")).expect("account");

        create_rc_account(&mut db, 50, &account, Asset::stake(7)).expect("create");
        let first = rc_account(&db, &AccountName::from("alice")).expect("load");

        create_rc_account(&mut db, 99, &account, Asset::stake(123)).expect("recreate");
        let second = rc_account(&db, &AccountName::from("alice")).expect("load");
        assert_eq!(first, second);
    }

    #[test]
    fn test_creation_snapshots_exclude_then_include_adjustment() {
        let mut db = db_with_account("alice", 1_000);
        let account = db.account(&AccountName::from("alice")).expect("account");

        create_rc_account(&mut db, 50, &account, Asset::stake(30)).expect("create");
        let rc = rc_account(&db, &AccountName::from("alice")).expect("load");
        assert_eq!(rc.rc_manabar.current_mana, 1_000);
        assert_eq!(rc.rc_manabar.last_update_time, 50);
        assert_eq!(rc.max_rc, 1_000);
        assert_eq!(rc.last_max_rc, 1_030);
    }

    #[test]
    fn test_charging_rejects_in_production_after_hardfork() {
        let mut db = db_with_account("bob", 0);
        let account = db.account(&AccountName::from("bob")).expect("account");
        create_rc_account(&mut db, 0, &account, Asset::stake(0)).expect("create");
        db.apply_hardfork(RC_HARDFORK_REJECT).expect("hardfork");
        db.set_producing(true);

        let name = AccountName::from("bob");
        let err = use_account_rcs(&mut db, Some(&name), 500, RcSkipFlags::default())
            .expect_err("should reject");
        match err {
            RcError::NotEnoughRc { account, rc_needed } => {
                assert_eq!(account, name);
                assert_eq!(rc_needed, 500);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_charging_goes_negative_when_not_producing() {
        let mut db = db_with_account("bob", 0);
        let account = db.account(&AccountName::from("bob")).expect("account");
        create_rc_account(&mut db, 0, &account, Asset::stake(0)).expect("create");
        db.apply_hardfork(RC_HARDFORK_REJECT).expect("hardfork");

        let name = AccountName::from("bob");
        use_account_rcs(&mut db, Some(&name), 500, RcSkipFlags::default()).expect("charge");
        let rc = rc_account(&db, &name).expect("load");
        assert_eq!(rc.rc_manabar.current_mana, -500);
    }

    #[test]
    fn test_skip_negative_balance_skips_the_deduction() {
        let mut db = db_with_account("bob", 100);
        let account = db.account(&AccountName::from("bob")).expect("account");
        create_rc_account(&mut db, 0, &account, Asset::stake(0)).expect("create");

        let skip = RcSkipFlags {
            skip_negative_rc_balance: true,
            ..RcSkipFlags::default()
        };
        let name = AccountName::from("bob");
        use_account_rcs(&mut db, Some(&name), 500, skip).expect("charge");
        assert_eq!(
            rc_account(&db, &name).expect("load").rc_manabar.current_mana,
            100
        );

        // An affordable cost is still deducted.
        use_account_rcs(&mut db, Some(&name), 40, skip).expect("charge");
        assert_eq!(
            rc_account(&db, &name).expect("load").rc_manabar.current_mana,
            60
        );
    }

    #[test]
    fn test_skip_deduct_never_deducts() {
        let mut db = db_with_account("bob", 100);
        let account = db.account(&AccountName::from("bob")).expect("account");
        create_rc_account(&mut db, 0, &account, Asset::stake(0)).expect("create");

        let skip = RcSkipFlags {
            skip_deduct_rc: true,
            ..RcSkipFlags::default()
        };
        let name = AccountName::from("bob");
        use_account_rcs(&mut db, Some(&name), 40, skip).expect("charge");
        assert_eq!(
            rc_account(&db, &name).expect("load").rc_manabar.current_mana,
            100
        );
    }

    #[test]
    fn test_missing_resource_user_fails_only_in_production() {
        let mut db = db_with_account("alice", 100);
        use_account_rcs(&mut db, None, 10, RcSkipFlags::default()).expect("silently skipped");

        db.set_producing(true);
        assert!(matches!(
            use_account_rcs(&mut db, None, 10, RcSkipFlags::default()),
            Err(RcError::NoResourceUser)
        ));

        let skip = RcSkipFlags {
            skip_reject_not_enough_rc: true,
            ..RcSkipFlags::default()
        };
        use_account_rcs(&mut db, None, 10, skip).expect("gated off");
    }

    #[test]
    fn test_validate_database_detects_stale_cache() {
        let mut db = db_with_account("alice", 1_000);
        let account = db.account(&AccountName::from("alice")).expect("account");
        create_rc_account(&mut db, 0, &account, Asset::stake(0)).expect("create");
        validate_database(&db).expect("coherent");

        // Stake changes behind the engine's back.
        db.modify_account(&AccountName::from("alice"), |account| {
            account.vesting_shares = Asset::stake(2_000);
        })
        .expect("modify");
        assert!(matches!(
            validate_database(&db),
            Err(RcError::UnknownStakeDelta { .. })
        ));
    }
}
