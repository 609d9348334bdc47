use anyhow::Result;
use tracing::debug;

use crate::account::{AccountName, AssetSymbol, WITHDRAWAL_INACTIVE};
use crate::database::{Database, NULL_ACCOUNT};
use crate::error::ChainResult;
use crate::operation::Operation;
use crate::transaction::{
    BlockNotification, OperationNotification, SignedBlock, SignedTransaction,
    TransactionNotification,
};

/// Number of weekly steps a vesting withdrawal is spread over.
pub const VESTING_WITHDRAW_INTERVALS: i64 = 13;

/// Seconds between two vesting withdrawal steps.
pub const VESTING_WITHDRAW_INTERVAL_SECONDS: u32 = 60 * 60 * 24 * 7;

/// Observer of chain application events.
///
/// The chain invokes every registered handler synchronously, in registration
/// order, inside the block's store transaction. A handler error aborts the
/// block and rolls the transaction back. All methods default to no-ops so
/// observers implement only the events they care about.
pub trait ChainEventHandler {
    fn on_post_apply_block(
        &mut self,
        db: &mut Database,
        note: &BlockNotification<'_>,
    ) -> Result<()> {
        let _ = (db, note);
        Ok(())
    }

    fn on_post_apply_transaction(
        &mut self,
        db: &mut Database,
        note: &TransactionNotification<'_>,
    ) -> Result<()> {
        let _ = (db, note);
        Ok(())
    }

    fn on_pre_apply_operation(
        &mut self,
        db: &mut Database,
        note: &OperationNotification<'_>,
    ) -> Result<()> {
        let _ = (db, note);
        Ok(())
    }

    fn on_post_apply_operation(
        &mut self,
        db: &mut Database,
        note: &OperationNotification<'_>,
    ) -> Result<()> {
        let _ = (db, note);
        Ok(())
    }
}

/// The host state machine: a database plus registered event handlers.
pub struct Chain {
    db: Database,
    handlers: Vec<Box<dyn ChainEventHandler>>,
}

impl Chain {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            handlers: Vec::new(),
        }
    }

    pub fn register(&mut self, handler: Box<dyn ChainEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn database_mut(&mut self) -> &mut Database {
        &mut self.db
    }

    /// Apply a block inside a store transaction.
    ///
    /// On any failure the transaction is rolled back and the error is
    /// surfaced to the caller; no partial state survives.
    pub fn push_block(&mut self, block: &SignedBlock) -> Result<()> {
        self.db.store_mut().begin_transaction()?;
        match self.apply_block(block) {
            Ok(()) => {
                self.db.store_mut().commit_transaction()?;
                Ok(())
            }
            Err(err) => {
                self.db.store_mut().rollback_transaction()?;
                Err(err)
            }
        }
    }

    fn apply_block(&mut self, block: &SignedBlock) -> Result<()> {
        let block_num = self.db.global_properties()?.head_block_number + 1;
        self.db.modify_global_properties(|gpo| {
            gpo.head_block_number = block_num;
            gpo.time = block.timestamp;
            gpo.current_witness = block.witness.clone();
        })?;

        for transaction in &block.transactions {
            self.apply_transaction(transaction)?;
        }

        let note = BlockNotification { block_num, block };
        for handler in &mut self.handlers {
            handler.on_post_apply_block(&mut self.db, &note)?;
        }
        debug!(
            block_num,
            transactions = block.transactions.len(),
            "applied block"
        );
        Ok(())
    }

    fn apply_transaction(&mut self, transaction: &SignedTransaction) -> Result<()> {
        for operation in &transaction.operations {
            let note = OperationNotification { operation };
            for handler in &mut self.handlers {
                handler.on_pre_apply_operation(&mut self.db, &note)?;
            }
            apply_operation(&mut self.db, operation)?;
            for handler in &mut self.handlers {
                handler.on_post_apply_operation(&mut self.db, &note)?;
            }
        }

        let note = TransactionNotification { transaction };
        for handler in &mut self.handlers {
            handler.on_post_apply_transaction(&mut self.db, &note)?;
        }
        Ok(())
    }
}

fn delegation_key(delegator: &AccountName, delegatee: &AccountName) -> String {
    format!("delegation/{delegator}/{delegatee}")
}

/// Apply an operation's stake-relevant state transition.
///
/// Only the effects observable through account stake fields are modeled;
/// balances, content and market state are outside this crate's scope.
pub fn apply_operation(db: &mut Database, operation: &Operation) -> ChainResult<()> {
    let now = db.global_properties()?.time;
    match operation {
        Operation::AccountCreate {
            new_account_name, ..
        } => {
            db.create_account(new_account_name, now)?;
        }
        Operation::AccountCreateWithDelegation {
            creator,
            new_account_name,
            delegation,
            ..
        } => {
            db.create_account(new_account_name, now)?;
            if delegation.amount > 0 {
                db.modify_account(creator, |account| {
                    account.delegated_vesting_shares.amount = account
                        .delegated_vesting_shares
                        .amount
                        .saturating_add(delegation.amount);
                })?;
                db.modify_account(new_account_name, |account| {
                    account.received_vesting_shares.amount = account
                        .received_vesting_shares
                        .amount
                        .saturating_add(delegation.amount);
                })?;
                db.put_object(&delegation_key(creator, new_account_name), &delegation.amount)?;
            }
        }
        Operation::TransferToVesting { from, to, amount } => {
            let target = if to.is_empty() { from } else { to };
            db.modify_account(target, |account| {
                account.vesting_shares.amount =
                    account.vesting_shares.amount.saturating_add(amount.amount);
            })?;
            db.modify_global_properties(|gpo| {
                gpo.total_vesting_shares.amount = gpo
                    .total_vesting_shares
                    .amount
                    .saturating_add(amount.amount);
            })?;
        }
        Operation::WithdrawVesting {
            account: name,
            vesting_shares,
        } => {
            let now_secs = db.global_properties()?.time_secs();
            db.modify_account(name, |account| {
                if vesting_shares.amount <= 0 {
                    account.vesting_withdraw_rate.amount = 0;
                    account.to_withdraw = 0;
                    account.withdrawn = 0;
                    account.next_vesting_withdrawal = WITHDRAWAL_INACTIVE;
                } else {
                    let rate = (vesting_shares.amount / VESTING_WITHDRAW_INTERVALS).max(1);
                    account.vesting_withdraw_rate.amount = rate;
                    account.to_withdraw = vesting_shares.amount;
                    account.withdrawn = 0;
                    account.next_vesting_withdrawal =
                        now_secs.saturating_add(VESTING_WITHDRAW_INTERVAL_SECONDS);
                }
            })?;
        }
        Operation::DelegateVestingShares {
            delegator,
            delegatee,
            vesting_shares,
        } => {
            let key = delegation_key(delegator, delegatee);
            let previous: i64 = db.get_object(&key)?.unwrap_or(0);
            let delta = vesting_shares.amount.saturating_sub(previous);
            if delta >= 0 {
                db.modify_account(delegator, |account| {
                    account.delegated_vesting_shares.amount =
                        account.delegated_vesting_shares.amount.saturating_add(delta);
                })?;
                db.modify_account(delegatee, |account| {
                    account.received_vesting_shares.amount =
                        account.received_vesting_shares.amount.saturating_add(delta);
                })?;
            } else {
                // The delegatee loses the shares immediately; the delegator
                // gets them back via a later return_vesting_delegation.
                db.modify_account(delegatee, |account| {
                    account.received_vesting_shares.amount =
                        account.received_vesting_shares.amount.saturating_add(delta);
                })?;
            }
            db.put_object(&key, &vesting_shares.amount)?;
        }
        Operation::ReturnVestingDelegation {
            account: name,
            vesting_shares,
        } => {
            db.modify_account(name, |account| {
                account.delegated_vesting_shares.amount = account
                    .delegated_vesting_shares
                    .amount
                    .saturating_sub(vesting_shares.amount);
            })?;
        }
        Operation::AuthorReward {
            author,
            vesting_payout,
            ..
        } => credit_vesting(db, author, vesting_payout.amount)?,
        Operation::CurationReward {
            curator, reward, ..
        } => credit_vesting(db, curator, reward.amount)?,
        Operation::CommentBenefactorReward {
            benefactor,
            vesting_payout,
            ..
        } => credit_vesting(db, benefactor, vesting_payout.amount)?,
        Operation::ProducerReward {
            producer,
            vesting_shares,
        } => credit_vesting(db, producer, vesting_shares.amount)?,
        Operation::ClaimRewardBalance {
            account: name,
            reward_vests,
        } => credit_vesting(db, name, reward_vests.amount)?,
        Operation::FillVestingWithdraw {
            from_account,
            to_account,
            withdrawn,
            deposited,
        } => {
            db.modify_account(from_account, |account| {
                account.vesting_shares.amount =
                    account.vesting_shares.amount.saturating_sub(withdrawn.amount);
                account.withdrawn = account.withdrawn.saturating_add(withdrawn.amount);
                if account.withdrawn >= account.to_withdraw {
                    account.vesting_withdraw_rate.amount = 0;
                    account.to_withdraw = 0;
                    account.withdrawn = 0;
                    account.next_vesting_withdrawal = WITHDRAWAL_INACTIVE;
                } else {
                    account.next_vesting_withdrawal = account
                        .next_vesting_withdrawal
                        .saturating_add(VESTING_WITHDRAW_INTERVAL_SECONDS);
                }
            })?;
            if to_account != from_account && deposited.symbol == AssetSymbol::Stake {
                db.modify_account(to_account, |account| {
                    account.vesting_shares.amount =
                        account.vesting_shares.amount.saturating_add(deposited.amount);
                })?;
            } else if deposited.symbol == AssetSymbol::Native {
                db.modify_global_properties(|gpo| {
                    gpo.total_vesting_shares.amount = gpo
                        .total_vesting_shares
                        .amount
                        .saturating_sub(withdrawn.amount);
                })?;
            }
        }
        Operation::ClearNullAccountBalance => {
            let null_account = AccountName::from(NULL_ACCOUNT);
            if db.find_account(&null_account)?.is_some() {
                let cleared = db.account(&null_account)?.vesting_shares.amount;
                db.modify_account(&null_account, |account| {
                    account.vesting_shares.amount = 0;
                })?;
                db.modify_global_properties(|gpo| {
                    gpo.total_vesting_shares.amount =
                        gpo.total_vesting_shares.amount.saturating_sub(cleared);
                })?;
            }
        }
        Operation::Hardfork { hardfork_id } => {
            db.apply_hardfork(*hardfork_id)?;
        }
        Operation::Pow { worker_account, .. } => {
            if db.find_account(worker_account)?.is_none() {
                db.create_account(worker_account, now)?;
            }
        }
        Operation::Pow2 { work } => {
            let worker = work.worker_account().clone();
            if db.find_account(&worker)?.is_none() {
                db.create_account(&worker, now)?;
            }
        }
        // No stake effect.
        Operation::SetWithdrawVestingRoute { .. }
        | Operation::CommentReward { .. }
        | Operation::RecoverAccount { .. }
        | Operation::WitnessSetProperties { .. }
        | Operation::Transfer { .. }
        | Operation::Comment { .. }
        | Operation::Vote { .. }
        | Operation::CustomJson { .. } => {}
    }
    Ok(())
}

fn credit_vesting(db: &mut Database, name: &AccountName, amount: i64) -> ChainResult<()> {
    db.modify_account(name, |account| {
        account.vesting_shares.amount = account.vesting_shares.amount.saturating_add(amount);
    })?;
    db.modify_global_properties(|gpo| {
        gpo.total_vesting_shares.amount = gpo.total_vesting_shares.amount.saturating_add(amount);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Asset, Authority};
    use chrono::{TimeZone, Utc};

    fn block_at(secs: i64, transactions: Vec<SignedTransaction>) -> SignedBlock {
        SignedBlock {
            timestamp: Utc.timestamp_opt(secs, 0).single().expect("valid timestamp"),
            witness: AccountName::from("witness0"),
            transactions,
        }
    }

    fn create_op(creator: &str, name: &str) -> Operation {
        Operation::AccountCreate {
            creator: AccountName::from(creator),
            new_account_name: AccountName::from(name),
            fee: Asset::native(0),
            owner: Authority::single_account(AccountName::from(name)),
            active: Authority::single_account(AccountName::from(name)),
            posting: Authority::single_account(AccountName::from(name)),
        }
    }

    #[test]
    fn test_push_block_advances_global_properties() {
        let mut chain = Chain::new(Database::in_memory());
        chain
            .database_mut()
            .create_account(&AccountName::from("alice"), Utc::now())
            .expect("create");
        chain.push_block(&block_at(100, vec![])).expect("push");
        let gpo = chain.database().global_properties().expect("gpo");
        assert_eq!(gpo.head_block_number, 1);
        assert_eq!(gpo.time_secs(), 100);
        assert_eq!(gpo.current_witness, AccountName::from("witness0"));
    }

    #[test]
    fn test_failed_block_rolls_back_state() {
        let mut chain = Chain::new(Database::in_memory());
        chain
            .database_mut()
            .create_account(&AccountName::from("alice"), Utc::now())
            .expect("create");

        // Second create of the same account fails mid-block.
        let tx = SignedTransaction::new(vec![
            create_op("alice", "bob"),
            create_op("alice", "bob"),
        ]);
        let result = chain.push_block(&block_at(100, vec![tx]));
        assert!(result.is_err());

        let db = chain.database();
        assert!(db.find_account(&AccountName::from("bob")).expect("find").is_none());
        assert_eq!(db.global_properties().expect("gpo").head_block_number, 0);
    }

    #[test]
    fn test_vesting_and_delegation_flow() {
        let mut chain = Chain::new(Database::in_memory());
        let alice = AccountName::from("alice");
        let bob = AccountName::from("bob");
        for name in [&alice, &bob] {
            chain
                .database_mut()
                .create_account(name, Utc::now())
                .expect("create");
        }

        let vest = SignedTransaction::new(vec![Operation::TransferToVesting {
            from: alice.clone(),
            to: AccountName::default(),
            amount: Asset::native(1_000),
        }]);
        let delegate = SignedTransaction::new(vec![Operation::DelegateVestingShares {
            delegator: alice.clone(),
            delegatee: bob.clone(),
            vesting_shares: Asset::stake(400),
        }]);
        chain.push_block(&block_at(100, vec![vest, delegate])).expect("push");

        let db = chain.database();
        let alice_obj = db.account(&alice).expect("alice");
        let bob_obj = db.account(&bob).expect("bob");
        assert_eq!(alice_obj.vesting_shares.amount, 1_000);
        assert_eq!(alice_obj.delegated_vesting_shares.amount, 400);
        assert_eq!(bob_obj.received_vesting_shares.amount, 400);
        assert_eq!(db.global_properties().expect("gpo").total_vesting_shares.amount, 1_000);
    }

    #[test]
    fn test_withdraw_vesting_schedules_thirteen_steps() {
        let mut chain = Chain::new(Database::in_memory());
        let alice = AccountName::from("alice");
        chain
            .database_mut()
            .create_account(&alice, Utc::now())
            .expect("create");

        let vest = SignedTransaction::new(vec![Operation::TransferToVesting {
            from: alice.clone(),
            to: AccountName::default(),
            amount: Asset::native(1_300),
        }]);
        let withdraw = SignedTransaction::new(vec![Operation::WithdrawVesting {
            account: alice.clone(),
            vesting_shares: Asset::stake(1_300),
        }]);
        chain.push_block(&block_at(100, vec![vest, withdraw])).expect("push");

        let account = chain.database().account(&alice).expect("alice");
        assert_eq!(account.vesting_withdraw_rate.amount, 100);
        assert_eq!(account.to_withdraw, 1_300);
        assert_eq!(
            account.next_vesting_withdrawal,
            100 + VESTING_WITHDRAW_INTERVAL_SECONDS
        );
    }
}
