use serde::{Deserialize, Serialize};

use crate::account::{AccountName, Asset, Authority};

/// The closed set of chain operations the RC engine dispatches on.
///
/// Stake-moving and account-admission operations carry the fields the RC
/// hooks read; social and transfer operations are present so transactions
/// have realistic shapes for resource counting and billing-account
/// selection, but their payloads are deliberately thin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    AccountCreate {
        creator: AccountName,
        new_account_name: AccountName,
        fee: Asset,
        owner: Authority,
        active: Authority,
        posting: Authority,
    },
    AccountCreateWithDelegation {
        creator: AccountName,
        new_account_name: AccountName,
        fee: Asset,
        delegation: Asset,
        owner: Authority,
        active: Authority,
        posting: Authority,
    },
    TransferToVesting {
        from: AccountName,
        /// Empty name means the vesting target is `from`.
        to: AccountName,
        amount: Asset,
    },
    WithdrawVesting {
        account: AccountName,
        vesting_shares: Asset,
    },
    SetWithdrawVestingRoute {
        from_account: AccountName,
        to_account: AccountName,
        percent: u16,
        auto_vest: bool,
    },
    DelegateVestingShares {
        delegator: AccountName,
        delegatee: AccountName,
        vesting_shares: Asset,
    },
    AuthorReward {
        author: AccountName,
        permlink: String,
        vesting_payout: Asset,
    },
    CurationReward {
        curator: AccountName,
        reward: Asset,
        author: AccountName,
        permlink: String,
    },
    CommentReward {
        author: AccountName,
        permlink: String,
        payout: Asset,
    },
    CommentBenefactorReward {
        benefactor: AccountName,
        author: AccountName,
        permlink: String,
        vesting_payout: Asset,
    },
    ProducerReward {
        producer: AccountName,
        vesting_shares: Asset,
    },
    FillVestingWithdraw {
        from_account: AccountName,
        to_account: AccountName,
        withdrawn: Asset,
        deposited: Asset,
    },
    ClaimRewardBalance {
        account: AccountName,
        reward_vests: Asset,
    },
    ReturnVestingDelegation {
        account: AccountName,
        vesting_shares: Asset,
    },
    ClearNullAccountBalance,
    Hardfork {
        hardfork_id: u32,
    },
    Pow {
        worker_account: AccountName,
        nonce: u64,
    },
    Pow2 {
        work: Pow2Work,
    },
    RecoverAccount {
        account_to_recover: AccountName,
        new_owner_authority: Authority,
        recent_owner_authority: Authority,
    },
    WitnessSetProperties {
        owner: AccountName,
        props: Vec<(String, String)>,
    },
    Transfer {
        from: AccountName,
        to: AccountName,
        amount: Asset,
        memo: String,
    },
    Comment {
        parent_author: AccountName,
        parent_permlink: String,
        author: AccountName,
        permlink: String,
        body: String,
    },
    Vote {
        voter: AccountName,
        author: AccountName,
        permlink: String,
        weight: i16,
    },
    CustomJson {
        required_auths: Vec<AccountName>,
        required_posting_auths: Vec<AccountName>,
        id: String,
        json: String,
    },
}

impl Operation {
    /// Accounts whose active authority must sign this operation.
    pub fn required_active_authorities(&self) -> Vec<AccountName> {
        match self {
            Operation::AccountCreate { creator, .. }
            | Operation::AccountCreateWithDelegation { creator, .. } => vec![creator.clone()],
            Operation::TransferToVesting { from, .. } => vec![from.clone()],
            Operation::WithdrawVesting { account, .. } => vec![account.clone()],
            Operation::SetWithdrawVestingRoute { from_account, .. } => {
                vec![from_account.clone()]
            }
            Operation::DelegateVestingShares { delegator, .. } => vec![delegator.clone()],
            Operation::Transfer { from, .. } => vec![from.clone()],
            Operation::CustomJson { required_auths, .. } => required_auths.clone(),
            _ => Vec::new(),
        }
    }

    /// Accounts whose owner authority must sign this operation.
    pub fn required_owner_authorities(&self) -> Vec<AccountName> {
        Vec::new()
    }

    /// Accounts whose posting authority must sign this operation.
    pub fn required_posting_authorities(&self) -> Vec<AccountName> {
        match self {
            Operation::Comment { author, .. } => vec![author.clone()],
            Operation::Vote { voter, .. } => vec![voter.clone()],
            Operation::ClaimRewardBalance { account, .. } => vec![account.clone()],
            Operation::CustomJson {
                required_posting_auths,
                ..
            } => required_posting_auths.clone(),
            _ => Vec::new(),
        }
    }
}

/// Work payload of a second-generation proof-of-work admission.
///
/// Both variants carry the same input layout; the split mirrors the two
/// accepted proof formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Pow2Work {
    Pow2 {
        input: Pow2Input,
        pow_summary: u32,
    },
    EquihashPow {
        input: Pow2Input,
        pow_summary: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pow2Input {
    pub worker_account: AccountName,
    pub prev_block: u64,
    pub nonce: u64,
}

impl Pow2Work {
    pub fn worker_account(&self) -> &AccountName {
        match self {
            Pow2Work::Pow2 { input, .. } | Pow2Work::EquihashPow { input, .. } => {
                &input.worker_account
            }
        }
    }
}
