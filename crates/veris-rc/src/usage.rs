use veris_chain::{AccountName, Authority, Operation, SignedTransaction};

use crate::resources::{ResourceCount, ResourceType};

/// Static resource weights of the reference costing policy.
///
/// State sizes are bytes of chain state an operation allocates; execution
/// weights are in abstract execution units. Values are policy, not
/// consensus, and only their relative magnitudes matter.
pub mod weights {
    pub const STATE_TRANSACTION_BASE: i64 = 174;
    pub const STATE_ACCOUNT_CREATE_BASE: i64 = 480;
    pub const STATE_AUTHORITY_ACCOUNT_MEMBER: i64 = 18;
    pub const STATE_AUTHORITY_KEY_MEMBER: i64 = 42;
    pub const STATE_VESTING_DELEGATION_OBJECT: i64 = 60;
    pub const STATE_WITHDRAW_ROUTE_OBJECT: i64 = 43;
    pub const STATE_TRANSFER_TO_VESTING: i64 = 31;
    pub const STATE_COMMENT_BASE: i64 = 201;
    pub const STATE_COMMENT_PERMLINK_CHAR: i64 = 1;
    pub const STATE_VOTE_OBJECT: i64 = 47;

    pub const EXEC_TRANSACTION_BASE: i64 = 3_780;
    pub const EXEC_VERIFY_SIGNATURE: i64 = 10_400;
    pub const EXEC_ACCOUNT_CREATE: i64 = 57_700;
    pub const EXEC_TRANSFER: i64 = 9_950;
    pub const EXEC_TRANSFER_TO_VESTING: i64 = 11_300;
    pub const EXEC_WITHDRAW_VESTING: i64 = 10_400;
    pub const EXEC_SET_WITHDRAW_ROUTE: i64 = 17_900;
    pub const EXEC_DELEGATE_VESTING: i64 = 19_900;
    pub const EXEC_CLAIM_REWARD: i64 = 14_400;
    pub const EXEC_COMMENT: i64 = 114_100;
    pub const EXEC_VOTE: i64 = 26_500;
    pub const EXEC_CUSTOM_JSON: i64 = 11_400;
    pub const EXEC_RECOVER_ACCOUNT: i64 = 49_700;
    pub const EXEC_WITNESS_SET_PROPERTIES: i64 = 9_500;
    pub const EXEC_POW: i64 = 74_500;
}

fn authority_state_bytes(authority: &Authority) -> i64 {
    weights::STATE_AUTHORITY_ACCOUNT_MEMBER * authority.account_auths.len() as i64
        + weights::STATE_AUTHORITY_KEY_MEMBER * authority.key_auths.len() as i64
}

/// Accumulate the raw per-kind resource counts of a transaction into
/// `count`.
///
/// The whole serialized transaction is history bandwidth; per-operation
/// weights cover state growth and execution effort. Reward and fill
/// operations are produced by the chain itself and carry no weight.
pub fn count_resources(transaction: &SignedTransaction, count: &mut ResourceCount) {
    use weights::*;

    let history = ResourceType::ResourceHistoryBytes.index();
    let new_accounts = ResourceType::ResourceNewAccounts.index();
    let state = ResourceType::ResourceStateBytes.index();
    let execution = ResourceType::ResourceExecutionTime.index();

    count[history] += transaction.serialized_size() as i64;

    for operation in &transaction.operations {
        match operation {
            Operation::AccountCreate {
                owner,
                active,
                posting,
                ..
            } => {
                count[new_accounts] += 1;
                count[state] += STATE_ACCOUNT_CREATE_BASE
                    + authority_state_bytes(owner)
                    + authority_state_bytes(active)
                    + authority_state_bytes(posting);
                count[execution] += EXEC_ACCOUNT_CREATE;
            }
            Operation::AccountCreateWithDelegation {
                owner,
                active,
                posting,
                ..
            } => {
                count[new_accounts] += 1;
                count[state] += STATE_ACCOUNT_CREATE_BASE
                    + STATE_VESTING_DELEGATION_OBJECT
                    + authority_state_bytes(owner)
                    + authority_state_bytes(active)
                    + authority_state_bytes(posting);
                count[execution] += EXEC_ACCOUNT_CREATE;
            }
            Operation::Pow { .. } | Operation::Pow2 { .. } => {
                count[new_accounts] += 1;
                count[execution] += EXEC_POW;
            }
            Operation::Transfer { .. } => {
                count[execution] += EXEC_TRANSFER;
            }
            Operation::TransferToVesting { .. } => {
                count[state] += STATE_TRANSFER_TO_VESTING;
                count[execution] += EXEC_TRANSFER_TO_VESTING;
            }
            Operation::WithdrawVesting { .. } => {
                count[execution] += EXEC_WITHDRAW_VESTING;
            }
            Operation::SetWithdrawVestingRoute { .. } => {
                count[state] += STATE_WITHDRAW_ROUTE_OBJECT;
                count[execution] += EXEC_SET_WITHDRAW_ROUTE;
            }
            Operation::DelegateVestingShares { .. } => {
                count[state] += STATE_VESTING_DELEGATION_OBJECT;
                count[execution] += EXEC_DELEGATE_VESTING;
            }
            Operation::ClaimRewardBalance { .. } => {
                count[execution] += EXEC_CLAIM_REWARD;
            }
            Operation::Comment { permlink, .. } => {
                count[state] +=
                    STATE_COMMENT_BASE + STATE_COMMENT_PERMLINK_CHAR * permlink.len() as i64;
                count[execution] += EXEC_COMMENT;
            }
            Operation::Vote { .. } => {
                count[state] += STATE_VOTE_OBJECT;
                count[execution] += EXEC_VOTE;
            }
            Operation::CustomJson { .. } => {
                count[execution] += EXEC_CUSTOM_JSON;
            }
            Operation::RecoverAccount {
                new_owner_authority,
                ..
            } => {
                count[state] += authority_state_bytes(new_owner_authority);
                count[execution] += EXEC_RECOVER_ACCOUNT;
            }
            Operation::WitnessSetProperties { .. } => {
                count[execution] += EXEC_WITNESS_SET_PROPERTIES;
            }
            Operation::AuthorReward { .. }
            | Operation::CurationReward { .. }
            | Operation::CommentReward { .. }
            | Operation::CommentBenefactorReward { .. }
            | Operation::ProducerReward { .. }
            | Operation::FillVestingWithdraw { .. }
            | Operation::ReturnVestingDelegation { .. }
            | Operation::ClearNullAccountBalance
            | Operation::Hardfork { .. } => {}
        }
    }

    count[state] += STATE_TRANSACTION_BASE;
    count[execution] +=
        EXEC_TRANSACTION_BASE + EXEC_VERIFY_SIGNATURE * transaction.signatures.len() as i64;
}

/// The account a single operation would bill, possibly the empty name.
fn resource_user_of(operation: &Operation) -> AccountName {
    match operation {
        Operation::WitnessSetProperties { owner, .. } => owner.clone(),
        Operation::RecoverAccount {
            account_to_recover,
            new_owner_authority,
            recent_owner_authority,
        } => new_owner_authority
            .account_auths
            .first()
            .or_else(|| recent_owner_authority.account_auths.first())
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| account_to_recover.clone()),
        _ => {
            for names in [
                operation.required_active_authorities(),
                operation.required_owner_authorities(),
                operation.required_posting_authorities(),
            ] {
                if let Some(name) = names.into_iter().next() {
                    return name;
                }
            }
            AccountName::default()
        }
    }
}

/// Select the account billed for a transaction: the first operation, in
/// order, that names one.
pub fn get_resource_user(transaction: &SignedTransaction) -> Option<AccountName> {
    for operation in &transaction.operations {
        let user = resource_user_of(operation);
        if !user.is_empty() {
            return Some(user);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use veris_chain::Asset;

    fn tx(operations: Vec<Operation>) -> SignedTransaction {
        SignedTransaction::new(operations)
    }

    #[test]
    fn test_account_create_counts_a_new_account_slot() {
        let mut count = ResourceCount::default();
        count_resources(
            &tx(vec![Operation::AccountCreate {
                creator: AccountName::from("alice"),
                new_account_name: AccountName::from("bob"),
                fee: Asset::native(3),
                owner: Authority::single_account(AccountName::from("bob")),
                active: Authority::single_account(AccountName::from("bob")),
                posting: Authority::single_account(AccountName::from("bob")),
            }]),
            &mut count,
        );
        assert_eq!(count[ResourceType::ResourceNewAccounts.index()], 1);
        assert!(count[ResourceType::ResourceHistoryBytes.index()] > 0);
        assert!(
            count[ResourceType::ResourceStateBytes.index()]
                > weights::STATE_TRANSACTION_BASE + weights::STATE_ACCOUNT_CREATE_BASE
        );
    }

    #[test]
    fn test_every_transaction_pays_base_costs() {
        let mut count = ResourceCount::default();
        count_resources(&tx(vec![]), &mut count);
        assert_eq!(count[ResourceType::ResourceNewAccounts.index()], 0);
        assert_eq!(
            count[ResourceType::ResourceStateBytes.index()],
            weights::STATE_TRANSACTION_BASE
        );
        assert_eq!(
            count[ResourceType::ResourceExecutionTime.index()],
            weights::EXEC_TRANSACTION_BASE
        );
    }

    #[test]
    fn test_signatures_add_verification_cost() {
        let mut unsigned = ResourceCount::default();
        count_resources(&tx(vec![]), &mut unsigned);

        let mut signed_tx = tx(vec![]);
        signed_tx.signatures = vec!["a".repeat(130), "b".repeat(130)];
        let mut signed = ResourceCount::default();
        count_resources(&signed_tx, &mut signed);

        let execution = ResourceType::ResourceExecutionTime.index();
        assert_eq!(
            signed[execution] - unsigned[execution],
            2 * weights::EXEC_VERIFY_SIGNATURE
        );
    }

    #[test]
    fn test_resource_user_prefers_first_operation_with_a_name() {
        let transaction = tx(vec![
            Operation::ClearNullAccountBalance,
            Operation::Vote {
                voter: AccountName::from("carol"),
                author: AccountName::from("alice"),
                permlink: "post".to_string(),
                weight: 100,
            },
            Operation::Transfer {
                from: AccountName::from("dave"),
                to: AccountName::from("alice"),
                amount: Asset::native(1),
                memo: String::new(),
            },
        ]);
        assert_eq!(
            get_resource_user(&transaction),
            Some(AccountName::from("carol"))
        );
    }

    #[test]
    fn test_witness_set_properties_bills_the_owner() {
        let transaction = tx(vec![Operation::WitnessSetProperties {
            owner: AccountName::from("witness0"),
            props: vec![],
        }]);
        assert_eq!(
            get_resource_user(&transaction),
            Some(AccountName::from("witness0"))
        );
    }

    #[test]
    fn test_recover_account_prefers_new_authority_members() {
        let base = Operation::RecoverAccount {
            account_to_recover: AccountName::from("victim"),
            new_owner_authority: Authority::single_account(AccountName::from("rescuer")),
            recent_owner_authority: Authority::single_account(AccountName::from("old-friend")),
        };
        assert_eq!(
            get_resource_user(&tx(vec![base])),
            Some(AccountName::from("rescuer"))
        );

        let no_new = Operation::RecoverAccount {
            account_to_recover: AccountName::from("victim"),
            new_owner_authority: Authority::default(),
            recent_owner_authority: Authority::single_account(AccountName::from("old-friend")),
        };
        assert_eq!(
            get_resource_user(&tx(vec![no_new])),
            Some(AccountName::from("old-friend"))
        );

        let neither = Operation::RecoverAccount {
            account_to_recover: AccountName::from("victim"),
            new_owner_authority: Authority::default(),
            recent_owner_authority: Authority::default(),
        };
        assert_eq!(
            get_resource_user(&tx(vec![neither])),
            Some(AccountName::from("victim"))
        );
    }

    #[test]
    fn test_transaction_without_authorities_has_no_user() {
        let transaction = tx(vec![Operation::ClearNullAccountBalance]);
        assert_eq!(get_resource_user(&transaction), None);
    }
}
