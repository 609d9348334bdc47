use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp sentinel marking a vesting withdrawal schedule as inactive.
pub const WITHDRAWAL_INACTIVE: u32 = u32::MAX;

/// A chain account name.
///
/// Names are the primary key of the account index and of every per-account
/// record derived from it. The empty name is reserved as "no account".
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AccountName(String);

impl AccountName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// The two token denominations the RC engine observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetSymbol {
    /// The liquid chain token.
    Native,
    /// Vesting shares (stake).
    Stake,
}

/// An amount of a single token denomination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub amount: i64,
    pub symbol: AssetSymbol,
}

impl Asset {
    pub fn native(amount: i64) -> Self {
        Self {
            amount,
            symbol: AssetSymbol::Native,
        }
    }

    pub fn stake(amount: i64) -> Self {
        Self {
            amount,
            symbol: AssetSymbol::Stake,
        }
    }
}

/// A signing authority: weighted account and key members with a threshold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authority {
    pub weight_threshold: u32,
    /// Account members, in authority order.
    #[serde(default)]
    pub account_auths: Vec<(AccountName, u16)>,
    /// Public-key members, in authority order.
    #[serde(default)]
    pub key_auths: Vec<(String, u16)>,
}

impl Authority {
    pub fn single_account(name: AccountName) -> Self {
        Self {
            weight_threshold: 1,
            account_auths: vec![(name, 1)],
            key_auths: Vec::new(),
        }
    }
}

/// The host-owned account record.
///
/// The RC engine treats this as a borrowed, read-only object: it reads the
/// stake fields and the withdrawal schedule but never writes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountObject {
    /// Creation-order id; iteration over "all accounts" follows this order.
    pub id: u64,
    pub name: AccountName,
    pub created: DateTime<Utc>,
    /// Owned vesting shares.
    pub vesting_shares: Asset,
    /// Vesting shares delegated away to other accounts.
    pub delegated_vesting_shares: Asset,
    /// Vesting shares received from other accounts.
    pub received_vesting_shares: Asset,
    /// Shares released per withdrawal interval while a withdrawal is active.
    pub vesting_withdraw_rate: Asset,
    /// Epoch seconds of the next scheduled withdrawal step, or
    /// [`WITHDRAWAL_INACTIVE`].
    pub next_vesting_withdrawal: u32,
    /// Total shares scheduled for withdrawal.
    pub to_withdraw: i64,
    /// Shares already withdrawn from the current schedule.
    pub withdrawn: i64,
}

impl AccountObject {
    pub fn new(id: u64, name: AccountName, created: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            created,
            vesting_shares: Asset::stake(0),
            delegated_vesting_shares: Asset::stake(0),
            received_vesting_shares: Asset::stake(0),
            vesting_withdraw_rate: Asset::stake(0),
            next_vesting_withdrawal: WITHDRAWAL_INACTIVE,
            to_withdraw: 0,
            withdrawn: 0,
        }
    }
}
