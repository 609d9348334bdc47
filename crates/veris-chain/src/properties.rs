use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::{AccountName, Asset};

/// The chain-wide dynamic state singleton.
///
/// Maintained by the host during block application; the RC engine only reads
/// it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicGlobalProperties {
    pub head_block_number: u32,
    /// Timestamp of the head block.
    pub time: DateTime<Utc>,
    pub current_witness: AccountName,
    /// Total vesting shares in existence across all accounts.
    pub total_vesting_shares: Asset,
    /// Account-creation subsidies accrued and not yet consumed, in
    /// subsidy-precision units.
    pub available_account_subsidies: i64,
}

impl DynamicGlobalProperties {
    /// Head-block time as epoch seconds, the clock domain of mana bars.
    pub fn time_secs(&self) -> u32 {
        self.time.timestamp().clamp(0, u32::MAX as i64) as u32
    }
}

impl Default for DynamicGlobalProperties {
    fn default() -> Self {
        Self {
            head_block_number: 0,
            time: DateTime::<Utc>::UNIX_EPOCH,
            current_witness: AccountName::default(),
            total_vesting_shares: Asset::stake(0),
            available_account_subsidies: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_time_secs_clamps_to_u32_domain() {
        let mut gpo = DynamicGlobalProperties::default();
        assert_eq!(gpo.time_secs(), 0);

        gpo.time = Utc.timestamp_opt(1_600_000_000, 0).single().expect("valid");
        assert_eq!(gpo.time_secs(), 1_600_000_000);

        gpo.time = Utc.timestamp_opt(-5, 0).single().expect("valid");
        assert_eq!(gpo.time_secs(), 0);
    }
}
