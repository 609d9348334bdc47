use serde::{Deserialize, Serialize};

use crate::error::{RcError, RcResult};

/// Runtime toggles governing permissive vs strict behavior.
///
/// Replay of historical blocks runs permissive so RC policy can never stall
/// it; production runs strict. The flags can be swapped at runtime through
/// [`crate::plugin::RcPlugin::set_skip_flags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RcSkipFlags {
    /// Never reject a transaction for insufficient RC.
    pub skip_reject_not_enough_rc: bool,
    /// Observability mode: price transactions but deduct nothing.
    pub skip_deduct_rc: bool,
    /// Skip a deduction that would drive a balance negative.
    pub skip_negative_rc_balance: bool,
    /// Downgrade unaccounted stake-change detection from fatal to a warning.
    pub skip_reject_unknown_delta_vests: bool,
}

impl Default for RcSkipFlags {
    fn default() -> Self {
        Self {
            skip_reject_not_enough_rc: false,
            skip_deduct_rc: false,
            skip_negative_rc_balance: false,
            skip_reject_unknown_delta_vests: true,
        }
    }
}

/// Plugin configuration as read from the node's config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RcConfig {
    /// Skip rejecting transactions when the account has insufficient RC.
    /// Not recommended outside of testing.
    pub skip_reject_not_enough_rc: bool,
}

impl RcConfig {
    /// Load a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> RcResult<Self> {
        toml::from_str(toml_str)
            .map_err(|err| RcError::InvalidConfiguration(format!("failed to parse TOML: {err}")))
    }

    /// Load a configuration from a JSON string.
    pub fn from_json(json_str: &str) -> RcResult<Self> {
        serde_json::from_str(json_str)
            .map_err(|err| RcError::InvalidConfiguration(format!("failed to parse JSON: {err}")))
    }
}
