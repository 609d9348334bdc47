use serde::{Deserialize, Serialize};

use crate::curve::CurveParams;
use crate::decay::DecayParams;
use crate::error::{RcError, RcResult};
use crate::resources::{ResourceType, NUM_RESOURCE_TYPES};

/// Clock domain a resource pool evolves in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Blocks,
    Seconds,
}

/// Immutable per-kind parameters, fixed at genesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceParams {
    /// Scale factor from raw counts to pool units.
    pub resource_unit: u64,
    /// Pool inflow per time unit.
    pub budget_per_time_unit: i64,
    /// Equilibrium pool level; also the genesis value.
    pub pool_eq: i64,
    pub time_unit: TimeUnit,
    pub curve_params: CurveParams,
    pub decay_params: DecayParams,
}

/// The resource-parameter seed shipped with the node.
///
/// One `[kind, params]` pair per resource kind, in index order. A sibling
/// subsystem may deliver an override with the same shape.
pub const DEFAULT_RESOURCE_PARAMETERS: &str = r#"[
  ["resource_history_bytes", {
    "resource_unit": 1,
    "budget_per_time_unit": 131072,
    "pool_eq": 56755555840,
    "time_unit": "seconds",
    "curve_params": { "coeff_a": "392338013268", "coeff_b": "80797", "shift": 16 },
    "decay_params": { "decay_per_time_unit": 347321, "decay_per_time_unit_denom_shift": 36 }
  }],
  ["resource_new_accounts", {
    "resource_unit": 10000,
    "budget_per_time_unit": 0,
    "pool_eq": 0,
    "time_unit": "blocks",
    "curve_params": { "coeff_a": "797196281936", "coeff_b": "347321", "shift": 16 },
    "decay_params": { "decay_per_time_unit": 347321, "decay_per_time_unit_denom_shift": 36 }
  }],
  ["resource_state_bytes", {
    "resource_unit": 1,
    "budget_per_time_unit": 197379,
    "pool_eq": 85254731776,
    "time_unit": "seconds",
    "curve_params": { "coeff_a": "725431853430", "coeff_b": "130864", "shift": 16 },
    "decay_params": { "decay_per_time_unit": 347321, "decay_per_time_unit_denom_shift": 36 }
  }],
  ["resource_execution_time", {
    "resource_unit": 1,
    "budget_per_time_unit": 135600,
    "pool_eq": 58593894400,
    "time_unit": "blocks",
    "curve_params": { "coeff_a": "586811439751", "coeff_b": "89576", "shift": 16 },
    "decay_params": { "decay_per_time_unit": 21337, "decay_per_time_unit_denom_shift": 36 }
  }]
]"#;

/// Parse a genesis seed into the parameter array.
///
/// The seed must name every kind exactly once, in index order; the ordering
/// is part of the external contract.
pub fn parse_genesis_params(seed: &str) -> RcResult<[ResourceParams; NUM_RESOURCE_TYPES]> {
    let pairs: Vec<(ResourceType, ResourceParams)> =
        serde_json::from_str(seed).map_err(|err| RcError::SeedParse(err.to_string()))?;

    if pairs.len() != NUM_RESOURCE_TYPES {
        return Err(RcError::SeedParse(format!(
            "expected {} resource kinds, found {}",
            NUM_RESOURCE_TYPES,
            pairs.len()
        )));
    }

    let mut params = [pairs[0].1; NUM_RESOURCE_TYPES];
    for (position, (kind, kind_params)) in pairs.into_iter().enumerate() {
        if kind.index() != position {
            return Err(RcError::SeedParse(format!(
                "resource kind {kind} out of order at position {position}"
            )));
        }
        params[position] = kind_params;
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_seed_parses() {
        let params = parse_genesis_params(DEFAULT_RESOURCE_PARAMETERS).expect("parse");
        let history = params[ResourceType::ResourceHistoryBytes.index()];
        assert_eq!(history.resource_unit, 1);
        assert_eq!(history.time_unit, TimeUnit::Seconds);
        assert_eq!(history.curve_params.coeff_a, 392_338_013_268);

        let new_accounts = params[ResourceType::ResourceNewAccounts.index()];
        assert_eq!(new_accounts.resource_unit, 10_000);
        assert_eq!(new_accounts.time_unit, TimeUnit::Blocks);
    }

    #[test]
    fn test_seed_round_trips_through_serialization() {
        let params = parse_genesis_params(DEFAULT_RESOURCE_PARAMETERS).expect("parse");
        let pairs: Vec<(ResourceType, ResourceParams)> = ResourceType::ALL
            .into_iter()
            .map(|kind| (kind, params[kind.index()]))
            .collect();
        let reserialized = serde_json::to_string(&pairs).expect("serialize");
        let reparsed = parse_genesis_params(&reserialized).expect("reparse");
        assert_eq!(params, reparsed);
    }

    #[test]
    fn test_short_seed_is_rejected() {
        let result = parse_genesis_params(r#"[]"#);
        assert!(matches!(result, Err(RcError::SeedParse(_))));
    }

    #[test]
    fn test_out_of_order_seed_is_rejected() {
        let parsed = parse_genesis_params(DEFAULT_RESOURCE_PARAMETERS).expect("parse");
        let mut pairs: Vec<(ResourceType, ResourceParams)> = ResourceType::ALL
            .into_iter()
            .map(|kind| (kind, parsed[kind.index()]))
            .collect();
        pairs.swap(0, 1);
        let seed = serde_json::to_string(&pairs).expect("serialize");
        assert!(matches!(
            parse_genesis_params(&seed),
            Err(RcError::SeedParse(_))
        ));
    }

    #[test]
    fn test_malformed_seed_is_rejected() {
        assert!(matches!(
            parse_genesis_params("not json"),
            Err(RcError::SeedParse(_))
        ));
    }
}
