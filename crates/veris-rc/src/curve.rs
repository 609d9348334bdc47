use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{RcError, RcResult};

/// Coefficients of the rational pricing curve for one resource kind.
///
/// The cost of consuming from a pool at level `P` is proportional to
/// `coeff_a << shift` and inversely proportional to `P + coeff_b`; the shift
/// lifts precision before the division.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveParams {
    #[serde(deserialize_with = "u64_from_string_or_number")]
    pub coeff_a: u64,
    #[serde(deserialize_with = "u64_from_string_or_number")]
    pub coeff_b: u64,
    pub shift: u8,
}

/// Genesis files carry the large coefficients as strings; accept both.
fn u64_from_string_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
    }
}

/// RC cost of consuming `resource_count` pool units at pool level
/// `current_pool`, under chain-wide regeneration rate `rc_regen`.
///
/// `cost = (Δ · (A << S)) / ((max(P, 0) + B) · R)`, divided to the nearest
/// integer with ties away from zero, never below 1 for positive usage. With
/// no stake (`rc_regen == 0`) or no usage the cost is zero. The curve is
/// pure; all overflow is detected and surfaced.
pub fn compute_rc_cost(
    curve: &CurveParams,
    current_pool: i64,
    resource_count: i64,
    rc_regen: i64,
) -> RcResult<i64> {
    if rc_regen <= 0 || resource_count == 0 {
        return Ok(0);
    }
    if resource_count < 0 {
        return Err(RcError::Arithmetic(
            "pricing curve fed a negative resource count".to_string(),
        ));
    }

    let coeff_bits = 64 - curve.coeff_a.leading_zeros();
    if u32::from(curve.shift) + coeff_bits > 127 {
        return Err(RcError::Arithmetic(
            "pricing curve scale overflows 128 bits".to_string(),
        ));
    }
    let scale = u128::from(curve.coeff_a) << curve.shift;
    let num = scale
        .checked_mul(resource_count as u128)
        .ok_or_else(|| RcError::Arithmetic("pricing curve numerator overflow".to_string()))?;

    let pool = current_pool.max(0) as u128;
    let denom = (pool + u128::from(curve.coeff_b))
        .checked_mul(rc_regen as u128)
        .ok_or_else(|| RcError::Arithmetic("pricing curve denominator overflow".to_string()))?;
    if denom == 0 {
        return Err(RcError::Arithmetic(
            "pricing curve denominator is zero".to_string(),
        ));
    }

    let rounded = num
        .checked_add(denom / 2)
        .ok_or_else(|| RcError::Arithmetic("pricing curve rounding overflow".to_string()))?
        / denom;
    let cost = rounded.max(1);
    i64::try_from(cost)
        .map_err(|_| RcError::Arithmetic("resource cost exceeds the i64 range".to_string()))
}
