use serde::{Deserialize, Serialize};

/// Fixed-point decay rate for one resource pool.
///
/// The per-time-unit decay fraction is
/// `decay_per_time_unit / 2^decay_per_time_unit_denom_shift`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecayParams {
    pub decay_per_time_unit: u64,
    pub decay_per_time_unit_denom_shift: u8,
}

/// Quantity to subtract from `current_pool` across `dt` time units.
///
/// Saturating; the result is clamped to `[0, current_pool]` so decay alone
/// never drives a pool negative, and a non-positive pool does not decay.
pub fn compute_pool_decay(params: &DecayParams, current_pool: i64, dt: u32) -> i64 {
    if dt == 0 || current_pool <= 0 {
        return 0;
    }
    let product = i128::from(current_pool)
        .saturating_mul(i128::from(params.decay_per_time_unit))
        .saturating_mul(i128::from(dt));
    let shift = u32::from(params.decay_per_time_unit_denom_shift).min(127);
    let decayed = product >> shift;
    decayed.clamp(0, i128::from(current_pool)) as i64
}
