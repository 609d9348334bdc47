use serde::{Deserialize, Serialize};

/// Regeneration inputs supplied by the caller on every update.
///
/// Capacity is never stored in the bar itself; the owner derives it from
/// stake at the moment of regeneration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManabarParams {
    pub max_mana: i64,
    /// Seconds over which an empty bar refills completely.
    pub regen_time: u32,
}

/// A capped, linearly regenerating token bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manabar {
    pub current_mana: i64,
    /// Epoch seconds of the last regeneration.
    pub last_update_time: u32,
}

impl Manabar {
    /// Regenerate mana up to `now`.
    ///
    /// The cap is enforced on the high side only; a balance above the cap is
    /// never produced by regeneration, but a negative balance regenerates
    /// toward zero like any other.
    pub fn regenerate(&mut self, params: ManabarParams, now: u32) {
        let dt = now.saturating_sub(self.last_update_time);
        if dt > 0 && params.regen_time > 0 {
            let regen =
                i128::from(params.max_mana) * i128::from(dt) / i128::from(params.regen_time);
            let regen = regen.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64;
            self.current_mana = self.current_mana.saturating_add(regen).min(params.max_mana);
        }
        self.last_update_time = now;
    }

    pub fn has_mana(&self, cost: i64) -> bool {
        self.current_mana >= cost
    }

    /// Deduct `cost`. The balance may go negative; whether that is allowed
    /// is the caller's policy.
    pub fn use_mana(&mut self, cost: i64) {
        self.current_mana = self.current_mana.saturating_sub(cost);
    }
}
