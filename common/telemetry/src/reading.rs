// Licensed under the Apache-2.0 license

use crate::fixed_point::{div_round_half_away, saturate_i64};

/// Micro-units per unit.
pub const MICRO: i64 = 1_000_000;

// Largest left shift that keeps `i32 * MICRO << shift` inside an i128.
const MAX_Q31_LEFT_SHIFT: u32 = 75;
// Beyond this denominator exponent every Q31 value rounds to zero.
const MAX_Q31_DEN_EXP: u32 = 100;

/// A rational sensor reading held in integer micro-units.
///
/// Every constructor is integer-only, so readings can be produced on parts
/// without a floating-point unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reading(i64);

impl Reading {
    pub const ZERO: Reading = Reading(0);

    pub const fn from_micro(micro: i64) -> Self {
        Reading(micro)
    }

    pub const fn from_milli(milli: i64) -> Self {
        Reading(milli.saturating_mul(1_000))
    }

    /// Builds a reading from an integer part and a millionths part, the split
    /// used by driver-level sensor values. Both parts carry the sign of the
    /// value, so -0.5 is `(0, -500_000)`.
    pub const fn from_parts(val1: i32, val2: i32) -> Self {
        Reading(val1 as i64 * MICRO + val2 as i64)
    }

    /// Converts a Q31 sample with a power-of-two shift, where the represented
    /// value is `value * 2^shift / 2^31`. Rounds to the nearest micro-unit.
    pub fn from_q31(value: i32, shift: i8) -> Self {
        if value == 0 {
            return Reading::ZERO;
        }
        let num = value as i128 * MICRO as i128;
        let shift = shift as i32;
        let micro = if shift >= 0 {
            let shift = shift as u32;
            if shift > MAX_Q31_LEFT_SHIFT {
                if value > 0 {
                    i128::MAX
                } else {
                    i128::MIN
                }
            } else {
                div_round_half_away(num << shift, 1i128 << 31)
            }
        } else {
            let den_exp = 31 + shift.unsigned_abs();
            if den_exp > MAX_Q31_DEN_EXP {
                0
            } else {
                div_round_half_away(num, 1i128 << den_exp)
            }
        };
        Reading(saturate_i64(micro))
    }

    pub const fn micro(self) -> i64 {
        self.0
    }

    /// Splits back into the `(val1, val2)` representation, saturating the
    /// integer part to the i32 range.
    pub fn parts(self) -> (i32, i32) {
        let val1 = (self.0 / MICRO).clamp(i32::MIN as i64, i32::MAX as i64) as i32;
        let val2 = (self.0 % MICRO) as i32;
        (val1, val2)
    }
}

impl From<i32> for Reading {
    fn from(units: i32) -> Self {
        Reading(units as i64 * MICRO)
    }
}
