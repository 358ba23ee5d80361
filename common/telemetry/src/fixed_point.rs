// Licensed under the Apache-2.0 license

use core::fmt;

use crate::reading::{Reading, MICRO};

/// Integer division rounding to nearest, ties away from zero. `den` must be positive.
pub(crate) fn div_round_half_away(num: i128, den: i128) -> i128 {
    let quotient = num / den;
    let remainder = num % den;
    if remainder.abs() * 2 >= den {
        quotient + num.signum()
    } else {
        quotient
    }
}

pub(crate) fn saturate_i64(value: i128) -> i64 {
    value.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signedness {
    Signed,
    Unsigned,
}

/// Maps a reading onto a 16-bit field as `round(value * scale)`, saturating
/// at the field limits instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantizer {
    pub scale: u32,
    pub signedness: Signedness,
}

impl Quantizer {
    pub const fn signed(scale: u32) -> Self {
        Self {
            scale,
            signedness: Signedness::Signed,
        }
    }

    pub const fn unsigned(scale: u32) -> Self {
        Self {
            scale,
            signedness: Signedness::Unsigned,
        }
    }

    pub const fn min(&self) -> i32 {
        match self.signedness {
            Signedness::Signed => i16::MIN as i32,
            Signedness::Unsigned => u16::MIN as i32,
        }
    }

    pub const fn max(&self) -> i32 {
        match self.signedness {
            Signedness::Signed => i16::MAX as i32,
            Signedness::Unsigned => u16::MAX as i32,
        }
    }

    pub fn quantize(&self, reading: Reading) -> i32 {
        let scaled = div_round_half_away(
            reading.micro() as i128 * self.scale as i128,
            MICRO as i128,
        );
        scaled.clamp(self.min() as i128, self.max() as i128) as i32
    }

    /// True when `raw` sits on a field limit. A value exactly at the limit
    /// is indistinguishable from a clamped one, so both count.
    pub fn is_saturated(&self, raw: i32) -> bool {
        // Zero is a legitimate unsigned reading, so only signed fields saturate low.
        raw >= self.max() || (self.signedness == Signedness::Signed && raw <= self.min())
    }

    pub fn fixed_point(&self, raw: i32) -> FixedPoint {
        FixedPoint {
            raw,
            scale: self.scale,
        }
    }
}

/// A decoded field: the represented value is `raw / scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPoint {
    pub raw: i32,
    pub scale: u32,
}

impl FixedPoint {
    pub fn to_reading(self) -> Reading {
        Reading::from_micro(saturate_i64(div_round_half_away(
            self.raw as i128 * MICRO as i128,
            self.scale.max(1) as i128,
        )))
    }

    /// Number of decimal places when the scale is a power of ten.
    fn decimal_places(self) -> Option<usize> {
        let mut scale = self.scale;
        let mut places = 0;
        while scale > 1 && scale % 10 == 0 {
            scale /= 10;
            places += 1;
        }
        (scale == 1).then_some(places)
    }
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.decimal_places() {
            Some(0) => write!(f, "{}", self.raw),
            Some(places) => {
                let sign = if self.raw < 0 { "-" } else { "" };
                let magnitude = self.raw.unsigned_abs();
                write!(
                    f,
                    "{}{}.{:0width$}",
                    sign,
                    magnitude / self.scale,
                    magnitude % self.scale,
                    width = places
                )
            }
            None => write!(f, "{}/{}", self.raw, self.scale),
        }
    }
}
