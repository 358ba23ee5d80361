// Licensed under the Apache-2.0 license

use zerocopy::byteorder::{BigEndian, I16, U16};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::error::FrameLengthError;
use crate::fixed_point::{FixedPoint, Quantizer};
use crate::reading::Reading;

pub const TELEMETRY_FRAME_LEN: usize = 12;

/// Degrees Celsius, two decimals.
pub const TEMPERATURE: Quantizer = Quantizer::signed(100);
/// Relative humidity in percent, two decimals.
pub const HUMIDITY: Quantizer = Quantizer::unsigned(100);
/// Barometric pressure in hPa, one decimal.
pub const PRESSURE: Quantizer = Quantizer::unsigned(10);
/// Acceleration in m/s², three decimals, per axis.
pub const ACCELERATION: Quantizer = Quantizer::signed(1000);

/// The latest value of every channel that goes into one uplink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorReadings {
    pub temperature_c: Reading,
    pub humidity_pct: Reading,
    pub pressure_hpa: Reading,
    pub accel_x: Reading,
    pub accel_y: Reading,
    pub accel_z: Reading,
}

/// Uplink payload: six big-endian 16-bit fixed-point fields.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct TelemetryFrame {
    pub temperature: I16<BigEndian>,
    pub humidity: U16<BigEndian>,
    pub pressure: U16<BigEndian>,
    pub accel_x: I16<BigEndian>,
    pub accel_y: I16<BigEndian>,
    pub accel_z: I16<BigEndian>,
}

// The quantizers clamp to the field range, so the narrowing casts below are lossless.
impl TelemetryFrame {
    pub fn from_readings(readings: &SensorReadings) -> Self {
        Self {
            temperature: I16::new(TEMPERATURE.quantize(readings.temperature_c) as i16),
            humidity: U16::new(HUMIDITY.quantize(readings.humidity_pct) as u16),
            pressure: U16::new(PRESSURE.quantize(readings.pressure_hpa) as u16),
            accel_x: I16::new(ACCELERATION.quantize(readings.accel_x) as i16),
            accel_y: I16::new(ACCELERATION.quantize(readings.accel_y) as i16),
            accel_z: I16::new(ACCELERATION.quantize(readings.accel_z) as i16),
        }
    }

    pub fn to_bytes(&self) -> [u8; TELEMETRY_FRAME_LEN] {
        let mut bytes = [0u8; TELEMETRY_FRAME_LEN];
        bytes.copy_from_slice(self.as_bytes());
        bytes
    }

    /// Parses a frame; anything other than exactly 12 bytes is refused.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FrameLengthError> {
        Self::read_from_bytes(bytes).map_err(|_| FrameLengthError {
            actual: bytes.len(),
        })
    }

    pub fn fields(&self) -> TelemetryFields {
        TelemetryFields {
            temperature: TEMPERATURE.fixed_point(self.temperature.get() as i32),
            humidity: HUMIDITY.fixed_point(self.humidity.get() as i32),
            pressure: PRESSURE.fixed_point(self.pressure.get() as i32),
            accel_x: ACCELERATION.fixed_point(self.accel_x.get() as i32),
            accel_y: ACCELERATION.fixed_point(self.accel_y.get() as i32),
            accel_z: ACCELERATION.fixed_point(self.accel_z.get() as i32),
        }
    }
}

/// Decoded frame contents as `(raw, scale)` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryFields {
    pub temperature: FixedPoint,
    pub humidity: FixedPoint,
    pub pressure: FixedPoint,
    pub accel_x: FixedPoint,
    pub accel_y: FixedPoint,
    pub accel_z: FixedPoint,
}

impl TelemetryFields {
    /// Fields in wire order.
    pub fn as_array(&self) -> [FixedPoint; 6] {
        [
            self.temperature,
            self.humidity,
            self.pressure,
            self.accel_x,
            self.accel_y,
            self.accel_z,
        ]
    }

    pub fn to_readings(&self) -> SensorReadings {
        SensorReadings {
            temperature_c: self.temperature.to_reading(),
            humidity_pct: self.humidity.to_reading(),
            pressure_hpa: self.pressure.to_reading(),
            accel_x: self.accel_x.to_reading(),
            accel_y: self.accel_y.to_reading(),
            accel_z: self.accel_z.to_reading(),
        }
    }
}
