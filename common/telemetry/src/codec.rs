// Licensed under the Apache-2.0 license

use crate::error::{CodecError, FrameLengthError};
use crate::frame::{SensorReadings, TelemetryFields, TelemetryFrame, TELEMETRY_FRAME_LEN};
use crate::reading::Reading;

/// A trait for encoding and decoding fixed-size uplink payloads.
///
/// Implementers write their wire form into a caller-provided buffer, so
/// encoding needs no allocation, and refuse to decode anything that is not
/// exactly one payload long.
pub trait FrameCodec: core::fmt::Debug + Sized {
    /// Encodes the payload into the start of `buffer`.
    ///
    /// # Returns
    ///
    /// The number of bytes written, or `CodecError::BufferTooShort`.
    fn encode(&self, buffer: &mut [u8]) -> Result<usize, CodecError>;

    /// Decodes a payload from `buffer`, which must hold exactly one payload.
    fn decode(buffer: &[u8]) -> Result<Self, CodecError>;
}

impl FrameCodec for TelemetryFrame {
    fn encode(&self, buffer: &mut [u8]) -> Result<usize, CodecError> {
        let actual = buffer.len();
        let dest = buffer
            .get_mut(..TELEMETRY_FRAME_LEN)
            .ok_or(CodecError::BufferTooShort {
                needed: TELEMETRY_FRAME_LEN,
                actual,
            })?;
        dest.copy_from_slice(&self.to_bytes());
        Ok(TELEMETRY_FRAME_LEN)
    }

    fn decode(buffer: &[u8]) -> Result<Self, CodecError> {
        Ok(TelemetryFrame::from_bytes(buffer)?)
    }
}

/// Scales, rounds (ties away from zero), saturates and packs six readings
/// into one big-endian frame.
pub fn encode(
    temperature_c: Reading,
    humidity_pct: Reading,
    pressure_hpa: Reading,
    accel_x: Reading,
    accel_y: Reading,
    accel_z: Reading,
) -> [u8; TELEMETRY_FRAME_LEN] {
    TelemetryFrame::from_readings(&SensorReadings {
        temperature_c,
        humidity_pct,
        pressure_hpa,
        accel_x,
        accel_y,
        accel_z,
    })
    .to_bytes()
}

/// Unpacks a received frame into its six fixed-point fields.
pub fn decode(frame: &[u8]) -> Result<TelemetryFields, FrameLengthError> {
    TelemetryFrame::from_bytes(frame).map(|frame| frame.fields())
}
