// Licensed under the Apache-2.0 license

//! Receive-side decoding of telemetry uplinks as delivered by a network
//! server: hex text, one frame per line.

use std::fmt;
use std::path::Path;

use anyhow::{bail, Context};
use log::debug;
use serde::{Deserialize, Serialize};
use telemetry_common::frame::{ACCELERATION, HUMIDITY, PRESSURE, TEMPERATURE};
use telemetry_common::{decode, FixedPoint, FrameLengthError, Quantizer};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedField {
    pub raw: i32,
    pub scale: u32,
    /// Exact decimal rendering of `raw / scale`.
    pub value: String,
    /// The raw value sits on the field limit, so the reading may have been clamped.
    pub saturated: bool,
}

impl DecodedField {
    fn new(field: FixedPoint, quantizer: Quantizer) -> Self {
        Self {
            raw: field.raw,
            scale: field.scale,
            value: field.to_string(),
            saturated: quantizer.is_saturated(field.raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedFrame {
    pub temperature_c: DecodedField,
    pub humidity_pct: DecodedField,
    pub pressure_hpa: DecodedField,
    pub accel_x: DecodedField,
    pub accel_y: DecodedField,
    pub accel_z: DecodedField,
}

impl fmt::Display for DecodedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = |field: &DecodedField| if field.saturated { "!" } else { "" };
        write!(
            f,
            "temp {}{} C, humidity {}{} %, pressure {}{} hPa, accel ({}{}, {}{}, {}{}) m/s2",
            self.temperature_c.value,
            mark(&self.temperature_c),
            self.humidity_pct.value,
            mark(&self.humidity_pct),
            self.pressure_hpa.value,
            mark(&self.pressure_hpa),
            self.accel_x.value,
            mark(&self.accel_x),
            self.accel_y.value,
            mark(&self.accel_y),
            self.accel_z.value,
            mark(&self.accel_z),
        )
    }
}

pub fn decode_frame(bytes: &[u8]) -> Result<DecodedFrame, FrameLengthError> {
    let fields = decode(bytes)?;
    Ok(DecodedFrame {
        temperature_c: DecodedField::new(fields.temperature, TEMPERATURE),
        humidity_pct: DecodedField::new(fields.humidity, HUMIDITY),
        pressure_hpa: DecodedField::new(fields.pressure, PRESSURE),
        accel_x: DecodedField::new(fields.accel_x, ACCELERATION),
        accel_y: DecodedField::new(fields.accel_y, ACCELERATION),
        accel_z: DecodedField::new(fields.accel_z, ACCELERATION),
    })
}

/// Parses hex text, ignoring whitespace, `:` separators and a `0x` prefix.
pub fn parse_hex_frame(text: &str) -> anyhow::Result<Vec<u8>> {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let digits: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex::decode(&digits).with_context(|| format!("invalid hex frame {:?}", text))
}

pub fn decode_hex(text: &str) -> anyhow::Result<DecodedFrame> {
    let bytes = parse_hex_frame(text)?;
    Ok(decode_frame(&bytes)?)
}

/// Decodes one frame per non-empty line. Lines starting with `#` are skipped.
pub fn decode_lines(text: &str) -> anyhow::Result<Vec<DecodedFrame>> {
    let mut frames = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let frame = decode_hex(line).with_context(|| format!("line {}", index + 1))?;
        debug!("line {}: {}", index + 1, frame);
        frames.push(frame);
    }
    if frames.is_empty() {
        bail!("no frames found");
    }
    Ok(frames)
}

pub fn decode_file(path: &Path) -> anyhow::Result<Vec<DecodedFrame>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    decode_lines(&text).with_context(|| format!("in {}", path.display()))
}
