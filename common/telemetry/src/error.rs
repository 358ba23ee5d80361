// Licensed under the Apache-2.0 license

use thiserror::Error;

/// Raised when a received telemetry buffer is not exactly one frame long.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("telemetry frame must be 12 bytes, got {actual}")]
pub struct FrameLengthError {
    pub actual: usize,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    #[error("buffer too short: need {needed} bytes, have {actual}")]
    BufferTooShort { needed: usize, actual: usize },
    #[error(transparent)]
    FrameLength(#[from] FrameLengthError),
}
