// Licensed under the Apache-2.0 license

#![cfg_attr(target_os = "none", no_std)]

pub mod codec;
pub mod error;
pub mod fixed_point;
pub mod frame;
pub mod reading;

pub use codec::{decode, encode, FrameCodec};
pub use error::{CodecError, FrameLengthError};
pub use fixed_point::{FixedPoint, Quantizer, Signedness};
pub use frame::{SensorReadings, TelemetryFields, TelemetryFrame, TELEMETRY_FRAME_LEN};
pub use reading::Reading;
