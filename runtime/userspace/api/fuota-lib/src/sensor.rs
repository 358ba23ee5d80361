// Licensed under the Apache-2.0 license

extern crate alloc;
use alloc::boxed::Box;
use async_trait::async_trait;
use telemetry_common::SensorReadings;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    #[error("sensor not ready")]
    NotReady,
    #[error("sensor read failed ({0})")]
    Read(i32),
}

/// Trait for the environmental and motion sensors feeding the uplink.
#[async_trait(?Send)]
pub trait SensorSource {
    /// Whether every sensor came up at start-up.
    fn is_ready(&self) -> bool;

    /// Takes one sample of every channel.
    async fn acquire(&self) -> Result<SensorReadings, SensorError>;
}
