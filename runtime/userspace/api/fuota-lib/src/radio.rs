// Licensed under the Apache-2.0 license

extern crate alloc;
use alloc::boxed::Box;
use async_trait::async_trait;
use thiserror::Error;

use crate::config::JoinConfig;
use crate::events::EventChannel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Unconfirmed,
    Confirmed,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioError {
    #[error("radio device not ready")]
    NotReady,
    #[error("radio stack start failed ({0})")]
    Start(i32),
    #[error("network join failed ({0})")]
    Join(i32),
    #[error("uplink send failed ({0})")]
    Send(i32),
    #[error("uplink send timed out")]
    Timeout,
    #[error("payload exceeds the current datarate limit")]
    PayloadTooLarge,
    #[error("background service start failed ({0})")]
    ServiceStart(i32),
}

/// Trait for the LoRaWAN MAC stack.
///
/// Callbacks are not closures: the stack is handed the service's event
/// queue and posts into it through the helpers in `events`.
#[async_trait(?Send)]
pub trait LorawanStack {
    fn is_ready(&self) -> bool;

    async fn start(&self) -> Result<(), RadioError>;

    /// Posts `DownlinkReceived` for every downlink on any port.
    fn register_downlink_callback(&self, events: &'static EventChannel);

    /// Posts `DatarateChanged` whenever the network moves the datarate.
    fn register_datarate_callback(&self, events: &'static EventChannel);

    /// Over-the-air activation. Blocks until the join completes or fails.
    async fn join(&self, config: &JoinConfig) -> Result<(), RadioError>;

    fn enable_adaptive_rate(&self, enable: bool);

    async fn send(&self, port: u8, payload: &[u8], msg_type: MessageType)
        -> Result<(), RadioError>;

    /// Largest application payload at the current datarate.
    fn max_payload_size(&self) -> usize;
}

/// Trait for the firmware-delivery services that run on top of the MAC.
#[async_trait(?Send)]
pub trait FuotaTransport {
    /// Starts application-layer clock synchronization in the background.
    async fn run_clock_sync(&self) -> Result<(), RadioError>;

    /// Starts fragmented data transport in the background. The service
    /// posts `TransferFinished` once a complete image has been written to
    /// the secondary slot.
    async fn run_fragmented_transport(&self, events: &'static EventChannel)
        -> Result<(), RadioError>;
}
