// Licensed under the Apache-2.0 license

use crate::config::{EVENT_QUEUE_DEPTH, MAX_DOWNLINK_PAYLOAD};
use arrayvec::ArrayVec;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use log::warn;

pub type DownlinkPayload = ArrayVec<u8, MAX_DOWNLINK_PAYLOAD>;

/// Notifications raised by the radio stack's background tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    JoinSucceeded,
    DownlinkReceived {
        port: u8,
        flags: u8,
        rssi: i16,
        snr: i8,
        payload: DownlinkPayload,
    },
    DatarateChanged {
        dr: u8,
    },
    TransferFinished,
}

/// Queue from radio callbacks into the service loop.
pub type EventChannel = Channel<CriticalSectionRawMutex, LifecycleEvent, EVENT_QUEUE_DEPTH>;

/// Queues an event without blocking; callbacks must not wait on the service.
/// Returns false if the queue was full and the event was dropped.
pub fn post(events: &EventChannel, event: LifecycleEvent) -> bool {
    match events.try_send(event) {
        Ok(()) => true,
        Err(TrySendError::Full(event)) => {
            warn!("Event queue full, dropping {:?}", event);
            false
        }
    }
}

/// Downlink callback body. Payloads longer than the largest downlink are
/// truncated.
pub fn on_downlink(events: &EventChannel, port: u8, flags: u8, rssi: i16, snr: i8, data: &[u8]) {
    let mut payload = DownlinkPayload::new();
    payload.extend(data.iter().copied().take(MAX_DOWNLINK_PAYLOAD));
    post(
        events,
        LifecycleEvent::DownlinkReceived {
            port,
            flags,
            rssi,
            snr,
            payload,
        },
    );
}

pub fn on_datarate_changed(events: &EventChannel, dr: u8) {
    post(events, LifecycleEvent::DatarateChanged { dr });
}

/// Transfer-finished callback body. This event must not be lost, so when
/// the queue is full the oldest pending event is discarded to make room.
pub fn on_transfer_finished(events: &EventChannel) {
    let mut event = LifecycleEvent::TransferFinished;
    for _ in 0..=EVENT_QUEUE_DEPTH {
        match events.try_send(event) {
            Ok(()) => return,
            Err(TrySendError::Full(rejected)) => {
                event = rejected;
                if let Ok(dropped) = events.try_receive() {
                    warn!("Event queue full, dropping {:?}", dropped);
                }
            }
        }
    }
    warn!("Could not queue transfer completion");
}
