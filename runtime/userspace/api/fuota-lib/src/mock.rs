// Licensed under the Apache-2.0 license

//! Host-side stand-ins for the device collaborators.

extern crate alloc;
use alloc::boxed::Box;
use alloc::vec::Vec;
use async_trait::async_trait;
use core::cell::{Cell, RefCell};
use core::convert::Infallible;

use crate::config::JoinConfig;
use crate::events::{self, EventChannel, LifecycleEvent};
use crate::flash::{FlashArea, FlashError, FlashMap};
use crate::radio::{FuotaTransport, LorawanStack, MessageType, RadioError};
use crate::sensor::{SensorError, SensorSource};
use crate::timer::{AsyncDelay, Milliseconds};
use fuota_config::boot::{BootPlatform, BootPlatformError, RebootKind, UpgradeMode};
use fuota_config::RegionId;
use telemetry_common::SensorReadings;

const ERASED: u8 = 0xFF;

struct MockRegion {
    area: FlashArea,
    data: Vec<u8>,
    read_error: Option<FlashError>,
}

/// Flash map backed by memory. Bytes past the supplied contents read as erased.
#[derive(Default)]
pub struct MockFlash {
    regions: RefCell<Vec<MockRegion>>,
    open_handles: Cell<i32>,
}

impl MockFlash {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_region(&self, id: RegionId, offset: u32, size: u32, contents: &[u8]) {
        self.regions.borrow_mut().push(MockRegion {
            area: FlashArea { id, offset, size },
            data: contents.to_vec(),
            read_error: None,
        });
    }

    pub fn fail_reads(&self, id: RegionId, error: FlashError) {
        for region in self.regions.borrow_mut().iter_mut() {
            if region.area.id == id {
                region.read_error = Some(error);
            }
        }
    }

    /// Regions opened and not yet closed.
    pub fn open_handles(&self) -> i32 {
        self.open_handles.get()
    }
}

#[async_trait(?Send)]
impl FlashMap for MockFlash {
    async fn open(&self, id: RegionId) -> Result<FlashArea, FlashError> {
        let regions = self.regions.borrow();
        let region = regions
            .iter()
            .find(|region| region.area.id == id)
            .ok_or(FlashError::NotFound)?;
        self.open_handles.set(self.open_handles.get() + 1);
        Ok(region.area)
    }

    async fn read(
        &self,
        area: &FlashArea,
        offset: u32,
        buf: &mut [u8],
    ) -> Result<(), FlashError> {
        let regions = self.regions.borrow();
        let region = regions
            .iter()
            .find(|region| region.area.id == area.id)
            .ok_or(FlashError::NotFound)?;
        if let Some(error) = region.read_error {
            return Err(error);
        }
        let start = offset as usize;
        let end = start + buf.len();
        if end > region.area.size as usize {
            return Err(FlashError::Io(-22));
        }
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte = region.data.get(start + i).copied().unwrap_or(ERASED);
        }
        Ok(())
    }

    fn close(&self, _area: &FlashArea) {
        self.open_handles.set(self.open_handles.get() - 1);
    }
}

/// Boot state store that records every request. `reboot` always returns,
/// since a host process cannot be restarted.
pub struct MockBootPlatform {
    confirmed: Cell<bool>,
    confirm_writes: Cell<u32>,
    confirm_error: Cell<Option<BootPlatformError>>,
    persist_confirm: Cell<bool>,
    upgrade_error: Cell<Option<BootPlatformError>>,
    upgrade_requests: RefCell<Vec<UpgradeMode>>,
    reboots: RefCell<Vec<RebootKind>>,
}

impl MockBootPlatform {
    pub fn new(confirmed: bool) -> Self {
        Self {
            confirmed: Cell::new(confirmed),
            confirm_writes: Cell::new(0),
            confirm_error: Cell::new(None),
            persist_confirm: Cell::new(true),
            upgrade_error: Cell::new(None),
            upgrade_requests: RefCell::new(Vec::new()),
            reboots: RefCell::new(Vec::new()),
        }
    }

    pub fn fail_confirm(&self, error: Option<BootPlatformError>) {
        self.confirm_error.set(error);
    }

    /// Accept confirm writes without persisting them.
    pub fn drop_confirm_writes(&self) {
        self.persist_confirm.set(false);
    }

    pub fn fail_upgrade(&self, error: Option<BootPlatformError>) {
        self.upgrade_error.set(error);
    }

    pub fn confirm_writes(&self) -> u32 {
        self.confirm_writes.get()
    }

    pub fn upgrade_requests(&self) -> Vec<UpgradeMode> {
        self.upgrade_requests.borrow().clone()
    }

    pub fn reboots(&self) -> Vec<RebootKind> {
        self.reboots.borrow().clone()
    }
}

impl BootPlatform for MockBootPlatform {
    async fn is_image_confirmed(&self) -> bool {
        self.confirmed.get()
    }

    async fn write_image_confirmed(&self) -> Result<(), BootPlatformError> {
        self.confirm_writes.set(self.confirm_writes.get() + 1);
        if let Some(error) = self.confirm_error.get() {
            return Err(error);
        }
        if self.persist_confirm.get() {
            self.confirmed.set(true);
        }
        Ok(())
    }

    async fn request_upgrade(&self, mode: UpgradeMode) -> Result<(), BootPlatformError> {
        self.upgrade_requests.borrow_mut().push(mode);
        match self.upgrade_error.get() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn reboot(&self, kind: RebootKind) -> Result<Infallible, BootPlatformError> {
        self.reboots.borrow_mut().push(kind);
        Err(BootPlatformError::RebootFailed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentUplink {
    pub port: u8,
    pub payload: Vec<u8>,
    pub msg_type: MessageType,
}

/// LoRaWAN stack double. Downlinks and datarate changes are injected by
/// the test and travel through the registered event queue.
pub struct MockRadio {
    ready: Cell<bool>,
    start_error: Cell<Option<RadioError>>,
    join_error: Cell<Option<RadioError>>,
    joined: Cell<bool>,
    adaptive_rate: Cell<bool>,
    max_payload: Cell<usize>,
    failing_sends: Cell<u32>,
    hang_sends: Cell<bool>,
    sent: RefCell<Vec<SentUplink>>,
    downlink_events: Cell<Option<&'static EventChannel>>,
    datarate_events: Cell<Option<&'static EventChannel>>,
}

impl MockRadio {
    pub fn new() -> Self {
        Self {
            ready: Cell::new(true),
            start_error: Cell::new(None),
            join_error: Cell::new(None),
            joined: Cell::new(false),
            adaptive_rate: Cell::new(false),
            max_payload: Cell::new(51),
            failing_sends: Cell::new(0),
            hang_sends: Cell::new(false),
            sent: RefCell::new(Vec::new()),
            downlink_events: Cell::new(None),
            datarate_events: Cell::new(None),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.set(ready);
    }

    pub fn fail_start(&self, error: Option<RadioError>) {
        self.start_error.set(error);
    }

    pub fn fail_join(&self, error: Option<RadioError>) {
        self.join_error.set(error);
    }

    /// Fails the next `count` sends with `RadioError::Send`.
    pub fn fail_sends(&self, count: u32) {
        self.failing_sends.set(count);
    }

    /// Sends never complete.
    pub fn hang_sends(&self, hang: bool) {
        self.hang_sends.set(hang);
    }

    pub fn is_joined(&self) -> bool {
        self.joined.get()
    }

    pub fn adaptive_rate(&self) -> bool {
        self.adaptive_rate.get()
    }

    pub fn callbacks_registered(&self) -> bool {
        self.downlink_events.get().is_some() && self.datarate_events.get().is_some()
    }

    pub fn sent(&self) -> Vec<SentUplink> {
        self.sent.borrow().clone()
    }

    pub fn deliver_downlink(&self, port: u8, rssi: i16, snr: i8, data: &[u8]) {
        if let Some(queue) = self.downlink_events.get() {
            events::on_downlink(queue, port, 0, rssi, snr, data);
        }
    }

    pub fn change_datarate(&self, dr: u8, max_payload: usize) {
        self.max_payload.set(max_payload);
        if let Some(queue) = self.datarate_events.get() {
            events::on_datarate_changed(queue, dr);
        }
    }
}

impl Default for MockRadio {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl LorawanStack for MockRadio {
    fn is_ready(&self) -> bool {
        self.ready.get()
    }

    async fn start(&self) -> Result<(), RadioError> {
        match self.start_error.get() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn register_downlink_callback(&self, events: &'static EventChannel) {
        self.downlink_events.set(Some(events));
    }

    fn register_datarate_callback(&self, events: &'static EventChannel) {
        self.datarate_events.set(Some(events));
    }

    async fn join(&self, _config: &JoinConfig) -> Result<(), RadioError> {
        if let Some(error) = self.join_error.get() {
            return Err(error);
        }
        self.joined.set(true);
        if let Some(queue) = self.downlink_events.get() {
            events::post(queue, LifecycleEvent::JoinSucceeded);
        }
        Ok(())
    }

    fn enable_adaptive_rate(&self, enable: bool) {
        self.adaptive_rate.set(enable);
    }

    async fn send(
        &self,
        port: u8,
        payload: &[u8],
        msg_type: MessageType,
    ) -> Result<(), RadioError> {
        if self.hang_sends.get() {
            futures::future::pending::<()>().await;
        }
        let failing = self.failing_sends.get();
        if failing > 0 {
            self.failing_sends.set(failing - 1);
            return Err(RadioError::Send(-116));
        }
        self.sent.borrow_mut().push(SentUplink {
            port,
            payload: payload.to_vec(),
            msg_type,
        });
        Ok(())
    }

    fn max_payload_size(&self) -> usize {
        self.max_payload.get()
    }
}

#[derive(Default)]
pub struct MockTransport {
    clock_sync_running: Cell<bool>,
    clock_sync_error: Cell<Option<RadioError>>,
    transport_error: Cell<Option<RadioError>>,
    events: Cell<Option<&'static EventChannel>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_clock_sync(&self, error: Option<RadioError>) {
        self.clock_sync_error.set(error);
    }

    pub fn fail_transport(&self, error: Option<RadioError>) {
        self.transport_error.set(error);
    }

    pub fn clock_sync_running(&self) -> bool {
        self.clock_sync_running.get()
    }

    pub fn transport_running(&self) -> bool {
        self.events.get().is_some()
    }

    /// Completes a firmware transfer.
    pub fn finish_transfer(&self) {
        if let Some(queue) = self.events.get() {
            events::on_transfer_finished(queue);
        }
    }
}

#[async_trait(?Send)]
impl FuotaTransport for MockTransport {
    async fn run_clock_sync(&self) -> Result<(), RadioError> {
        if let Some(error) = self.clock_sync_error.get() {
            return Err(error);
        }
        self.clock_sync_running.set(true);
        Ok(())
    }

    async fn run_fragmented_transport(
        &self,
        events: &'static EventChannel,
    ) -> Result<(), RadioError> {
        if let Some(error) = self.transport_error.get() {
            return Err(error);
        }
        self.events.set(Some(events));
        Ok(())
    }
}

pub struct MockSensors {
    ready: bool,
    readings: Cell<Result<SensorReadings, SensorError>>,
    acquisitions: Cell<u32>,
}

impl MockSensors {
    pub fn new(readings: SensorReadings) -> Self {
        Self {
            ready: true,
            readings: Cell::new(Ok(readings)),
            acquisitions: Cell::new(0),
        }
    }

    /// Sensors that failed to come up at start-up.
    pub fn absent() -> Self {
        Self {
            ready: false,
            readings: Cell::new(Err(SensorError::NotReady)),
            acquisitions: Cell::new(0),
        }
    }

    pub fn set_readings(&self, readings: Result<SensorReadings, SensorError>) {
        self.readings.set(readings);
    }

    pub fn acquisitions(&self) -> u32 {
        self.acquisitions.get()
    }
}

#[async_trait(?Send)]
impl SensorSource for MockSensors {
    fn is_ready(&self) -> bool {
        self.ready
    }

    async fn acquire(&self) -> Result<SensorReadings, SensorError> {
        self.acquisitions.set(self.acquisitions.get() + 1);
        self.readings.get()
    }
}

/// Delay that completes immediately and records what was asked for.
#[derive(Default)]
pub struct MockDelay {
    sleeps: RefCell<Vec<Milliseconds>>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Milliseconds> {
        self.sleeps.borrow().clone()
    }
}

#[async_trait(?Send)]
impl AsyncDelay for MockDelay {
    async fn sleep(&self, time: Milliseconds) {
        self.sleeps.borrow_mut().push(time);
    }
}
