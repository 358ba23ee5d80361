// Licensed under the Apache-2.0 license

use core::convert::Infallible;
use core::future::Future;
use core::pin::pin;

use crate::boot_ctrl::BootConfirmationController;
use crate::config::{FuotaConfig, FALLBACK_PAYLOAD};
use crate::error::FuotaError;
use crate::events::{EventChannel, LifecycleEvent};
use crate::flash::FlashMap;
use crate::radio::{FuotaTransport, LorawanStack, RadioError};
use crate::sensor::SensorSource;
use crate::slot::{ImageSlotInspector, SlotReport};
use crate::swap::SwapMechanismDetector;
use crate::timer::{AsyncDelay, Milliseconds};
use fuota_config::boot::{BootConfirmationState, BootPlatform};
use futures::future::{select, Either};
use log::{debug, error, info, warn};
use telemetry_common::{TelemetryFrame, TELEMETRY_FRAME_LEN};

/// Device handles the service runs on, constructed by the platform.
pub struct FuotaDevices<'a, B: BootPlatform> {
    pub flash: &'a dyn FlashMap,
    pub radio: &'a dyn LorawanStack,
    pub transport: &'a dyn FuotaTransport,
    pub sensors: &'a dyn SensorSource,
    pub delay: &'a dyn AsyncDelay,
    pub boot: &'a B,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FuotaStats {
    pub uplinks_sent: u32,
    pub uplinks_failed: u32,
    /// Failed uplinks since the last success. Sends are retried every
    /// interval without backoff, so this is the only record of an outage.
    pub consecutive_failures: u32,
    pub cycles_skipped: u32,
    pub downlinks_received: u32,
    pub datarate_changes: u32,
}

/// Firmware update service.
///
/// Joins the network, hands the fragmented transport its completion event,
/// and keeps sending telemetry so the network has class A receive windows
/// to set the update session up in. Radio callbacks reach the service
/// through `events` and are handled whenever the loop is waiting.
pub struct FuotaService<'a, B: BootPlatform> {
    config: FuotaConfig,
    flash: &'a dyn FlashMap,
    radio: &'a dyn LorawanStack,
    transport: &'a dyn FuotaTransport,
    sensors: &'a dyn SensorSource,
    delay: &'a dyn AsyncDelay,
    boot: BootConfirmationController<'a, B>,
    events: &'static EventChannel,
    sensors_available: bool,
    max_payload: usize,
    stats: FuotaStats,
}

impl<'a, B: BootPlatform> FuotaService<'a, B> {
    pub fn new(
        config: FuotaConfig,
        devices: FuotaDevices<'a, B>,
        events: &'static EventChannel,
    ) -> Self {
        let boot = BootConfirmationController::new(devices.boot, devices.delay, &config.timing);
        let max_payload = devices.radio.max_payload_size();
        Self {
            config,
            flash: devices.flash,
            radio: devices.radio,
            transport: devices.transport,
            sensors: devices.sensors,
            delay: devices.delay,
            boot,
            events,
            sensors_available: false,
            max_payload,
            stats: FuotaStats::default(),
        }
    }

    pub fn stats(&self) -> FuotaStats {
        self.stats
    }

    pub fn boot_controller(&self) -> &BootConfirmationController<'a, B> {
        &self.boot
    }

    /// Logs the flash inventory and both image slots, and classifies them.
    /// Unreadable slots are reported as unknown.
    pub async fn report_slots(&self) -> SlotReport {
        let layout = &self.config.layout;
        let inspector = ImageSlotInspector::new(self.flash);

        for area in inspector.inventory(layout.inventory_ids.clone()).await {
            info!(
                "Flash area {}: size={} bytes, offset=0x{:x}",
                area.id, area.size, area.offset
            );
        }

        let primary = match inspector.inspect(layout.primary_slot).await {
            Ok(slot) => Some(slot),
            Err(e) => {
                warn!("Primary slot: {}", e);
                None
            }
        };
        let secondary = match inspector.inspect(layout.secondary_slot).await {
            Ok(slot) => Some(slot),
            Err(e) => {
                warn!("Secondary slot: {}", e);
                None
            }
        };
        if let Some(slot) = primary.filter(|slot| slot.has_valid_image) {
            match inspector.read_header(slot.region_id).await {
                Ok(header) => info!(
                    "Primary image {} ({} bytes)",
                    header.version,
                    header.img_size.get()
                ),
                Err(e) => debug!("Primary header: {}", e),
            }
        }

        let swap = SwapMechanismDetector::new(self.flash)
            .detect(
                layout.scratch_candidates,
                layout.primary_slot,
                layout.secondary_slot,
            )
            .await;
        let report = SlotReport {
            primary,
            secondary,
            confirmation: self.boot.current_state().await,
            swap,
        };
        info!(
            "Slots: primary={:?} secondary={:?} {:?} swap={:?} -> {:?}",
            primary.map(|slot| slot.has_valid_image),
            secondary.map(|slot| slot.has_valid_image),
            report.confirmation,
            report.swap,
            report.readiness()
        );
        report
    }

    /// Brings the radio up, joins, confirms the running image and starts the
    /// update services. Any error here is fatal.
    pub async fn start(&mut self) -> Result<(), FuotaError> {
        self.sensors_available = self.sensors.is_ready();
        if !self.sensors_available {
            error!("Sensors not available, sending fallback uplinks");
        }

        if !self.radio.is_ready() {
            error!("Radio device not ready");
            return Err(RadioError::NotReady.into());
        }
        self.radio.start().await?;
        self.radio.register_downlink_callback(self.events);
        self.radio.register_datarate_callback(self.events);

        info!("Joining network over OTAA");
        self.radio.join(&self.config.join).await.map_err(|e| {
            error!("Join failed: {}", e);
            e
        })?;

        // A join is the self-test for a freshly swapped image.
        if self.boot.current_state().await == BootConfirmationState::Tentative {
            info!("Running a test image, confirming");
        }
        self.boot.confirm_permanent().await?;

        self.radio.enable_adaptive_rate(true);
        self.max_payload = self.radio.max_payload_size();

        if let Err(e) = self.transport.run_clock_sync().await {
            warn!("Clock sync not started: {}", e);
        }
        self.transport.run_fragmented_transport(self.events).await?;
        info!("FUOTA services started");
        Ok(())
    }

    /// Starts the service and runs the uplink loop. Only returns on a fatal error.
    pub async fn run(&mut self) -> Result<Infallible, FuotaError> {
        self.start().await?;
        loop {
            self.run_cycle().await?;
        }
    }

    /// One uplink followed by the inter-cycle sleep. Send failures are
    /// counted and retried next cycle.
    pub async fn run_cycle(&mut self) -> Result<(), FuotaError> {
        let frame: [u8; TELEMETRY_FRAME_LEN];
        let payload: &[u8] = if self.sensors_available {
            let sensors = self.sensors;
            match self.drive(sensors.acquire()).await? {
                Ok(readings) => {
                    debug!("Readings: {:?}", readings);
                    frame = TelemetryFrame::from_readings(&readings).to_bytes();
                    &frame
                }
                Err(e) => {
                    error!("Sensor read failed: {}", e);
                    self.stats.cycles_skipped = self.stats.cycles_skipped.saturating_add(1);
                    return self.sleep_interval().await;
                }
            }
        } else {
            FALLBACK_PAYLOAD
        };

        match self.send_uplink(payload).await? {
            Ok(()) => {
                info!("Uplink sent ({} bytes)", payload.len());
                self.stats.uplinks_sent = self.stats.uplinks_sent.saturating_add(1);
                self.stats.consecutive_failures = 0;
            }
            Err(e) => {
                self.stats.uplinks_failed = self.stats.uplinks_failed.saturating_add(1);
                self.stats.consecutive_failures =
                    self.stats.consecutive_failures.saturating_add(1);
                error!(
                    "Uplink failed: {} ({} in a row)",
                    e, self.stats.consecutive_failures
                );
            }
        }

        self.sleep_interval().await
    }

    /// Applies the side effects of one lifecycle event. Returns only an
    /// error for `TransferFinished`, whose success path restarts the device.
    pub async fn handle_event(&mut self, event: LifecycleEvent) -> Result<(), FuotaError> {
        match event {
            LifecycleEvent::JoinSucceeded => info!("Joined network"),
            LifecycleEvent::DownlinkReceived {
                port,
                flags,
                rssi,
                snr,
                payload,
            } => {
                self.stats.downlinks_received = self.stats.downlinks_received.saturating_add(1);
                info!(
                    "Received from port {}, flags {}, RSSI {}dB, SNR {}dBm",
                    port, flags, rssi, snr
                );
                if !payload.is_empty() {
                    debug!("Payload: {:02x?}", payload.as_slice());
                }
            }
            LifecycleEvent::DatarateChanged { dr } => {
                self.stats.datarate_changes = self.stats.datarate_changes.saturating_add(1);
                self.max_payload = self.radio.max_payload_size();
                info!("New datarate: DR {}, max payload {}", dr, self.max_payload);
            }
            LifecycleEvent::TransferFinished => {
                info!("FUOTA finished, rebooting to apply the upgrade");
                match self.boot.request_upgrade_and_reboot().await {
                    Ok(never) => match never {},
                    Err(e) => {
                        error!("Upgrade failed: {}", e);
                        return Err(e.into());
                    }
                }
            }
        }
        Ok(())
    }

    async fn send_uplink(&mut self, payload: &[u8]) -> Result<Result<(), RadioError>, FuotaError> {
        if payload.len() > self.max_payload {
            warn!(
                "Payload of {} bytes exceeds datarate limit of {}",
                payload.len(),
                self.max_payload
            );
            return Ok(Err(RadioError::PayloadTooLarge));
        }

        let (radio, delay) = (self.radio, self.delay);
        let send = radio.send(self.config.port, payload, self.config.msg_type);
        let timeout = delay.sleep(Milliseconds(self.config.timing.send_timeout_ms));
        match self.drive(select(send, timeout)).await? {
            Either::Left((result, _)) => Ok(result),
            Either::Right(_) => Ok(Err(RadioError::Timeout)),
        }
    }

    async fn sleep_interval(&mut self) -> Result<(), FuotaError> {
        let delay = self.delay;
        let sleep = delay.sleep(Milliseconds(self.config.timing.uplink_interval_ms));
        self.drive(sleep).await
    }

    /// Runs `fut` to completion, servicing queued events while it is pending.
    /// Events already queued are handled first.
    async fn drive<F: Future>(&mut self, fut: F) -> Result<F::Output, FuotaError> {
        let events = self.events;
        let mut fut = pin!(fut);
        loop {
            let event = pin!(events.receive());
            match select(event, fut.as_mut()).await {
                Either::Left((event, _)) => self.handle_event(event).await?,
                Either::Right((output, _)) => return Ok(output),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::boot_ctrl::BootError;
    use crate::config::JoinConfig;
    use crate::events;
    use crate::mock::*;
    use crate::radio::MessageType;
    use crate::sensor::SensorError;
    use crate::slot::UpgradeReadiness;
    use crate::swap::SwapMechanism;
    use fuota_config::boot::{BootPlatformError, RebootKind, UpgradeMode};
    use futures::executor::block_on;
    use log::LevelFilter;
    use simple_logger::SimpleLogger;
    use slot_image::IMAGE_MAGIC_BYTES;
    use telemetry_common::{Reading, SensorReadings};

    fn init_logger() {
        let _ = SimpleLogger::new().with_level(LevelFilter::Debug).init();
    }

    fn readings() -> SensorReadings {
        SensorReadings {
            temperature_c: Reading::from_parts(24, 430_000),
            humidity_pct: Reading::from_parts(38, 680_000),
            pressure_hpa: Reading::from_parts(1014, 200_000),
            accel_x: Reading::from_parts(0, 10_000),
            accel_y: Reading::from_parts(0, -5_000),
            accel_z: Reading::from_parts(9, 810_000),
        }
    }

    struct Fixture {
        flash: MockFlash,
        radio: MockRadio,
        transport: MockTransport,
        sensors: MockSensors,
        delay: MockDelay,
        boot: MockBootPlatform,
        events: &'static EventChannel,
    }

    impl Fixture {
        fn new(sensors: MockSensors, confirmed: bool) -> Self {
            init_logger();
            Self {
                flash: MockFlash::new(),
                radio: MockRadio::new(),
                transport: MockTransport::new(),
                sensors,
                delay: MockDelay::new(),
                boot: MockBootPlatform::new(confirmed),
                events: Box::leak(Box::new(EventChannel::new())),
            }
        }

        fn service(&self) -> FuotaService<'_, MockBootPlatform> {
            let join = JoinConfig {
                dev_eui: [0x70, 0xB3, 0xD5, 0x7E, 0xD0, 0x07, 0x43, 0xCC],
                join_eui: [0x00, 0x80, 0xE1, 0x15, 0x06, 0x1D, 0xA7, 0x0F],
                app_key: [0x11; 16],
            };
            FuotaService::new(
                FuotaConfig::new(join),
                FuotaDevices {
                    flash: &self.flash,
                    radio: &self.radio,
                    transport: &self.transport,
                    sensors: &self.sensors,
                    delay: &self.delay,
                    boot: &self.boot,
                },
                self.events,
            )
        }
    }

    #[test]
    fn test_start_joins_confirms_and_starts_services() {
        let fixture = Fixture::new(MockSensors::new(readings()), false);
        let mut service = fixture.service();

        assert_eq!(block_on(service.start()), Ok(()));
        assert!(fixture.radio.is_joined());
        assert!(fixture.radio.callbacks_registered());
        assert!(fixture.radio.adaptive_rate());
        assert!(fixture.transport.clock_sync_running());
        assert!(fixture.transport.transport_running());
        assert_eq!(fixture.boot.confirm_writes(), 1);
        assert_eq!(
            block_on(service.boot_controller().current_state()),
            BootConfirmationState::Confirmed
        );
    }

    #[test]
    fn test_start_fails_fast_when_radio_not_ready() {
        let fixture = Fixture::new(MockSensors::new(readings()), true);
        fixture.radio.set_ready(false);
        let mut service = fixture.service();

        assert_eq!(
            block_on(service.start()),
            Err(FuotaError::Radio(RadioError::NotReady))
        );
        assert!(!fixture.radio.is_joined());
        assert!(!fixture.transport.transport_running());
    }

    #[test]
    fn test_join_failure_is_fatal() {
        let fixture = Fixture::new(MockSensors::new(readings()), false);
        fixture.radio.fail_join(Some(RadioError::Join(-110)));
        let mut service = fixture.service();

        assert_eq!(
            block_on(service.start()),
            Err(FuotaError::Radio(RadioError::Join(-110)))
        );
        assert_eq!(fixture.boot.confirm_writes(), 0);
        assert!(!fixture.transport.transport_running());
    }

    #[test]
    fn test_confirm_failure_is_fatal() {
        let fixture = Fixture::new(MockSensors::new(readings()), false);
        fixture
            .boot
            .fail_confirm(Some(BootPlatformError::WriteFailed(-5)));
        let mut service = fixture.service();

        assert_eq!(
            block_on(service.start()),
            Err(FuotaError::Boot(BootError::ConfirmWrite(
                BootPlatformError::WriteFailed(-5)
            )))
        );
        assert!(!fixture.transport.transport_running());
    }

    #[test]
    fn test_clock_sync_failure_is_not_fatal() {
        let fixture = Fixture::new(MockSensors::new(readings()), true);
        fixture
            .transport
            .fail_clock_sync(Some(RadioError::ServiceStart(-12)));
        let mut service = fixture.service();

        assert_eq!(block_on(service.start()), Ok(()));
        assert!(fixture.transport.transport_running());
        assert_eq!(fixture.boot.confirm_writes(), 0);
    }

    #[test]
    fn test_start_failure_is_fatal() {
        let fixture = Fixture::new(MockSensors::new(readings()), false);
        fixture.radio.fail_start(Some(RadioError::Start(-19)));
        let mut service = fixture.service();

        assert_eq!(
            block_on(service.run()),
            Err(FuotaError::Radio(RadioError::Start(-19)))
        );
        assert!(!fixture.radio.is_joined());
        assert!(!fixture.radio.callbacks_registered());
        assert_eq!(fixture.boot.confirm_writes(), 0);
        assert!(fixture.radio.sent().is_empty());
        assert!(fixture.delay.sleeps().is_empty());
    }

    #[test]
    fn test_fragmented_transport_failure_is_fatal() {
        let fixture = Fixture::new(MockSensors::new(readings()), true);
        fixture
            .transport
            .fail_transport(Some(RadioError::ServiceStart(-12)));
        let mut service = fixture.service();

        assert_eq!(
            block_on(service.run()),
            Err(FuotaError::Radio(RadioError::ServiceStart(-12)))
        );
        assert!(fixture.radio.is_joined());
        assert!(fixture.transport.clock_sync_running());
        assert!(!fixture.transport.transport_running());
        assert!(fixture.radio.sent().is_empty());
        assert!(fixture.delay.sleeps().is_empty());
    }

    #[test]
    fn test_cycle_before_start_uses_stack_payload_limit() {
        let fixture = Fixture::new(MockSensors::absent(), true);
        let mut service = fixture.service();

        assert_eq!(block_on(service.run_cycle()), Ok(()));
        assert_eq!(fixture.radio.sent().len(), 1);
        assert_eq!(service.stats().uplinks_sent, 1);
        assert_eq!(service.stats().uplinks_failed, 0);
    }

    #[test]
    fn test_cycle_sends_telemetry_frame() {
        let fixture = Fixture::new(MockSensors::new(readings()), true);
        let mut service = fixture.service();
        block_on(service.start()).unwrap();

        assert_eq!(block_on(service.run_cycle()), Ok(()));
        assert_eq!(
            fixture.radio.sent(),
            vec![SentUplink {
                port: 2,
                payload: vec![0x09, 0x8B, 0x0F, 0x1C, 0x27, 0x9E, 0x00, 0x0A, 0xFF, 0xFB, 0x26, 0x52],
                msg_type: MessageType::Unconfirmed,
            }]
        );
        assert_eq!(fixture.delay.sleeps(), vec![Milliseconds(2000)]);
        assert_eq!(service.stats().uplinks_sent, 1);
    }

    #[test]
    fn test_fallback_payload_without_sensors() {
        let fixture = Fixture::new(MockSensors::absent(), true);
        let mut service = fixture.service();
        block_on(service.start()).unwrap();

        block_on(service.run_cycle()).unwrap();
        block_on(service.run_cycle()).unwrap();
        let sent = fixture.radio.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].payload, b"data send".to_vec());
        assert_eq!(fixture.sensors.acquisitions(), 0);
    }

    #[test]
    fn test_send_failures_are_retried_next_cycle() {
        let fixture = Fixture::new(MockSensors::new(readings()), true);
        let mut service = fixture.service();
        block_on(service.start()).unwrap();
        fixture.radio.fail_sends(2);

        block_on(service.run_cycle()).unwrap();
        block_on(service.run_cycle()).unwrap();
        assert_eq!(service.stats().uplinks_failed, 2);
        assert_eq!(service.stats().consecutive_failures, 2);
        assert!(fixture.radio.sent().is_empty());

        block_on(service.run_cycle()).unwrap();
        let stats = service.stats();
        assert_eq!(stats.uplinks_sent, 1);
        assert_eq!(stats.consecutive_failures, 0);
        assert_eq!(fixture.radio.sent().len(), 1);
        // Fixed interval between attempts, no backoff.
        assert_eq!(fixture.delay.sleeps(), vec![Milliseconds(2000); 3]);
    }

    #[test]
    fn test_sensor_failure_skips_send() {
        let fixture = Fixture::new(MockSensors::new(readings()), true);
        let mut service = fixture.service();
        block_on(service.start()).unwrap();
        fixture.sensors.set_readings(Err(SensorError::Read(-5)));

        assert_eq!(block_on(service.run_cycle()), Ok(()));
        assert!(fixture.radio.sent().is_empty());
        assert_eq!(service.stats().cycles_skipped, 1);
        assert_eq!(service.stats().uplinks_failed, 0);
        assert_eq!(fixture.delay.sleeps(), vec![Milliseconds(2000)]);
    }

    #[test]
    fn test_send_timeout() {
        let fixture = Fixture::new(MockSensors::new(readings()), true);
        let mut service = fixture.service();
        block_on(service.start()).unwrap();
        fixture.radio.hang_sends(true);

        assert_eq!(block_on(service.run_cycle()), Ok(()));
        assert_eq!(service.stats().uplinks_failed, 1);
        assert_eq!(
            fixture.delay.sleeps(),
            vec![Milliseconds(10_000), Milliseconds(2000)]
        );
    }

    #[test]
    fn test_datarate_change_limits_payload() {
        let fixture = Fixture::new(MockSensors::new(readings()), true);
        let mut service = fixture.service();
        block_on(service.start()).unwrap();
        fixture.radio.change_datarate(0, 11);

        block_on(service.run_cycle()).unwrap();
        let stats = service.stats();
        assert_eq!(stats.datarate_changes, 1);
        assert_eq!(stats.uplinks_failed, 1);
        assert!(fixture.radio.sent().is_empty());

        fixture.radio.change_datarate(3, 115);
        block_on(service.run_cycle()).unwrap();
        assert_eq!(fixture.radio.sent().len(), 1);
    }

    #[test]
    fn test_downlinks_are_counted() {
        let fixture = Fixture::new(MockSensors::new(readings()), true);
        let mut service = fixture.service();
        block_on(service.start()).unwrap();
        fixture.radio.deliver_downlink(201, -80, 9, &[0x02, 0x01]);
        fixture.radio.deliver_downlink(202, -81, 8, &[]);

        block_on(service.run_cycle()).unwrap();
        assert_eq!(service.stats().downlinks_received, 2);
        assert_eq!(fixture.radio.sent().len(), 1);
    }

    #[test]
    fn test_transfer_finished_requests_upgrade() {
        let fixture = Fixture::new(MockSensors::new(readings()), true);
        let mut service = fixture.service();
        block_on(service.start()).unwrap();
        fixture.transport.finish_transfer();

        // The mock reboot returns, which the service treats as fatal.
        assert_eq!(
            block_on(service.run_cycle()),
            Err(FuotaError::Boot(BootError::RebootReturned(
                BootPlatformError::RebootFailed
            )))
        );
        assert_eq!(fixture.boot.upgrade_requests(), vec![UpgradeMode::Permanent]);
        assert_eq!(fixture.boot.reboots(), vec![RebootKind::Cold]);
        assert_eq!(fixture.delay.sleeps(), vec![Milliseconds(100)]);
        assert!(fixture.radio.sent().is_empty());
    }

    #[test]
    fn test_run_halts_on_upgrade_failure() {
        let fixture = Fixture::new(MockSensors::new(readings()), true);
        fixture.boot.fail_upgrade(Some(BootPlatformError::NoCandidate));
        events::on_transfer_finished(fixture.events);
        let mut service = fixture.service();

        assert_eq!(
            block_on(service.run()),
            Err(FuotaError::Boot(BootError::UpgradeRequest(
                BootPlatformError::NoCandidate
            )))
        );
        assert!(fixture.boot.reboots().is_empty());
        assert!(fixture.radio.sent().is_empty());
    }

    #[test]
    fn test_report_slots_primary_only() {
        let fixture = Fixture::new(MockSensors::new(readings()), true);
        fixture.flash.add_region(0, 0x0800_0000, 0xC000, &[]);
        fixture
            .flash
            .add_region(1, 0x0800_C000, 0x3_0000, &IMAGE_MAGIC_BYTES);
        fixture
            .flash
            .add_region(2, 0x0803_C000, 0x2_C000, &[0x00; 4]);
        let service = fixture.service();

        let report = block_on(service.report_slots());
        assert!(report.primary.unwrap().has_valid_image);
        assert!(!report.secondary.unwrap().has_valid_image);
        assert_eq!(report.confirmation, BootConfirmationState::Confirmed);
        assert_eq!(report.swap, SwapMechanism::Undetermined);
        assert_eq!(report.readiness(), UpgradeReadiness::NoSecondaryImage);
        assert_eq!(fixture.flash.open_handles(), 0);
    }

    #[test]
    fn test_report_slots_with_scratch() {
        let fixture = Fixture::new(MockSensors::new(readings()), false);
        fixture.flash.add_region(1, 0, 0x3_0000, &IMAGE_MAGIC_BYTES);
        fixture.flash.add_region(2, 0, 0x3_0000, &IMAGE_MAGIC_BYTES);
        fixture.flash.add_region(3, 0, 0x2_0000, &[]);
        let service = fixture.service();

        let report = block_on(service.report_slots());
        assert_eq!(
            report.swap,
            SwapMechanism::ScratchBased {
                region_id: 3,
                size_bytes: 0x2_0000
            }
        );
        assert_eq!(report.readiness(), UpgradeReadiness::TestingCandidate);
        // Reporting never writes boot state.
        assert_eq!(fixture.boot.confirm_writes(), 0);
    }

    #[test]
    fn test_report_slots_unreadable_regions() {
        let fixture = Fixture::new(MockSensors::new(readings()), true);
        fixture.flash.add_region(1, 0, 0x3_0000, &IMAGE_MAGIC_BYTES);
        fixture.flash.add_region(2, 0, 0x3_0000, &IMAGE_MAGIC_BYTES);
        fixture.flash.fail_reads(2, crate::flash::FlashError::Io(-5));
        let service = fixture.service();

        let report = block_on(service.report_slots());
        assert!(report.secondary.is_none());
        assert_eq!(report.readiness(), UpgradeReadiness::Unknown);
        // Open still succeeds, so the sizes can be compared.
        assert_eq!(report.swap, SwapMechanism::RelocationBased);
    }
}
