// Licensed under the Apache-2.0 license

#![cfg_attr(target_os = "none", no_std)]

pub mod boot;

use core::ops::RangeInclusive;

/// Flash region identifier as exposed by the platform flash map.
pub type RegionId = u8;

/// Upper bound on the delay between an upgrade request and the reboot.
pub const MAX_REBOOT_SETTLE_MS: u32 = 200;

/// Configures the flash partitions used by the dual-bank update.
/// These are the defaults for the reference board and can be overridden per platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashLayout {
    /// Slot holding the running image.
    pub primary_slot: RegionId,
    /// Slot receiving the staged candidate.
    pub secondary_slot: RegionId,
    /// Regions probed, in order, for a swap scratch area.
    pub scratch_candidates: &'static [RegionId],
    /// Regions listed in the start-up flash inventory.
    pub inventory_ids: RangeInclusive<RegionId>,
}

impl Default for FlashLayout {
    fn default() -> Self {
        FlashLayout {
            primary_slot: 1,
            secondary_slot: 2,
            scratch_candidates: &[3, 4, 5],
            inventory_ids: 0..=10,
        }
    }
}

/// Timing of the application loop and the upgrade hand-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppTiming {
    pub uplink_interval_ms: u32,
    pub reboot_settle_ms: u32,
    pub send_timeout_ms: u32,
}

impl Default for AppTiming {
    fn default() -> Self {
        AppTiming {
            uplink_interval_ms: 2000,
            reboot_settle_ms: 100,
            send_timeout_ms: 10_000,
        }
    }
}

impl AppTiming {
    /// Settle delay actually applied before a reboot, clamped to
    /// `MAX_REBOOT_SETTLE_MS`.
    pub fn reboot_settle(&self) -> u32 {
        self.reboot_settle_ms.min(MAX_REBOOT_SETTLE_MS)
    }
}
