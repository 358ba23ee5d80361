// Licensed under the Apache-2.0 license

use core::ops::RangeInclusive;

use crate::config::MAX_INVENTORY_AREAS;
use crate::flash::{FlashArea, FlashError, FlashMap, OpenArea};
use crate::swap::SwapMechanism;
use arrayvec::ArrayVec;
use fuota_config::boot::BootConfirmationState;
use fuota_config::RegionId;
use log::{debug, warn};
use slot_image::{has_image_magic, ImageHeader, IMAGE_MAGIC_LEN};
use thiserror::Error;
use zerocopy::{FromZeros, IntoBytes};

/// Snapshot of one image bank taken at inspection time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSlot {
    pub region_id: RegionId,
    pub size_bytes: u32,
    pub offset: u32,
    pub has_valid_image: bool,
}

/// Inspection failures. An unavailable region means "unknown", never
/// "no image".
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotError {
    #[error("flash region {region_id} unavailable: {cause}")]
    RegionUnavailable { region_id: RegionId, cause: FlashError },
}

pub struct ImageSlotInspector<'a> {
    flash: &'a dyn FlashMap,
}

impl<'a> ImageSlotInspector<'a> {
    pub fn new(flash: &'a dyn FlashMap) -> Self {
        Self { flash }
    }

    /// Probes a region and checks for the image magic at offset 0.
    pub async fn inspect(&self, region_id: RegionId) -> Result<ImageSlot, SlotError> {
        let unavailable = |cause| SlotError::RegionUnavailable { region_id, cause };

        let area = OpenArea::open(self.flash, region_id)
            .await
            .map_err(unavailable)?;
        let mut magic = [0u8; IMAGE_MAGIC_LEN];
        area.read(0, &mut magic).await.map_err(unavailable)?;

        let geometry = *area.area();
        Ok(ImageSlot {
            region_id,
            size_bytes: geometry.size,
            offset: geometry.offset,
            has_valid_image: has_image_magic(&magic),
        })
    }

    /// Reads the full image header of a region for diagnostics. The header
    /// is returned as found; callers decide whether it verifies.
    pub async fn read_header(&self, region_id: RegionId) -> Result<ImageHeader, SlotError> {
        let unavailable = |cause| SlotError::RegionUnavailable { region_id, cause };

        let area = OpenArea::open(self.flash, region_id)
            .await
            .map_err(unavailable)?;
        let mut header = ImageHeader::new_zeroed();
        area.read(0, header.as_mut_bytes())
            .await
            .map_err(unavailable)?;
        Ok(header)
    }

    /// Lists the geometry of every region in `ids` that opens.
    pub async fn inventory(
        &self,
        ids: RangeInclusive<RegionId>,
    ) -> ArrayVec<FlashArea, MAX_INVENTORY_AREAS> {
        let mut areas = ArrayVec::new();
        for id in ids {
            match OpenArea::open(self.flash, id).await {
                Ok(area) => {
                    if areas.try_push(*area.area()).is_err() {
                        warn!("Flash inventory full, stopping at area {}", id);
                        break;
                    }
                }
                Err(e) => debug!("Flash area {} not present: {}", id, e),
            }
        }
        areas
    }
}

/// Advisory reading of the two image banks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeReadiness {
    /// Confirmed image running with a candidate waiting in the secondary slot.
    SecondaryStaged,
    NoSecondaryImage,
    /// Running image is unconfirmed, so it is the candidate under test.
    TestingCandidate,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotReport {
    pub primary: Option<ImageSlot>,
    pub secondary: Option<ImageSlot>,
    pub confirmation: BootConfirmationState,
    pub swap: SwapMechanism,
}

impl SlotReport {
    /// Diagnostic only; confirm and rollback never consult this.
    pub fn readiness(&self) -> UpgradeReadiness {
        match (self.primary, self.secondary) {
            (_, Some(secondary)) if !secondary.has_valid_image => {
                UpgradeReadiness::NoSecondaryImage
            }
            (Some(primary), Some(_)) if primary.has_valid_image => match self.confirmation {
                BootConfirmationState::Confirmed => UpgradeReadiness::SecondaryStaged,
                BootConfirmationState::Tentative => UpgradeReadiness::TestingCandidate,
            },
            _ => UpgradeReadiness::Unknown,
        }
    }
}
