// Licensed under the Apache-2.0 license

use crate::flash::{FlashMap, OpenArea};
use crate::slot::ImageSlot;
use fuota_config::RegionId;
use log::debug;

/// How the bootloader exchanges the two image slots.
///
/// Nothing on the device reports this directly, so the value is inferred
/// from the partition table. It is advisory and `Undetermined` is an
/// ordinary outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapMechanism {
    ScratchBased { region_id: RegionId, size_bytes: u32 },
    RelocationBased,
    Undetermined,
}

impl SwapMechanism {
    /// Equal slot sizes allow a relocation swap; anything else is undetermined.
    pub fn from_slot_sizes(primary: Option<u32>, secondary: Option<u32>) -> Self {
        match (primary, secondary) {
            (Some(primary), Some(secondary)) if primary == secondary => {
                SwapMechanism::RelocationBased
            }
            _ => SwapMechanism::Undetermined,
        }
    }

    /// Classifies from an earlier inspection pass without touching flash.
    pub fn from_slots(primary: Option<&ImageSlot>, secondary: Option<&ImageSlot>) -> Self {
        Self::from_slot_sizes(
            primary.map(|slot| slot.size_bytes),
            secondary.map(|slot| slot.size_bytes),
        )
    }
}

pub struct SwapMechanismDetector<'a> {
    flash: &'a dyn FlashMap,
}

impl<'a> SwapMechanismDetector<'a> {
    pub fn new(flash: &'a dyn FlashMap) -> Self {
        Self { flash }
    }

    /// The first scratch candidate that opens wins, whatever the slot sizes.
    pub async fn detect(
        &self,
        candidate_scratch_ids: &[RegionId],
        primary_id: RegionId,
        secondary_id: RegionId,
    ) -> SwapMechanism {
        for &region_id in candidate_scratch_ids {
            if let Ok(area) = OpenArea::open(self.flash, region_id).await {
                let size_bytes = area.area().size;
                debug!("Scratch area found: id {} ({} bytes)", region_id, size_bytes);
                return SwapMechanism::ScratchBased {
                    region_id,
                    size_bytes,
                };
            }
        }

        let primary = self.region_size(primary_id).await;
        let secondary = self.region_size(secondary_id).await;
        SwapMechanism::from_slot_sizes(primary, secondary)
    }

    async fn region_size(&self, region_id: RegionId) -> Option<u32> {
        match OpenArea::open(self.flash, region_id).await {
            Ok(area) => Some(area.area().size),
            Err(e) => {
                debug!("Slot {} unreadable during swap detection: {}", region_id, e);
                None
            }
        }
    }
}
