// Licensed under the Apache-2.0 license

use core::convert::Infallible;
use thiserror::Error;

/// Trait for querying and mutating the persisted boot state of a dual-bank device.
///
/// This trait abstracts the bootloader hand-off: whether the running image has
/// been made permanent, marking the secondary slot for a swap, and restarting.
#[allow(async_fn_in_trait)]
pub trait BootPlatform {
    /// Checks whether the running image is marked permanent.
    ///
    /// # Returns
    /// * `bool` - `true` if the image will not be reverted on the next boot.
    async fn is_image_confirmed(&self) -> bool;

    /// Marks the running image permanent.
    ///
    /// # Returns
    /// * `Result<(), BootPlatformError>` - `Ok(())` once the flag is persisted.
    async fn write_image_confirmed(&self) -> Result<(), BootPlatformError>;

    /// Marks the secondary slot to be swapped in on the next boot.
    ///
    /// # Arguments
    /// * `mode` - `Permanent` keeps the new image, `Test` reverts unless it confirms itself.
    async fn request_upgrade(&self, mode: UpgradeMode) -> Result<(), BootPlatformError>;

    /// Restarts the device. Only returns if the restart could not be triggered.
    async fn reboot(&self, kind: RebootKind) -> Result<Infallible, BootPlatformError>;

    /// Confirmation flag as a two-valued state.
    async fn confirmation_state(&self) -> BootConfirmationState {
        if self.is_image_confirmed().await {
            BootConfirmationState::Confirmed
        } else {
            BootConfirmationState::Tentative
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootConfirmationState {
    Tentative,
    Confirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeMode {
    Test = 0,
    Permanent = 1,
}

impl core::convert::TryFrom<u8> for UpgradeMode {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(UpgradeMode::Test),
            1 => Ok(UpgradeMode::Permanent),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebootKind {
    Warm = 0,
    Cold = 1,
}

impl core::convert::TryFrom<u8> for RebootKind {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RebootKind::Warm),
            1 => Ok(RebootKind::Cold),
            _ => Err(()),
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootPlatformError {
    #[error("boot state read failed")]
    ReadFailed,
    #[error("boot state write failed ({0})")]
    WriteFailed(i32),
    #[error("boot state did not read back as written")]
    Unverified,
    #[error("no valid image in the secondary slot")]
    NoCandidate,
    #[error("restart was not performed")]
    RebootFailed,
}
