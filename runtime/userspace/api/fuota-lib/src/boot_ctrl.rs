// Licensed under the Apache-2.0 license

use core::cell::Cell;
use core::convert::Infallible;

use crate::timer::{AsyncDelay, Milliseconds};
use fuota_config::boot::{
    BootConfirmationState, BootPlatform, BootPlatformError, RebootKind, UpgradeMode,
};
use fuota_config::AppTiming;
use log::{debug, error, info};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootError {
    #[error("confirming the running image failed: {0}")]
    ConfirmWrite(BootPlatformError),
    #[error("upgrade request failed: {0}")]
    UpgradeRequest(BootPlatformError),
    #[error("reboot returned: {0}")]
    RebootReturned(BootPlatformError),
    #[error("upgrade already attempted in this boot")]
    UpgradeAlreadyAttempted,
}

/// Drives the tentative/confirmed state of the running image and the
/// hand-off to the bootloader.
///
/// The only transition this controller makes is `Tentative -> Confirmed`.
/// Writing a new candidate into the secondary slot resets that state, which
/// happens outside of it.
pub struct BootConfirmationController<'a, B: BootPlatform> {
    platform: &'a B,
    delay: &'a dyn AsyncDelay,
    settle: Milliseconds,
    upgrade_attempted: Cell<bool>,
}

impl<'a, B: BootPlatform> BootConfirmationController<'a, B> {
    pub fn new(platform: &'a B, delay: &'a dyn AsyncDelay, timing: &AppTiming) -> Self {
        Self {
            platform,
            delay,
            settle: Milliseconds(timing.reboot_settle()),
            upgrade_attempted: Cell::new(false),
        }
    }

    pub async fn current_state(&self) -> BootConfirmationState {
        self.platform.confirmation_state().await
    }

    /// Makes the running image permanent. A no-op when already confirmed.
    pub async fn confirm_permanent(&self) -> Result<(), BootError> {
        if self.current_state().await == BootConfirmationState::Confirmed {
            debug!("Image already confirmed");
            return Ok(());
        }

        self.platform
            .write_image_confirmed()
            .await
            .map_err(BootError::ConfirmWrite)?;

        if self.current_state().await != BootConfirmationState::Confirmed {
            return Err(BootError::ConfirmWrite(BootPlatformError::Unverified));
        }
        info!("Image confirmed");
        Ok(())
    }

    /// Requests a permanent swap of the secondary slot and restarts.
    ///
    /// Does not return on success. Only one attempt is made per execution;
    /// later calls fail with `UpgradeAlreadyAttempted`.
    pub async fn request_upgrade_and_reboot(&self) -> Result<Infallible, BootError> {
        if self.upgrade_attempted.replace(true) {
            error!("Upgrade already attempted, refusing to retry");
            return Err(BootError::UpgradeAlreadyAttempted);
        }

        self.platform
            .request_upgrade(UpgradeMode::Permanent)
            .await
            .map_err(BootError::UpgradeRequest)?;

        info!("Upgrade requested, rebooting in {} ms", self.settle.0);
        self.delay.sleep(self.settle).await;

        match self.platform.reboot(RebootKind::Cold).await {
            Ok(never) => match never {},
            Err(e) => Err(BootError::RebootReturned(e)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mock::{MockBootPlatform, MockDelay};
    use futures::executor::block_on;

    #[test]
    fn test_confirm_is_idempotent() {
        let platform = MockBootPlatform::new(false);
        let delay = MockDelay::new();
        let ctrl = BootConfirmationController::new(&platform, &delay, &AppTiming::default());

        assert_eq!(
            block_on(ctrl.current_state()),
            BootConfirmationState::Tentative
        );
        assert_eq!(block_on(ctrl.confirm_permanent()), Ok(()));
        assert_eq!(platform.confirm_writes(), 1);
        assert_eq!(block_on(ctrl.confirm_permanent()), Ok(()));
        assert_eq!(platform.confirm_writes(), 1);
        assert_eq!(
            block_on(ctrl.current_state()),
            BootConfirmationState::Confirmed
        );
    }

    #[test]
    fn test_confirm_write_failure() {
        let platform = MockBootPlatform::new(false);
        platform.fail_confirm(Some(BootPlatformError::WriteFailed(-5)));
        let delay = MockDelay::new();
        let ctrl = BootConfirmationController::new(&platform, &delay, &AppTiming::default());

        assert_eq!(
            block_on(ctrl.confirm_permanent()),
            Err(BootError::ConfirmWrite(BootPlatformError::WriteFailed(-5)))
        );
        assert_eq!(
            block_on(ctrl.current_state()),
            BootConfirmationState::Tentative
        );
    }

    #[test]
    fn test_confirm_not_persisted() {
        let platform = MockBootPlatform::new(false);
        platform.drop_confirm_writes();
        let delay = MockDelay::new();
        let ctrl = BootConfirmationController::new(&platform, &delay, &AppTiming::default());

        assert_eq!(
            block_on(ctrl.confirm_permanent()),
            Err(BootError::ConfirmWrite(BootPlatformError::Unverified))
        );
    }

    #[test]
    fn test_upgrade_sequence() {
        let platform = MockBootPlatform::new(true);
        let delay = MockDelay::new();
        let ctrl = BootConfirmationController::new(&platform, &delay, &AppTiming::default());

        assert_eq!(
            block_on(ctrl.request_upgrade_and_reboot()),
            Err(BootError::RebootReturned(BootPlatformError::RebootFailed))
        );
        assert_eq!(platform.upgrade_requests(), vec![UpgradeMode::Permanent]);
        assert_eq!(delay.sleeps(), vec![Milliseconds(100)]);
        assert_eq!(platform.reboots(), vec![RebootKind::Cold]);
    }

    #[test]
    fn test_settle_delay_is_bounded() {
        let platform = MockBootPlatform::new(true);
        let delay = MockDelay::new();
        let timing = AppTiming {
            reboot_settle_ms: 60_000,
            ..Default::default()
        };
        let ctrl = BootConfirmationController::new(&platform, &delay, &timing);

        let _ = block_on(ctrl.request_upgrade_and_reboot());
        assert_eq!(delay.sleeps(), vec![Milliseconds(200)]);
    }

    #[test]
    fn test_upgrade_request_failure_is_not_retried() {
        let platform = MockBootPlatform::new(true);
        platform.fail_upgrade(Some(BootPlatformError::NoCandidate));
        let delay = MockDelay::new();
        let ctrl = BootConfirmationController::new(&platform, &delay, &AppTiming::default());

        assert_eq!(
            block_on(ctrl.request_upgrade_and_reboot()),
            Err(BootError::UpgradeRequest(BootPlatformError::NoCandidate))
        );
        assert!(platform.reboots().is_empty());
        assert!(delay.sleeps().is_empty());

        platform.fail_upgrade(None);
        assert_eq!(
            block_on(ctrl.request_upgrade_and_reboot()),
            Err(BootError::UpgradeAlreadyAttempted)
        );
        // The second call never reached the platform.
        assert_eq!(platform.upgrade_requests(), vec![UpgradeMode::Permanent]);
    }
}
