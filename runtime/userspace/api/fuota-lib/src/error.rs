// Licensed under the Apache-2.0 license

use crate::boot_ctrl::BootError;
use crate::radio::RadioError;
use thiserror::Error;

/// Errors that stop the update service.
///
/// Inspection and uplink failures are recovered inside the service and
/// never surface here.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuotaError {
    #[error(transparent)]
    Radio(#[from] RadioError),
    #[error(transparent)]
    Boot(#[from] BootError),
}
