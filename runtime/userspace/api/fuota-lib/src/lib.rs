// Licensed under the Apache-2.0 license

#![cfg_attr(target_os = "none", no_std)]

pub mod boot_ctrl;
pub mod config;
pub mod daemon;
pub mod error;
pub mod events;
pub mod flash;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod radio;
pub mod sensor;
pub mod slot;
pub mod swap;
pub mod timer;
