// Licensed under the Apache-2.0 license

use core::fmt;

use crate::radio::MessageType;
use fuota_config::{AppTiming, FlashLayout};
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const UPLINK_PORT: u8 = 2;
pub const UPLINK_MSG_TYPE: MessageType = MessageType::Unconfirmed;
pub const EVENT_QUEUE_DEPTH: usize = 8;
pub const MAX_DOWNLINK_PAYLOAD: usize = 242; // Largest application payload of any region.
pub const MAX_INVENTORY_AREAS: usize = 16;

/// Sent instead of telemetry when no sensors came up, so the class A
/// receive windows that carry the update setup keep opening.
pub const FALLBACK_PAYLOAD: &[u8] = b"data send";

/// Over-the-air activation credentials. The application key doubles as
/// the network key.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct JoinConfig {
    pub dev_eui: [u8; 8],
    pub join_eui: [u8; 8],
    pub app_key: [u8; 16],
}

impl fmt::Debug for JoinConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinConfig")
            .field("dev_eui", &self.dev_eui)
            .field("join_eui", &self.join_eui)
            .field("app_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct FuotaConfig {
    pub layout: FlashLayout,
    pub timing: AppTiming,
    pub join: JoinConfig,
    pub port: u8,
    pub msg_type: MessageType,
}

impl FuotaConfig {
    pub fn new(join: JoinConfig) -> Self {
        Self {
            layout: FlashLayout::default(),
            timing: AppTiming::default(),
            join,
            port: UPLINK_PORT,
            msg_type: UPLINK_MSG_TYPE,
        }
    }
}
