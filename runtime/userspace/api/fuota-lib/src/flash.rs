// Licensed under the Apache-2.0 license

extern crate alloc;
use alloc::boxed::Box;
use async_trait::async_trait;
use fuota_config::RegionId;
use thiserror::Error;

/// Geometry of an opened flash region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashArea {
    pub id: RegionId,
    pub offset: u32,
    pub size: u32,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashError {
    #[error("flash region not found")]
    NotFound,
    #[error("flash read failed ({0})")]
    Io(i32),
    #[error("flash access timed out")]
    Timeout,
}

/// Trait for the platform flash map.
///
/// Implementations are expected to bound every access with their own
/// timeout and report `FlashError::Timeout` instead of hanging.
#[async_trait(?Send)]
pub trait FlashMap {
    /// Opens a numbered region.
    ///
    /// # Returns
    ///
    /// * `Result<FlashArea, FlashError>` - The region geometry, or `FlashError::NotFound`.
    async fn open(&self, id: RegionId) -> Result<FlashArea, FlashError>;

    /// Reads `buf.len()` bytes starting at `offset` within the region.
    async fn read(&self, area: &FlashArea, offset: u32, buf: &mut [u8])
        -> Result<(), FlashError>;

    /// Releases a region returned by `open`.
    fn close(&self, area: &FlashArea);
}

/// An open region that is closed when dropped, so a handle cannot outlive
/// the operation that opened it.
pub struct OpenArea<'a> {
    flash: &'a dyn FlashMap,
    area: FlashArea,
}

impl<'a> OpenArea<'a> {
    pub async fn open(flash: &'a dyn FlashMap, id: RegionId) -> Result<Self, FlashError> {
        let area = flash.open(id).await?;
        Ok(Self { flash, area })
    }

    pub fn area(&self) -> &FlashArea {
        &self.area
    }

    pub async fn read(&self, offset: u32, buf: &mut [u8]) -> Result<(), FlashError> {
        self.flash.read(&self.area, offset, buf).await
    }
}

impl Drop for OpenArea<'_> {
    fn drop(&mut self) {
        self.flash.close(&self.area);
    }
}
