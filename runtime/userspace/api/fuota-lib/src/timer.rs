// Licensed under the Apache-2.0 license

extern crate alloc;
use alloc::boxed::Box;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Milliseconds(pub u32);

/// Suspends the calling task. Implemented over the platform alarm.
#[async_trait(?Send)]
pub trait AsyncDelay {
    async fn sleep(&self, time: Milliseconds);
}
