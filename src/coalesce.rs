//! Deferred reconciliation requests.
//!
//! Host feature writes, endpoint switches and connection changes all ask
//! for the same thing: "bring the live mode in line with what is
//! recorded". Requests are a dirty flag, not a queue. Any number of
//! submissions before the worker wakes produce one pass, and that pass
//! reads whatever is recorded when it runs.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

pub struct Coalescer {
    pending: Signal<CriticalSectionRawMutex, ()>,
}

impl Coalescer {
    pub const fn new() -> Self {
        Self {
            pending: Signal::new(),
        }
    }

    /// Mark a reconciliation pass as needed. Never blocks.
    pub fn submit(&self) {
        self.pending.signal(());
    }

    pub fn is_pending(&self) -> bool {
        self.pending.signaled()
    }

    /// Claim the pending pass, if any.
    pub fn try_take(&self) -> bool {
        self.pending.try_take().is_some()
    }

    /// Wait until a pass is pending and claim it.
    pub async fn wait(&self) {
        self.pending.wait().await
    }
}

impl Default for Coalescer {
    fn default() -> Self {
        Self::new()
    }
}
