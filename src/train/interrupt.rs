//! Cooperative interruption flag

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared stop flag checked by the run controller between batches
///
/// Clones share the same flag, so a clone can be moved into a signal
/// handler while the controller keeps the other.
#[derive(Clone, Debug, Default)]
pub struct Interrupter {
    state: Arc<AtomicBool>,
}

impl Interrupter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the run to stop at the next batch boundary
    pub fn stop(&self) {
        self.state.store(true, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.state.store(false, Ordering::Relaxed);
    }

    /// True if [`Interrupter::stop`] has been called
    pub fn should_stop(&self) -> bool {
        self.state.load(Ordering::Relaxed)
    }
}
