use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cooperative, caller-owned stop flag.
///
/// Triggering it never interrupts work that is already running, it only
/// prevents new work from being picked up. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    flag: Arc<AtomicBool>,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
