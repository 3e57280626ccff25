//! Remount key handed to renderers.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque, monotonically increasing counter bumped once per committed style
/// change. Renderers compare it to decide whether to rebuild derived
/// visuals; it carries no ordering guarantee beyond "changed".
#[derive(Debug, Clone, Default)]
pub struct WidgetKey(Arc<AtomicU64>);

impl WidgetKey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    /// Increment and return the new value.
    pub fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}
