//! Cooperative cancellation shared between a run and its controller.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Flag checked by the converter at each top-level record boundary.
///
/// Clones share the same underlying flag.
///
/// # Examples
/// ```
/// use pgplanet_core::CancelFlag;
///
/// let flag = CancelFlag::default();
/// let controller = flag.clone();
/// assert!(!flag.is_cancelled());
/// controller.cancel();
/// assert!(flag.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Shared handle for signal handlers that set the flag directly.
    #[must_use]
    pub fn handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.0)
    }
}
