//! Cooperative cancellation for long-running training calls

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag polled by the SMO loop, the K-fold loops and the RFE rounds
///
/// Clones observe the same flag. A cancelled call returns `Ok(None)`, never an error.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every call holding this token
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
