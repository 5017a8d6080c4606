//! Core traits shared by the trainers

/// Progress reporting capability injected into trainers
///
/// The trainers never log through a process-wide instance; they receive a
/// reporter at construction. [`LogReporter`] forwards to the `log` facade.
pub trait Reporter: Send + Sync {
    /// User-facing progress message
    fn info(&self, message: &str);

    /// Diagnostic detail
    fn debug(&self, message: &str);
}

/// Reporter that forwards to `log::info!` and `log::debug!`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn info(&self, message: &str) {
        log::info!(target: "mcsvm", "{message}");
    }

    fn debug(&self, message: &str) {
        log::debug!(target: "mcsvm", "{message}");
    }
}

/// Reporter that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn info(&self, _message: &str) {}

    fn debug(&self, _message: &str) {}
}
