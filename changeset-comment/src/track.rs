//! Error-tracking sink.
//!
//! Unexpected (non-validation) discovery failures are reported here; the run
//! then continues with placeholder data. Enum dispatch, same convention as
//! the rest of the crate.

use tracing::error;

/// Where unexpected failures are reported.
#[derive(Debug, Clone, Copy, Default)]
pub enum ErrorTracker {
    /// Emit through the process log stream.
    #[default]
    Log,
}

impl ErrorTracker {
    pub fn report(&self, err: &dyn std::error::Error) {
        match self {
            Self::Log => error!("changed-package discovery failed: {err}"),
        }
    }
}
