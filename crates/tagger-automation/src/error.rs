//! Automation error types.

use std::time::Duration;

use tagger_cdp::CdpError;
use thiserror::Error;

/// Errors raised while driving the gallery page.
#[derive(Debug, Error)]
pub enum AutomationError {
    /// No visible candidate for the description field.
    #[error("No visible description field for {0}")]
    TargetNotFound(&'static str),

    /// The driver failed (CDP error, script exception, closed session).
    #[error("Driver error: {0}")]
    Driver(#[from] CdpError),

    /// A page script returned something of the wrong shape.
    #[error("Script {op} returned unexpected data: {message}")]
    Script { op: &'static str, message: String },

    /// Browser or page session could not be opened.
    #[error("Launch failed: {0}")]
    Launch(String),

    /// The session did not become ready in time.
    #[error("Session not ready after {0:?}")]
    ReadinessTimeout(Duration),

    /// No worker is alive to take commands.
    #[error("Automation session is not running")]
    NotRunning,

    /// The worker thread vanished while a caller was waiting on it.
    #[error("Automation worker is gone")]
    WorkerGone,
}

impl AutomationError {
    /// Errors the worker reports at warn level: the page was momentarily
    /// not in a usable state, nothing broke.
    pub fn is_benign(&self) -> bool {
        matches!(self, AutomationError::TargetNotFound(_))
    }

    pub(crate) fn launch(err: impl std::fmt::Display) -> Self {
        AutomationError::Launch(err.to_string())
    }
}
