//! The four page primitives the worker needs.

use async_trait::async_trait;
use serde_json::Value;
use tagger_cdp::{CdpError, PageSession};

/// Primitive operations against the remote page.
///
/// All DOM inspection goes through [`evaluate`](AutomationDriver::evaluate);
/// nothing walks the DOM in-process.
#[async_trait]
pub trait AutomationDriver: Send + Sync {
    /// Run a script and return its JSON result (`null` for `undefined`).
    async fn evaluate(&self, script: &str) -> Result<Value, CdpError>;

    /// Left-click at viewport coordinates.
    async fn click(&self, x: f64, y: f64) -> Result<(), CdpError>;

    /// Press and release a key by name (`"End"`, `"Backspace"`, ...).
    async fn press_key(&self, key: &str) -> Result<(), CdpError>;

    /// Insert literal text at the caret.
    async fn type_text(&self, text: &str) -> Result<(), CdpError>;
}

#[async_trait]
impl AutomationDriver for PageSession {
    async fn evaluate(&self, script: &str) -> Result<Value, CdpError> {
        PageSession::evaluate(self, script).await
    }

    async fn click(&self, x: f64, y: f64) -> Result<(), CdpError> {
        PageSession::click(self, x, y).await
    }

    async fn press_key(&self, key: &str) -> Result<(), CdpError> {
        PageSession::press_key(self, key).await
    }

    async fn type_text(&self, text: &str) -> Result<(), CdpError> {
        PageSession::type_text(self, text).await
    }
}
