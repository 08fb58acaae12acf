//! Core session struct and CDP command dispatch.

use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use serde_json::Value;
use tracing::debug;

use crate::client::{PendingMap, WsSink, send_and_wait};
use crate::error::CdpError;

/// A session attached to a single page/target.
pub struct PageSession {
    /// Target ID.
    pub(super) target_id: String,
    /// Session ID for this target.
    pub(super) session_id: String,
    /// WebSocket sender (shared with client).
    pub(super) ws_tx: Arc<tokio::sync::Mutex<WsSink>>,
    /// Pending requests (shared with client).
    pub(super) pending: PendingMap,
    /// Request ID counter (shared with client).
    pub(super) request_id: Arc<AtomicU64>,
}

impl PageSession {
    /// Create a new page session.
    pub(crate) fn new(
        target_id: String,
        session_id: String,
        ws_tx: Arc<tokio::sync::Mutex<WsSink>>,
        pending: PendingMap,
        request_id: Arc<AtomicU64>,
    ) -> Self {
        Self {
            target_id,
            session_id,
            ws_tx,
            pending,
            request_id,
        }
    }

    /// Get target ID.
    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// Get session ID.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send a CDP command to this page session.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        send_and_wait(
            &self.ws_tx,
            &self.pending,
            &self.request_id,
            method,
            params,
            Some(self.session_id.clone()),
        )
        .await
    }

    /// Enable required CDP domains.
    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("Page.enable", None).await?;
        self.call("Runtime.enable", None).await?;

        debug!("Enabled CDP domains for session {}", self.session_id);
        Ok(())
    }

    /// Bring this tab to the foreground.
    pub async fn bring_to_front(&self) -> Result<(), CdpError> {
        self.call("Page.bringToFront", None).await?;
        Ok(())
    }

    /// Register a script that runs before any page script on every new
    /// document in this tab.
    pub async fn add_init_script(&self, source: &str) -> Result<String, CdpError> {
        let result = self
            .call(
                "Page.addScriptToEvaluateOnNewDocument",
                Some(serde_json::json!({"source": source})),
            )
            .await?;

        result["identifier"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| CdpError::InvalidResponse("Missing script identifier".to_string()))
    }
}
