//! CDP protocol types and message definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// CDP request message.
#[derive(Debug, Serialize)]
pub struct CdpRequest {
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// CDP response message.
#[derive(Debug, Deserialize)]
pub struct CdpResponse {
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<CdpErrorResponse>,
    pub method: Option<String>,
    pub params: Option<Value>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// CDP error in response.
#[derive(Debug, Deserialize)]
pub struct CdpErrorResponse {
    pub code: i64,
    pub message: String,
    pub data: Option<String>,
}

/// Page info from /json endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub page_type: String,
    pub title: String,
    pub url: String,
    pub web_socket_debugger_url: Option<String>,
}

impl PageInfo {
    /// Whether this target is a regular tab (not a worker or extension page).
    pub fn is_page(&self) -> bool {
        self.page_type == "page" && !self.url.starts_with("chrome-extension://")
    }
}

/// Browser version info.
///
/// Note: Chrome returns PascalCase field names for this endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserVersion {
    #[serde(rename = "Browser")]
    pub browser: String,
    #[serde(rename = "Protocol-Version")]
    pub protocol_version: String,
    #[serde(rename = "User-Agent")]
    pub user_agent: String,
    #[serde(rename = "webSocketDebuggerUrl")]
    pub web_socket_debugger_url: String,
}

// ============================================================================
// Runtime Types
// ============================================================================

/// Exception details from `Runtime.evaluate`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDetails {
    pub text: String,
    #[serde(default)]
    pub line_number: i64,
    #[serde(default)]
    pub column_number: i64,
    pub exception: Option<ExceptionObject>,
}

/// The thrown value attached to [`ExceptionDetails`].
#[derive(Debug, Clone, Deserialize)]
pub struct ExceptionObject {
    pub description: Option<String>,
}

impl ExceptionDetails {
    /// Human-readable message, preferring the thrown error's description.
    pub fn message(&self) -> String {
        let detail = self
            .exception
            .as_ref()
            .and_then(|e| e.description.as_deref())
            .unwrap_or(&self.text);
        format!("{} (line {}, col {})", detail, self.line_number, self.column_number)
    }
}

// ============================================================================
// Input Types
// ============================================================================

/// Mouse button.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    None,
    Left,
    Middle,
    Right,
}

/// Mouse event type.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MouseEventType {
    MousePressed,
    MouseReleased,
    MouseMoved,
}

/// Key event type.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyEventType {
    KeyDown,
    KeyUp,
    RawKeyDown,
    Char,
}

/// DOM key/code pair plus the Windows virtual key code Chrome needs to
/// run the default action of a non-printing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDefinition {
    pub key: &'static str,
    pub code: &'static str,
    pub key_code: u32,
}

const KEY_DEFINITIONS: &[KeyDefinition] = &[
    KeyDefinition { key: "Backspace", code: "Backspace", key_code: 8 },
    KeyDefinition { key: "Tab", code: "Tab", key_code: 9 },
    KeyDefinition { key: "Enter", code: "Enter", key_code: 13 },
    KeyDefinition { key: "Escape", code: "Escape", key_code: 27 },
    KeyDefinition { key: "End", code: "End", key_code: 35 },
    KeyDefinition { key: "Home", code: "Home", key_code: 36 },
    KeyDefinition { key: "ArrowLeft", code: "ArrowLeft", key_code: 37 },
    KeyDefinition { key: "ArrowUp", code: "ArrowUp", key_code: 38 },
    KeyDefinition { key: "ArrowRight", code: "ArrowRight", key_code: 39 },
    KeyDefinition { key: "ArrowDown", code: "ArrowDown", key_code: 40 },
    KeyDefinition { key: "Delete", code: "Delete", key_code: 46 },
];

/// Look up a symbolic key name (`"End"`, `"ArrowRight"`, ...).
pub fn key_definition(name: &str) -> Option<KeyDefinition> {
    KEY_DEFINITIONS
        .iter()
        .find(|def| def.key.eq_ignore_ascii_case(name))
        .copied()
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
