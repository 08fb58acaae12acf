//! Input (mouse and keyboard) operations for CDP page session.

use serde_json::{Value, json};
use tracing::debug;

use crate::error::CdpError;
use crate::protocol::{KeyEventType, MouseButton, MouseEventType, key_definition};

use super::core::PageSession;

impl PageSession {
    /// Click at coordinates.
    pub async fn click(&self, x: f64, y: f64) -> Result<(), CdpError> {
        self.call(
            "Input.dispatchMouseEvent",
            Some(json!({
                "type": MouseEventType::MouseMoved,
                "x": x,
                "y": y,
            })),
        )
        .await?;

        for event_type in [MouseEventType::MousePressed, MouseEventType::MouseReleased] {
            self.call(
                "Input.dispatchMouseEvent",
                Some(json!({
                    "type": event_type,
                    "x": x,
                    "y": y,
                    "button": MouseButton::Left,
                    "clickCount": 1,
                })),
            )
            .await?;
        }

        debug!("Clicked at ({}, {})", x, y);
        Ok(())
    }

    /// Type text at the current caret.
    pub async fn type_text(&self, text: &str) -> Result<(), CdpError> {
        self.call("Input.insertText", Some(json!({"text": text})))
            .await?;
        debug!("Typed {} characters", text.chars().count());
        Ok(())
    }

    /// Press a key.
    ///
    /// Named keys (`End`, `Backspace`, `ArrowRight`, ...) carry their
    /// virtual key code so the browser performs the default editing or
    /// navigation action; anything else is sent as a plain key name.
    pub async fn press_key(&self, key: &str) -> Result<(), CdpError> {
        let (down, up) = Self::key_events(key);
        self.call("Input.dispatchKeyEvent", Some(down)).await?;
        self.call("Input.dispatchKeyEvent", Some(up)).await?;
        Ok(())
    }

    /// Build the keyDown/keyUp parameter pair for a key name.
    pub(super) fn key_events(key: &str) -> (Value, Value) {
        match key_definition(key) {
            Some(def) => (
                json!({
                    "type": KeyEventType::RawKeyDown,
                    "key": def.key,
                    "code": def.code,
                    "windowsVirtualKeyCode": def.key_code,
                    "nativeVirtualKeyCode": def.key_code,
                }),
                json!({
                    "type": KeyEventType::KeyUp,
                    "key": def.key,
                    "code": def.code,
                    "windowsVirtualKeyCode": def.key_code,
                    "nativeVirtualKeyCode": def.key_code,
                }),
            ),
            None => (
                json!({
                    "type": KeyEventType::KeyDown,
                    "key": key,
                }),
                json!({
                    "type": KeyEventType::KeyUp,
                    "key": key,
                }),
            ),
        }
    }
}
