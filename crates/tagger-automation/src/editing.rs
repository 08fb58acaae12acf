//! Text mutations: append, backspace, delete-all.
//!
//! Each one re-resolves the field, runs inside a [`ScrollGuard`] scope and
//! updates the cached text afterwards.

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::AutomationError;
use crate::page::PageAutomation;
use crate::resolver::CandidateElement;
use crate::sampler::trim_sampled;
use crate::scroll_guard::ScrollGuard;

impl PageAutomation {
    /// Append literal text at the end of the description.
    pub async fn append_text(&self, text: &str) -> Result<(), AutomationError> {
        let target = self.resolve_on_screen("append_text").await?;

        ScrollGuard::scoped(self.driver.as_ref(), &self.scripts, target.handle, async {
            self.position_caret(&target).await?;
            self.driver.type_text(text).await?;
            sleep(self.timing.type_settle()).await;
            self.position_caret(&target).await
        })
        .await?;

        let updated = format!("{}{}", trim_sampled(&target.text_value), text);
        debug!(chars = text.chars().count(), "Appended text");
        self.state.set_text(Some(updated));
        Ok(())
    }

    /// Delete one character before the end of the description.
    pub async fn backspace(&self) -> Result<(), AutomationError> {
        let target = self.require_target("backspace").await?;

        ScrollGuard::scoped(self.driver.as_ref(), &self.scripts, target.handle, async {
            self.position_caret(&target).await?;
            self.driver.press_key("Backspace").await?;
            sleep(self.timing.key_settle()).await;
            Ok::<(), AutomationError>(())
        })
        .await?;

        let mut remaining = target.text_value;
        remaining.pop();
        self.state.set_text(Some(trim_sampled(&remaining)));
        Ok(())
    }

    /// Clear the description with a fixed number of backspaces.
    pub async fn delete_all(&self) -> Result<(), AutomationError> {
        let target = self.require_target("delete_all").await?;
        let presses = self.timing.delete_all_presses;

        ScrollGuard::scoped(self.driver.as_ref(), &self.scripts, target.handle, async {
            self.position_caret(&target).await?;
            for _ in 0..presses {
                self.driver.press_key("Backspace").await?;
                sleep(self.timing.key_settle()).await;
            }
            Ok::<(), AutomationError>(())
        })
        .await?;

        debug!(presses, "Cleared description");
        self.state.set_text(Some(String::new()));
        Ok(())
    }

    /// Resolve, retrying once when the field's center is above the
    /// viewport (the panel was mid-scroll).
    async fn resolve_on_screen(&self, op: &'static str) -> Result<CandidateElement, AutomationError> {
        let target = self.require_target(op).await?;
        if !target.is_above_viewport() {
            return Ok(target);
        }

        debug!(handle = target.handle, y = target.bounding_rect.y, "Field above viewport, re-resolving");
        sleep(self.timing.resample_delay()).await;
        let target = self.require_target(op).await?;
        if target.is_above_viewport() {
            warn!(handle = target.handle, "Field still above viewport, editing anyway");
        }
        Ok(target)
    }
}

#[cfg(test)]
#[path = "editing_tests.rs"]
mod tests;
