//! Caret placement at the end of the description field.

use serde::Deserialize;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

use crate::error::AutomationError;
use crate::page::PageAutomation;
use crate::resolver::CandidateElement;

#[derive(Debug, Deserialize)]
struct FocusResult {
    ok: bool,
    #[serde(default)]
    length: usize,
}

impl PageAutomation {
    /// Resolve the field and put the caret at its end.
    pub async fn cursor_to_end(&self) -> Result<(), AutomationError> {
        let target = self.require_target("cursor_to_end").await?;
        self.position_caret(&target).await
    }

    /// Focus `target` without scrolling, move the selection to the end and
    /// pin the field's own scroll to the bottom.
    ///
    /// The page sometimes swallows `focus()`. If the field is not the
    /// active element within the verify window, `End` is pressed once and
    /// the caller carries on.
    pub(crate) async fn position_caret(&self, target: &CandidateElement) -> Result<(), AutomationError> {
        let focus: FocusResult = self.eval(&self.scripts.focus_caret(target.handle)).await?;
        if !focus.ok {
            warn!(handle = target.handle, "Description field vanished before focusing");
        } else {
            debug!(handle = target.handle, length = focus.length, "Caret moved to end");
        }

        if self.verify_focus(target.handle).await {
            return Ok(());
        }

        warn!(handle = target.handle, "Focus not confirmed, falling back to End key");
        self.driver.press_key("End").await?;
        sleep(self.timing.key_settle()).await;
        Ok(())
    }

    /// Bounded poll for `document.activeElement === field`.
    async fn verify_focus(&self, handle: usize) -> bool {
        let deadline = Instant::now() + self.timing.focus_verify_timeout();
        let op = self.scripts.is_active(handle);
        loop {
            match self.eval::<bool>(&op).await {
                Ok(true) => return true,
                Ok(false) => {}
                Err(e) => debug!("Focus check failed: {}", e),
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(self.timing.focus_verify_step()).await;
        }
    }
}
