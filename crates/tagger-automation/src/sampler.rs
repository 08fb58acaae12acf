//! Reads the current description text.

use tracing::debug;

use crate::error::AutomationError;
use crate::page::PageAutomation;

/// Trim a sampled value: leading whitespace and trailing line breaks go,
/// trailing spaces stay so a just-appended `"X "` reads back unchanged.
pub(crate) fn trim_sampled(value: &str) -> String {
    value.trim_start().trim_end_matches(['\n', '\r']).to_string()
}

impl PageAutomation {
    /// Current text of the live field, `None` when no field is visible.
    pub async fn sample(&self) -> Result<Option<String>, AutomationError> {
        let text = self
            .resolve_target()
            .await?
            .map(|target| trim_sampled(&target.text_value));
        debug!(chars = text.as_ref().map(|t| t.chars().count()), "Sampled description");
        Ok(text)
    }

    /// Sample and cache the result as the last known text.
    pub async fn read_description(&self) -> Result<Option<String>, AutomationError> {
        let text = self.sample().await?;
        if text.is_some() {
            self.state.set_text(text.clone());
        }
        Ok(text)
    }
}
