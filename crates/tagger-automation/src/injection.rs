//! Name-injection pass: scrape people/place labels from the info panel and
//! append the ones the description does not mention yet.
//!
//! Filtering is greedy and single-pass. Duplicates are detected by
//! case-insensitive substring match against everything already in the
//! description or queued earlier in the same pass.

use std::collections::HashSet;

use tagger_config::NameBook;
use tracing::{debug, info};

use crate::error::AutomationError;
use crate::page::PageAutomation;

/// Collapse runs of whitespace to single spaces and trim.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Dates and counters, not names: a four-digit prefix (`"2019 Summer"`)
/// or a leading zero (`"03:14"`).
pub fn is_metadata_label(label: &str) -> bool {
    if label.starts_with('0') {
        return true;
    }
    let prefix: Vec<char> = label.chars().take(4).collect();
    prefix.len() == 4 && prefix.iter().all(|c| c.is_ascii_digit())
}

/// Lower-cased, whitespace-collapsed text seen so far in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunningDescriptionBuffer {
    text: String,
}

impl RunningDescriptionBuffer {
    pub fn seed(existing: &str) -> Self {
        Self {
            text: normalize_whitespace(existing).to_lowercase(),
        }
    }

    /// Whether the normalized label already occurs in the buffer.
    pub fn contains(&self, label: &str) -> bool {
        let needle = normalize_whitespace(label).to_lowercase();
        !needle.is_empty() && self.text.contains(&needle)
    }

    pub fn fold(&mut self, label: &str) {
        let norm = normalize_whitespace(label).to_lowercase();
        if norm.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(&norm);
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Labels to append, in scrape order, given the field's current text.
pub fn plan_injection(existing: &str, labels: &[String], names: &NameBook) -> Vec<String> {
    let mut buffer = RunningDescriptionBuffer::seed(existing);
    let mut queued_keys: HashSet<String> = HashSet::new();
    let mut queued = Vec::new();

    for raw in labels {
        let label = normalize_whitespace(raw);
        if label.is_empty() {
            continue;
        }
        if is_metadata_label(&label) {
            debug!(label = %label, "Skipping metadata label");
            continue;
        }

        let mapped = match names.rename(&label) {
            Some(renamed) => normalize_whitespace(renamed),
            None => label,
        };
        let key = mapped.to_lowercase();
        if key.is_empty() || queued_keys.contains(&key) || buffer.contains(&key) {
            debug!(label = %mapped, "Already present");
            continue;
        }

        buffer.fold(&key);
        queued_keys.insert(key);
        queued.push(mapped);
    }

    queued
}

impl PageAutomation {
    /// Run one injection pass against the live field.
    ///
    /// Returns the labels that were appended.
    pub async fn inject_names(&self) -> Result<Vec<String>, AutomationError> {
        self.cursor_to_end().await?;

        let existing = self.sample().await?.unwrap_or_default();
        let labels: Vec<String> = self.eval(&self.scripts.scrape_labels()).await?;
        let queued = plan_injection(&existing, &labels, &self.names);
        debug!(scraped = labels.len(), queued = queued.len(), "Planned name injection");

        for label in &queued {
            self.append_text(&format!(" {} ", label)).await?;
        }
        if !queued.is_empty() {
            info!("Added {}", queued.join(", "));
        }

        self.cursor_to_end().await?;
        Ok(queued)
    }
}

#[cfg(test)]
#[path = "injection_tests.rs"]
mod tests;
