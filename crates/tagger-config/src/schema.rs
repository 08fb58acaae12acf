//! Configuration schema definitions.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::loader::ConfigLoader;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaggerConfig {
    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub page: PageConfig,

    #[serde(default)]
    pub timing: TimingConfig,
}

impl TaggerConfig {
    /// Reject values the worker cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.browser.debug_port == 0 {
            return Err(ConfigError::invalid("browser.debug_port", "must be non-zero"));
        }
        if self.page.description_selector.trim().is_empty() {
            return Err(ConfigError::invalid("page.description_selector", "must not be empty"));
        }
        if self.page.label_window == 0 {
            return Err(ConfigError::invalid("page.label_window", "must be at least 1"));
        }
        let threshold = self.page.distance_tie_threshold;
        if threshold.is_nan() || threshold < 0.0 {
            return Err(ConfigError::invalid(
                "page.distance_tie_threshold",
                "must be a non-negative number",
            ));
        }
        if self.timing.poll_interval_ms == 0 {
            return Err(ConfigError::invalid("timing.poll_interval_ms", "must be positive"));
        }
        if self.timing.ready_timeout_secs == 0 {
            return Err(ConfigError::invalid("timing.ready_timeout_secs", "must be positive"));
        }
        if self.timing.focus_verify_step_ms == 0 {
            return Err(ConfigError::invalid("timing.focus_verify_step_ms", "must be positive"));
        }
        if let SettleStrategy::ImageSource { step_ms: 0, .. } = self.timing.settle {
            return Err(ConfigError::invalid("timing.settle.step_ms", "must be positive"));
        }
        Ok(())
    }
}

/// Browser session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Remote debugging port.
    #[serde(default = "default_debug_port")]
    pub debug_port: u16,

    /// Persistent profile directory; `~` is expanded.
    #[serde(default = "default_profile_dir")]
    pub profile_dir: String,

    /// Page opened once the session is attached.
    #[serde(default = "default_start_url")]
    pub start_url: String,

    /// Default for `start` when the caller does not choose.
    #[serde(default)]
    pub headless: bool,

    /// Extra Chrome switches.
    #[serde(default = "default_extra_args")]
    pub extra_args: Vec<String>,

    /// Report an iPad-like navigator to the page.
    #[serde(default)]
    pub spoof_tablet: bool,

    /// Explicit browser binary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            debug_port: default_debug_port(),
            profile_dir: default_profile_dir(),
            start_url: default_start_url(),
            headless: false,
            extra_args: default_extra_args(),
            spoof_tablet: false,
            chrome_path: None,
        }
    }
}

impl BrowserConfig {
    /// Profile directory with `~` expanded.
    pub fn profile_path(&self) -> PathBuf {
        PathBuf::from(ConfigLoader::expand_path(&self.profile_dir))
    }

    /// Marker Chrome leaves in a profile that is in use.
    pub fn lock_path(&self) -> PathBuf {
        self.profile_path().join("SingletonLock")
    }
}

fn default_debug_port() -> u16 {
    9222
}

fn default_profile_dir() -> String {
    "~/.googlephotos_profile".to_string()
}

fn default_start_url() -> String {
    "https://photos.google.com".to_string()
}

fn default_extra_args() -> Vec<String> {
    vec!["--disable-blink-features=AutomationControlled".to_string()]
}

/// Selectors and geometry used against the gallery page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// Candidate description fields.
    #[serde(default = "default_description_selector")]
    pub description_selector: String,

    /// People chips in the info panel.
    #[serde(default = "default_chip_selector")]
    pub chip_selector: String,

    /// Grouping caption container; the last match is used.
    #[serde(default = "default_caption_group_selector")]
    pub caption_group_selector: String,

    /// Caption text inside the group container.
    #[serde(default = "default_caption_name_selector")]
    pub caption_name_selector: String,

    /// Fallback scroll panels when no scrollable ancestor is found.
    #[serde(default = "default_panel_selectors")]
    pub panel_selectors: Vec<String>,

    /// Minimum rendered width of the main image.
    #[serde(default = "default_image_min_width")]
    pub image_min_width: f64,

    /// Minimum rendered height of the main image.
    #[serde(default = "default_image_min_height")]
    pub image_min_height: f64,

    /// Only the last N chips are scraped.
    #[serde(default = "default_label_window")]
    pub label_window: usize,

    /// Distance differences up to this many pixels rank as equal.
    #[serde(default = "default_distance_tie_threshold")]
    pub distance_tie_threshold: f64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            description_selector: default_description_selector(),
            chip_selector: default_chip_selector(),
            caption_group_selector: default_caption_group_selector(),
            caption_name_selector: default_caption_name_selector(),
            panel_selectors: default_panel_selectors(),
            image_min_width: default_image_min_width(),
            image_min_height: default_image_min_height(),
            label_window: default_label_window(),
            distance_tie_threshold: default_distance_tie_threshold(),
        }
    }
}

fn default_description_selector() -> String {
    r#"textarea[aria-label="Description"]"#.to_string()
}

fn default_chip_selector() -> String {
    "span.Y8X4Pc".to_string()
}

fn default_caption_group_selector() -> String {
    "div.DgVY7".to_string()
}

fn default_caption_name_selector() -> String {
    "div.AJM7gb".to_string()
}

fn default_panel_selectors() -> Vec<String> {
    vec![
        r#"[data-has-scrollable="true"]"#.to_string(),
        ".ZPTMcc".to_string(),
        r#"[role="complementary"]"#.to_string(),
    ]
}

fn default_image_min_width() -> f64 {
    200.0
}

fn default_image_min_height() -> f64 {
    100.0
}

fn default_label_window() -> usize {
    5
}

fn default_distance_tie_threshold() -> f64 {
    50.0
}

/// How the navigation controller waits for the next item to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SettleStrategy {
    /// Sleep for a fixed delay.
    Fixed {
        #[serde(default = "default_settle_delay_ms")]
        delay_ms: u64,
    },
    /// Poll until the main image's `src` differs from the pre-navigation value.
    ImageSource {
        #[serde(default = "default_settle_timeout_ms")]
        timeout_ms: u64,
        #[serde(default = "default_settle_step_ms")]
        step_ms: u64,
    },
}

impl Default for SettleStrategy {
    fn default() -> Self {
        SettleStrategy::Fixed {
            delay_ms: default_settle_delay_ms(),
        }
    }
}

fn default_settle_delay_ms() -> u64 {
    500
}

fn default_settle_timeout_ms() -> u64 {
    3000
}

fn default_settle_step_ms() -> u64 {
    100
}

/// Poll intervals, waits and bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Worker queue receive timeout.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// How long `start` waits for the session to become ready.
    #[serde(default = "default_ready_timeout_secs")]
    pub ready_timeout_secs: u64,

    /// How long `stop` waits for the worker thread to finish.
    #[serde(default = "default_stop_join_timeout_secs")]
    pub stop_join_timeout_secs: u64,

    /// Post-navigation settling.
    #[serde(default)]
    pub settle: SettleStrategy,

    /// Bound on the active-element check after focusing.
    #[serde(default = "default_focus_verify_timeout_ms")]
    pub focus_verify_timeout_ms: u64,

    #[serde(default = "default_focus_verify_step_ms")]
    pub focus_verify_step_ms: u64,

    /// Pause after a focusing click.
    #[serde(default = "default_click_settle_ms")]
    pub click_settle_ms: u64,

    /// Pause after each key press.
    #[serde(default = "default_key_settle_ms")]
    pub key_settle_ms: u64,

    /// Pause after inserting text.
    #[serde(default = "default_type_settle_ms")]
    pub type_settle_ms: u64,

    /// Wait before re-resolving a target found above the viewport.
    #[serde(default = "default_resample_delay_ms")]
    pub resample_delay_ms: u64,

    /// Backspaces sent by delete-all.
    #[serde(default = "default_delete_all_presses")]
    pub delete_all_presses: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            ready_timeout_secs: default_ready_timeout_secs(),
            stop_join_timeout_secs: default_stop_join_timeout_secs(),
            settle: SettleStrategy::default(),
            focus_verify_timeout_ms: default_focus_verify_timeout_ms(),
            focus_verify_step_ms: default_focus_verify_step_ms(),
            click_settle_ms: default_click_settle_ms(),
            key_settle_ms: default_key_settle_ms(),
            type_settle_ms: default_type_settle_ms(),
            resample_delay_ms: default_resample_delay_ms(),
            delete_all_presses: default_delete_all_presses(),
        }
    }
}

impl TimingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }

    pub fn stop_join_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_join_timeout_secs)
    }

    pub fn focus_verify_timeout(&self) -> Duration {
        Duration::from_millis(self.focus_verify_timeout_ms)
    }

    pub fn focus_verify_step(&self) -> Duration {
        Duration::from_millis(self.focus_verify_step_ms)
    }

    pub fn click_settle(&self) -> Duration {
        Duration::from_millis(self.click_settle_ms)
    }

    pub fn key_settle(&self) -> Duration {
        Duration::from_millis(self.key_settle_ms)
    }

    pub fn type_settle(&self) -> Duration {
        Duration::from_millis(self.type_settle_ms)
    }

    pub fn resample_delay(&self) -> Duration {
        Duration::from_millis(self.resample_delay_ms)
    }
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_ready_timeout_secs() -> u64 {
    30
}

fn default_stop_join_timeout_secs() -> u64 {
    5
}

fn default_focus_verify_timeout_ms() -> u64 {
    2000
}

fn default_focus_verify_step_ms() -> u64 {
    50
}

fn default_click_settle_ms() -> u64 {
    15
}

fn default_key_settle_ms() -> u64 {
    5
}

fn default_type_settle_ms() -> u64 {
    10
}

fn default_resample_delay_ms() -> u64 {
    100
}

fn default_delete_all_presses() -> u32 {
    50
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
