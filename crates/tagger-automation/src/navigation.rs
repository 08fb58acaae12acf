//! Next/previous navigation followed by sampling and name injection.

use serde::{Deserialize, Serialize};
use tagger_config::SettleStrategy;
use tokio::time::{Duration, Instant, sleep};
use tracing::{debug, info, warn};

use crate::command::Direction;
use crate::error::AutomationError;
use crate::page::PageAutomation;
use crate::resolver::Viewport;

/// Where a navigation request currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavPhase {
    Idle,
    Focusing,
    KeySent,
    Settling,
    Sampled,
}

/// What one navigation observed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationReport {
    pub direction: Direction,
    pub location: Option<String>,
    pub text: Option<String>,
    pub appended: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MainImage {
    x: f64,
    y: f64,
    #[serde(default)]
    src: String,
}

impl PageAutomation {
    pub fn nav_phase(&self) -> NavPhase {
        self.phase
    }

    fn enter(&mut self, phase: NavPhase) {
        debug!(from = ?self.phase, to = ?phase, "Navigation phase");
        self.phase = phase;
    }

    /// Move to the adjacent item, then sample and inject names.
    ///
    /// Always ends in [`NavPhase::Idle`]; failures are returned, never
    /// retried.
    pub async fn navigate(&mut self, direction: Direction) -> Result<NavigationReport, AutomationError> {
        let result = self.run_navigation(direction).await;
        self.enter(NavPhase::Idle);
        result
    }

    async fn run_navigation(&mut self, direction: Direction) -> Result<NavigationReport, AutomationError> {
        self.enter(NavPhase::Focusing);
        let image: Option<MainImage> = self.eval(&self.scripts.main_image()).await?;
        let (x, y) = match &image {
            Some(img) => (img.x, img.y),
            None => {
                debug!("No main image, clicking viewport center");
                let viewport: Viewport = self.eval(&self.scripts.viewport()).await?;
                viewport.center()
            }
        };
        self.driver.click(x, y).await?;
        sleep(self.timing.click_settle()).await;

        self.enter(NavPhase::KeySent);
        self.driver.press_key(direction.key()).await?;

        self.enter(NavPhase::Settling);
        self.settle(image.map(|img| img.src)).await;

        self.enter(NavPhase::Sampled);
        let location = match self.eval::<Option<String>>(&self.scripts.location()).await {
            Ok(location) => location,
            Err(e) => {
                warn!("Could not read location: {}", e);
                None
            }
        };
        self.state.set_location(location.clone());

        let text = self.sample().await?;
        self.state.set_text(text.clone());
        info!(
            direction = ?direction,
            location = location.as_deref().unwrap_or("-"),
            "Now at {:?}",
            text.as_deref().unwrap_or("")
        );

        let appended = self.inject_names().await?;
        Ok(NavigationReport {
            direction,
            location,
            text,
            appended,
        })
    }

    /// Wait for the next item to render.
    async fn settle(&self, previous_src: Option<String>) {
        match self.timing.settle {
            SettleStrategy::Fixed { delay_ms } => sleep(Duration::from_millis(delay_ms)).await,
            SettleStrategy::ImageSource { timeout_ms, step_ms } => {
                let deadline = Instant::now() + Duration::from_millis(timeout_ms);
                let step = Duration::from_millis(step_ms);
                loop {
                    sleep(step).await;
                    match self.eval::<Option<MainImage>>(&self.scripts.main_image()).await {
                        Ok(Some(img)) if Some(&img.src) != previous_src.as_ref() => {
                            debug!(src = %img.src, "Main image changed");
                            return;
                        }
                        Ok(_) => {}
                        Err(e) => debug!("Settle probe failed: {}", e),
                    }
                    if Instant::now() >= deadline {
                        debug!("Main image unchanged after {}ms, continuing", timeout_ms);
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "navigation_tests.rs"]
mod tests;
