//! Keeps the info panel from scrolling while the field is edited.

use std::future::Future;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::driver::AutomationDriver;
use crate::error::AutomationError;
use crate::scripts::{PageScripts, evaluate_op};

/// Outcome of a freeze or unfreeze script.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ScrollFreeze {
    pub frozen: bool,
    pub top: f64,
}

/// Pins the first scrollable ancestor of the description field.
pub struct ScrollGuard<'a> {
    driver: &'a dyn AutomationDriver,
    scripts: &'a PageScripts,
}

impl<'a> ScrollGuard<'a> {
    pub fn new(driver: &'a dyn AutomationDriver, scripts: &'a PageScripts) -> Self {
        Self { driver, scripts }
    }

    /// Record the panel offset and force it back on every scroll event.
    pub async fn freeze(&self, handle: usize) -> Result<ScrollFreeze, AutomationError> {
        let freeze: ScrollFreeze = evaluate_op(self.driver, &self.scripts.freeze_scroll(handle)).await?;
        if freeze.frozen {
            debug!(top = freeze.top, "Scroll panel frozen");
        } else {
            debug!("No scrollable panel to freeze");
        }
        Ok(freeze)
    }

    /// Remove the listener and restore the recorded offset.
    pub async fn unfreeze(&self) -> Result<ScrollFreeze, AutomationError> {
        evaluate_op(self.driver, &self.scripts.unfreeze_scroll()).await
    }

    /// Run `body` with the panel frozen. Unfreeze always runs, also when
    /// `body` fails; the body's result is returned.
    ///
    /// A failed freeze is logged and `body` runs unguarded.
    pub async fn scoped<T, F>(
        driver: &'a dyn AutomationDriver,
        scripts: &'a PageScripts,
        handle: usize,
        body: F,
    ) -> Result<T, AutomationError>
    where
        F: Future<Output = Result<T, AutomationError>>,
    {
        let guard = ScrollGuard::new(driver, scripts);
        if let Err(e) = guard.freeze(handle).await {
            warn!("Scroll freeze failed, editing unguarded: {}", e);
        }

        let result = body.await;

        if let Err(e) = guard.unfreeze().await {
            warn!("Scroll unfreeze failed: {}", e);
        }
        result
    }
}
