//! Worker-owned automation context for one page.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tagger_config::{NameBook, TaggerConfig, TimingConfig};

use crate::driver::AutomationDriver;
use crate::error::AutomationError;
use crate::navigation::NavPhase;
use crate::resolver::TargetResolver;
use crate::scripts::{PageScripts, ScriptOp, evaluate_op};
use crate::state::SharedState;

/// Everything the worker needs to operate on the gallery page.
///
/// Component behavior lives in `impl PageAutomation` blocks spread over
/// `cursor`, `sampler`, `injection`, `navigation` and `editing`.
pub struct PageAutomation {
    pub(crate) driver: Arc<dyn AutomationDriver>,
    pub(crate) scripts: PageScripts,
    pub(crate) resolver: TargetResolver,
    pub(crate) timing: TimingConfig,
    pub(crate) names: NameBook,
    pub(crate) state: SharedState,
    pub(crate) phase: NavPhase,
}

impl PageAutomation {
    pub fn new(
        driver: Arc<dyn AutomationDriver>,
        config: &TaggerConfig,
        names: NameBook,
        state: SharedState,
    ) -> Self {
        Self {
            driver,
            scripts: PageScripts::new(config.page.clone()),
            resolver: TargetResolver::new(config.page.distance_tie_threshold),
            timing: config.timing.clone(),
            names,
            state,
            phase: NavPhase::Idle,
        }
    }

    pub fn names(&self) -> &NameBook {
        &self.names
    }

    pub fn set_names(&mut self, names: NameBook) {
        self.names = names;
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub(crate) async fn eval<T: DeserializeOwned>(&self, op: &ScriptOp) -> Result<T, AutomationError> {
        evaluate_op(self.driver.as_ref(), op).await
    }
}
