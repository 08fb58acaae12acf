//! Opens the page session the worker drives.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tagger_cdp::{BrowserLauncher, CdpClient, LauncherConfig, PageSession};
use tagger_config::BrowserConfig;
use tokio::process::Child;
use tracing::{debug, info, warn};

use crate::driver::AutomationDriver;
use crate::error::AutomationError;
use crate::scripts::ScriptOp;

const PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of the worker's page session.
///
/// Called on the worker thread only: `open` once before the command loop,
/// `close` once after it.
#[async_trait]
pub trait SessionBackend: Send {
    async fn open(&mut self, headful: bool) -> Result<Arc<dyn AutomationDriver>, AutomationError>;

    async fn close(&mut self);
}

/// Chrome over CDP with a persistent profile.
pub struct ChromeBackend {
    browser: BrowserConfig,
    client: Option<CdpClient>,
    child: Option<Child>,
    page: Option<Arc<PageSession>>,
}

impl ChromeBackend {
    pub fn new(browser: BrowserConfig) -> Self {
        Self {
            browser,
            client: None,
            child: None,
            page: None,
        }
    }

    async fn connect(&mut self, headful: bool) -> Result<Arc<PageSession>, AutomationError> {
        let launcher = BrowserLauncher::new(launcher_config(&self.browser, headful));
        self.child = launcher.ensure_running().await.map_err(AutomationError::launch)?;
        let client = launcher.connect().await.map_err(AutomationError::launch)?;

        let page = match client.first_page().await.map_err(AutomationError::launch)? {
            Some(info) => {
                debug!("Attaching to existing tab {} ({})", info.id, info.url);
                client.attach_page(&info.id).await
            }
            None => client.new_page(None).await,
        }
        .map_err(AutomationError::launch)?;

        if self.browser.spoof_tablet {
            page.add_init_script(&ScriptOp::SpoofNavigator.render())
                .await
                .map_err(AutomationError::launch)?;
        }

        page.navigate(&self.browser.start_url)
            .await
            .map_err(AutomationError::launch)?;
        if let Err(e) = page.wait_for_load(PAGE_LOAD_TIMEOUT).await {
            warn!("Start page did not finish loading: {}", e);
        }
        page.bring_to_front().await.map_err(AutomationError::launch)?;

        let page = Arc::new(page);
        self.client = Some(client);
        self.page = Some(page.clone());
        Ok(page)
    }
}

#[async_trait]
impl SessionBackend for ChromeBackend {
    async fn open(&mut self, headful: bool) -> Result<Arc<dyn AutomationDriver>, AutomationError> {
        let page = self.connect(headful).await?;
        info!("Gallery page ready at {}", self.browser.start_url);
        Ok(page)
    }

    async fn close(&mut self) {
        self.page = None;
        let client = self.client.take();
        // A browser we did not start belongs to someone else.
        let Some(mut child) = self.child.take() else {
            return;
        };
        if let Some(client) = client {
            if let Err(e) = client.close_browser().await {
                debug!("Browser.close failed: {}", e);
            }
        }
        if let Err(e) = child.kill().await {
            debug!("Chrome already exited: {}", e);
        }
        info!("Browser closed");
    }
}

/// Launcher settings for one session.
fn launcher_config(browser: &BrowserConfig, headful: bool) -> LauncherConfig {
    LauncherConfig {
        debug_port: browser.debug_port,
        profile_dir: Some(browser.profile_path()),
        headless: !headful || browser.headless,
        extra_args: browser.extra_args.clone(),
        chrome_path: browser.chrome_path.clone(),
        ..LauncherConfig::default()
    }
}
