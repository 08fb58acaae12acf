//! Chrome discovery and launch with a persistent profile.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::{info, warn};

use crate::client::CdpClient;
use crate::error::CdpError;

/// How Chrome is started when no debugging endpoint is listening.
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    /// Chrome debugging port.
    pub debug_port: u16,
    /// Profile directory for persistent login state.
    pub profile_dir: Option<PathBuf>,
    /// Whether to run Chrome in headless mode.
    pub headless: bool,
    /// Extra command-line switches appended after the built-in ones.
    pub extra_args: Vec<String>,
    /// Explicit browser binary; searched for when unset.
    pub chrome_path: Option<PathBuf>,
    /// How long to wait for the debugging port after spawning.
    pub startup_timeout: Duration,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            debug_port: 9222,
            profile_dir: None,
            headless: false,
            extra_args: Vec::new(),
            chrome_path: None,
            startup_timeout: Duration::from_secs(6),
        }
    }
}

impl LauncherConfig {
    /// Get the profile directory, falling back to `~/.googlephotos_profile`.
    pub fn get_profile_dir(&self) -> PathBuf {
        self.profile_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".googlephotos_profile")
        })
    }

    /// Get the CDP endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("http://127.0.0.1:{}", self.debug_port)
    }

    /// Full Chrome command line (without the binary).
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--remote-debugging-port={}", self.debug_port),
            format!("--user-data-dir={}", self.get_profile_dir().display()),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-sync".to_string(),
            "--disable-translate".to_string(),
        ];
        if self.headless {
            args.push("--headless=new".to_string());
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

/// Starts (or finds) a debuggable Chrome and connects to it.
pub struct BrowserLauncher {
    config: LauncherConfig,
}

impl BrowserLauncher {
    /// Create a launcher.
    pub fn new(config: LauncherConfig) -> Self {
        Self { config }
    }

    /// Launcher settings.
    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    /// Find Chrome executable path.
    pub fn find_chrome() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            let paths = [
                "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
                "/Applications/Chromium.app/Contents/MacOS/Chromium",
                "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
            ];
            for path in &paths {
                let p = PathBuf::from(path);
                if p.exists() {
                    return Some(p);
                }
            }
        }

        #[cfg(target_os = "linux")]
        {
            let paths = [
                "/usr/bin/google-chrome",
                "/usr/bin/google-chrome-stable",
                "/usr/bin/chromium",
                "/usr/bin/chromium-browser",
                "/snap/bin/chromium",
            ];
            for path in &paths {
                let p = PathBuf::from(path);
                if p.exists() {
                    return Some(p);
                }
            }
        }

        #[cfg(target_os = "windows")]
        {
            let paths = [
                r"C:\Program Files\Google\Chrome\Application\chrome.exe",
                r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            ];
            for path in &paths {
                let p = PathBuf::from(path);
                if p.exists() {
                    return Some(p);
                }
            }
        }

        None
    }

    /// Check if Chrome is already listening on the debug port.
    pub async fn is_running(&self) -> bool {
        match url::Url::parse(&self.config.endpoint()) {
            Ok(endpoint) => CdpClient::fetch_version(&endpoint).await.is_ok(),
            Err(_) => false,
        }
    }

    /// Spawn Chrome with remote debugging enabled.
    ///
    /// The child is killed when its handle is dropped.
    pub async fn launch(&self) -> Result<Child, CdpError> {
        let chrome_path = self
            .config
            .chrome_path
            .clone()
            .or_else(Self::find_chrome)
            .ok_or(CdpError::ChromeNotFound)?;
        let profile_dir = self.config.get_profile_dir();

        if let Err(e) = std::fs::create_dir_all(&profile_dir) {
            warn!("Failed to create profile directory: {}", e);
        }

        info!("Launching Chrome with profile at: {}", profile_dir.display());

        let child = Command::new(&chrome_path)
            .args(self.config.args())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CdpError::LaunchFailed(e.to_string()))?;

        info!("Chrome launched with PID: {:?}", child.id());
        Ok(child)
    }

    /// Launch Chrome unless something already serves the debug port.
    ///
    /// Returns the child only when this call spawned it.
    pub async fn ensure_running(&self) -> Result<Option<Child>, CdpError> {
        if self.is_running().await {
            info!("Chrome already running on port {}", self.config.debug_port);
            return Ok(None);
        }

        info!("Chrome not running on port {}, launching...", self.config.debug_port);
        let mut child = self.launch().await?;

        let step = Duration::from_millis(200);
        let deadline = tokio::time::Instant::now() + self.config.startup_timeout;
        loop {
            tokio::time::sleep(step).await;
            if self.is_running().await {
                return Ok(Some(child));
            }
            if let Ok(Some(status)) = child.try_wait() {
                return Err(CdpError::LaunchFailed(format!(
                    "Chrome exited during startup ({})",
                    status
                )));
            }
            if tokio::time::Instant::now() >= deadline {
                let _ = child.kill().await;
                return Err(CdpError::LaunchFailed(
                    "Chrome failed to start within timeout".to_string(),
                ));
            }
        }
    }

    /// Connect a CDP client to the configured endpoint.
    pub async fn connect(&self) -> Result<CdpClient, CdpError> {
        let client = CdpClient::connect(&self.config.endpoint()).await?;
        info!("Connected to Chrome at {}", self.config.endpoint());
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LauncherConfig::default();
        assert_eq!(config.debug_port, 9222);
        assert!(!config.headless);
        assert_eq!(config.endpoint(), "http://127.0.0.1:9222");
    }

    #[test]
    fn test_default_profile_dir() {
        let config = LauncherConfig::default();
        assert!(config.get_profile_dir().ends_with(".googlephotos_profile"));
    }

    #[test]
    fn test_args_include_profile_and_extras() {
        let dir = tempfile::tempdir().unwrap();
        let config = LauncherConfig {
            debug_port: 9333,
            profile_dir: Some(dir.path().to_path_buf()),
            headless: true,
            extra_args: vec!["--disable-blink-features=AutomationControlled".to_string()],
            ..Default::default()
        };
        let args = config.args();
        assert_eq!(args[0], "--remote-debugging-port=9333");
        assert_eq!(args[1], format!("--user-data-dir={}", dir.path().display()));
        assert!(args.contains(&"--headless=new".to_string()));
        assert_eq!(
            args.last().map(String::as_str),
            Some("--disable-blink-features=AutomationControlled")
        );
    }

    #[tokio::test]
    async fn test_missing_binary_fails_to_launch() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = BrowserLauncher::new(LauncherConfig {
            chrome_path: Some(dir.path().join("no-such-chrome")),
            profile_dir: Some(dir.path().join("profile")),
            ..Default::default()
        });
        let err = launcher.launch().await.unwrap_err();
        assert!(matches!(err, CdpError::LaunchFailed(_)));
    }
}
