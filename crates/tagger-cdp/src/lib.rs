//! Chrome DevTools Protocol plumbing for Gallery Tagger.
//!
//! A small pure-Rust CDP client: one WebSocket to the browser, flattened
//! sessions per page target, and the handful of `Runtime`/`Input`/`Page`
//! commands the automation worker needs.
//!
//! ```text
//! ┌─────────────────┐    WebSocket     ┌──────────────────┐
//! │ tagger worker   │ ◄──────────────► │   Chrome/Edge    │
//! │  (this crate)   │       CDP        │ (gallery viewer) │
//! └─────────────────┘                  └──────────────────┘
//! ```
//!
//! [`BrowserLauncher`] starts Chrome with a persistent profile and a
//! remote-debugging port when one is not already listening.
//!
//! ```rust,ignore
//! let launcher = BrowserLauncher::new(LauncherConfig::default());
//! let child = launcher.ensure_running().await?;
//! let client = launcher.connect().await?;
//! let page = client.new_page(Some("https://photos.google.com")).await?;
//! page.press_key("ArrowRight").await?;
//! ```

mod client;
mod error;
mod launcher;
mod protocol;
mod session;

pub use client::CdpClient;
pub use error::CdpError;
pub use launcher::{BrowserLauncher, LauncherConfig};
pub use protocol::*;
pub use session::PageSession;
