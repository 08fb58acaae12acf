//! Session state shared between the worker and callers.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

/// Session lifecycle. Only moves forward within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    NotStarted,
    Starting,
    Ready,
    Stopping,
    Stopped,
}

impl Lifecycle {
    /// Whether a fresh session may be started from here.
    pub fn can_start(self) -> bool {
        matches!(self, Lifecycle::NotStarted | Lifecycle::Stopped)
    }
}

/// Settings a session was launched with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchConfig {
    pub headful: bool,
    pub debug_port: u16,
    pub profile_dir: String,
    pub start_url: String,
}

/// Snapshot of the automation session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    pub lifecycle: Lifecycle,
    pub last_known_location: Option<String>,
    pub last_known_text: Option<String>,
    pub launch_config: Option<LaunchConfig>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            lifecycle: Lifecycle::NotStarted,
            last_known_location: None,
            last_known_text: None,
            launch_config: None,
        }
    }
}

/// Cloneable handle to the one [`SessionState`] of a controller.
///
/// The worker writes, anyone reads a cloned snapshot.
#[derive(Debug, Clone, Default)]
pub struct SharedState {
    inner: Arc<RwLock<SessionState>>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> SessionState {
        self.inner.read().clone()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.inner.read().lifecycle
    }

    /// Mutate under the write lock.
    pub fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        f(&mut self.inner.write())
    }

    /// Move the lifecycle forward; backward moves are ignored.
    ///
    /// Returns whether the state changed.
    pub fn advance(&self, next: Lifecycle) -> bool {
        let mut state = self.inner.write();
        if next > state.lifecycle {
            state.lifecycle = next;
            true
        } else {
            false
        }
    }

    /// Reset for a new session and enter `Starting`.
    ///
    /// Fails (returning the current lifecycle) unless the previous session
    /// never started or has fully stopped.
    pub fn begin_session(&self, launch: LaunchConfig) -> Result<(), Lifecycle> {
        let mut state = self.inner.write();
        if !state.lifecycle.can_start() {
            return Err(state.lifecycle);
        }
        *state = SessionState {
            lifecycle: Lifecycle::Starting,
            launch_config: Some(launch),
            ..SessionState::default()
        };
        Ok(())
    }

    pub fn set_text(&self, text: Option<String>) {
        self.inner.write().last_known_text = text;
    }

    pub fn set_location(&self, location: Option<String>) {
        self.inner.write().last_known_location = location;
    }
}
