//! Caller-facing handle: start, enqueue, stop.

use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tagger_config::{NameBook, TaggerConfig};
use tracing::{debug, error, info, warn};

use crate::backend::{ChromeBackend, SessionBackend};
use crate::command::{Command, Direction};
use crate::completion::Completion;
use crate::error::AutomationError;
use crate::lock::SessionLock;
use crate::state::{LaunchConfig, Lifecycle, SessionState, SharedState};
use crate::worker::{self, WorkerHandle, WorkerSetup};

const JOIN_POLL: Duration = Duration::from_millis(20);

/// Builds the session backend for each new worker.
pub type BackendFactory = Box<dyn Fn(&TaggerConfig) -> Box<dyn SessionBackend> + Send + Sync>;

/// Owns at most one automation worker.
///
/// Every method takes `&self`; share it behind an `Arc` to drive the
/// session from several threads. Commands from all callers land on one
/// FIFO and run one at a time.
pub struct TaggerController {
    config: TaggerConfig,
    names: Mutex<NameBook>,
    state: SharedState,
    factory: BackendFactory,
    worker: Mutex<Option<WorkerHandle>>,
}

impl TaggerController {
    /// Controller driving Chrome.
    pub fn new(config: TaggerConfig, names: NameBook) -> Self {
        Self::with_backend(
            config,
            names,
            Box::new(|config: &TaggerConfig| {
                Box::new(ChromeBackend::new(config.browser.clone())) as Box<dyn SessionBackend>
            }),
        )
    }

    pub fn with_backend(config: TaggerConfig, names: NameBook, factory: BackendFactory) -> Self {
        Self {
            config,
            names: Mutex::new(names),
            state: SharedState::new(),
            factory,
            worker: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &TaggerConfig {
        &self.config
    }

    /// Start the session and block until the page is ready.
    ///
    /// A profile locked by another browser is logged and leaves the
    /// controller idle; an already running worker is left alone. A worker
    /// still winding down is waited for (up to the stop-join timeout)
    /// before a fresh session starts.
    pub fn start(&self, headful: bool, timeout: Duration) -> Result<(), AutomationError> {
        let ready = {
            let mut slot = self.worker.lock();
            // Our own browser holds the profile lock while a worker runs.
            if let Some(handle) = slot.as_ref().filter(|h| h.is_alive()) {
                if self.state.lifecycle() < Lifecycle::Stopping {
                    debug!("Worker already running");
                    return Ok(());
                }
                debug!("Previous worker is winding down, waiting for it");
                if !wait_finished(handle, self.config.timing.stop_join_timeout()) {
                    return Err(AutomationError::Launch(
                        "previous session is still stopping".to_string(),
                    ));
                }
            }
            let lock = SessionLock::new(self.config.browser.lock_path());
            if lock.is_held() {
                error!(
                    "Browser profile is in use ({}{}); close the other browser first",
                    lock.path().display(),
                    lock.holder().map(|h| format!(" held by {}", h)).unwrap_or_default()
                );
                return Ok(());
            }
            if let Some(finished) = slot.take() {
                finished.join();
            }

            let browser = &self.config.browser;
            let launch = LaunchConfig {
                headful,
                debug_port: browser.debug_port,
                profile_dir: browser.profile_path().display().to_string(),
                start_url: browser.start_url.clone(),
            };
            self.state.begin_session(launch).map_err(|current| {
                AutomationError::Launch(format!("previous session is still {:?}", current))
            })?;

            info!(headful, "Starting automation session");
            let (handle, ready) = worker::spawn(WorkerSetup {
                config: self.config.clone(),
                names: self.names.lock().clone(),
                state: self.state.clone(),
                backend: (self.factory)(&self.config),
                headful,
            })?;
            *slot = Some(handle);
            ready
        };

        match ready.recv_timeout(timeout) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                if let Some(handle) = self.worker.lock().take() {
                    handle.join();
                }
                Err(e)
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!("Session not ready after {:?}, stopping", timeout);
                if let Some(handle) = self.worker.lock().as_ref() {
                    let _ = handle.send(Command::Stop);
                }
                self.state.advance(Lifecycle::Stopping);
                Err(AutomationError::ReadinessTimeout(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(AutomationError::WorkerGone),
        }
    }

    /// Queue a command without waiting for it.
    pub fn enqueue(&self, command: Command) -> Result<(), AutomationError> {
        let slot = self.worker.lock();
        match slot.as_ref() {
            Some(handle) if handle.is_alive() && self.state.lifecycle() < Lifecycle::Stopping => {
                debug!(command = command.name(), "Enqueued");
                handle.send(command)
            }
            _ => Err(AutomationError::NotRunning),
        }
    }

    /// Queue a command carrying a completion and wait up to `timeout` for
    /// its result. `Ok(None)` means the wait timed out.
    pub fn enqueue_sync<T>(
        &self,
        make: impl FnOnce(Completion<T>) -> Command,
        timeout: Duration,
    ) -> Result<Option<T>, AutomationError> {
        let done = Completion::new();
        self.enqueue(make(done.clone()))?;
        let value = done.wait(timeout);
        if value.is_none() {
            warn!("No reply within {:?}", timeout);
        }
        Ok(value)
    }

    /// Stop the worker and wait a bounded time for it to exit.
    pub fn stop(&self) {
        let Some(handle) = self.worker.lock().take() else {
            return;
        };
        let _ = handle.send(Command::Stop);
        self.state.advance(Lifecycle::Stopping);

        if wait_finished(&handle, self.config.timing.stop_join_timeout()) {
            handle.join();
        } else {
            warn!(
                "Worker still busy after {:?}; leaving it to finish",
                self.config.timing.stop_join_timeout()
            );
        }
    }

    pub fn go_to_next(&self) -> Result<(), AutomationError> {
        self.enqueue(Command::Navigate(Direction::Forward))
    }

    pub fn go_to_previous(&self) -> Result<(), AutomationError> {
        self.enqueue(Command::Navigate(Direction::Backward))
    }

    pub fn append_text(&self, text: impl Into<String>) -> Result<(), AutomationError> {
        self.enqueue(Command::AppendText(text.into()))
    }

    pub fn send_backspace(&self) -> Result<(), AutomationError> {
        self.enqueue(Command::Backspace)
    }

    pub fn delete_all(&self) -> Result<(), AutomationError> {
        self.enqueue(Command::DeleteAll)
    }

    pub fn cursor_to_end(&self) -> Result<(), AutomationError> {
        self.enqueue(Command::CursorToEnd)
    }

    /// Current description text; `None` on timeout or when no field is
    /// visible.
    pub fn read_description(&self, timeout: Duration) -> Result<Option<String>, AutomationError> {
        Ok(self.enqueue_sync(Command::ReadDescription, timeout)?.flatten())
    }

    /// Replace the name book, for this session and the next.
    pub fn reload_names(&self, names: NameBook) -> Result<(), AutomationError> {
        *self.names.lock() = names.clone();
        match self.enqueue(Command::ReloadNames(names)) {
            Err(AutomationError::NotRunning) => {
                debug!("No session running, names stored for the next start");
                Ok(())
            }
            other => other,
        }
    }

    /// Append the name bound to a shortcut key. Returns the name, or
    /// `None` when nothing is bound to `key`.
    pub fn insert_name(&self, key: &str) -> Result<Option<String>, AutomationError> {
        let entry = self.names.lock().shortcut(key).cloned();
        let Some(entry) = entry else {
            debug!(key, "No name bound to key");
            return Ok(None);
        };
        self.append_text(entry.insert_text)?;
        Ok(Some(entry.display))
    }

    pub fn names(&self) -> NameBook {
        self.names.lock().clone()
    }

    pub fn state(&self) -> SessionState {
        self.state.snapshot()
    }

    pub fn is_running(&self) -> bool {
        let alive = self.worker.lock().as_ref().is_some_and(WorkerHandle::is_alive);
        alive && matches!(self.state.lifecycle(), Lifecycle::Starting | Lifecycle::Ready)
    }
}

/// Poll until the worker thread has exited or `timeout` elapses.
fn wait_finished(handle: &WorkerHandle, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while !handle.is_finished() && Instant::now() < deadline {
        std::thread::sleep(JOIN_POLL);
    }
    handle.is_finished()
}

impl Drop for TaggerController {
    fn drop(&mut self) {
        if let Some(handle) = self.worker.get_mut().take() {
            let _ = handle.send(Command::Stop);
            self.state.advance(Lifecycle::Stopping);
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
