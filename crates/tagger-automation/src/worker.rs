//! The thread that owns the page session and drains the command FIFO.

use std::any::Any;
use std::ops::ControlFlow;
use std::panic::AssertUnwindSafe;
use std::sync::mpsc as std_mpsc;
use std::thread::JoinHandle;

use futures::FutureExt;
use tagger_config::{NameBook, TaggerConfig};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::backend::SessionBackend;
use crate::command::Command;
use crate::error::AutomationError;
use crate::page::PageAutomation;
use crate::state::{Lifecycle, SharedState};

pub(crate) type ReadySignal = std_mpsc::Receiver<Result<(), AutomationError>>;

/// Caller-side handle of a running worker.
pub(crate) struct WorkerHandle {
    tx: mpsc::UnboundedSender<Command>,
    thread: JoinHandle<()>,
}

impl WorkerHandle {
    /// Append to the FIFO without blocking.
    pub(crate) fn send(&self, command: Command) -> Result<(), AutomationError> {
        self.tx.send(command).map_err(|_| AutomationError::WorkerGone)
    }

    pub(crate) fn is_alive(&self) -> bool {
        !self.thread.is_finished()
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    pub(crate) fn join(self) {
        if self.thread.join().is_err() {
            error!("Automation worker panicked");
        }
    }
}

/// Everything the worker thread takes ownership of.
pub(crate) struct WorkerSetup {
    pub config: TaggerConfig,
    pub names: NameBook,
    pub state: SharedState,
    pub backend: Box<dyn SessionBackend>,
    pub headful: bool,
}

/// Spawn the worker; the returned signal fires once the page is ready or
/// the launch failed.
pub(crate) fn spawn(setup: WorkerSetup) -> Result<(WorkerHandle, ReadySignal), AutomationError> {
    let (tx, rx) = mpsc::unbounded_channel();
    let (ready_tx, ready_rx) = std_mpsc::sync_channel(1);
    let state = setup.state.clone();

    let thread = std::thread::Builder::new()
        .name("tagger-worker".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(e) => {
                    let _ = ready_tx.send(Err(AutomationError::launch(e)));
                    setup.state.advance(Lifecycle::Stopped);
                    return;
                }
            };
            runtime.block_on(run(setup, rx, ready_tx));
        })
        .map_err(|e| {
            state.advance(Lifecycle::Stopped);
            AutomationError::launch(e)
        })?;

    Ok((WorkerHandle { tx, thread }, ready_rx))
}

async fn run(
    setup: WorkerSetup,
    mut rx: mpsc::UnboundedReceiver<Command>,
    ready_tx: std_mpsc::SyncSender<Result<(), AutomationError>>,
) {
    let WorkerSetup {
        config,
        names,
        state,
        mut backend,
        headful,
    } = setup;

    match backend.open(headful).await {
        Ok(driver) => {
            if state.advance(Lifecycle::Ready) {
                info!("Automation session ready");
            }
            let _ = ready_tx.send(Ok(()));
            let mut page = PageAutomation::new(driver, &config, names, state.clone());
            command_loop(&mut page, &mut rx, &config).await;
        }
        Err(e) => {
            error!("Failed to open browser session: {}", e);
            let _ = ready_tx.send(Err(e));
        }
    }

    backend.close().await;
    state.advance(Lifecycle::Stopped);
    info!("Automation worker stopped");
}

async fn command_loop(page: &mut PageAutomation, rx: &mut mpsc::UnboundedReceiver<Command>, config: &TaggerConfig) {
    let poll = config.timing.poll_interval();
    loop {
        match timeout(poll, rx.recv()).await {
            Ok(Some(command)) => {
                let name = command.name();
                match AssertUnwindSafe(dispatch(page, command)).catch_unwind().await {
                    Ok(ControlFlow::Break(())) => {
                        debug!("Stop received");
                        return;
                    }
                    Ok(ControlFlow::Continue(())) => {}
                    Err(panic) => error!(command = name, "Command panicked: {}", panic_message(&*panic)),
                }
            }
            Ok(None) => {
                debug!("All command senders dropped");
                return;
            }
            Err(_) => {}
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        *msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic"
    }
}

/// Run one command; failures are logged and the loop goes on.
async fn dispatch(page: &mut PageAutomation, command: Command) -> ControlFlow<()> {
    let name = command.name();
    debug!(command = name, "Dispatching");

    let result = match command {
        Command::Navigate(direction) => page.navigate(direction).await.map(|_| ()),
        Command::AppendText(text) => page.append_text(&text).await,
        Command::Backspace => page.backspace().await,
        Command::DeleteAll => page.delete_all().await,
        Command::CursorToEnd => page.cursor_to_end().await,
        Command::ReadDescription(done) => {
            let result = page.read_description().await;
            let text = result.as_ref().ok().cloned().flatten();
            done.complete(text);
            result.map(|_| ())
        }
        Command::ReloadNames(names) => {
            info!("Reloaded {} names", names.entries.len());
            page.set_names(names);
            Ok(())
        }
        Command::Stop => return ControlFlow::Break(()),
    };

    if let Err(e) = result {
        if e.is_benign() {
            warn!(command = name, "{}", e);
        } else {
            error!(command = name, "{}", e);
        }
    }
    ControlFlow::Continue(())
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
