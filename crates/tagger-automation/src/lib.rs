//! # Gallery Tagger Automation
//!
//! One worker thread owns the browser page. Callers enqueue [`Command`]s on
//! a FIFO and read [`SessionState`] snapshots; the worker resolves the live
//! description field, moves the caret, guards panel scrolling and runs the
//! name-injection pass after every navigation.
//!
//! ```text
//! caller threads ──enqueue──► [ FIFO ] ──► worker thread (current-thread runtime)
//!       ▲                                     │
//!       └──────── SessionState snapshot ◄─────┤ PageAutomation
//!                                             │  ├─ TargetResolver
//!                                             │  ├─ cursor / ScrollGuard
//!                                             │  ├─ sampler / injection
//!                                             │  └─ navigation
//!                                             ▼
//!                                      AutomationDriver (CDP page)
//! ```

mod backend;
mod command;
mod completion;
mod controller;
mod cursor;
mod driver;
mod editing;
mod error;
mod injection;
mod lock;
mod navigation;
mod page;
mod resolver;
mod sampler;
mod scripts;
mod scroll_guard;
mod state;
mod worker;

#[cfg(test)]
mod testing;

pub use backend::{ChromeBackend, SessionBackend};
pub use command::{Command, Direction};
pub use completion::Completion;
pub use controller::{BackendFactory, TaggerController};
pub use driver::AutomationDriver;
pub use error::AutomationError;
pub use injection::{RunningDescriptionBuffer, is_metadata_label, normalize_whitespace, plan_injection};
pub use lock::SessionLock;
pub use navigation::{NavPhase, NavigationReport};
pub use page::PageAutomation;
pub use resolver::{CandidateElement, Rect, TargetResolver, Viewport};
pub use scripts::{PageScripts, ScriptOp};
pub use scroll_guard::{ScrollFreeze, ScrollGuard};
pub use state::{LaunchConfig, Lifecycle, SessionState, SharedState};
