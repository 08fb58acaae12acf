//! # Gallery Tagger Config
//!
//! TOML settings for the browser session, page selectors and timing, plus
//! the `names.json` shortcut book consumed by the injection pipeline.

mod error;
mod loader;
mod names;
mod schema;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use names::{NameBook, NameEntry, ShortcutMarker, DEFAULT_NAMES};
pub use schema::*;
