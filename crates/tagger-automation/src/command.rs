//! Commands accepted by the automation worker.

use serde::{Deserialize, Serialize};
use tagger_config::NameBook;

use crate::completion::Completion;

/// Navigation direction in the gallery viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Key the viewer binds to this direction.
    pub fn key(self) -> &'static str {
        match self {
            Direction::Forward => "ArrowRight",
            Direction::Backward => "ArrowLeft",
        }
    }
}

/// One unit of work for the worker. Matched exhaustively in dispatch.
#[derive(Debug)]
pub enum Command {
    Navigate(Direction),
    AppendText(String),
    Backspace,
    DeleteAll,
    CursorToEnd,
    /// Sample the field; the result (or `None`) is posted to the completion.
    ReadDescription(Completion<Option<String>>),
    ReloadNames(NameBook),
    Stop,
}

impl Command {
    /// Short name for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Navigate(Direction::Forward) => "next",
            Command::Navigate(Direction::Backward) => "previous",
            Command::AppendText(_) => "append_text",
            Command::Backspace => "backspace",
            Command::DeleteAll => "delete_all",
            Command::CursorToEnd => "cursor_to_end",
            Command::ReadDescription(_) => "read_description",
            Command::ReloadNames(_) => "reload_names",
            Command::Stop => "stop",
        }
    }
}
