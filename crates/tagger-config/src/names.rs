//! Name-shortcut book loaded from `names.json`.
//!
//! Two layouts are accepted:
//!
//! ```json
//! { "names": ["(D)ennis", "(1) Dennis Laura"], "special_cases": {"Liz": "Elizabeth"} }
//! ["(D)ennis", "(L)aura"]
//! ```

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::ConfigError;

/// Built-in names used when no usable file is found.
pub const DEFAULT_NAMES: [&str; 3] = ["(D)ennis", "(L)aura", "(B)ekah"];

/// Shortcut embedded in a raw label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutMarker {
    /// `(D)ennis`: a single-character key, stored upper-case.
    Key(char),
    /// `(1) Dennis Laura`: a numbered group.
    Group(u32),
}

impl std::fmt::Display for ShortcutMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShortcutMarker::Key(c) => write!(f, "{}", c),
            ShortcutMarker::Group(n) => write!(f, "{}", n),
        }
    }
}

/// One label from the name book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameEntry {
    /// Label as written in the file.
    pub raw: String,
    /// Clean form shown to the user.
    pub display: String,
    /// Text appended when the shortcut fires.
    pub insert_text: String,
    pub shortcut: Option<ShortcutMarker>,
}

impl NameEntry {
    /// Parse a raw label, extracting its marker.
    ///
    /// Numbered groups lose their `(n)` prefix and gain a trailing space;
    /// letter markers only lose the parentheses.
    pub fn parse(raw: &str) -> Self {
        let without_parens: String = raw.chars().filter(|c| !matches!(c, '(' | ')')).collect();

        let (shortcut, insert_text) = if let Some((group, rest)) = split_group_prefix(raw) {
            let rest = rest.trim();
            let text = if rest.is_empty() {
                without_parens.clone()
            } else {
                format!("{} ", rest)
            };
            (Some(ShortcutMarker::Group(group)), text)
        } else if let Some(key) = key_marker(raw) {
            (Some(ShortcutMarker::Key(key)), without_parens.clone())
        } else {
            (None, without_parens.clone())
        };

        Self {
            raw: raw.to_string(),
            display: insert_text.trim().to_string(),
            insert_text,
            shortcut,
        }
    }
}

/// `(12) rest` anywhere in the label, returning the number and the text
/// after a leading marker (or the whole label when the marker is inline).
fn split_group_prefix(raw: &str) -> Option<(u32, &str)> {
    let inline = Regex::new(r"\((\d+)\)").ok()?;
    let caps = inline.captures(raw)?;
    let group = caps[1].parse().ok()?;
    let whole = caps.get(0)?;
    let rest = if whole.start() == 0 {
        &raw[whole.end()..]
    } else {
        raw
    };
    Some((group, rest))
}

fn key_marker(raw: &str) -> Option<char> {
    let re = Regex::new(r"\((.)\)").ok()?;
    let caps = re.captures(raw)?;
    caps[1].chars().next().map(|c| c.to_ascii_uppercase())
}

/// On-disk layouts of the names file.
#[derive(Deserialize)]
#[serde(untagged)]
enum NamesFile {
    Book {
        #[serde(default)]
        names: Vec<Value>,
        #[serde(default)]
        special_cases: HashMap<String, String>,
    },
    List(Vec<Value>),
}

/// Ordered name entries plus the global rename table.
#[derive(Debug, Clone, PartialEq)]
pub struct NameBook {
    pub entries: Vec<NameEntry>,
    pub special_cases: HashMap<String, String>,
}

impl Default for NameBook {
    fn default() -> Self {
        Self {
            entries: DEFAULT_NAMES.iter().map(|raw| NameEntry::parse(raw)).collect(),
            special_cases: HashMap::new(),
        }
    }
}

impl NameBook {
    /// Build a book from raw labels and a rename table.
    pub fn new<I, S>(names: I, special_cases: HashMap<String, String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            entries: names.into_iter().map(|n| NameEntry::parse(n.as_ref())).collect(),
            special_cases,
        }
    }

    /// Parse the JSON contents of a names file.
    ///
    /// Non-string entries are skipped; an empty name list falls back to
    /// [`DEFAULT_NAMES`] while keeping any rename table.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let file: NamesFile = serde_json::from_str(content)?;
        let (values, special_cases) = match file {
            NamesFile::Book {
                names,
                special_cases,
            } => (names, special_cases),
            NamesFile::List(names) => (names, HashMap::new()),
        };

        let mut names = Vec::with_capacity(values.len());
        for value in values {
            match value {
                Value::String(s) if !s.trim().is_empty() => names.push(s),
                other => warn!("Skipping malformed name entry: {}", other),
            }
        }

        if names.is_empty() {
            debug!("Name list empty, using built-in names");
            return Ok(Self {
                special_cases,
                ..Self::default()
            });
        }

        Ok(Self::new(names, special_cases))
    }

    /// Load a names file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        let book = Self::from_json_str(&content)?;
        info!("Loaded {} names from {}", book.entries.len(), path.display());
        for marker in book.duplicate_markers() {
            warn!("Shortcut ({}) is used by more than one name", marker);
        }
        Ok(book)
    }

    /// Load a names file, falling back to the built-in list on any error.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            info!("No names file given, using built-in names");
            return Self::default();
        };
        match Self::load(path) {
            Ok(book) => book,
            Err(e) => {
                warn!("Failed to load {}: {}; using built-in names", path.display(), e);
                Self::default()
            }
        }
    }

    /// Rename target for a scraped label: exact key first, then
    /// case-insensitive.
    pub fn rename(&self, label: &str) -> Option<&str> {
        if let Some(mapped) = self.special_cases.get(label) {
            return Some(mapped);
        }
        let lowered = label.to_lowercase();
        self.special_cases
            .iter()
            .find(|(key, _)| key.to_lowercase() == lowered)
            .map(|(_, mapped)| mapped.as_str())
    }

    /// Entry bound to a key (`"d"`) or group number (`"1"`).
    pub fn shortcut(&self, key: &str) -> Option<&NameEntry> {
        let key = key.trim();
        let wanted = if let Ok(n) = key.parse::<u32>() {
            ShortcutMarker::Group(n)
        } else {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => ShortcutMarker::Key(c.to_ascii_uppercase()),
                _ => return None,
            }
        };
        self.entries.iter().find(|e| e.shortcut == Some(wanted))
    }

    /// Markers claimed by more than one entry, in first-seen order.
    pub fn duplicate_markers(&self) -> Vec<ShortcutMarker> {
        let mut seen = HashSet::new();
        let mut dups = Vec::new();
        for marker in self.entries.iter().filter_map(|e| e.shortcut) {
            if !seen.insert(marker) && !dups.contains(&marker) {
                dups.push(marker);
            }
        }
        dups
    }
}

#[cfg(test)]
#[path = "names_tests.rs"]
mod tests;
