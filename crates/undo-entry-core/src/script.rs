/// Editing sessions described as data.
///
/// An `EditScript` is a starting text plus a list of user-level actions
/// (typing, backspace, paste, undo, ...). Scripts are read from JSON and
/// replayed against an `Entry`.
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::entry::Entry;

fn one() -> usize {
    1
}

/// A single user-level action on an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Type each char as a separate keystroke.
    Type { text: String },
    /// Insert the whole text at the caret at once.
    Paste { text: String },
    Backspace {
        #[serde(default = "one")]
        count: usize,
    },
    DeleteForward {
        #[serde(default = "one")]
        count: usize,
    },
    MoveCaret { to: usize },
    /// Programmatic insert; the caret only moves if it sits after `offset`.
    Insert { offset: usize, text: String },
    /// Programmatic delete; a missing `end` means the end of the text.
    Delete {
        start: usize,
        #[serde(default)]
        end: Option<usize>,
    },
    Clear,
    /// Replace the text and drop the undo history.
    SetText { text: String },
    Undo,
    Redo,
    SetUndo { enabled: bool },
}

impl Action {
    /// Performs this action on `entry`.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry rejects the edit (e.g. an offset out of
    /// bounds).
    pub fn apply(&self, entry: &mut Entry) -> Result<()> {
        match self {
            Action::Type { text } => entry.type_text(text)?,
            Action::Paste { text } => entry.paste(text)?,
            Action::Backspace { count } => {
                for _ in 0..*count {
                    if !entry.backspace()? {
                        break;
                    }
                }
            }
            Action::DeleteForward { count } => {
                for _ in 0..*count {
                    if !entry.delete_forward()? {
                        break;
                    }
                }
            }
            Action::MoveCaret { to } => entry.set_caret(*to)?,
            Action::Insert { offset, text } => entry.insert_text(*offset, text)?,
            Action::Delete { start, end } => entry.delete_text(*start, *end)?,
            Action::Clear => entry.clear()?,
            Action::SetText { text } => entry.set_text(text)?,
            Action::Undo => {
                entry.undo()?;
            }
            Action::Redo => {
                entry.redo()?;
            }
            Action::SetUndo { enabled } => entry.set_undo(*enabled),
        }
        Ok(())
    }
}

/// Starting text plus the actions to perform on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditScript {
    /// Loaded with `set_text`, so it is never part of the undo history.
    pub initial: String,
    pub actions: Vec<Action>,
}

impl EditScript {
    /// Parses a script from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a script.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse edit script")
    }

    /// Reads a script from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        Self::from_json(&contents).with_context(|| format!("Invalid script {}", path.display()))
    }

    /// Loads the initial text into `entry` and performs every action.
    ///
    /// # Errors
    ///
    /// Stops at the first failing action and reports its 1-based index.
    pub fn run(&self, entry: &mut Entry) -> Result<()> {
        self.run_with(entry, |_, _, _| {})
    }

    /// Like [`run`](Self::run), calling `on_step` after every action.
    ///
    /// # Errors
    ///
    /// Stops at the first failing action and reports its 1-based index.
    pub fn run_with<F>(&self, entry: &mut Entry, mut on_step: F) -> Result<()>
    where
        F: FnMut(usize, &Action, &Entry),
    {
        entry
            .set_text(&self.initial)
            .context("Failed to load initial text")?;
        for (i, action) in self.actions.iter().enumerate() {
            tracing::trace!(step = i + 1, ?action, "Applying action");
            action
                .apply(entry)
                .with_context(|| format!("Action {} ({action:?}) failed", i + 1))?;
            on_step(i + 1, action, &*entry);
        }
        Ok(())
    }
}
