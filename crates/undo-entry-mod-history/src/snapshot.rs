/// Whole-buffer snapshots stored on the undo/redo stacks.
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::host::TextHost;

/// Buffer content and caret at one group boundary.
///
/// Snapshots are plain values; nothing in them points back into the host.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Full buffer content.
    pub text: String,
    /// Caret offset in chars, at most `text.chars().count()`.
    pub caret: usize,
}

impl Snapshot {
    pub fn new(text: impl Into<String>, caret: usize) -> Self {
        Self {
            text: text.into(),
            caret,
        }
    }

    /// Reads the full content and caret of `host`.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot read its own content.
    pub fn capture<H: TextHost + ?Sized>(host: &H) -> Result<Self> {
        let text = host
            .read(0, None)
            .context("Failed to read buffer for snapshot")?;
        Ok(Self {
            text,
            caret: host.caret(),
        })
    }
}
