/// Single-line entry with coalescing undo/redo.
///
/// An `Entry` owns an `EntryBuffer` (text, caret, notification block) and an
/// `UndoEngine`. Every edit takes the same path: validate, report to the
/// engine unless notifications are blocked, then apply. Undo/redo hand the
/// buffer to the engine, which blocks notifications while it swaps content.
use anyhow::{Context, Result};
use undo_entry_mod_history::{
    EditEvent, HistoryConfig, Inhibited, Snapshot, TextHost, UndoEngine,
};

use crate::buffer::TextBuffer;

/// Entry text plus caret, implementing the host side of the undo contract.
#[derive(Debug, Clone, Default)]
pub struct EntryBuffer {
    text: TextBuffer,
    caret: usize,
    /// Nesting depth of `block_notifications` calls.
    blocked: usize,
}

impl EntryBuffer {
    /// Creates a buffer holding `text` with the caret at the start.
    pub fn new(text: &str) -> Self {
        Self {
            text: TextBuffer::from(text),
            caret: 0,
            blocked: 0,
        }
    }

    /// Returns the underlying text (read-only).
    pub fn text(&self) -> &TextBuffer {
        &self.text
    }

    /// Whether edits are currently kept from reaching the undo engine.
    pub fn notifications_blocked(&self) -> bool {
        self.blocked > 0
    }

    /// Fails unless `event` can be applied to the current content.
    pub fn validate(&self, event: &EditEvent) -> Result<()> {
        match event {
            EditEvent::Insert { offset, .. } => self.text.check_offset(*offset),
            EditEvent::Delete { start, end } => self.text.check_range(*start, *end),
        }
    }

    /// Applies `event` and moves the caret along with the text around it.
    ///
    /// The caret shifts right only when it sits strictly after an insert
    /// point; a caret inside or after a deleted range moves left.
    ///
    /// # Errors
    ///
    /// Returns an error if the event is out of bounds.
    pub fn apply(&mut self, event: &EditEvent) -> Result<()> {
        match event {
            EditEvent::Insert { offset, text } => {
                self.text.insert(*offset, text)?;
                if self.caret > *offset {
                    self.caret += text.chars().count();
                }
            }
            EditEvent::Delete { start, end } => {
                self.text.remove(*start, *end)?;
                if self.caret > *start {
                    self.caret -= self.caret.min(*end) - start;
                }
            }
        }
        Ok(())
    }
}

impl TextHost for EntryBuffer {
    fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    fn read(&self, start: usize, end: Option<usize>) -> Result<String> {
        let end = end.unwrap_or_else(|| self.text.len_chars());
        Ok(self.text.slice(start, end)?.to_string())
    }

    fn caret(&self) -> usize {
        self.caret
    }

    fn set_caret(&mut self, offset: usize) -> Result<()> {
        if offset > self.text.len_chars() {
            anyhow::bail!(
                "caret {} out of bounds (buffer has {} chars)",
                offset,
                self.text.len_chars()
            );
        }
        self.caret = offset;
        Ok(())
    }

    fn replace_all(&mut self, text: &str) -> Result<()> {
        let len = self.text.len_chars();
        self.apply(&EditEvent::Delete { start: 0, end: len })?;
        self.apply(&EditEvent::Insert {
            offset: 0,
            text: text.to_string(),
        })
    }

    fn block_notifications(&mut self) {
        self.blocked += 1;
    }

    fn unblock_notifications(&mut self) {
        self.blocked = self.blocked.saturating_sub(1);
    }
}

/// A text entry whose edits are tracked for undo/redo.
#[derive(Debug)]
pub struct Entry {
    buffer: EntryBuffer,
    undo: UndoEngine,
}

impl Default for Entry {
    fn default() -> Self {
        Self::new()
    }
}

impl Entry {
    /// Creates an empty entry with undo enabled.
    pub fn new() -> Self {
        Self::with_config(HistoryConfig::default(), true)
    }

    /// Creates an empty entry with the given history settings.
    pub fn with_config(config: HistoryConfig, undo_enabled: bool) -> Self {
        let undo = if undo_enabled {
            UndoEngine::new(config)
        } else {
            UndoEngine::disabled(config)
        };
        Self {
            buffer: EntryBuffer::default(),
            undo,
        }
    }

    /// Current content.
    pub fn text(&self) -> String {
        self.buffer.text().to_string()
    }

    pub fn len_chars(&self) -> usize {
        self.buffer.len_chars()
    }

    pub fn caret(&self) -> usize {
        self.buffer.caret()
    }

    pub fn buffer(&self) -> &EntryBuffer {
        &self.buffer
    }

    /// The undo engine (read-only).
    pub fn history(&self) -> &UndoEngine {
        &self.undo
    }

    /// Current content and caret as a snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.text(), self.caret())
    }

    /// Moves the caret. Caret moves alone are not edits.
    ///
    /// # Errors
    ///
    /// Returns an error if `offset` is past the end of the text.
    pub fn set_caret(&mut self, offset: usize) -> Result<()> {
        self.buffer.set_caret(offset)
    }

    fn edit(&mut self, event: EditEvent) -> Result<()> {
        self.buffer.validate(&event)?;
        if self.undo.is_enabled() && !self.buffer.notifications_blocked() {
            self.undo
                .notify(&self.buffer, &event)
                .context("Failed to record edit")?;
        }
        self.buffer.apply(&event)
    }

    /// Inserts `text` at `offset`. Empty inserts are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if `offset` is past the end of the text.
    pub fn insert_text(&mut self, offset: usize, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.edit(EditEvent::Insert {
            offset,
            text: text.to_string(),
        })
    }

    /// Deletes `[start, end)`; `end = None` deletes to the end of the text.
    /// Empty ranges are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is invalid.
    pub fn delete_text(&mut self, start: usize, end: Option<usize>) -> Result<()> {
        let end = end.unwrap_or_else(|| self.len_chars());
        if start == end {
            return Ok(());
        }
        self.edit(EditEvent::Delete { start, end })
    }

    /// Types `text` one keystroke per char at the caret.
    ///
    /// # Errors
    ///
    /// Returns an error if an insert cannot be recorded.
    pub fn type_text(&mut self, text: &str) -> Result<()> {
        let mut utf8 = [0u8; 4];
        for ch in text.chars() {
            let offset = self.caret();
            self.insert_text(offset, ch.encode_utf8(&mut utf8))?;
            self.buffer.set_caret(offset + 1)?;
        }
        Ok(())
    }

    /// Inserts `text` at the caret in one edit and moves the caret after it.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert cannot be recorded.
    pub fn paste(&mut self, text: &str) -> Result<()> {
        let offset = self.caret();
        self.insert_text(offset, text)?;
        self.buffer.set_caret(offset + text.chars().count())
    }

    /// Deletes the char before the caret. Returns false at the start of the
    /// text.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete cannot be recorded.
    pub fn backspace(&mut self) -> Result<bool> {
        let caret = self.caret();
        if caret == 0 {
            return Ok(false);
        }
        self.delete_text(caret - 1, Some(caret))?;
        Ok(true)
    }

    /// Deletes the char after the caret. Returns false at the end of the
    /// text.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete cannot be recorded.
    pub fn delete_forward(&mut self) -> Result<bool> {
        let caret = self.caret();
        if caret >= self.len_chars() {
            return Ok(false);
        }
        self.delete_text(caret, Some(caret + 1))?;
        Ok(true)
    }

    /// Deletes all text as a single undoable edit.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete cannot be recorded.
    pub fn clear(&mut self) -> Result<()> {
        self.delete_text(0, None)
    }

    /// Replaces the content without recording it and drops the undo history,
    /// which no longer matches the text. The caret ends up at the start.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer rejects the text.
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        {
            let mut buffer = Inhibited::new(&mut self.buffer);
            buffer.replace_all(text)?;
        }
        self.undo.reset();
        tracing::debug!(chars = self.len_chars(), "Entry text replaced, undo history reset");
        Ok(())
    }

    /// Turns undo tracking on or off. Turning it off drops the history.
    pub fn set_undo(&mut self, enabled: bool) {
        self.undo.set_enabled(enabled);
    }

    pub fn undo_enabled(&self) -> bool {
        self.undo.is_enabled()
    }

    /// Undoes the most recent group. Returns false if there was nothing to
    /// undo.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer could not be restored.
    pub fn undo(&mut self) -> Result<bool> {
        self.undo.undo(&mut self.buffer)
    }

    /// Redoes the most recently undone group. Returns false if there was
    /// nothing to redo.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer could not be restored.
    pub fn redo(&mut self) -> Result<bool> {
        self.undo.redo(&mut self.buffer)
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    /// Drops the undo history without touching the text.
    pub fn reset_undo(&mut self) {
        self.undo.reset();
    }
}
