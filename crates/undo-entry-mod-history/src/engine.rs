/// Coalescing undo/redo engine.
///
/// The host reports every insert and delete right before applying it. The
/// engine decides per edit whether it continues the current undo group or
/// opens a new one; opening a group pushes a snapshot of the pre-edit buffer.
/// Undo and redo swap whole-buffer snapshots between the two stacks.
use anyhow::{anyhow, Context, Result};

use crate::config::HistoryConfig;
use crate::host::{EditEvent, Inhibited, TextHost};
use crate::snapshot::Snapshot;

/// Stacks and coalescing state. Only exists while tracking is enabled.
#[derive(Debug, Default)]
struct UndoState {
    /// Undo stack, oldest first.
    history: Vec<Snapshot>,
    /// Redo stack, most recently undone on top.
    redo_history: Vec<Snapshot>,
    /// Caret the next insert needs to continue the current group.
    insert_anchor: Option<usize>,
    /// Caret the next delete needs to continue the current group.
    delete_anchor: Option<usize>,
    /// Whether the last tracked edit inserted or removed a single space.
    last_was_space: bool,
}

impl UndoState {
    fn clear_anchors(&mut self) {
        self.insert_anchor = None;
        self.delete_anchor = None;
    }

    /// Pushes a group boundary and drops the oldest groups past `max_depth`.
    fn open_group(&mut self, snapshot: Snapshot, max_depth: usize) {
        self.history.push(snapshot);
        self.redo_history.clear();
        trim_to_depth(&mut self.history, max_depth);
    }
}

/// Whether an edit with `text` (of `len` chars) at `caret` must start a new
/// group instead of extending the one anchored at `anchor`.
fn breaks_group(
    anchor: Option<usize>,
    caret: usize,
    last_was_space: bool,
    text: &str,
    len: usize,
) -> bool {
    anchor != Some(caret) || (last_was_space && text != " ") || len > 1
}

fn trim_to_depth(stack: &mut Vec<Snapshot>, max_depth: usize) {
    if stack.len() > max_depth {
        let excess = stack.len() - max_depth;
        stack.drain(..excess);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Undo,
    Redo,
}

/// Undo/redo history for a single text entry.
///
/// Each entry owns its own engine. Tracking can be switched off with
/// [`disable`](Self::disable), which drops all history.
pub struct UndoEngine {
    config: HistoryConfig,
    state: Option<UndoState>,
}

impl std::fmt::Debug for UndoEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoEngine")
            .field("enabled", &self.is_enabled())
            .field("undo_len", &self.undo_depth())
            .field("redo_len", &self.redo_depth())
            .field("max_history_depth", &self.config.max_history_depth)
            .finish()
    }
}

impl Default for UndoEngine {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl UndoEngine {
    /// Creates an engine with tracking enabled and empty history.
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            config,
            state: Some(UndoState::default()),
        }
    }

    /// Creates an engine with tracking disabled.
    pub fn disabled(config: HistoryConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Whether edits are currently being tracked.
    pub fn is_enabled(&self) -> bool {
        self.state.is_some()
    }

    /// Starts tracking with empty history. No-op if already enabled.
    pub fn enable(&mut self) {
        if self.state.is_none() {
            tracing::debug!("Undo tracking enabled");
            self.state = Some(UndoState::default());
        }
    }

    /// Stops tracking and discards all history.
    pub fn disable(&mut self) {
        if self.state.take().is_some() {
            tracing::debug!("Undo tracking disabled");
        }
    }

    /// Enables or disables tracking.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled {
            self.enable();
        } else {
            self.disable();
        }
    }

    /// Drops both stacks and the coalescing state without touching the
    /// buffer. Used when the buffer content is replaced by something other
    /// than undo/redo.
    pub fn reset(&mut self) {
        if let Some(state) = self.state.as_mut() {
            *state = UndoState::default();
        }
    }

    fn state_mut(&mut self) -> Result<&mut UndoState> {
        self.state
            .as_mut()
            .ok_or_else(|| anyhow!("undo tracking is disabled"))
    }

    /// Routes an edit event to [`notify_insert`](Self::notify_insert) or
    /// [`notify_delete`](Self::notify_delete).
    ///
    /// # Errors
    ///
    /// See the two notification methods.
    pub fn notify<H: TextHost + ?Sized>(&mut self, host: &H, event: &EditEvent) -> Result<()> {
        match event {
            EditEvent::Insert { offset, text } => self.notify_insert(host, *offset, text),
            EditEvent::Delete { start, end } => self.notify_delete(host, *start, *end),
        }
    }

    /// Records that `text` is about to be inserted at `offset`.
    ///
    /// Must be called before the host applies the insert.
    ///
    /// # Errors
    ///
    /// Returns an error if tracking is disabled, if `offset` is past the end
    /// of the buffer, or if the buffer cannot be read.
    pub fn notify_insert<H: TextHost + ?Sized>(
        &mut self,
        host: &H,
        offset: usize,
        text: &str,
    ) -> Result<()> {
        let max_depth = self.config.max_history_depth;
        let state = self.state_mut()?;
        if offset > host.len_chars() {
            anyhow::bail!(
                "insert offset {} out of bounds (buffer has {} chars)",
                offset,
                host.len_chars()
            );
        }

        state.delete_anchor = None;
        let caret = host.caret();
        let len = text.chars().count();

        if breaks_group(state.insert_anchor, caret, state.last_was_space, text, len) {
            let snapshot = Snapshot::capture(host).context("Failed to open undo group")?;
            state.open_group(snapshot, max_depth);
            tracing::debug!(offset, caret, len, depth = state.history.len(), "Insert opened undo group");
        } else {
            tracing::trace!(offset, caret, "Insert merged into current group");
        }

        state.last_was_space = text == " ";
        state.insert_anchor = Some(caret + 1);
        Ok(())
    }

    /// Records that `[start, end)` is about to be deleted.
    ///
    /// Must be called before the host applies the delete, so the removed
    /// text can still be read.
    ///
    /// # Errors
    ///
    /// Returns an error if tracking is disabled, if the range is invalid,
    /// or if the buffer cannot be read.
    pub fn notify_delete<H: TextHost + ?Sized>(
        &mut self,
        host: &H,
        start: usize,
        end: usize,
    ) -> Result<()> {
        let max_depth = self.config.max_history_depth;
        let state = self.state_mut()?;

        state.insert_anchor = None;
        let deleted = host
            .read(start, Some(end))
            .with_context(|| format!("Failed to read deleted range {start}..{end}"))?;
        let len = end - start;
        let caret = host.caret();

        if breaks_group(state.delete_anchor, caret, state.last_was_space, &deleted, len) {
            let snapshot = Snapshot::capture(host).context("Failed to open undo group")?;
            state.open_group(snapshot, max_depth);
            tracing::debug!(start, end, caret, depth = state.history.len(), "Delete opened undo group");
        } else {
            tracing::trace!(start, end, caret, "Delete merged into current group");
        }

        state.last_was_space = deleted == " ";
        state.delete_anchor = end.checked_sub(1);
        Ok(())
    }

    /// Restores the buffer to the state before the most recent group.
    ///
    /// Returns `Ok(false)` without touching the host when there is nothing
    /// to undo or tracking is disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the host fails to read or replace its content.
    /// The stacks are left as they were if the content could not be replaced.
    pub fn undo<H: TextHost + ?Sized>(&mut self, host: &mut H) -> Result<bool> {
        self.replay(host, Direction::Undo)
    }

    /// Re-applies the most recently undone group.
    ///
    /// Returns `Ok(false)` without touching the host when there is nothing
    /// to redo or tracking is disabled.
    ///
    /// # Errors
    ///
    /// Same as [`undo`](Self::undo).
    pub fn redo<H: TextHost + ?Sized>(&mut self, host: &mut H) -> Result<bool> {
        self.replay(host, Direction::Redo)
    }

    fn replay<H: TextHost + ?Sized>(&mut self, host: &mut H, direction: Direction) -> Result<bool> {
        let max_depth = self.config.max_history_depth;
        let Some(state) = self.state.as_mut() else {
            return Ok(false);
        };
        let source_empty = match direction {
            Direction::Undo => state.history.is_empty(),
            Direction::Redo => state.redo_history.is_empty(),
        };
        if source_empty {
            return Ok(false);
        }

        // The replay itself must not extend whatever group is open.
        state.clear_anchors();

        let (source, target) = match direction {
            Direction::Undo => (&mut state.history, &mut state.redo_history),
            Direction::Redo => (&mut state.redo_history, &mut state.history),
        };

        let mut host = Inhibited::new(host);
        let now = Snapshot::capture(&*host)?;
        let Some(restored) = source.pop() else {
            return Ok(false);
        };
        let pushed = now != restored;
        if pushed {
            target.push(now);
        }

        if let Err(err) = host.replace_all(&restored.text) {
            tracing::warn!("Failed to replay {direction:?}: {err}");
            if pushed {
                target.pop();
            }
            source.push(restored);
            return Err(err.context(format!("Failed to replay {direction:?}")));
        }
        host.set_caret(restored.caret)
            .context("Failed to restore caret position")?;

        if direction == Direction::Redo {
            trim_to_depth(target, max_depth);
        }
        tracing::debug!(
            ?direction,
            caret = restored.caret,
            undo_len = state.history.len(),
            redo_len = state.redo_history.len(),
            "Replayed snapshot"
        );
        Ok(true)
    }

    /// Whether there is a group to undo.
    pub fn can_undo(&self) -> bool {
        self.undo_depth() > 0
    }

    /// Whether there is a group to redo.
    pub fn can_redo(&self) -> bool {
        self.redo_depth() > 0
    }

    /// Number of groups on the undo stack.
    pub fn undo_depth(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.history.len())
    }

    /// Number of groups on the redo stack.
    pub fn redo_depth(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.redo_history.len())
    }

    /// Undo stack, oldest first. Empty while disabled.
    pub fn history(&self) -> &[Snapshot] {
        self.state.as_ref().map_or(&[], |s| s.history.as_slice())
    }

    /// Redo stack, next redo last. Empty while disabled.
    pub fn redo_history(&self) -> &[Snapshot] {
        self.state.as_ref().map_or(&[], |s| s.redo_history.as_slice())
    }
}
