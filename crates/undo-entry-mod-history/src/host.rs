/// The contract between the undo engine and the text it tracks.
///
/// A host owns the characters and the caret. It tells the engine about every
/// edit right before applying it, and lets the engine swap the whole content
/// back in during undo/redo.
use std::ops::{Deref, DerefMut};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// A low-level edit, in char offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditEvent {
    /// `text` is about to be inserted at `offset`.
    Insert { offset: usize, text: String },
    /// The half-open range `[start, end)` is about to be removed.
    Delete { start: usize, end: usize },
}

impl EditEvent {
    /// Number of chars the edit touches.
    pub fn len_chars(&self) -> usize {
        match self {
            EditEvent::Insert { text, .. } => text.chars().count(),
            EditEvent::Delete { start, end } => end.saturating_sub(*start),
        }
    }
}

/// Text storage the `UndoEngine` reads from and restores into.
///
/// Offsets are char indices. The engine only ever mutates the host through
/// `replace_all` and `set_caret`, and always with notifications blocked.
pub trait TextHost {
    /// Total number of chars in the buffer.
    fn len_chars(&self) -> usize;

    /// Reads the chars in `[start, end)`. `end = None` reads to the end of
    /// the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is out of bounds.
    fn read(&self, start: usize, end: Option<usize>) -> Result<String>;

    /// Current caret offset.
    fn caret(&self) -> usize;

    /// Moves the caret.
    ///
    /// # Errors
    ///
    /// Returns an error if `offset` is past the end of the buffer.
    fn set_caret(&mut self, offset: usize) -> Result<()>;

    /// Replaces the entire content.
    ///
    /// # Errors
    ///
    /// Returns an error if the host refuses the new content.
    fn replace_all(&mut self, text: &str) -> Result<()>;

    /// Stops the host from reporting edits until the matching unblock.
    fn block_notifications(&mut self);

    /// Undoes one `block_notifications`.
    fn unblock_notifications(&mut self);
}

/// Scoped notification block on a host.
///
/// Blocks on construction and unblocks on drop, so an early return or a `?`
/// inside the scope still releases the host.
pub struct Inhibited<'a, H: TextHost + ?Sized> {
    host: &'a mut H,
}

impl<'a, H: TextHost + ?Sized> Inhibited<'a, H> {
    pub fn new(host: &'a mut H) -> Self {
        host.block_notifications();
        Self { host }
    }
}

impl<H: TextHost + ?Sized> Deref for Inhibited<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.host
    }
}

impl<H: TextHost + ?Sized> DerefMut for Inhibited<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.host
    }
}

impl<H: TextHost + ?Sized> Drop for Inhibited<'_, H> {
    fn drop(&mut self) {
        self.host.unblock_notifications();
    }
}

/// In-memory host used by the unit tests of this crate.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    #[derive(Debug, Default)]
    pub struct MockHost {
        pub chars: Vec<char>,
        pub caret: usize,
        pub blocked: usize,
        /// Block depth observed by each `replace_all` call.
        pub blocked_during_replace: Vec<usize>,
        /// Makes the next `replace_all` fail.
        pub fail_replace: bool,
    }

    impl MockHost {
        pub fn with_text(text: &str) -> Self {
            let chars: Vec<char> = text.chars().collect();
            Self {
                caret: chars.len(),
                chars,
                ..Self::default()
            }
        }

        pub fn text(&self) -> String {
            self.chars.iter().collect()
        }

        pub fn insert(&mut self, offset: usize, text: &str) {
            let new: Vec<char> = text.chars().collect();
            let n = new.len();
            self.chars.splice(offset..offset, new);
            if self.caret > offset {
                self.caret += n;
            }
        }

        pub fn remove(&mut self, start: usize, end: usize) {
            self.chars.drain(start..end);
            if self.caret > start {
                self.caret -= self.caret.min(end) - start;
            }
        }
    }

    impl TextHost for MockHost {
        fn len_chars(&self) -> usize {
            self.chars.len()
        }

        fn read(&self, start: usize, end: Option<usize>) -> Result<String> {
            let end = end.unwrap_or(self.chars.len());
            if start > end || end > self.chars.len() {
                anyhow::bail!("read range {start}..{end} out of bounds");
            }
            Ok(self.chars[start..end].iter().collect())
        }

        fn caret(&self) -> usize {
            self.caret
        }

        fn set_caret(&mut self, offset: usize) -> Result<()> {
            if offset > self.chars.len() {
                anyhow::bail!("caret {offset} out of bounds");
            }
            self.caret = offset;
            Ok(())
        }

        fn replace_all(&mut self, text: &str) -> Result<()> {
            self.blocked_during_replace.push(self.blocked);
            if self.fail_replace {
                self.fail_replace = false;
                anyhow::bail!("host rejected replace");
            }
            self.chars = text.chars().collect();
            self.caret = self.caret.min(self.chars.len());
            Ok(())
        }

        fn block_notifications(&mut self) {
            self.blocked += 1;
        }

        fn unblock_notifications(&mut self) {
            self.blocked = self.blocked.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MockHost;
    use super::*;

    #[test]
    fn test_event_len_chars() {
        let insert = EditEvent::Insert {
            offset: 0,
            text: "héllo".to_string(),
        };
        assert_eq!(insert.len_chars(), 5);
        assert_eq!(EditEvent::Delete { start: 2, end: 7 }.len_chars(), 5);
    }

    #[test]
    fn test_event_json_shape() {
        let event: EditEvent =
            serde_json::from_str(r#"{"kind": "delete", "start": 1, "end": 3}"#).unwrap();
        assert_eq!(event, EditEvent::Delete { start: 1, end: 3 });
    }

    #[test]
    fn test_inhibited_blocks_and_releases() {
        let mut host = MockHost::with_text("abc");
        {
            let guard = Inhibited::new(&mut host);
            assert_eq!(guard.blocked, 1);
        }
        assert_eq!(host.blocked, 0);
    }

    #[test]
    fn test_inhibited_nests() {
        let mut host = MockHost::default();
        let mut outer = Inhibited::new(&mut host);
        {
            let inner = Inhibited::new(&mut *outer);
            assert_eq!(inner.blocked, 2);
        }
        assert_eq!(outer.blocked, 1);
        drop(outer);
        assert_eq!(host.blocked, 0);
    }

    #[test]
    fn test_inhibited_released_on_error() {
        fn replace_blocked(host: &mut MockHost) -> Result<()> {
            let mut guard = Inhibited::new(host);
            guard.replace_all("new")?;
            Ok(())
        }

        let mut host = MockHost::with_text("old");
        host.fail_replace = true;
        assert!(replace_blocked(&mut host).is_err());
        assert_eq!(host.blocked, 0);
        assert_eq!(host.blocked_during_replace, vec![1]);
        assert_eq!(host.text(), "old");
    }
}
