/// Text buffer wrapping `ropey::Rope`. All offsets are char indices.
use std::fmt;

use anyhow::Result;
use ropey::Rope;

/// The characters of an entry, backed by a rope.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    rope: Rope,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TextBuffer {
    fn from(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }
}

impl fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rope)
    }
}

impl TextBuffer {
    /// Creates an empty text buffer.
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Returns the total number of characters in the buffer.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Inserts text at the given char index.
    ///
    /// # Errors
    ///
    /// Returns an error if the char index is out of bounds.
    pub fn insert(&mut self, char_idx: usize, text: &str) -> Result<()> {
        self.check_offset(char_idx)?;
        self.rope.insert(char_idx, text);
        Ok(())
    }

    /// Removes the character range [start..end) from the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is out of bounds.
    pub fn remove(&mut self, start: usize, end: usize) -> Result<()> {
        self.check_range(start, end)?;
        self.rope.remove(start..end);
        Ok(())
    }

    /// Returns a slice of text in the given char range.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is out of bounds.
    pub fn slice(&self, start: usize, end: usize) -> Result<ropey::RopeSlice<'_>> {
        self.check_range(start, end)?;
        Ok(self.rope.slice(start..end))
    }

    /// Fails unless `char_idx` is a valid insert position.
    pub fn check_offset(&self, char_idx: usize) -> Result<()> {
        if char_idx > self.rope.len_chars() {
            anyhow::bail!(
                "insert position {} out of bounds (buffer has {} chars)",
                char_idx,
                self.rope.len_chars()
            );
        }
        Ok(())
    }

    /// Fails unless `[start, end)` lies inside the buffer.
    pub fn check_range(&self, start: usize, end: usize) -> Result<()> {
        if start > end {
            anyhow::bail!("invalid range: start ({}) > end ({})", start, end);
        }
        if end > self.rope.len_chars() {
            anyhow::bail!(
                "range end {} out of bounds (buffer has {} chars)",
                end,
                self.rope.len_chars()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_empty() {
        let buf = TextBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.len_chars(), 0);
        assert_eq!(buf.to_string(), "");
    }

    #[test]
    fn test_insert_and_remove() {
        let mut buf = TextBuffer::new();
        buf.insert(0, "hello").unwrap();
        buf.insert(5, " world").unwrap();
        assert_eq!(buf.to_string(), "hello world");

        buf.remove(5, 11).unwrap();
        assert_eq!(buf.to_string(), "hello");
    }

    #[test]
    fn test_slice() {
        let buf = TextBuffer::from("hello world");
        assert_eq!(buf.slice(6, 11).unwrap().to_string(), "world");
        assert_eq!(buf.slice(2, 2).unwrap().to_string(), "");
    }

    // ── Unicode handling ─────────────────────────────────────────────

    #[test]
    fn test_unicode_offsets_are_chars() {
        let mut buf = TextBuffer::from("a🌍b");
        assert_eq!(buf.len_chars(), 3);
        assert_eq!(buf.slice(1, 2).unwrap().to_string(), "🌍");

        buf.insert(2, "日本").unwrap();
        assert_eq!(buf.to_string(), "a🌍日本b");
        buf.remove(1, 2).unwrap();
        assert_eq!(buf.to_string(), "a日本b");
    }

    // ── Error paths ──────────────────────────────────────────────────

    #[test]
    fn test_insert_out_of_bounds() {
        let mut buf = TextBuffer::from("hello");
        assert!(buf.insert(6, "x").is_err());
        assert!(buf.insert(5, "x").is_ok());
    }

    #[test]
    fn test_remove_start_greater_than_end() {
        let mut buf = TextBuffer::from("hello");
        assert!(buf.remove(3, 1).is_err());
        assert_eq!(buf.to_string(), "hello");
    }

    #[test]
    fn test_remove_end_out_of_bounds() {
        let mut buf = TextBuffer::from("hello");
        assert!(buf.remove(0, 100).is_err());
    }
}
