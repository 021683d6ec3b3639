/// Serializable view of an entry's state.
use serde::Serialize;
use undo_entry_mod_history::Snapshot;

use crate::entry::Entry;

/// Text, caret and undo status of an `Entry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryReport {
    pub text: String,
    pub caret: usize,
    pub undo_enabled: bool,
    pub can_undo: bool,
    pub can_redo: bool,
    pub undo_depth: usize,
    pub redo_depth: usize,
    pub max_history_depth: usize,
    /// Undo stack, oldest first. Only filled in on request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<Snapshot>>,
    /// Redo stack, next redo last. Only filled in on request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redo_history: Option<Vec<Snapshot>>,
}

impl EntryReport {
    pub fn from_entry(entry: &Entry, include_history: bool) -> Self {
        let engine = entry.history();
        Self {
            text: entry.text(),
            caret: entry.caret(),
            undo_enabled: engine.is_enabled(),
            can_undo: engine.can_undo(),
            can_redo: engine.can_redo(),
            undo_depth: engine.undo_depth(),
            redo_depth: engine.redo_depth(),
            max_history_depth: engine.config().max_history_depth,
            history: include_history.then(|| engine.history().to_vec()),
            redo_history: include_history.then(|| engine.redo_history().to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use undo_entry_mod_history::HistoryConfig;

    #[test]
    fn test_report_without_history() {
        let mut entry = Entry::new();
        entry.type_text("ab cd").unwrap();
        entry.undo().unwrap();

        let report = EntryReport::from_entry(&entry, false);
        assert_eq!(report.text, "ab ");
        assert_eq!(report.caret, 3);
        assert!(report.can_undo && report.can_redo);
        assert_eq!((report.undo_depth, report.redo_depth), (1, 1));
        assert_eq!(report.max_history_depth, 10_000);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("history").is_none());
    }

    #[test]
    fn test_report_with_history() {
        let mut entry = Entry::new();
        entry.type_text("ab cd").unwrap();

        let report = EntryReport::from_entry(&entry, true);
        assert_eq!(
            report.history,
            Some(vec![Snapshot::new("", 0), Snapshot::new("ab ", 3)])
        );
        assert_eq!(report.redo_history, Some(Vec::new()));
    }

    #[test]
    fn test_report_shows_configured_depth() {
        let entry = Entry::with_config(
            HistoryConfig {
                max_history_depth: 3,
            },
            true,
        );
        let json = serde_json::to_value(EntryReport::from_entry(&entry, false)).unwrap();
        assert_eq!(json["max_history_depth"], 3);
    }
}
