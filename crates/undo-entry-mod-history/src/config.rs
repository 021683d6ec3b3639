/// Configuration for the undo history.
use undo_entry_config::AppConfig;

/// Maximum number of undo groups kept per entry.
/// Oldest groups are dropped when this limit is exceeded.
pub const DEFAULT_MAX_HISTORY_DEPTH: usize = 10_000;

/// Configuration for an `UndoEngine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Max undo groups kept on the undo stack.
    pub max_history_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history_depth: DEFAULT_MAX_HISTORY_DEPTH,
        }
    }
}

impl HistoryConfig {
    /// Builds the history settings from the application config.
    ///
    /// A depth of zero would make every group vanish as soon as it is
    /// recorded, so it is raised to one.
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_history_depth: config.max_history_depth.max(1),
        }
    }
}

impl From<&AppConfig> for HistoryConfig {
    fn from(config: &AppConfig) -> Self {
        Self::from_app_config(config)
    }
}
