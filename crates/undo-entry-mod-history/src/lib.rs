/// Undo/redo history for single-line text entries.
///
/// Provides an `UndoEngine` that watches insert/delete notifications from a
/// text host, coalesces them into human-scale undo groups, and replays
/// whole-buffer snapshots on undo/redo. History lives in memory only and is
/// owned by one entry.
pub mod config;
pub mod engine;
pub mod host;
pub mod snapshot;

pub use config::HistoryConfig;
pub use engine::UndoEngine;
pub use host::{EditEvent, Inhibited, TextHost};
pub use snapshot::Snapshot;
