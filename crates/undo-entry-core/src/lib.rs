/// Text entry model with coalescing undo/redo.
///
/// `TextBuffer` stores the characters, `EntryBuffer` adds the caret and the
/// notification block the undo engine needs, and `Entry` routes every edit
/// through the engine before applying it. `EditScript` describes a whole
/// editing session as data.
pub mod buffer;
pub mod entry;
pub mod report;
pub mod script;

pub use buffer::TextBuffer;
pub use entry::{Entry, EntryBuffer};
pub use report::EntryReport;
pub use script::{Action, EditScript};
pub use undo_entry_mod_history::{EditEvent, HistoryConfig, Snapshot};
