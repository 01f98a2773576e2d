pub mod actions;
pub mod autosave;
pub mod history;
pub mod layout;

pub use actions::{ActionDispatcher, ActionOutcome, BoardAction, NodePatch, TaskMapError};
pub use autosave::{CommitListener, DebouncedAutosave};
pub use history::History;
