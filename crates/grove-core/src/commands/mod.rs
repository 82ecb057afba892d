//! User-facing commands composed from the operation layer.

pub mod delete_tag;
pub mod undo;

pub use delete_tag::{DeleteTagCommand, DeleteTagOptions, DeleteTagReport};
pub use undo::UndoCommand;
