pub mod editor;
pub mod list;

pub use editor::{Draft, EditorState, LyricsEditor, Section};
pub use list::{AlwaysConfirm, Confirm, ListItem, ListState, LyricsList};
