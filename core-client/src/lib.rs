//! # Lyrics Client
//!
//! Typed access to the lyrics API plus the list and editor component state
//! machines built on it.
//!
//! ## Overview
//!
//! - [`LyricsService`] / [`HttpLyricsService`]: one async call per API
//!   operation, unwrapping the `{success, data | message}` envelope
//! - [`LyricsList`]: `Loading -> Populated | Empty`, refreshed on
//!   `lyrics:created` and `lyrics:updated`
//! - [`LyricsEditor`]: `Hidden -> Editing -> Hidden`, opened by
//!   `lyrics:create` and `lyrics:selected`
//!
//! Components never reference each other; they only share a [`LyricsBus`].
//! `mount()` returns a [`ComponentHandle`](core_runtime::scope::ComponentHandle)
//! whose `dispose()` tears down that component's listeners.
//!
//! ```no_run
//! # async fn example() -> core_client::Result<()> {
//! use core_client::{AlwaysConfirm, HttpLyricsService, LyricsBus, LyricsEditor, LyricsList};
//! use std::sync::Arc;
//!
//! let service = Arc::new(HttpLyricsService::new("http://localhost:3000")?);
//! service.login("writer@example.com", "secret1").await?;
//!
//! let bus = LyricsBus::default();
//! let list = Arc::new(LyricsList::new(service.clone(), bus.clone(), Arc::new(AlwaysConfirm)));
//! let editor = Arc::new(LyricsEditor::new(service, bus));
//!
//! let list_handle = list.mount();
//! let editor_handle = editor.mount();
//!
//! list.request_new();
//!
//! editor_handle.dispose().await;
//! list_handle.dispose().await;
//! # Ok(())
//! # }
//! ```

pub mod components;
pub mod error;
pub mod events;
pub mod models;
pub mod service;

pub use components::{
    AlwaysConfirm, Confirm, Draft, EditorState, ListItem, ListState, LyricsEditor, LyricsList,
    Section,
};
pub use error::{ClientError, Result};
pub use events::{LyricsBus, LyricsEvent};
pub use models::{Lyrics, LyricsInput};
pub use service::{HttpLyricsService, LyricsService};
