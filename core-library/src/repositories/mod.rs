//! # Repository Pattern Implementation
//!
//! Repository traits and their SQLite implementations.
//!
//! - Traits define the interface and are the seam the HTTP layer depends on
//! - SQLite implementations use sqlx for async database access
//! - All operations return `Result<T>` for error handling

pub mod lyrics;

pub use lyrics::{LyricsRepository, SqliteLyricsRepository};
