//! # Lyrics Library Module
//!
//! Owns the lyrics database and provides the repository used to access it.
//!
//! ## Overview
//!
//! This module manages:
//! - SQLite connection pool and embedded migrations
//! - The lyrics document model and input validation
//! - The owner-scoped `LyricsRepository` with a per-owner quota

pub mod db;
pub mod error;
pub mod models;
pub mod repositories;

pub use error::{LibraryError, Result};
pub use models::{Lyrics, LyricsId, LyricsPatch, NewLyrics};
pub use repositories::{LyricsRepository, SqliteLyricsRepository};
