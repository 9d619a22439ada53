//! Domain models for the lyrics library
//!
//! This module contains the lyrics document model, its identifier type and the
//! validated inputs used to create and update documents.

use crate::error::{LibraryError, Result};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Maximum title length in characters, after trimming.
pub const TITLE_MAX_CHARS: usize = 40;

/// Maximum content length in characters, after trimming.
pub const CONTENT_MAX_CHARS: usize = 30_000;

/// Default number of documents a single owner may hold.
pub const DEFAULT_LYRICS_QUOTA: u32 = 50;

// =============================================================================
// ID Types
// =============================================================================

/// Unique identifier for a lyrics document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LyricsId(pub Uuid);

impl LyricsId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> std::result::Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for LyricsId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LyricsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Lyrics
// =============================================================================

/// A lyrics document owned by a single principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Lyrics {
    /// UUID v4 in hyphenated text form
    pub id: String,
    /// Principal id of the creator
    pub owner: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Unix epoch milliseconds
    pub created_at: i64,
    /// Unix epoch milliseconds
    pub updated_at: i64,
}

impl Lyrics {
    /// Create a new document for `owner` with a fresh id and timestamps.
    ///
    /// `input` is expected to be normalized already.
    pub fn new(owner: impl Into<String>, input: NewLyrics) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: LyricsId::new().to_string(),
            owner: owner.into(),
            title: input.title,
            content: input.content.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLyrics {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl NewLyrics {
    pub fn new(title: impl Into<String>, content: Option<String>) -> Self {
        Self {
            title: title.into(),
            content,
        }
    }

    /// Trim both fields and check their bounds.
    pub fn normalize(self) -> Result<Self> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            content: self.content.as_deref().map(normalize_content).transpose()?,
        })
    }
}

/// Partial update. Absent fields keep their stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl LyricsPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }

    /// Trim the provided fields and check their bounds. A patch with no
    /// fields at all is rejected.
    pub fn normalize(self) -> Result<Self> {
        if self.is_empty() {
            return Err(LibraryError::invalid("body", "No update data provided"));
        }

        Ok(Self {
            title: self.title.as_deref().map(normalize_title).transpose()?,
            content: self.content.as_deref().map(normalize_content).transpose()?,
        })
    }
}

fn normalize_title(raw: &str) -> Result<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(LibraryError::invalid("title", "Title is required"));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(LibraryError::invalid(
            "title",
            format!("Title must be at most {} characters", TITLE_MAX_CHARS),
        ));
    }
    Ok(title.to_string())
}

fn normalize_content(raw: &str) -> Result<String> {
    let content = raw.trim();
    if content.chars().count() > CONTENT_MAX_CHARS {
        return Err(LibraryError::invalid(
            "content",
            format!("Content must be at most {} characters", CONTENT_MAX_CHARS),
        ));
    }
    Ok(content.to_string())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: LibraryError) -> String {
        match err {
            LibraryError::InvalidInput { field, .. } => field,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_lyrics_new() {
        let lyrics = Lyrics::new("uid-1", NewLyrics::new("Song", None));
        assert_eq!(lyrics.owner, "uid-1");
        assert_eq!(lyrics.title, "Song");
        assert_eq!(lyrics.content, "");
        assert_eq!(lyrics.created_at, lyrics.updated_at);
        assert!(LyricsId::from_string(&lyrics.id).is_ok());
    }

    #[test]
    fn test_lyrics_serializes_camel_case() {
        let lyrics = Lyrics::new("uid-1", NewLyrics::new("Song", Some("la la".into())));
        let json = serde_json::to_value(&lyrics).unwrap();
        assert_eq!(json["title"], "Song");
        assert_eq!(json["content"], "la la");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_new_lyrics_trims() {
        let input = NewLyrics::new("  Title  ", Some("\n verse \n".into()))
            .normalize()
            .unwrap();
        assert_eq!(input.title, "Title");
        assert_eq!(input.content.as_deref(), Some("verse"));
    }

    #[test]
    fn test_new_lyrics_rejects_blank_title() {
        let err = NewLyrics::new("   ", None).normalize().unwrap_err();
        assert_eq!(field_of(err), "title");
    }

    #[test]
    fn test_title_length_counts_chars() {
        let exactly = "é".repeat(TITLE_MAX_CHARS);
        assert!(NewLyrics::new(exactly, None).normalize().is_ok());

        let too_long = "a".repeat(TITLE_MAX_CHARS + 1);
        let err = NewLyrics::new(too_long, None).normalize().unwrap_err();
        assert_eq!(field_of(err), "title");
    }

    #[test]
    fn test_content_length_limit() {
        let ok = "x".repeat(CONTENT_MAX_CHARS);
        assert!(NewLyrics::new("t", Some(ok)).normalize().is_ok());

        let too_long = "x".repeat(CONTENT_MAX_CHARS + 1);
        let err = NewLyrics::new("t", Some(too_long)).normalize().unwrap_err();
        assert_eq!(field_of(err), "content");
    }

    #[test]
    fn test_empty_patch_rejected() {
        let err = LyricsPatch::default().normalize().unwrap_err();
        assert!(
            matches!(err, LibraryError::InvalidInput { ref message, .. } if message == "No update data provided")
        );
    }

    #[test]
    fn test_patch_content_only() {
        let patch = LyricsPatch::default().content("  chorus ").normalize().unwrap();
        assert_eq!(patch.title, None);
        assert_eq!(patch.content.as_deref(), Some("chorus"));
    }

    #[test]
    fn test_patch_rejects_blank_title() {
        let err = LyricsPatch::default().title(" ").normalize().unwrap_err();
        assert_eq!(field_of(err), "title");
    }

    #[test]
    fn test_lyrics_id_parse() {
        let id = LyricsId::new();
        assert_eq!(LyricsId::from_string(&id.to_string()).unwrap(), id);
        assert!(LyricsId::from_string("not-a-uuid").is_err());
    }
}
