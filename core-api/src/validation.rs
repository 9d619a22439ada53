//! Shape checks on lyrics request bodies.
//!
//! These run before any repository call and only look at the raw values;
//! trimming and the blank-title rule are applied by the repository.

use crate::error::{ApiError, Result};
use core_library::models::{CONTENT_MAX_CHARS, TITLE_MAX_CHARS};
use core_library::{LyricsPatch, NewLyrics};
use serde::Deserialize;

/// Body of `POST /api/lyrics` and `PUT /api/lyrics/{id}`.
///
/// Non-string values fail deserialization and are reported as invalid input
/// by the JSON extractor.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LyricsBody {
    pub title: Option<String>,
    pub content: Option<String>,
}

fn title_ok(title: &str) -> bool {
    !title.is_empty() && title.chars().count() <= TITLE_MAX_CHARS
}

fn content_ok(content: &str) -> bool {
    content.chars().count() <= CONTENT_MAX_CHARS
}

pub fn validate_create(body: LyricsBody) -> Result<NewLyrics> {
    let title = match body.title {
        Some(title) if title_ok(&title) => title,
        _ => return Err(ApiError::invalid_input()),
    };
    if body.content.as_deref().is_some_and(|c| !content_ok(c)) {
        return Err(ApiError::invalid_input());
    }
    Ok(NewLyrics::new(title, body.content))
}

pub fn validate_update(body: LyricsBody) -> Result<LyricsPatch> {
    if body.title.is_none() && body.content.is_none() {
        return Err(ApiError::InvalidInput("No update data provided".to_string()));
    }
    if body.title.as_deref().is_some_and(|t| !title_ok(t))
        || body.content.as_deref().is_some_and(|c| !content_ok(c))
    {
        return Err(ApiError::invalid_input());
    }
    Ok(LyricsPatch {
        title: body.title,
        content: body.content,
    })
}
