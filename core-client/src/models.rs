use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// A lyrics document as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lyrics {
    pub id: String,
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
    /// `updated_at` rendered as day and short month, e.g. `3 Mar`.
    pub fn last_edited(&self) -> String {
        DateTime::from_timestamp_millis(self.updated_at)
            .map(|at| at.format("%-d %b").to_string())
            .unwrap_or_default()
    }
}

/// Request body for create and update. Absent fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LyricsInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl LyricsInput {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
        }
    }
}
