//! Lyrics repository trait and implementation

use crate::error::{LibraryError, Result};
use crate::models::{Lyrics, LyricsId, LyricsPatch, NewLyrics, DEFAULT_LYRICS_QUOTA};
use sqlx::SqlitePool;
use tracing::debug;

const SELECT_COLUMNS: &str = "id, owner, title, content, created_at, updated_at";

/// Owner-scoped access to lyrics documents.
///
/// Every operation takes the acting principal explicitly. A document that
/// exists but belongs to someone else is reported exactly like a missing one.
#[async_trait::async_trait]
pub trait LyricsRepository: Send + Sync {
    /// Create a document for `owner`
    ///
    /// # Errors
    /// Returns error if:
    /// - The title is blank or too long, or the content is too long
    /// - The owner already holds the maximum number of documents
    /// - Database error occurs
    async fn create(&self, owner: &str, input: NewLyrics) -> Result<Lyrics>;

    /// All documents of `owner`, most recently updated first
    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Lyrics>>;

    /// Find a document by id
    ///
    /// # Errors
    /// `NotFound` for a malformed id, an unknown id, or a document owned by
    /// another principal.
    async fn get_by_id(&self, owner: &str, id: &str) -> Result<Lyrics>;

    /// Apply a partial update and return the stored document
    ///
    /// # Errors
    /// - `InvalidInput` if the patch is empty or a field violates its bounds
    /// - `NotFound` if no matching owned document exists
    async fn update(&self, owner: &str, id: &str, patch: LyricsPatch) -> Result<Lyrics>;

    /// Permanently delete a document
    ///
    /// # Errors
    /// `NotFound` if no matching owned document exists.
    async fn delete(&self, owner: &str, id: &str) -> Result<()>;

    /// Number of documents held by `owner`
    async fn count_by_owner(&self, owner: &str) -> Result<i64>;

    /// Verify the underlying store is reachable
    async fn ping(&self) -> Result<()>;
}

/// SQLite implementation of LyricsRepository
#[derive(Debug, Clone)]
pub struct SqliteLyricsRepository {
    pool: SqlitePool,
    quota: u32,
}

impl SqliteLyricsRepository {
    /// Create a repository with the default per-owner quota
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_quota(pool, DEFAULT_LYRICS_QUOTA)
    }

    pub fn with_quota(pool: SqlitePool, quota: u32) -> Self {
        Self { pool, quota }
    }

    pub fn quota(&self) -> u32 {
        self.quota
    }

    // Malformed ids can never match a row; report them as missing.
    fn parse_id(id: &str) -> Result<String> {
        LyricsId::from_string(id)
            .map(|id| id.to_string())
            .map_err(|_| LibraryError::lyrics_not_found(id))
    }
}

#[async_trait::async_trait]
impl LyricsRepository for SqliteLyricsRepository {
    async fn create(&self, owner: &str, input: NewLyrics) -> Result<Lyrics> {
        let lyrics = Lyrics::new(owner, input.normalize()?);

        // The count and the insert run as one statement, so concurrent
        // creates for the same owner cannot overshoot the quota.
        let result = sqlx::query(
            r#"
            INSERT INTO lyrics (id, owner, title, content, created_at, updated_at)
            SELECT ?, ?, ?, ?, ?, ?
            WHERE (SELECT COUNT(*) FROM lyrics WHERE owner = ?) < ?
            "#,
        )
        .bind(&lyrics.id)
        .bind(&lyrics.owner)
        .bind(&lyrics.title)
        .bind(&lyrics.content)
        .bind(lyrics.created_at)
        .bind(lyrics.updated_at)
        .bind(owner)
        .bind(i64::from(self.quota))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            debug!(owner, quota = self.quota, "Lyrics quota reached");
            return Err(LibraryError::QuotaExceeded { limit: self.quota });
        }

        debug!(owner, lyrics_id = %lyrics.id, "Lyrics inserted");
        Ok(lyrics)
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Lyrics>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM lyrics WHERE owner = ? \
             ORDER BY updated_at DESC, created_at DESC"
        );
        let lyrics = sqlx::query_as::<_, Lyrics>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;
        Ok(lyrics)
    }

    async fn get_by_id(&self, owner: &str, id: &str) -> Result<Lyrics> {
        let key = Self::parse_id(id)?;
        let sql = format!("SELECT {SELECT_COLUMNS} FROM lyrics WHERE id = ? AND owner = ?");

        sqlx::query_as::<_, Lyrics>(&sql)
            .bind(&key)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| LibraryError::lyrics_not_found(id))
    }

    async fn update(&self, owner: &str, id: &str, patch: LyricsPatch) -> Result<Lyrics> {
        let patch = patch.normalize()?;
        let key = Self::parse_id(id)?;
        let now = chrono::Utc::now().timestamp_millis();

        // updated_at advances by at least 1ms so it strictly increases even
        // when two writes land within the same millisecond.
        let sql = format!(
            "UPDATE lyrics SET \
                title = COALESCE(?, title), \
                content = COALESCE(?, content), \
                updated_at = MAX(?, updated_at + 1) \
             WHERE id = ? AND owner = ? \
             RETURNING {SELECT_COLUMNS}"
        );

        let updated = sqlx::query_as::<_, Lyrics>(&sql)
            .bind(patch.title)
            .bind(patch.content)
            .bind(now)
            .bind(&key)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| LibraryError::lyrics_not_found(id))?;

        debug!(owner, lyrics_id = %updated.id, "Lyrics updated");
        Ok(updated)
    }

    async fn delete(&self, owner: &str, id: &str) -> Result<()> {
        let key = Self::parse_id(id)?;
        let result = sqlx::query("DELETE FROM lyrics WHERE id = ? AND owner = ?")
            .bind(&key)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(LibraryError::lyrics_not_found(id));
        }

        debug!(owner, lyrics_id = %key, "Lyrics deleted");
        Ok(())
    }

    async fn count_by_owner(&self, owner: &str) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM lyrics WHERE owner = ?")
            .bind(owner)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn ping(&self) -> Result<()> {
        crate::db::health_check(&self.pool).await
    }
}
