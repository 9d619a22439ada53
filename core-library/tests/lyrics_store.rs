//! Integration tests for the SQLite lyrics store

use core_library::db::{create_pool, create_test_pool, DatabaseConfig};
use core_library::{LibraryError, LyricsPatch, LyricsRepository, NewLyrics, SqliteLyricsRepository};
use futures::future::join_all;
use std::sync::Arc;

#[tokio::test]
async fn test_concurrent_creates_never_exceed_quota() {
    let repo = Arc::new(SqliteLyricsRepository::new(create_test_pool().await.unwrap()));

    let attempts = (0..60).map(|i| {
        let repo = repo.clone();
        async move { repo.create("alice", NewLyrics::new(format!("Song {i}"), None)).await }
    });
    let results = join_all(attempts).await;

    let created = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|r| matches!(r, Err(LibraryError::QuotaExceeded { .. })))
        .count();

    assert_eq!(created, 50);
    assert_eq!(rejected, 10);
    assert_eq!(repo.count_by_owner("alice").await.unwrap(), 50);
}

#[tokio::test]
async fn test_documents_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lyrics.db");

    let id = {
        let pool = create_pool(DatabaseConfig::new(&path)).await.unwrap();
        let repo = SqliteLyricsRepository::new(pool.clone());
        let created = repo
            .create("alice", NewLyrics::new("Persistent", Some("verse".into())))
            .await
            .unwrap();
        pool.close().await;
        created.id
    };

    let pool = create_pool(DatabaseConfig::new(&path)).await.unwrap();
    let repo = SqliteLyricsRepository::new(pool);
    let fetched = repo.get_by_id("alice", &id).await.unwrap();
    assert_eq!(fetched.title, "Persistent");
    assert_eq!(fetched.content, "verse");
}

#[tokio::test]
async fn test_create_update_get_roundtrip() {
    let repo = SqliteLyricsRepository::new(create_test_pool().await.unwrap());

    let created = repo
        .create("alice", NewLyrics::new("A", Some("B".into())))
        .await
        .unwrap();
    repo.update("alice", &created.id, LyricsPatch::default().content("C"))
        .await
        .unwrap();

    let fetched = repo.get_by_id("alice", &created.id).await.unwrap();
    assert_eq!(fetched.title, "A");
    assert_eq!(fetched.content, "C");
    assert!(fetched.updated_at > created.updated_at);
}
