use crate::envelope::Envelope;
use crate::error::{ApiError, Operation, Result};
use crate::extract::{CurrentOwner, ValidJson};
use crate::rate_limit::limit_requests;
use crate::state::AppState;
use crate::validation::{validate_create, validate_update, LyricsBody};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::{Json, Router};
use core_library::Lyrics;
use tracing::info;

type Reply<T> = Result<(StatusCode, Json<Envelope<T>>)>;

/// Lyrics CRUD, rate limited per client.
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/lyrics", get(list_lyrics).post(create_lyrics))
        .route(
            "/api/lyrics/{id}",
            get(get_lyrics).put(update_lyrics).delete(delete_lyrics),
        )
        .route_layer(from_fn_with_state(state.clone(), limit_requests))
}

#[tracing::instrument(skip_all, fields(owner = %owner.uid))]
async fn create_lyrics(
    CurrentOwner(owner): CurrentOwner,
    State(state): State<AppState>,
    body: std::result::Result<ValidJson<LyricsBody>, ApiError>,
) -> Reply<Lyrics> {
    let audit = |e: ApiError| e.audited(Operation::Create);
    let ValidJson(body) = body.map_err(audit)?;
    let input = validate_create(body).map_err(audit)?;
    let lyrics = state
        .repository
        .create(&owner.uid, input)
        .await
        .map_err(|e| ApiError::from_library(Operation::Create, e))?;

    info!(lyrics_id = %lyrics.id, "Lyrics created");
    Ok((StatusCode::CREATED, Json(Envelope::data(lyrics))))
}

#[tracing::instrument(skip_all, fields(owner = %owner.uid))]
async fn list_lyrics(
    CurrentOwner(owner): CurrentOwner,
    State(state): State<AppState>,
) -> Reply<Vec<Lyrics>> {
    let lyrics = state
        .repository
        .list_by_owner(&owner.uid)
        .await
        .map_err(|e| ApiError::from_library(Operation::List, e))?;

    info!(count = lyrics.len(), "Lyrics listed");
    Ok((StatusCode::OK, Json(Envelope::data(lyrics))))
}

#[tracing::instrument(skip_all, fields(owner = %owner.uid, lyrics_id = %id))]
async fn get_lyrics(
    CurrentOwner(owner): CurrentOwner,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Reply<Lyrics> {
    let lyrics = state
        .repository
        .get_by_id(&owner.uid, &id)
        .await
        .map_err(|e| ApiError::from_library(Operation::Get, e))?;

    info!("Lyrics retrieved");
    Ok((StatusCode::OK, Json(Envelope::data(lyrics))))
}

#[tracing::instrument(skip_all, fields(owner = %owner.uid, lyrics_id = %id))]
async fn update_lyrics(
    CurrentOwner(owner): CurrentOwner,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<ValidJson<LyricsBody>, ApiError>,
) -> Reply<Lyrics> {
    let audit = |e: ApiError| e.audited(Operation::Update);
    let ValidJson(body) = body.map_err(audit)?;
    let patch = validate_update(body).map_err(audit)?;
    let lyrics = state
        .repository
        .update(&owner.uid, &id, patch)
        .await
        .map_err(|e| ApiError::from_library(Operation::Update, e))?;

    info!("Lyrics updated");
    Ok((StatusCode::OK, Json(Envelope::data(lyrics))))
}

#[tracing::instrument(skip_all, fields(owner = %owner.uid, lyrics_id = %id))]
async fn delete_lyrics(
    CurrentOwner(owner): CurrentOwner,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Reply<()> {
    state
        .repository
        .delete(&owner.uid, &id)
        .await
        .map_err(|e| ApiError::from_library(Operation::Delete, e))?;

    info!("Lyrics deleted");
    Ok((
        StatusCode::OK,
        Json(Envelope::success_message("Lyrics deleted successfully")),
    ))
}
