//! # Lyrics HTTP API
//!
//! Axum server exposing the owner-scoped lyrics store and the session
//! endpoints that establish the owner.
//!
//! ## Request pipeline
//!
//! ```text
//! TraceLayer -> SessionManagerLayer -> [lyrics routes: limit_requests]
//!            -> CurrentOwner -> ValidJson -> validation -> LyricsRepository
//! ```
//!
//! Every response body is an [`envelope::Envelope`]; failures are produced
//! by [`error::ApiError`] so status codes and messages live in one place.

pub mod envelope;
pub mod error;
pub mod extract;
pub mod rate_limit;
mod routes;
pub mod state;
pub mod validation;

pub use error::{ApiError, ServerError};
pub use state::AppState;

use axum::Router;
use core_auth::{FirebaseIdentityProvider, IdentityProvider, InMemoryIdentityProvider};
use core_library::db::{create_pool, DatabaseConfig};
use core_library::{LyricsRepository, SqliteLyricsRepository};
use core_runtime::config::ServerConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::{time, SameSite};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use tracing::{info, warn};

/// Builds the application router over `state`.
pub fn router(state: AppState) -> Router {
    let settings = &state.config.session;
    let max_age = i64::try_from(settings.max_age.as_secs()).unwrap_or(i64::MAX);

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_name(settings.cookie_name.clone())
        .with_secure(settings.secure)
        .with_http_only(true)
        .with_same_site(SameSite::Strict)
        .with_expiry(Expiry::OnInactivity(time::Duration::seconds(max_age)));

    routes::router(&state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Opens the database and picks the identity provider for `config`.
pub async fn build_state(config: ServerConfig) -> Result<AppState, ServerError> {
    let pool = create_pool(DatabaseConfig::new(config.database_path.clone())).await?;
    let repository: Arc<dyn LyricsRepository> =
        Arc::new(SqliteLyricsRepository::with_quota(pool, config.lyrics_quota));

    let identity: Arc<dyn IdentityProvider> = match &config.firebase_api_key {
        Some(key) => Arc::new(FirebaseIdentityProvider::new(key.clone())),
        None => {
            warn!("FIREBASE_API_KEY not set; using in-memory accounts");
            Arc::new(InMemoryIdentityProvider::new())
        }
    };

    Ok(AppState::new(config, repository, identity))
}

/// Binds `config.bind_addr` and serves until Ctrl-C.
pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    let addr = config.bind_addr;
    let state = build_state(config).await?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    serve_with_listener(listener, state).await
}

/// Serves on an already bound listener until Ctrl-C.
pub async fn serve_with_listener(listener: TcpListener, state: AppState) -> Result<(), ServerError> {
    let pruner = state
        .limiter
        .clone()
        .spawn_pruner(state.config.rate_limit.window);

    info!(
        addr = %listener.local_addr()?,
        identity = state.identity.name(),
        "Lyrics server listening"
    );

    let app = router(state).into_make_service_with_connect_info::<SocketAddr>();
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    pruner.abort();
    info!("Lyrics server stopped");
    result.map_err(ServerError::from)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
