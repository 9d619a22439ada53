use crate::envelope::Envelope;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tracing::warn;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Envelope<()>>) {
    match state.repository.ping().await {
        Ok(()) => (StatusCode::OK, Json(Envelope::ok())),
        Err(e) => {
            warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Envelope::failure("Database unavailable")),
            )
        }
    }
}
