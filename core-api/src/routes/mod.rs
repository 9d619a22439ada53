mod health;
mod lyrics;
mod users;

use crate::state::AppState;
use axum::Router;

/// All routes, not yet bound to state.
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(lyrics::router(state))
        .merge(users::router())
        .merge(health::router())
}
