use crate::envelope::{AuthStatus, Envelope};
use crate::error::{ApiError, Operation, Result};
use crate::extract::{ValidJson, SESSION_USER_KEY};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use core_auth::{AuthError, AuthErrorCode, Credentials, Principal};
use core_runtime::logging::redact_if_sensitive;
use tower_sessions::Session;
use tracing::{info, warn};

const LOGIN_REDIRECT: &str = "/music-room";
const REGISTER_REDIRECT: &str = "/?registration_success=true";
const LOGOUT_REDIRECT: &str = "/";

type Reply = Result<(StatusCode, Json<Envelope<()>>)>;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/login", post(login))
        .route("/users/register", post(register))
        .route("/users/logout", post(logout))
        .route("/auth/check", get(auth_check))
}

fn rejected(action: &'static str, email: &str, err: AuthError) -> ApiError {
    warn!(
        action,
        email = %redact_if_sensitive("email", email),
        error = %err,
        "Credential check failed"
    );
    ApiError::Credentials {
        feedback: err.feedback(),
    }
}

async fn login(
    State(state): State<AppState>,
    session: Session,
    ValidJson(credentials): ValidJson<Credentials>,
) -> Reply {
    credentials
        .validate()
        .map_err(|_| ApiError::invalid_input())?;

    let principal = state
        .identity
        .sign_in(&credentials)
        .await
        .map_err(|e| rejected("login", &credentials.email, e))?;

    // New id on privilege change so a pre-login cookie cannot be reused.
    let stored = match session.cycle_id().await {
        Ok(()) => session.insert(SESSION_USER_KEY, &principal).await,
        Err(e) => Err(e),
    };
    if let Err(e) = stored {
        warn!(error = %e, "Failed to store principal in session");
        return Err(ApiError::Credentials {
            feedback: AuthErrorCode::Unknown.feedback(),
        });
    }

    info!(uid = %principal.uid, provider = state.identity.name(), "User logged in");
    Ok((StatusCode::OK, Json(Envelope::redirect(LOGIN_REDIRECT))))
}

async fn register(
    State(state): State<AppState>,
    ValidJson(credentials): ValidJson<Credentials>,
) -> Reply {
    credentials
        .validate()
        .map_err(|_| ApiError::invalid_input())?;

    let principal = state
        .identity
        .register(&credentials)
        .await
        .map_err(|e| rejected("register", &credentials.email, e))?;

    info!(uid = %principal.uid, "New user registered");
    Ok((StatusCode::CREATED, Json(Envelope::redirect(REGISTER_REDIRECT))))
}

async fn logout(session: Session) -> Reply {
    let uid = session
        .get::<Principal>(SESSION_USER_KEY)
        .await
        .ok()
        .flatten()
        .map(|p| p.uid);

    session
        .flush()
        .await
        .map_err(|e| ApiError::unexpected(Operation::Logout, e))?;

    info!(uid = uid.as_deref().unwrap_or("anonymous"), "User logged out");
    Ok((
        StatusCode::OK,
        Json(Envelope::redirect(LOGOUT_REDIRECT).with_message("Logout successful")),
    ))
}

async fn auth_check(session: Session) -> Json<AuthStatus> {
    let user = session
        .get::<Principal>(SESSION_USER_KEY)
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read session");
            None
        });

    Json(AuthStatus {
        authenticated: user.is_some(),
        user,
    })
}
