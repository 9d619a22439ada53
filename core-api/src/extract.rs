use crate::error::ApiError;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::Json;
use core_auth::Principal;
use serde::de::DeserializeOwned;
use tower_sessions::Session;
use tracing::{debug, error, warn};

/// Session key holding the signed-in [`Principal`].
pub const SESSION_USER_KEY: &str = "user";

/// The signed-in principal. Rejects with 401 when the session carries none.
pub struct CurrentOwner(pub Principal);

impl<S> FromRequestParts<S> for CurrentOwner
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(status, message)| {
                error!(%status, message, "Session layer missing");
                ApiError::Unauthorized
            })?;

        match session.get::<Principal>(SESSION_USER_KEY).await {
            Ok(Some(principal)) => {
                debug!(owner = %principal.uid, path = %parts.uri.path(), "Authenticated access");
                Ok(Self(principal))
            }
            Ok(None) => Err(ApiError::Unauthorized),
            Err(e) => {
                warn!(error = %e, "Failed to load session");
                Err(ApiError::Unauthorized)
            }
        }
    }
}

/// JSON body whose parse failures answer `400 Invalid input` in the
/// standard envelope instead of axum's plain-text rejection.
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                debug!(reason = %rejection.body_text(), "Rejected request body");
                Err(ApiError::invalid_input())
            }
        }
    }
}
