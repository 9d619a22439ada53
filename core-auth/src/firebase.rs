//! Hosted identity provider backed by the Identity Toolkit REST API.
//!
//! ## Flow
//!
//! 1. POST `accounts:signInWithPassword` or `accounts:signUp` with the
//!    project's web API key
//! 2. On success the response carries `localId` (the principal id) and `email`
//! 3. On failure the body is `{"error": {"code": 400, "message": "EMAIL_EXISTS"}}`;
//!    the message token is mapped onto [`AuthErrorCode`]
//!
//! ```no_run
//! # async fn example() -> core_auth::Result<()> {
//! use core_auth::{Credentials, FirebaseIdentityProvider, IdentityProvider};
//!
//! let provider = FirebaseIdentityProvider::new("web-api-key");
//! let principal = provider
//!     .sign_in(&Credentials::new("writer@example.com", "secret1"))
//!     .await?;
//! println!("signed in as {}", principal.uid);
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, AuthErrorCode, Result};
use crate::provider::IdentityProvider;
use crate::types::{Credentials, Principal};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Maps an Identity Toolkit error token such as `WEAK_PASSWORD : Password
/// should be at least 6 characters` onto a provider-neutral code.
pub fn map_error_message(message: &str) -> AuthErrorCode {
    let token = message.split(':').next().unwrap_or_default().trim();
    match token {
        "EMAIL_EXISTS" => AuthErrorCode::EmailAlreadyInUse,
        "INVALID_EMAIL" | "MISSING_EMAIL" => AuthErrorCode::InvalidEmail,
        "WEAK_PASSWORD" => AuthErrorCode::WeakPassword,
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS"
        | "MISSING_PASSWORD" | "USER_DISABLED" => AuthErrorCode::InvalidCredential,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthErrorCode::TooManyRequests,
        _ => AuthErrorCode::Unknown,
    }
}

pub struct FirebaseIdentityProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl FirebaseIdentityProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Points the provider at another host, e.g. the local emulator.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn call(&self, endpoint: &str, credentials: &Credentials) -> Result<Principal> {
        let url = format!("{}/v1/accounts:{}", self.base_url, endpoint);
        let body = PasswordRequest {
            email: credentials.email.trim(),
            password: &credentials.password,
            return_secure_token: true,
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(endpoint, error = %e, "Identity provider request failed");
                AuthError::Provider(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .map(|envelope| envelope.error.message)
                .unwrap_or_default();
            let code = map_error_message(&message);

            if code == AuthErrorCode::Unknown {
                warn!(endpoint, status = status.as_u16(), message = %message, "Unexpected identity provider error");
            }
            return Err(AuthError::rejected(code));
        }

        let account: AccountResponse = response.json().await.map_err(|e| {
            AuthError::Provider(format!("Failed to parse identity provider response: {}", e))
        })?;

        Ok(Principal {
            uid: account.local_id,
            email: account
                .email
                .unwrap_or_else(|| credentials.normalized_email()),
        })
    }
}

impl fmt::Debug for FirebaseIdentityProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirebaseIdentityProvider")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[async_trait::async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    fn name(&self) -> &'static str {
        "firebase"
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Principal> {
        self.call("signInWithPassword", credentials).await
    }

    async fn register(&self, credentials: &Credentials) -> Result<Principal> {
        let principal = self.call("signUp", credentials).await?;
        info!(uid = %principal.uid, "Account registered with identity provider");
        Ok(principal)
    }
}
