//! Typed access to the lyrics HTTP API.

use crate::error::{ClientError, Result};
use crate::models::{Lyrics, LyricsInput};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// CRUD calls against the lyrics API, scoped to the signed-in user.
#[async_trait::async_trait]
pub trait LyricsService: Send + Sync {
    async fn create(&self, input: &LyricsInput) -> Result<Lyrics>;

    /// All documents of the current user, most recently edited first.
    async fn list(&self) -> Result<Vec<Lyrics>>;

    async fn get_by_id(&self, id: &str) -> Result<Lyrics>;

    async fn update(&self, id: &str, input: &LyricsInput) -> Result<Lyrics>;

    async fn delete(&self, id: &str) -> Result<()>;
}

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    message: Option<String>,
}

/// [`LyricsService`] over HTTP with a cookie jar holding the session.
#[derive(Debug, Clone)]
pub struct HttpLyricsService {
    client: Client,
    base_url: String,
}

impl HttpLyricsService {
    /// Client for the server at `base_url`, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Uses a caller-built client. It needs a cookie store for the session
    /// to survive between calls.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Signs in and keeps the session cookie for later calls.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let request = self
            .request(Method::POST, "/users/login")
            .json(&json!({"email": email, "password": password}));
        self.send::<IgnoredAny>(request, "Login failed").await?;
        Ok(())
    }

    pub async fn logout(&self) -> Result<()> {
        let request = self.request(Method::POST, "/users/logout");
        self.send::<IgnoredAny>(request, "Logout failed").await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
    }

    fn lyrics_path(id: &str) -> String {
        format!("/api/lyrics/{id}")
    }

    /// Sends `request` and unwraps the response envelope.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<Option<T>> {
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        let envelope = match serde_json::from_slice::<Envelope<T>>(&bytes) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                return Err(ClientError::Decode(e.to_string()));
            }
            Err(_) => {
                warn!(status = status.as_u16(), "Non-envelope error response");
                return Err(ClientError::Api {
                    status: status.as_u16(),
                    message: fallback.to_string(),
                });
            }
        };

        if !status.is_success() || !envelope.success {
            let message = envelope.message.unwrap_or_else(|| fallback.to_string());
            debug!(status = status.as_u16(), message = %message, "API call failed");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(envelope.data)
    }

    async fn send_data<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<T> {
        self.send(request, fallback)
            .await?
            .ok_or_else(|| ClientError::Decode("response carries no data".to_string()))
    }
}

#[async_trait::async_trait]
impl LyricsService for HttpLyricsService {
    async fn create(&self, input: &LyricsInput) -> Result<Lyrics> {
        let request = self.request(Method::POST, "/api/lyrics").json(input);
        self.send_data(request, "Failed to create lyrics").await
    }

    async fn list(&self) -> Result<Vec<Lyrics>> {
        let request = self.request(Method::GET, "/api/lyrics");
        self.send_data(request, "Failed to retrieve lyrics").await
    }

    async fn get_by_id(&self, id: &str) -> Result<Lyrics> {
        let request = self.request(Method::GET, &Self::lyrics_path(id));
        self.send_data(request, "Failed to retrieve lyrics").await
    }

    async fn update(&self, id: &str, input: &LyricsInput) -> Result<Lyrics> {
        let request = self.request(Method::PUT, &Self::lyrics_path(id)).json(input);
        self.send_data(request, "Failed to update lyrics").await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let request = self.request(Method::DELETE, &Self::lyrics_path(id));
        self.send::<IgnoredAny>(request, "Failed to delete lyrics")
            .await?;
        Ok(())
    }
}
