//! Per-client sliding window request limiting.
//!
//! Each key (the signed-in principal, or the peer address for anonymous
//! callers) keeps the instants of its admitted requests inside the current
//! window. A request is admitted while fewer than `max_requests` instants
//! remain after expiring old ones.

use crate::error::ApiError;
use crate::extract::SESSION_USER_KEY;
use crate::state::AppState;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use core_auth::Principal;
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tower_sessions::Session;
use tracing::{debug, warn};

pub const RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
pub const RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");

/// Outcome of a limiter check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

#[derive(Debug)]
pub struct SlidingWindowLimiter {
    max_requests: u32,
    window: Duration,
    hits: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl SlidingWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub async fn check(&self, key: &str) -> Decision {
        self.check_at(key, Instant::now()).await
    }

    /// Records a request for `key` at `now` if the window has room.
    pub async fn check_at(&self, key: &str, now: Instant) -> Decision {
        let mut hits = self.hits.lock().await;
        let entry = hits.entry(key.to_string()).or_default();

        while let Some(&oldest) = entry.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                entry.pop_front();
            } else {
                break;
            }
        }

        if entry.len() >= self.max_requests as usize {
            let oldest = entry.front().copied().unwrap_or(now);
            let retry_after = self
                .window
                .saturating_sub(now.saturating_duration_since(oldest));
            return Decision::Limited { retry_after };
        }

        entry.push_back(now);
        Decision::Allowed {
            remaining: self.max_requests.saturating_sub(entry.len() as u32),
        }
    }

    /// Drops keys with no requests left in the window. Returns how many
    /// keys were removed.
    pub async fn prune_at(&self, now: Instant) -> usize {
        let mut hits = self.hits.lock().await;
        let before = hits.len();
        hits.retain(|_, entry| {
            entry
                .back()
                .is_some_and(|&newest| now.saturating_duration_since(newest) < self.window)
        });
        before - hits.len()
    }

    pub async fn tracked_keys(&self) -> usize {
        self.hits.lock().await.len()
    }

    /// Periodically prunes stale keys until the returned task is aborted.
    pub fn spawn_pruner(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await;
            loop {
                interval.tick().await;
                let removed = self.prune_at(Instant::now()).await;
                if removed > 0 {
                    debug!(removed, "Pruned idle rate limit keys");
                }
            }
        })
    }
}

/// Key for the current request: the session principal, else the peer address.
async fn client_key(session: &Session, peer: Option<SocketAddr>) -> String {
    match session.get::<Principal>(SESSION_USER_KEY).await {
        Ok(Some(principal)) => return format!("uid:{}", principal.uid),
        Ok(None) => {}
        Err(e) => warn!(error = %e, "Failed to read session for rate limiting"),
    }

    peer.map(|addr| format!("ip:{}", addr.ip()))
        .unwrap_or_else(|| "anonymous".to_string())
}

/// Middleware applied to the lyrics routes.
pub async fn limit_requests(
    State(state): State<AppState>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    // Copied out before awaiting; the request body is not `Sync`.
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(&session, peer).await;
    let limiter = &state.limiter;

    match limiter.check(&key).await {
        Decision::Allowed { remaining } => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            headers.insert(
                RATELIMIT_LIMIT,
                HeaderValue::from(limiter.max_requests()),
            );
            headers.insert(RATELIMIT_REMAINING, HeaderValue::from(remaining));
            response
        }
        Decision::Limited { retry_after } => {
            warn!(key = %key, "Rate limit exceeded");
            ApiError::RateLimited { retry_after }.into_response()
        }
    }
}
