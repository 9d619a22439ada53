use crate::rate_limit::SlidingWindowLimiter;
use core_auth::IdentityProvider;
use core_library::LyricsRepository;
use core_runtime::config::ServerConfig;
use std::fmt;
use std::sync::Arc;

/// Shared handles every handler may reach.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn LyricsRepository>,
    pub identity: Arc<dyn IdentityProvider>,
    pub limiter: Arc<SlidingWindowLimiter>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Builds the state with a limiter sized from `config.rate_limit`.
    pub fn new(
        config: ServerConfig,
        repository: Arc<dyn LyricsRepository>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let limiter = SlidingWindowLimiter::new(
            config.rate_limit.max_requests,
            config.rate_limit.window,
        );
        Self {
            repository,
            identity,
            limiter: Arc::new(limiter),
            config: Arc::new(config),
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("identity", &self.identity.name())
            .field("limiter", &self.limiter)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
