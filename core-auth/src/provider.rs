use crate::error::Result;
use crate::types::{Credentials, Principal};

/// Verifies credentials and creates accounts.
///
/// Implementations report refusals as [`AuthError::Rejected`] with a
/// provider-neutral [`AuthErrorCode`] and infrastructure failures as
/// [`AuthError::Provider`].
///
/// [`AuthError::Rejected`]: crate::AuthError::Rejected
/// [`AuthError::Provider`]: crate::AuthError::Provider
/// [`AuthErrorCode`]: crate::AuthErrorCode
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn sign_in(&self, credentials: &Credentials) -> Result<Principal>;

    async fn register(&self, credentials: &Credentials) -> Result<Principal>;
}
