//! Process-local identity provider.
//!
//! Accounts live in memory for the lifetime of the process. Used for local
//! development when no hosted provider key is configured, and by tests.

use crate::error::{AuthError, AuthErrorCode, Result};
use crate::provider::IdentityProvider;
use crate::types::{Credentials, Principal};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use core_runtime::logging::redact_if_sensitive;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

pub const MIN_PASSWORD_CHARS: usize = 6;

/// Consecutive failed sign-ins after which an account is locked.
pub const MAX_FAILED_ATTEMPTS: u32 = 5;

struct Account {
    uid: String,
    email: String,
    /// PHC string, salt included.
    password_hash: String,
    failed_attempts: u32,
}

impl Account {
    fn new(email: String, password_hash: String) -> Self {
        Self {
            uid: Uuid::new_v4().simple().to_string(),
            email,
            password_hash,
            failed_attempts: 0,
        }
    }

    fn principal(&self) -> Principal {
        Principal::new(self.uid.clone(), self.email.clone())
    }
}

fn hash_password(password: &str) -> password_hash::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// `Ok(false)` on a mismatch, `Err` when the stored hash is unreadable.
fn verify_password(password_hash: &str, password: &str) -> password_hash::Result<bool> {
    let hash = PasswordHash::new(password_hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &hash) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(other) => Err(other),
    }
}

/// Runs a hashing step off the async workers.
async fn off_thread<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> password_hash::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AuthError::Provider(e.to_string()))?
        .map_err(|e| AuthError::Provider(format!("password hashing failed: {e}")))
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[derive(Default)]
pub struct InMemoryIdentityProvider {
    accounts: RwLock<HashMap<String, Account>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account up front. Intended for fixtures.
    pub async fn with_account(self, email: &str, password: &str) -> Result<Self> {
        self.register(&Credentials::new(email, password)).await?;
        Ok(self)
    }

    pub async fn account_count(&self) -> usize {
        self.accounts.read().await.len()
    }
}

#[async_trait::async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Principal> {
        let key = credentials.normalized_email();

        let stored = {
            let accounts = self.accounts.read().await;
            let Some(account) = accounts.get(&key) else {
                debug!(email = %redact_if_sensitive("email", &key), "Unknown account");
                return Err(AuthError::rejected(AuthErrorCode::InvalidCredential));
            };
            if account.failed_attempts >= MAX_FAILED_ATTEMPTS {
                return Err(AuthError::rejected(AuthErrorCode::TooManyRequests));
            }
            account.password_hash.clone()
        };

        let password = credentials.password.clone();
        let matched = off_thread(move || verify_password(&stored, &password)).await?;

        let mut accounts = self.accounts.write().await;
        let Some(account) = accounts.get_mut(&key) else {
            return Err(AuthError::rejected(AuthErrorCode::InvalidCredential));
        };

        if !matched {
            account.failed_attempts += 1;
            debug!(
                uid = %account.uid,
                failed_attempts = account.failed_attempts,
                "Password mismatch"
            );
            return Err(AuthError::rejected(AuthErrorCode::InvalidCredential));
        }

        account.failed_attempts = 0;
        Ok(account.principal())
    }

    async fn register(&self, credentials: &Credentials) -> Result<Principal> {
        let key = credentials.normalized_email();
        if !looks_like_email(&key) {
            return Err(AuthError::rejected(AuthErrorCode::InvalidEmail));
        }
        if credentials.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AuthError::rejected(AuthErrorCode::WeakPassword));
        }
        if self.accounts.read().await.contains_key(&key) {
            return Err(AuthError::rejected(AuthErrorCode::EmailAlreadyInUse));
        }

        let password = credentials.password.clone();
        let password_hash = off_thread(move || hash_password(&password)).await?;

        // Re-checked under the write lock; a concurrent register may have won.
        let mut accounts = self.accounts.write().await;
        let principal = match accounts.entry(key.clone()) {
            Entry::Occupied(_) => {
                return Err(AuthError::rejected(AuthErrorCode::EmailAlreadyInUse));
            }
            Entry::Vacant(slot) => slot.insert(Account::new(key, password_hash)).principal(),
        };

        info!(uid = %principal.uid, "Account registered");
        Ok(principal)
    }
}
