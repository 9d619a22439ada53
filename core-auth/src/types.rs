use crate::error::{AuthError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest email address accepted, per RFC 5321 path limits.
pub const EMAIL_MAX_CHARS: usize = 254;

pub const PASSWORD_MAX_CHARS: usize = 128;

/// An authenticated identity.
///
/// `uid` is the stable principal id every lyrics document is scoped to.
///
/// # Examples
///
/// ```
/// use core_auth::Principal;
///
/// let principal = Principal::new("uid-42", "writer@example.com");
/// assert_eq!(principal.uid, "uid-42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    pub uid: String,
    pub email: String,
}

impl Principal {
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
        }
    }
}

/// Email and password as submitted by a login or registration form.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Checks presence and length of both fields.
    ///
    /// Format and strength rules belong to the identity provider, which
    /// reports them with field-specific messages.
    pub fn validate(&self) -> Result<()> {
        let email = self.email.trim();
        if email.is_empty() || email.chars().count() > EMAIL_MAX_CHARS {
            return Err(AuthError::InvalidInput);
        }
        if self.password.is_empty() || self.password.chars().count() > PASSWORD_MAX_CHARS {
            return Err(AuthError::InvalidInput);
        }
        Ok(())
    }

    /// Email trimmed and lowercased, used as the account lookup key.
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
