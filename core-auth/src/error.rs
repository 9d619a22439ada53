use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid input")]
    InvalidInput,

    #[error("Identity provider rejected the request: {code:?}")]
    Rejected { code: AuthErrorCode },

    #[error("Identity provider unavailable: {0}")]
    Provider(String),

    #[error("Not authenticated")]
    NotAuthenticated,
}

impl AuthError {
    pub fn rejected(code: AuthErrorCode) -> Self {
        AuthError::Rejected { code }
    }

    /// User-facing field and message for this failure.
    pub fn feedback(&self) -> Feedback {
        match self {
            AuthError::InvalidInput => Feedback::new(FeedbackField::General, "Invalid input"),
            AuthError::Rejected { code } => code.feedback(),
            AuthError::Provider(_) | AuthError::NotAuthenticated => {
                AuthErrorCode::Unknown.feedback()
            }
        }
    }
}

/// Reasons an identity provider refuses a sign-in or registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorCode {
    EmailAlreadyInUse,
    InvalidEmail,
    WeakPassword,
    InvalidCredential,
    TooManyRequests,
    Unknown,
}

impl AuthErrorCode {
    pub fn feedback(&self) -> Feedback {
        match self {
            AuthErrorCode::EmailAlreadyInUse => Feedback::new(
                FeedbackField::Email,
                "An account with this email address already exists.",
            ),
            AuthErrorCode::InvalidEmail => {
                Feedback::new(FeedbackField::Email, "Invalid email format.")
            }
            AuthErrorCode::WeakPassword => Feedback::new(
                FeedbackField::Password,
                "Password must be at least 6 characters.",
            ),
            AuthErrorCode::InvalidCredential => {
                Feedback::new(FeedbackField::Password, "Invalid email or password.")
            }
            AuthErrorCode::TooManyRequests => Feedback::new(
                FeedbackField::General,
                "Too many unsuccessful login attempts. Please try again later.",
            ),
            AuthErrorCode::Unknown => {
                Feedback::new(FeedbackField::General, "An unexpected error occurred.")
            }
        }
    }
}

/// Which form field a failure message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackField {
    Email,
    Password,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub field: FeedbackField,
    pub message: &'static str,
}

impl Feedback {
    fn new(field: FeedbackField, message: &'static str) -> Self {
        Self { field, message }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_mapping() {
        let fb = AuthError::rejected(AuthErrorCode::EmailAlreadyInUse).feedback();
        assert_eq!(fb.field, FeedbackField::Email);
        assert_eq!(fb.message, "An account with this email address already exists.");

        let fb = AuthError::rejected(AuthErrorCode::InvalidCredential).feedback();
        assert_eq!(fb.field, FeedbackField::Password);
        assert_eq!(fb.message, "Invalid email or password.");

        let fb = AuthError::rejected(AuthErrorCode::TooManyRequests).feedback();
        assert_eq!(fb.field, FeedbackField::General);
    }

    #[test]
    fn test_provider_failures_are_generic() {
        let fb = AuthError::Provider("connection reset".into()).feedback();
        assert_eq!(fb.field, FeedbackField::General);
        assert_eq!(fb.message, "An unexpected error occurred.");
    }

    #[test]
    fn test_feedback_serializes_lowercase_field() {
        let json = serde_json::to_value(AuthErrorCode::WeakPassword.feedback()).unwrap();
        assert_eq!(json["field"], "password");
        assert_eq!(json["message"], "Password must be at least 6 characters.");
    }
}
