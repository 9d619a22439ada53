//! JSON response bodies.
//!
//! Every lyrics and session endpoint answers with the same shape:
//!
//! ```json
//! { "success": true, "data": { ... } }
//! { "success": false, "message": "Lyrics not found" }
//! { "success": false, "field": "email", "message": "Invalid email format." }
//! ```

use core_auth::{FeedbackField, Principal};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<FeedbackField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<&'static str>,
}

impl<T> Envelope<T> {
    fn empty(success: bool) -> Self {
        Self {
            success,
            data: None,
            message: None,
            field: None,
            redirect_url: None,
        }
    }

    pub fn data(data: T) -> Self {
        Self {
            data: Some(data),
            ..Self::empty(true)
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::empty(false)
        }
    }

    pub fn with_field(mut self, field: FeedbackField) -> Self {
        self.field = Some(field);
        self
    }
}

impl Envelope<()> {
    pub fn ok() -> Self {
        Self::empty(true)
    }

    pub fn success_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::empty(true)
        }
    }

    pub fn redirect(url: &'static str) -> Self {
        Self {
            redirect_url: Some(url),
            ..Self::empty(true)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Body of `GET /auth/check`.
#[derive(Debug, Serialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Principal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_envelope() {
        let body = serde_json::to_value(Envelope::data(vec![1, 2])).unwrap();
        assert_eq!(body, json!({"success": true, "data": [1, 2]}));
    }

    #[test]
    fn test_failure_with_field() {
        let body = Envelope::<()>::failure("Invalid email format.").with_field(FeedbackField::Email);
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({"success": false, "field": "email", "message": "Invalid email format."})
        );
    }

    #[test]
    fn test_redirect_uses_camel_case() {
        let body = Envelope::redirect("/").with_message("Logout successful");
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({"success": true, "redirectUrl": "/", "message": "Logout successful"})
        );
    }
}
