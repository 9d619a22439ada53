//! # Authentication Module
//!
//! Credential verification behind a pluggable identity provider.
//!
//! ## Overview
//!
//! The server never stores passwords itself when a hosted provider is
//! configured; it forwards credentials to an [`IdentityProvider`] and keeps
//! only the resulting [`Principal`] in the session. Provider refusals are
//! normalized into [`AuthErrorCode`] so the HTTP layer can render the same
//! field-specific messages regardless of backend.
//!
//! ## Providers
//!
//! - [`FirebaseIdentityProvider`] - Identity Toolkit REST API (email/password)
//! - [`InMemoryIdentityProvider`] - process-local accounts for development and tests

pub mod error;
pub mod firebase;
pub mod memory;
pub mod provider;
pub mod types;

pub use error::{AuthError, AuthErrorCode, Feedback, FeedbackField, Result};
pub use firebase::FirebaseIdentityProvider;
pub use memory::InMemoryIdentityProvider;
pub use provider::IdentityProvider;
pub use types::{Credentials, Principal};
