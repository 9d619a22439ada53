//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure shared by the lyrics server
//! and the client components:
//! - Logging and tracing infrastructure
//! - Server configuration
//! - Typed notification bus
//! - Component scopes that own bus subscriptions
//!
//! ## Overview
//!
//! This crate contains the runtime utilities every other crate depends on.
//! It establishes the logging conventions, the configuration surface and the
//! publish/subscribe mechanism UI components use to coordinate without
//! holding references to each other.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod scope;

pub use error::{Error, Result};
