//! Workspace placeholder crate.
//!
//! This crate exists to expose feature flags that map to the individual
//! workspace crates (`core-api` for the lyrics server, `core-client` for the
//! client service and components). Hosts can depend on `toneteam-workspace`
//! and enable the documented features without wiring each crate individually.

#[cfg(feature = "server")]
pub use core_api as api;

#[cfg(feature = "client")]
pub use core_client as client;
