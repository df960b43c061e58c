//! devquery Core Library
//!
//! Shared types, wire models, and errors for reading device values from a
//! device-control server's JSON API. Used by the `devqueryctl` client and CLI.

pub mod api;
pub mod error;
pub mod state;
pub mod types;

// Re-export commonly used types
pub use api::DeviceValues;
pub use error::*;
pub use state::{MasterCondition, MasterState};
pub use types::*;
