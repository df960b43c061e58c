//! devquery CLI Library
//!
//! This library provides the core functionality for the `devquery` CLI tool.
//!
//! # Public API
//!
//! The primary public API is the [`client::DeviceClient`] which reads values
//! from a device-control server. Configuration types are also available via
//! [`config::CliConfig`] and [`config::ConfigBuilder`].
//!
//! ```no_run
//! use devqueryctl::client::DeviceClient;
//!
//! # async fn example() -> devquery_core::Result<()> {
//! let client = DeviceClient::new("http://localhost:8889")?;
//!
//! let state = client.get_value("centrald", "state").await?;
//! println!("centrald.state = {}", state);
//! # Ok(())
//! # }
//! ```

// Internal CLI implementation - not part of public API
#[doc(hidden)]
pub mod cli;

/// HTTP client for communicating with the device-control server.
pub mod client;

/// Configuration types for the CLI tool.
pub mod config;

// Internal formatting functions - not part of public API
#[doc(hidden)]
pub mod format;

#[cfg(test)]
pub mod test_utils;
