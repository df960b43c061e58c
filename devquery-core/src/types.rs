//! Core types and data structures for device queries

use crate::error::{DevQueryError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between device name and parameter name in a query string
pub const QUERY_SEPARATOR: char = '.';

/// A `(device, parameter)` pair naming one value on the server
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    /// Device name, sent to the server as the `d` query parameter
    pub device: String,
    /// Field name looked up inside the response's `"d"` object
    pub parameter: String,
}

impl Query {
    /// Create a query from its parts
    pub fn new(device: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            parameter: parameter.into(),
        }
    }

    /// Parse `device.parameter`, splitting on the first `.`
    ///
    /// The parameter part may itself contain dots.
    ///
    /// # Errors
    ///
    /// Returns [`DevQueryError::Usage`] if the separator is missing or either
    /// side of it is empty.
    pub fn parse(s: &str) -> Result<Self> {
        let (device, parameter) = s.split_once(QUERY_SEPARATOR).ok_or_else(|| {
            DevQueryError::Usage(format!(
                "cannot find '{}' separating device and parameter in '{}'",
                QUERY_SEPARATOR, s
            ))
        })?;

        if device.is_empty() {
            return Err(DevQueryError::Usage(format!(
                "device name is empty in '{}'",
                s
            )));
        }
        if parameter.is_empty() {
            return Err(DevQueryError::Usage(format!(
                "parameter name is empty in '{}'",
                s
            )));
        }

        Ok(Self::new(device, parameter))
    }

    /// Shell-friendly name: `device_parameter`
    pub fn env_name(&self) -> String {
        format!("{}_{}", self.device, self.parameter)
    }
}

impl FromStr for Query {
    type Err = DevQueryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.device, QUERY_SEPARATOR, self.parameter)
    }
}

/// HTTP Basic credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Create validated credentials
    ///
    /// # Errors
    ///
    /// Returns [`DevQueryError::InvalidCredentials`] if the username is empty
    /// or contains `:`, which Basic authentication cannot encode.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let username = username.into();
        if username.is_empty() {
            return Err(DevQueryError::InvalidCredentials(
                "username cannot be empty".to_string(),
            ));
        }
        if username.contains(':') {
            return Err(DevQueryError::InvalidCredentials(format!(
                "username '{}' cannot contain ':'",
                username
            )));
        }

        Ok(Self {
            username,
            password: password.into(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

// Keep passwords out of logs and error details.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Requested interpretation of a fetched value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Display string of the JSON value
    #[default]
    String,
    /// Decimal floating-point number
    Number,
    /// Epoch-millisecond timestamp
    Date,
}

/// Raw JSON value found at `response["d"][parameter]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValue(serde_json::Value);

impl FieldValue {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// The underlying JSON value
    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_json(self) -> serde_json::Value {
        self.0
    }

    /// String representation used for display and numeric coercion
    ///
    /// JSON strings yield their contents without quotes; everything else
    /// yields its compact JSON text.
    pub fn to_display_string(&self) -> String {
        match &self.0 {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Interpret the value as a decimal floating-point number
    pub fn to_f64(&self) -> Result<f64> {
        parse_f64(&self.to_display_string())
    }

    /// Interpret the value as epoch milliseconds
    pub fn to_timestamp(&self) -> Result<DateTime<Utc>> {
        timestamp_from_millis(self.to_f64()?)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

/// Parse a decimal floating-point number, ignoring surrounding whitespace
///
/// `NaN` and the infinities are not decimal numbers and are rejected.
pub fn parse_f64(s: &str) -> Result<f64> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| DevQueryError::NumericParse {
            value: s.to_string(),
        })
}

/// Convert epoch milliseconds to an instant, truncating sub-millisecond parts
pub fn timestamp_from_millis(millis: f64) -> Result<DateTime<Utc>> {
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return Err(DevQueryError::InvalidTimestamp(millis));
    }

    DateTime::<Utc>::from_timestamp_millis(millis.trunc() as i64)
        .ok_or(DevQueryError::InvalidTimestamp(millis))
}
