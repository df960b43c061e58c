//! Wire models for the device-control JSON API
//!
//! The server answers `GET /api/get?d=<device>` with a JSON object whose
//! top-level `"d"` member maps the device's field names to values:
//!
//! ```json
//! {"d": {"infotime": 1356998400000, "state": 0}, "minmax": {}, "idle": 1}
//! ```
//!
//! Only the nested `"d"` layout is supported for values. The top-level
//! integer `"state"` is kept as the device state; other members are ignored.

use crate::error::{DevQueryError, Result};
use crate::types::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Path of the value retrieval endpoint, relative to the server base URL
pub const GET_PATH: [&str; 2] = ["api", "get"];

/// Name of the query parameter carrying the device name
pub const DEVICE_QUERY_PARAM: &str = "d";

/// Top-level member holding the device's values
pub const VALUES_MEMBER: &str = "d";

/// Top-level member holding the device's state word
pub const STATE_MEMBER: &str = "state";

/// Values of one device, as returned by a single `/api/get` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceValues {
    /// Device the values were fetched for
    pub device: String,
    /// Field name to raw JSON value, sorted by name
    pub values: BTreeMap<String, serde_json::Value>,
    /// Device state word, when the server sent one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<u64>,
}

impl DeviceValues {
    /// Parse a response body
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The body is not a JSON document ([`DevQueryError::Parse`])
    /// - `"d"` is missing or not an object ([`DevQueryError::FieldNotFound`])
    pub fn from_body(device: &str, body: &str) -> Result<Self> {
        let document: serde_json::Value = serde_json::from_str(body)?;
        Self::from_document(device, document)
    }

    /// Extract the `"d"` object from a parsed response document
    pub fn from_document(device: &str, document: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(mut root) = document else {
            return Err(DevQueryError::FieldNotFound(format!(
                "response for device '{}' is not a JSON object",
                device
            )));
        };

        let state = root.get(STATE_MEMBER).and_then(serde_json::Value::as_u64);

        match root.remove(VALUES_MEMBER) {
            Some(serde_json::Value::Object(values)) => Ok(Self {
                device: device.to_string(),
                values: values.into_iter().collect(),
                state,
            }),
            Some(_) => Err(DevQueryError::FieldNotFound(format!(
                "'{}' member of response for device '{}' is not an object",
                VALUES_MEMBER, device
            ))),
            None => Err(DevQueryError::FieldNotFound(format!(
                "response for device '{}' has no '{}' member",
                device, VALUES_MEMBER
            ))),
        }
    }

    /// Look up one field
    ///
    /// # Errors
    ///
    /// Returns [`DevQueryError::FieldNotFound`] if the device has no such field.
    pub fn get(&self, parameter: &str) -> Result<FieldValue> {
        self.values
            .get(parameter)
            .cloned()
            .map(FieldValue::new)
            .ok_or_else(|| {
                DevQueryError::FieldNotFound(format!("{}.{}", self.device, parameter))
            })
    }

    /// Take one field, consuming the device values
    pub fn into_field(mut self, parameter: &str) -> Result<FieldValue> {
        self.values
            .remove(parameter)
            .map(FieldValue::new)
            .ok_or_else(|| {
                DevQueryError::FieldNotFound(format!("{}.{}", self.device, parameter))
            })
    }

    /// The device state word
    ///
    /// # Errors
    ///
    /// Returns [`DevQueryError::FieldNotFound`] if the response carried no
    /// integer `"state"` member.
    pub fn device_state(&self) -> Result<u64> {
        self.state.ok_or_else(|| {
            DevQueryError::FieldNotFound(format!("state of device '{}'", self.device))
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
