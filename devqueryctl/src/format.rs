//! Output formatting utilities for the CLI
//!
//! Provides plain, table and JSON formatting.

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use colored::*;
use devquery_core::{DeviceValues, FieldValue, MasterCondition, MasterState, Query};
use tabled::{settings::Style, Table, Tabled};

/// Output format options
#[derive(Debug, Clone)]
pub enum OutputFormat {
    Plain,
    Json,
}

/// A value fetched through one of the typed accessors
#[derive(Debug, Clone, PartialEq)]
pub enum FetchedValue {
    /// Raw JSON value
    Raw(FieldValue),
    Number(f64),
    Date(DateTime<Utc>),
}

impl FetchedValue {
    /// Text printed in plain output
    pub fn to_plain_string(&self) -> String {
        match self {
            FetchedValue::Raw(value) => value.to_display_string(),
            FetchedValue::Number(n) => n.to_string(),
            FetchedValue::Date(date) => format_timestamp(date),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            FetchedValue::Raw(value) => value.as_json().clone(),
            FetchedValue::Number(n) => serde_json::json!(n),
            FetchedValue::Date(date) => serde_json::Value::String(format_timestamp(date)),
        }
    }
}

/// RFC 3339 with millisecond precision and `Z` suffix
pub fn format_timestamp(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Format a single fetched value
///
/// In plain output `named` prefixes the value with `device_parameter=`.
pub fn format_value(
    query: &Query,
    value: &FetchedValue,
    named: bool,
    format: &OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "device": query.device,
                "parameter": query.parameter,
                "value": value.to_json(),
            });
            Ok(serde_json::to_string_pretty(&response)?)
        }
        OutputFormat::Plain => {
            if named {
                Ok(format!("{}={}", query.env_name(), value.to_plain_string()))
            } else {
                Ok(value.to_plain_string())
            }
        }
    }
}

/// Format every value of a device
pub fn format_device_values(values: &DeviceValues, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(values)?),
        OutputFormat::Plain => {
            #[derive(Tabled)]
            struct ValueRow {
                #[tabled(rename = "Parameter")]
                parameter: String,
                #[tabled(rename = "Value")]
                value: String,
            }

            let rows: Vec<ValueRow> = values
                .values
                .iter()
                .map(|(parameter, value)| ValueRow {
                    parameter: parameter.clone(),
                    value: FieldValue::new(value.clone()).to_display_string(),
                })
                .collect();

            let mut output = String::new();
            output.push_str(&format!("Device: {}", values.device.cyan()).bold().to_string());
            output.push('\n');

            if rows.is_empty() {
                output.push_str("No values published");
            } else {
                let table = Table::new(rows).with(Style::rounded()).to_string();
                output.push_str(&table);
            }

            Ok(output)
        }
    }
}

/// Format device state words, one `device state` line each in plain output
pub fn format_device_states(states: &[(String, u64)], format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let map: serde_json::Map<String, serde_json::Value> = states
                .iter()
                .map(|(device, state)| (device.clone(), serde_json::json!(state)))
                .collect();
            Ok(serde_json::to_string_pretty(&map)?)
        }
        OutputFormat::Plain => Ok(states
            .iter()
            .map(|(device, state)| format!("{} {}", device, state))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// Format the central server state
///
/// With a condition, plain output is `1` when it holds and `0` otherwise.
pub fn format_master_state(
    state: MasterState,
    condition: Option<MasterCondition>,
    format: &OutputFormat,
) -> Result<String> {
    match (format, condition) {
        (OutputFormat::Json, None) => Ok(serde_json::to_string_pretty(
            &serde_json::json!({ "state": state }),
        )?),
        (OutputFormat::Json, Some(condition)) => {
            let response = serde_json::json!({
                "state": state,
                "condition": condition.as_str(),
                "satisfied": state.satisfies(condition),
            });
            Ok(serde_json::to_string_pretty(&response)?)
        }
        (OutputFormat::Plain, None) => Ok(state.to_string()),
        (OutputFormat::Plain, Some(condition)) => {
            Ok(u8::from(state.satisfies(condition)).to_string())
        }
    }
}
