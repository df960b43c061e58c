//! Action execution handlers

use anyhow::Result;
use devquery_core::{DevQueryError, MasterCondition, Query, ValueType};
use tracing::{debug, warn};

use crate::client::DeviceClient;
use crate::config::CliConfig;
use crate::format::{
    format_device_states, format_device_values, format_master_state, format_value, FetchedValue,
};

use super::commands::*;

/// Build the client described by the configuration.
///
/// When a user is configured, authenticated construction is tried first. If
/// the credentials are unusable (empty or malformed user name, no password),
/// a warning is logged and an unauthenticated client for the same URL is
/// returned. A password without a user is also logged. An invalid URL is
/// always an error.
pub fn build_client(config: &CliConfig) -> devquery_core::Result<DeviceClient> {
    let timeout = config.timeout_duration();

    if let Some(username) = &config.username {
        let attempt = match &config.password {
            Some(password) => {
                DeviceClient::with_credentials(&config.server_url, username, password, timeout)
            }
            None => Err(DevQueryError::InvalidCredentials(format!(
                "no password configured for user '{}'",
                username
            ))),
        };

        match attempt {
            Ok(client) => {
                debug!("Authenticating to {} as {}", config.server_url, username);
                return Ok(client);
            }
            Err(e @ DevQueryError::InvalidCredentials(_)) => {
                warn!(
                    "{}; falling back to unauthenticated access to {}",
                    e, config.server_url
                );
            }
            Err(e) => return Err(e),
        }
    } else if config.password.is_some() {
        warn!(
            "password configured without a user; falling back to unauthenticated access to {}",
            config.server_url
        );
    }

    DeviceClient::with_config(&config.server_url, None, timeout)
}

/// Fetch a value through the accessor matching `value_type`
pub async fn fetch_value(
    client: &DeviceClient,
    query: &Query,
    value_type: ValueType,
) -> devquery_core::Result<FetchedValue> {
    let Query { device, parameter } = query;

    let value = match value_type {
        ValueType::String => FetchedValue::Raw(client.get_field(device, parameter).await?),
        ValueType::Number => FetchedValue::Number(client.get_value_f64(device, parameter).await?),
        ValueType::Date => FetchedValue::Date(client.get_value_date(device, parameter).await?),
    };

    Ok(value)
}

/// Handle -G / -g
pub async fn handle_get(
    client: &DeviceClient,
    query: &Query,
    value_type: ValueType,
    named: bool,
    format: &OutputFormat,
) -> Result<()> {
    let value = fetch_value(client, query, value_type).await?;
    let formatted = format_value(query, &value, named, &format.into())?;
    println!("{}", formatted);

    Ok(())
}

/// Handle --list
pub async fn handle_list(client: &DeviceClient, device: &str, format: &OutputFormat) -> Result<()> {
    let values = client.get_values(device).await?;
    let formatted = format_device_values(&values, &format.into())?;
    println!("{}", formatted);

    Ok(())
}

/// Handle -S
///
/// Devices are queried in order; the first failure aborts.
pub async fn handle_state(
    client: &DeviceClient,
    devices: &[String],
    format: &OutputFormat,
) -> Result<()> {
    let mut states = Vec::with_capacity(devices.len());
    for device in devices {
        states.push((device.clone(), client.get_state(device).await?));
    }

    println!("{}", format_device_states(&states, &format.into())?);
    Ok(())
}

/// Handle --master-state
pub async fn handle_master_state(
    client: &DeviceClient,
    condition: Option<MasterCondition>,
    format: &OutputFormat,
) -> Result<()> {
    let state = client.get_master_state().await?;
    debug!("Central server state {:#x}", state.0);

    println!("{}", format_master_state(state, condition, &format.into())?);
    Ok(())
}

/// Generate shell completion script
pub fn generate_completion(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}
