//! HTTP client for reading device values from a device-control server.

use chrono::{DateTime, Utc};
use devquery_core::{
    api, state, Credentials, DevQueryError, DeviceValues, FieldValue, MasterState, Result,
};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("devquery/", env!("CARGO_PKG_VERSION"));

/// Parse and validate a server base URL.
///
/// The URL must be absolute, use `http` or `https`, and name a host.
///
/// # Errors
///
/// Returns [`DevQueryError::InvalidUrl`] describing the first problem found.
pub fn parse_base_url(url: &str) -> Result<Url> {
    let invalid = |reason: String| DevQueryError::InvalidUrl {
        url: url.to_string(),
        reason,
    };

    let parsed = Url::parse(url.trim()).map_err(|e| invalid(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(invalid(format!(
                "unsupported scheme '{}', expected http or https",
                other
            )))
        }
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(invalid("URL has no host".to_string()));
    }

    Ok(parsed)
}

/// Build `{base_url}/api/get?d={device}`, keeping any base path.
fn endpoint_url(base_url: &Url, device: &str) -> Url {
    let mut url = base_url.clone();
    url.set_query(None);
    url.set_fragment(None);

    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().extend(api::GET_PATH);
    }
    url.query_pairs_mut()
        .append_pair(api::DEVICE_QUERY_PARAM, device);

    url
}

/// Endpoint description for logs and errors; never contains host or userinfo.
fn endpoint_label(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

/// HTTP client for a device-control server's JSON API.
///
/// Every accessor performs exactly one `GET {base_url}/api/get?d={device}`
/// request. Nothing is cached and failed requests are not retried.
///
/// # Examples
///
/// ```no_run
/// use devqueryctl::client::DeviceClient;
/// use std::time::Duration;
///
/// # async fn example() -> devquery_core::Result<()> {
/// let client = DeviceClient::with_credentials(
///     "http://localhost:8889",
///     "observer",
///     "secret",
///     Duration::from_secs(10),
/// )?;
///
/// let infotime = client.get_value_date("centrald", "infotime").await?;
/// println!("Last update: {}", infotime);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DeviceClient {
    client: Client,
    base_url: Url,
    credentials: Option<Credentials>,
    timeout: Duration,
}

impl DeviceClient {
    /// Create an unauthenticated client with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`DevQueryError::InvalidUrl`] if `base_url` is not a usable
    /// http(s) URL.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(base_url, None, DEFAULT_TIMEOUT)
    }

    /// Create a client that sends HTTP Basic credentials to the server.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The base URL is invalid ([`DevQueryError::InvalidUrl`])
    /// - The username is empty or contains `:` ([`DevQueryError::InvalidCredentials`])
    pub fn with_credentials(
        base_url: &str,
        username: &str,
        password: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;
        let credentials = Credentials::new(username, password)?;

        Self::build(base_url, Some(credentials), timeout)
    }

    /// Create a client with explicit configuration.
    ///
    /// No request is sent during construction.
    pub fn with_config(
        base_url: &str,
        credentials: Option<Credentials>,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;
        Self::build(base_url, credentials, timeout)
    }

    fn build(base_url: Url, credentials: Option<Credentials>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                DevQueryError::transport(
                    base_url.as_str(),
                    format!("failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self {
            client,
            base_url,
            credentials,
            timeout,
        })
    }

    /// Get the server base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether requests carry Basic credentials
    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    /// Credentials in scope for `url`: same host and effective port as the base URL.
    fn credentials_for(&self, url: &Url) -> Option<&Credentials> {
        let credentials = self.credentials.as_ref()?;

        let same_origin = url.host_str() == self.base_url.host_str()
            && url.port_or_known_default() == self.base_url.port_or_known_default();

        same_origin.then_some(credentials)
    }

    fn transport_error(&self, endpoint: &str, err: reqwest::Error) -> DevQueryError {
        let reason = if err.is_timeout() {
            format!("request timed out after {:?}", self.timeout)
        } else if err.is_connect() {
            format!("connection failed: {}", err)
        } else {
            err.to_string()
        };

        DevQueryError::transport(endpoint, reason)
    }

    /// Check the HTTP status and read the whole response body.
    ///
    /// # Errors
    ///
    /// Returns [`DevQueryError::Transport`] if:
    /// - The HTTP status code indicates failure (4xx or 5xx)
    /// - The response body cannot be read
    async fn handle_response(&self, response: Response, endpoint: &str) -> Result<String> {
        let status = response.status();

        if !status.is_success() {
            let reason = match status {
                StatusCode::UNAUTHORIZED => {
                    "Unauthorized (check the configured user and password)".to_string()
                }
                StatusCode::FORBIDDEN => "Access forbidden".to_string(),
                StatusCode::NOT_FOUND => "Not found".to_string(),
                StatusCode::SERVICE_UNAVAILABLE => "Service unavailable".to_string(),
                _ => format!("HTTP {}", status),
            };
            return Err(DevQueryError::http_status(endpoint, status.as_u16(), reason));
        }

        response
            .text()
            .await
            .map_err(|e| self.transport_error(endpoint, e))
    }

    /// Retrieve every value the server publishes for a device.
    #[instrument(skip(self))]
    pub async fn get_values(&self, device: &str) -> Result<DeviceValues> {
        let url = endpoint_url(&self.base_url, device);
        let endpoint = endpoint_label(&url);

        let mut request = self.client.get(url.clone());
        if let Some(credentials) = self.credentials_for(&url) {
            request = request.basic_auth(credentials.username(), Some(credentials.password()));
        }

        debug!(authenticated = self.is_authenticated(), "GET {}", endpoint);

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(&endpoint, e))?;
        let body = self.handle_response(response, &endpoint).await?;

        debug!("Received {} bytes from {}", body.len(), endpoint);

        DeviceValues::from_body(device, &body)
    }

    /// Retrieve the raw JSON value of `device.parameter`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The request fails or the server answers with an error status ([`DevQueryError::Transport`])
    /// - The body is not JSON ([`DevQueryError::Parse`])
    /// - `"d"` or `parameter` is missing ([`DevQueryError::FieldNotFound`])
    #[instrument(skip(self))]
    pub async fn get_field(&self, device: &str, parameter: &str) -> Result<FieldValue> {
        self.get_values(device).await?.into_field(parameter)
    }

    /// Retrieve `device.parameter` as a string.
    pub async fn get_value(&self, device: &str, parameter: &str) -> Result<String> {
        Ok(self.get_field(device, parameter).await?.to_display_string())
    }

    /// Retrieve `device.parameter` as a floating-point number.
    ///
    /// # Errors
    ///
    /// In addition to the [`get_value`](Self::get_value) errors, returns
    /// [`DevQueryError::NumericParse`] if the value is not a decimal number.
    pub async fn get_value_f64(&self, device: &str, parameter: &str) -> Result<f64> {
        let value = self.get_value(device, parameter).await?;
        devquery_core::parse_f64(&value)
    }

    /// Retrieve `device.parameter` as an instant, reading it as epoch milliseconds.
    ///
    /// # Errors
    ///
    /// In addition to the [`get_value_f64`](Self::get_value_f64) errors,
    /// returns [`DevQueryError::InvalidTimestamp`] if the number is out of range.
    pub async fn get_value_date(&self, device: &str, parameter: &str) -> Result<DateTime<Utc>> {
        let millis = self.get_value_f64(device, parameter).await?;
        devquery_core::timestamp_from_millis(millis)
    }

    /// Retrieve the state word of a device.
    ///
    /// # Errors
    ///
    /// Same as [`get_values`](Self::get_values), plus
    /// [`DevQueryError::FieldNotFound`] if the response carries no state.
    pub async fn get_state(&self, device: &str) -> Result<u64> {
        self.get_values(device).await?.device_state()
    }

    /// Retrieve the state word of the central server.
    pub async fn get_master_state(&self) -> Result<MasterState> {
        Ok(MasterState(self.get_state(state::MASTER_DEVICE).await?))
    }
}
