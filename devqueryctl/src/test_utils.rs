//! Test utilities for client testing
//!
//! Provides an in-process mock of the device-control server's `/api/get` endpoint.

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// Login accepted by the mock server when authentication is required
pub const TEST_USER: &str = "alice";
/// Password accepted by the mock server when authentication is required
pub const TEST_PASSWORD: &str = "secret";
/// `Authorization` header value for [`TEST_USER`]:[`TEST_PASSWORD`]
pub const TEST_AUTHORIZATION: &str = "Basic YWxpY2U6c2VjcmV0";

/// One request seen by the mock server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Value of the `d` query parameter
    pub device: Option<String>,
    /// Raw `Authorization` header
    pub authorization: Option<String>,
}

/// Mock server state
#[derive(Debug, Clone)]
pub struct MockServerState {
    /// Published values per device
    pub devices: Arc<Mutex<HashMap<String, Map<String, Value>>>>,
    /// Top-level state word per device
    pub states: Arc<Mutex<HashMap<String, u64>>>,
    /// Body returned verbatim instead of the device document
    pub raw_body: Arc<Mutex<Option<String>>>,
    /// Status returned instead of a document
    pub status: Arc<Mutex<Option<StatusCode>>>,
    /// Delay before answering
    pub delay: Arc<Mutex<Duration>>,
    /// Expected `Authorization` header, if authentication is enforced
    pub required_auth: Arc<Mutex<Option<String>>>,
    /// Every request received, in order
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl Default for MockServerState {
    fn default() -> Self {
        let mut devices = HashMap::new();

        let centrald = json!({
            "infotime": 1356998400000u64,
            "state": 0,
            "sun_alt": -18.25,
            "night_beginning": 1357056000000u64,
        });
        let telescope = json!({
            "target_name": "M 31",
            "TEL_alt": 45.5,
            "tracking": true,
        });

        if let (Value::Object(centrald), Value::Object(telescope)) = (centrald, telescope) {
            devices.insert("centrald".to_string(), centrald);
            devices.insert("T0".to_string(), telescope);
        }

        // centrald: switched on, night
        let states = HashMap::from([("centrald".to_string(), 0x003), ("T0".to_string(), 0)]);

        Self {
            devices: Arc::new(Mutex::new(devices)),
            states: Arc::new(Mutex::new(states)),
            raw_body: Arc::new(Mutex::new(None)),
            status: Arc::new(Mutex::new(None)),
            delay: Arc::new(Mutex::new(Duration::ZERO)),
            required_auth: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockServerState {
    /// Answer every request with `body` and status 200
    pub fn set_raw_body(&self, body: &str) {
        *self.raw_body.lock().unwrap() = Some(body.to_string());
    }

    /// Answer every request with `status`
    pub fn set_status(&self, status: Option<StatusCode>) {
        *self.status.lock().unwrap() = status;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    /// Reject requests without [`TEST_AUTHORIZATION`]
    pub fn require_auth(&self) {
        *self.required_auth.lock().unwrap() = Some(TEST_AUTHORIZATION.to_string());
    }

    /// Publish a value for a device
    pub fn set_value(&self, device: &str, parameter: &str, value: Value) {
        self.devices
            .lock()
            .unwrap()
            .entry(device.to_string())
            .or_default()
            .insert(parameter.to_string(), value);
    }

    /// Publish a device state word
    pub fn set_state(&self, device: &str, state: u64) {
        self.states
            .lock()
            .unwrap()
            .insert(device.to_string(), state);
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Mock server implementation
#[derive(Debug)]
pub struct MockServer {
    state: MockServerState,
    port: u16,
}

impl Default for MockServer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockServer {
    /// Create a new mock server
    pub fn new() -> Self {
        Self {
            state: MockServerState::default(),
            port: 0, // Will be assigned when server starts
        }
    }

    /// Start the mock server and return the address
    pub async fn start(mut self) -> Result<(Self, String)> {
        let app = self.create_router();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        self.port = addr.port();

        let server_url = format!("http://127.0.0.1:{}", self.port);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Mock server error: {}", e);
            }
        });

        Ok((self, server_url))
    }

    /// Get the server port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get a reference to the server state
    pub fn state(&self) -> &MockServerState {
        &self.state
    }

    /// Create the mock server router
    fn create_router(&self) -> Router {
        Router::new()
            .route("/api/get", get(get_handler))
            // Server mounted below a base path
            .route("/rts2/api/get", get(get_handler))
            .with_state(self.state.clone())
    }
}

async fn get_handler(
    State(state): State<MockServerState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let device = params.get("d").cloned();
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    state.requests.lock().unwrap().push(RecordedRequest {
        device: device.clone(),
        authorization: authorization.clone(),
    });

    let delay = *state.delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let required_auth = state.required_auth.lock().unwrap().clone();
    if let Some(expected) = required_auth {
        if authorization.as_deref() != Some(expected.as_str()) {
            return (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Basic realm=\"devquery\"")],
                "Unauthorized",
            )
                .into_response();
        }
    }

    let status = *state.status.lock().unwrap();
    if let Some(status) = status {
        return (status, "forced failure").into_response();
    }

    let raw_body = state.raw_body.lock().unwrap().clone();
    if let Some(body) = raw_body {
        return body.into_response();
    }

    let Some(device) = device else {
        return (StatusCode::BAD_REQUEST, "missing d parameter").into_response();
    };

    let values = state.devices.lock().unwrap().get(&device).cloned();
    let device_state = state.states.lock().unwrap().get(&device).copied();
    match values {
        Some(values) => {
            let mut document = json!({ "d": values, "idle": 1 });
            if let (Some(device_state), Value::Object(root)) = (device_state, &mut document) {
                root.insert("state".to_string(), json!(device_state));
            }
            Json(document).into_response()
        }
        None => (StatusCode::NOT_FOUND, format!("device {} not found", device)).into_response(),
    }
}
