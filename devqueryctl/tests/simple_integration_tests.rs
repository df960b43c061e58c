//! Simple integration tests for the devquery client library
//!
//! These tests exercise the public API without a server: construction,
//! validation, and failures that happen before or instead of an HTTP exchange.

use devquery_core::{DevQueryError, Query};
use devqueryctl::client::{parse_base_url, DeviceClient, DEFAULT_TIMEOUT};
use devqueryctl::config::CliConfig;
use std::time::Duration;

#[test]
fn test_client_creation() {
    let client = DeviceClient::new("http://localhost:8889").unwrap();
    assert_eq!(client.base_url().as_str(), "http://localhost:8889/");
    assert_eq!(client.timeout(), DEFAULT_TIMEOUT);
    assert!(!client.is_authenticated());
}

#[test]
fn test_malformed_url_rejected() {
    match DeviceClient::new("not a url") {
        Err(DevQueryError::InvalidUrl { url, .. }) => assert_eq!(url, "not a url"),
        other => panic!("Expected InvalidUrl error, got {:?}", other),
    }
}

#[test]
fn test_default_port_from_scheme() {
    let url = parse_base_url("http://observatory.example.org").unwrap();
    assert_eq!(url.port_or_known_default(), Some(80));

    let url = parse_base_url("https://observatory.example.org").unwrap();
    assert_eq!(url.port_or_known_default(), Some(443));
}

#[test]
fn test_authenticated_client_creation() {
    let client = DeviceClient::with_credentials(
        "http://localhost:8889",
        "observer",
        "secret",
        Duration::from_secs(5),
    )
    .unwrap();
    assert!(client.is_authenticated());
    assert_eq!(client.timeout(), Duration::from_secs(5));

    // Credentials never appear in the debug output
    assert!(!format!("{:?}", client).contains("secret"));
}

#[test]
fn test_query_parsing() {
    let query: Query = "centrald.infotime".parse().unwrap();
    assert_eq!(query, Query::new("centrald", "infotime"));

    assert!(matches!(
        "centrald".parse::<Query>(),
        Err(DevQueryError::Usage(_))
    ));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // Reserve a port, then release it so the connection is refused
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = DeviceClient::with_config(
        &format!("http://127.0.0.1:{}", port),
        None,
        Duration::from_secs(2),
    )
    .unwrap();

    let err = client.get_value("centrald", "infotime").await.unwrap_err();
    assert!(matches!(err, DevQueryError::Transport { status: None, .. }));

    // Typed accessors fail the same way
    assert!(matches!(
        client.get_value_f64("centrald", "infotime").await,
        Err(DevQueryError::Transport { .. })
    ));
    assert!(matches!(
        client.get_value_date("centrald", "infotime").await,
        Err(DevQueryError::Transport { .. })
    ));
}

#[test]
fn test_config_defaults_match_client_defaults() {
    let config = CliConfig::default();
    assert_eq!(config.timeout_duration(), DEFAULT_TIMEOUT);
    assert!(DeviceClient::new(&config.server_url).is_ok());
}
