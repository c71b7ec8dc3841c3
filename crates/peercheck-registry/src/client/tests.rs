//! Unit tests for registry client

use super::*;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_retries: 2,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        multiplier: 2.0,
    }
}

async fn client_for(server: &MockServer) -> RegistryClient {
    RegistryClient::with_registry(&server.uri(), AuthConfig::default())
        .unwrap()
        .with_retry_config(fast_retry())
}

fn packument(name: &str, versions: &[&str]) -> serde_json::Value {
    let versions: serde_json::Map<String, serde_json::Value> = versions
        .iter()
        .map(|v| (v.to_string(), serde_json::json!({ "version": v })))
        .collect();
    serde_json::json!({
        "name": name,
        "dist-tags": { "latest": "2.0.0" },
        "versions": versions,
    })
}

#[test]
fn test_registry_client_creation() {
    let client = RegistryClient::new().unwrap();
    assert_eq!(client.base_url(), "https://registry.npmjs.org");
    assert_eq!(client.retry_config.max_retries, 3);
}

#[test]
fn test_registry_url_validation() {
    assert!(RegistryClient::with_registry("not a url", AuthConfig::default()).is_err());
    assert!(RegistryClient::with_registry("ftp://npm.example.com", AuthConfig::default()).is_err());

    let client = RegistryClient::with_registry("https://npm.example.com/", AuthConfig::default()).unwrap();
    assert_eq!(client.base_url(), "https://npm.example.com");
}

#[test]
fn test_encode_package_name() {
    assert_eq!(encode_package_name("lodash"), "lodash");
    assert_eq!(encode_package_name("@types/node"), "@types%2fnode");
}

#[test]
fn test_retry_config_default() {
    let config = RetryConfig::default();
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.initial_delay, Duration::from_millis(100));
    assert_eq!(config.max_delay, Duration::from_secs(10));
    assert_eq!(config.multiplier, 2.0);
}

#[tokio::test]
async fn test_fetch_versions_sorted_and_filtered() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/react"))
        .and(header("Accept", "application/vnd.npm.install-v1+json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(packument("react", &["2.0.0", "1.0.0", "not-semver", "1.5.0"])),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let versions = client.fetch_versions("react").await.unwrap();

    assert_eq!(
        versions,
        vec![Version::new(1, 0, 0), Version::new(1, 5, 0), Version::new(2, 0, 0)]
    );
}

#[tokio::test]
async fn test_fetch_versions_uses_cache() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/react"))
        .respond_with(ResponseTemplate::new(200).set_body_json(packument("react", &["1.0.0"])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    client.fetch_versions("react").await.unwrap();
    client.fetch_versions("react").await.unwrap();
    // The mock's expect(1) is verified when the server drops
}

#[tokio::test]
async fn test_fetch_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nonexistent-package"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;

    match client.fetch_versions("nonexistent-package").await.unwrap_err() {
        PeerCheckError::PackageNotFound { name } => assert_eq!(name, "nonexistent-package"),
        other => panic!("Expected PackageNotFound error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_version_source_treats_unknown_package_as_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let versions = client.available_versions("ghost").await.unwrap();
    assert!(versions.is_empty());
}

#[tokio::test]
async fn test_retry_on_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(packument("flaky", &["1.0.0"])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let versions = client.available_versions("flaky").await.unwrap();
    assert_eq!(versions, vec![Version::new(1, 0, 0)]);
}

#[tokio::test]
async fn test_server_error_propagates_after_retries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let err = client.available_versions("down").await.unwrap_err();
    assert!(matches!(err, PeerCheckError::Network { .. }));
}

#[tokio::test]
async fn test_scoped_package_url_encoding() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/@types%2fnode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(packument("@types/node", &["18.0.0"])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let versions = client.fetch_versions("@types/node").await.unwrap();
    assert_eq!(versions, vec![Version::new(18, 0, 0)]);
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/private-pkg"))
        .and(header("Authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(packument("private-pkg", &["0.1.0"])))
        .mount(&mock_server)
        .await;

    let auth = AuthConfig {
        token: Some("secret-token".to_string()),
    };
    let client = RegistryClient::with_registry(&mock_server.uri(), auth)
        .unwrap()
        .with_retry_config(fast_retry());

    let versions = client.fetch_versions("private-pkg").await.unwrap();
    assert_eq!(versions, vec![Version::new(0, 1, 0)]);
}
