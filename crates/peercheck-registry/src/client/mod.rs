//! HTTP client implementation with connection pooling and retry logic

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use tracing::{debug, warn};

use peercheck_core::error::PeerCheckError;
use peercheck_core::types::Version;
use crate::{api::Packument, cache::MetadataCache, RegistryResult, VersionSource};

/// Configuration for exponential backoff retry logic
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

/// Authentication configuration for registry access
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Bearer token for authentication
    pub token: Option<String>,
}

/// HTTP client for npm registry version lookups
#[derive(Debug, Clone)]
pub struct RegistryClient {
    /// Underlying HTTP client with connection pooling
    client: Client,
    /// Retry configuration
    retry_config: RetryConfig,
    /// Base registry URL, without trailing slash
    base_url: String,
    /// Version lists already fetched during this run
    cache: Arc<MetadataCache>,
}

impl RegistryClient {
    /// Create a client for the public npm registry
    pub fn new() -> RegistryResult<Self> {
        Self::with_registry("https://registry.npmjs.org", AuthConfig::default())
    }

    /// Create a client for a custom registry
    pub fn with_registry(base_url: &str, auth: AuthConfig) -> RegistryResult<Self> {
        let parsed = url::Url::parse(base_url).map_err(|e| PeerCheckError::ConfigValidation {
            field: "registry".to_string(),
            reason: format!("'{}' is not a valid URL: {}", base_url, e),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(PeerCheckError::ConfigValidation {
                field: "registry".to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let mut builder = ClientBuilder::new()
            // Connection pooling configuration
            .pool_max_idle_per_host(8)
            .pool_idle_timeout(Duration::from_secs(90))
            // Request timeout
            .timeout(Duration::from_secs(30))
            // Enable gzip compression
            .gzip(true)
            // User agent
            .user_agent(concat!("peercheck/", env!("CARGO_PKG_VERSION")));

        if let Some(token) = auth.token {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", token).parse().map_err(|e| PeerCheckError::Network {
                    message: format!("Invalid auth token: {}", e),
                    source: Some(Box::new(e)),
                })?,
            );
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|e| PeerCheckError::Network {
            message: format!("Failed to create HTTP client: {}", e),
            source: Some(Box::new(e)),
        })?;

        Ok(Self {
            client,
            retry_config: RetryConfig::default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: Arc::new(MetadataCache::new()),
        })
    }

    /// Replace the retry configuration
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Registry base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute HTTP request with exponential backoff retry logic
    async fn with_retry<F, Fut, T>(&self, operation: F) -> RegistryResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = RegistryResult<T>>,
    {
        let mut delay = self.retry_config.initial_delay;
        let mut last_error = None;

        for attempt in 0..=self.retry_config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(error) => {
                    // Don't retry on final attempt or on definitive answers
                    if attempt == self.retry_config.max_retries || !error.is_recoverable() {
                        return Err(error);
                    }

                    warn!("Registry request failed (attempt {}): {}", attempt + 1, error);
                    last_error = Some(error);

                    tokio::time::sleep(delay).await;

                    delay = std::cmp::min(
                        Duration::from_millis(
                            (delay.as_millis() as f64 * self.retry_config.multiplier) as u64,
                        ),
                        self.retry_config.max_delay,
                    );
                },
            }
        }

        Err(last_error.unwrap_or_else(|| PeerCheckError::Network {
            message: "Retry operation failed without error".to_string(),
            source: None,
        }))
    }

    /// Fetch the abbreviated package document with retry logic
    pub async fn fetch_packument(&self, package_name: &str) -> RegistryResult<Packument> {
        let url = format!("{}/{}", self.base_url, encode_package_name(package_name));
        debug!("GET {}", url);

        self.with_retry(|| async {
            let response = self
                .client
                .get(&url)
                .header("Accept", "application/vnd.npm.install-v1+json")
                .send()
                .await
                .map_err(|e| PeerCheckError::network(format!("Failed to fetch {}: {}", package_name, e), e))?;

            match response.status() {
                reqwest::StatusCode::OK => response.json::<Packument>().await.map_err(|e| {
                    PeerCheckError::JsonParse {
                        path: url.clone(),
                        message: e.to_string(),
                    }
                }),
                reqwest::StatusCode::NOT_FOUND => Err(PeerCheckError::PackageNotFound {
                    name: package_name.to_string(),
                }),
                status => Err(PeerCheckError::Network {
                    message: format!("Registry returned status {}: {}", status, package_name),
                    source: None,
                }),
            }
        })
        .await
    }

    /// List published versions, sorted ascending; unparsable keys are skipped
    pub async fn fetch_versions(&self, package_name: &str) -> RegistryResult<Vec<Version>> {
        if let Some(versions) = self.cache.get(package_name) {
            debug!("Using cached versions for {}", package_name);
            return Ok(versions);
        }

        let packument = self.fetch_packument(package_name).await?;
        let mut versions: Vec<Version> = packument
            .versions
            .keys()
            .filter_map(|raw| match Version::from_str(raw) {
                Ok(version) => Some(version),
                Err(e) => {
                    debug!("Skipping unparsable version {}@{}: {}", package_name, raw, e);
                    None
                },
            })
            .collect();
        versions.sort();

        self.cache.insert(package_name.to_string(), versions.clone());
        Ok(versions)
    }
}

#[async_trait]
impl VersionSource for RegistryClient {
    async fn available_versions(&self, name: &str) -> RegistryResult<Vec<Version>> {
        match self.fetch_versions(name).await {
            Err(PeerCheckError::PackageNotFound { .. }) => {
                warn!("{} is not published on {}", name, self.base_url);
                Ok(Vec::new())
            },
            other => other,
        }
    }
}

/// Encode package name for URL (handle scoped packages)
fn encode_package_name(name: &str) -> String {
    if name.starts_with('@') {
        // Scoped package: @org/pkg → @org%2fpkg
        name.replace('/', "%2f")
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests;
