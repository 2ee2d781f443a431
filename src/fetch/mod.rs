use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio::time::sleep;

use crate::error::{DocsError, Result};

/// Loads the raw JSON of one OpenAPI source.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, source: &str) -> Result<Value>;
}

/// Fetches sources over HTTP(S), falling back to the local filesystem for
/// anything that is not an `http://` or `https://` URL.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    max_retries: usize,
    initial_delay: Duration,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("openapi-docs-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DocsError::Fetch {
                url: String::new(),
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
        })
    }

    /// Fetch a URL, retrying transient failures with exponential backoff.
    async fn fetch_url(&self, url: &str) -> Result<String> {
        let mut delay = self.initial_delay;
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.fetch_once(url).await {
                Ok(body) => {
                    tracing::info!("Fetched {} bytes from {}", body.len(), url);
                    return Ok(body);
                }
                Err(FetchFailure::Transient(message)) if attempt < self.max_retries => {
                    tracing::warn!(
                        "Retry {}/{} for {}: {}",
                        attempt,
                        self.max_retries - 1,
                        url,
                        message
                    );
                    sleep(delay).await;
                    delay *= 2;
                }
                Err(FetchFailure::Transient(message) | FetchFailure::Permanent(message)) => {
                    return Err(DocsError::Fetch {
                        url: url.to_string(),
                        message,
                    });
                }
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> std::result::Result<String, FetchFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchFailure::Transient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = format!("HTTP status {status}");
            return Err(if is_transient(status) {
                FetchFailure::Transient(message)
            } else {
                FetchFailure::Permanent(message)
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchFailure::Transient(e.to_string()))
    }

    async fn read_file(&self, source: &str) -> Result<String> {
        let path = source.strip_prefix("file://").unwrap_or(source);
        let body = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DocsError::Io {
                path: path.to_string(),
                message: e.to_string(),
            })?;
        tracing::info!("Read {} bytes from {}", body.len(), path);
        Ok(body)
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch(&self, source: &str) -> Result<Value> {
        let body = if is_remote(source) {
            self.fetch_url(source).await?
        } else {
            self.read_file(source).await?
        };

        serde_json::from_str(&body).map_err(|e| DocsError::Decode {
            url: source.to_string(),
            message: e.to_string(),
        })
    }
}

enum FetchFailure {
    Transient(String),
    Permanent(String),
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

fn is_transient(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}
