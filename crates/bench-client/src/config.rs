//! Configuration for the Ollama client

use bench_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Default endpoint the serving container publishes on
const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Configuration for the Ollama HTTP client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Endpoint base URL
    pub endpoint: Url,

    /// Request timeout. Generate calls against large models can run for
    /// minutes, so the default is generous.
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Create a client configuration for the given endpoint
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            ..Self::default()
        }
    }

    /// Set the endpoint URL from a string
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.endpoint = Url::parse(endpoint)
            .map_err(|e| Error::config(format!("invalid endpoint {}: {}", endpoint, e)))?;
        Ok(self)
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        match self.endpoint.scheme() {
            "http" | "https" => {}
            other => {
                return Err(Error::config(format!(
                    "endpoint scheme must be http or https, got {}",
                    other
                )));
            }
        }

        if self.request_timeout.is_zero() {
            return Err(Error::config("request_timeout must be > 0"));
        }

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).unwrap(),
            request_timeout: Duration::from_secs(600),
        }
    }
}
