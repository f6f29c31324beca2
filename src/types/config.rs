//! Configuration Types
//!
//! Client configuration shared by the plain and intercepted pipelines.

use std::collections::HashMap;
use std::time::Duration;

use crate::builders::ClientConfigBuilder;
use crate::core::DEFAULT_MAX_RESPONSE_SIZE;
use crate::error::{ApiResult, ConfigurationError};

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Path of the refresh-token exchange endpoint, relative to the base URL.
pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";

/// Client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// API base URL, without a trailing slash.
    pub base_url: String,
    /// Refresh endpoint path.
    pub refresh_path: String,
    /// HTTP timeout.
    pub timeout: Duration,
    /// Largest response body accepted.
    pub max_response_size: usize,
    /// Headers sent with every request.
    pub default_headers: HashMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            timeout: Duration::from_secs(30),
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
            default_headers: default_headers(),
        }
    }
}

pub(crate) fn default_headers() -> HashMap<String, String> {
    [
        ("content-type".to_string(), "application/json".to_string()),
        ("accept".to_string(), "application/json".to_string()),
    ]
    .into_iter()
    .collect()
}

impl ClientConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `API_URL` (optional): API base URL, defaults to `http://localhost:5000/api`
    /// - `API_TIMEOUT` (optional): Request timeout in seconds
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> ApiResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = ClientConfigBuilder::new();

        if let Some(base_url) = lookup("API_URL") {
            builder = builder.base_url(base_url);
        }

        if let Some(timeout) = lookup("API_TIMEOUT") {
            let secs = timeout.trim().parse::<u64>().map_err(|_| {
                ConfigurationError::InvalidEnvironment {
                    name: "API_TIMEOUT".to_string(),
                    value: timeout.clone(),
                }
            })?;
            builder = builder.timeout(Duration::from_secs(secs));
        }

        builder.build()
    }

    /// Returns the full URL for an endpoint path.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Returns the full URL of the refresh endpoint.
    pub fn refresh_url(&self) -> String {
        self.endpoint_url(&self.refresh_path)
    }
}
