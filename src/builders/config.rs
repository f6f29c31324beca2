//! Configuration Builder
//!
//! Fluent builder for client configuration.

use std::collections::HashMap;
use std::time::Duration;

use url::Url;

use crate::core::DEFAULT_MAX_RESPONSE_SIZE;
use crate::error::{ApiError, ApiResult, ConfigurationError};
use crate::types::config::{default_headers, DEFAULT_BASE_URL, DEFAULT_REFRESH_PATH};
use crate::types::ClientConfig;

/// Client configuration builder.
#[derive(Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    refresh_path: Option<String>,
    timeout: Option<Duration>,
    max_response_size: Option<usize>,
    headers: HashMap<String, String>,
}

impl ClientConfigBuilder {
    /// Create new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set API base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set refresh endpoint path.
    pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = Some(path.into());
        self
    }

    /// Set request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set maximum response body size.
    pub fn max_response_size(mut self, size: usize) -> Self {
        self.max_response_size = Some(size);
        self
    }

    /// Add a header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_lowercase(), value.into());
        self
    }

    /// Build the client configuration.
    pub fn build(self) -> ApiResult<ClientConfig> {
        let raw = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let trimmed = raw.trim().trim_end_matches('/').to_string();

        let parsed = Url::parse(&trimmed).map_err(|_| {
            ApiError::Configuration(ConfigurationError::InvalidBaseUrl { url: raw.clone() })
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::Configuration(ConfigurationError::InvalidBaseUrl {
                url: raw,
            }));
        }

        let refresh_path = self
            .refresh_path
            .unwrap_or_else(|| DEFAULT_REFRESH_PATH.to_string());
        if refresh_path.trim().is_empty() {
            return Err(ApiError::Configuration(ConfigurationError::MissingField {
                field: "refresh_path".to_string(),
            }));
        }

        let timeout = self.timeout.unwrap_or(Duration::from_secs(30));
        if timeout.is_zero() {
            return Err(ApiError::Configuration(ConfigurationError::InvalidConfig {
                message: "timeout must be greater than zero".to_string(),
            }));
        }

        let mut headers = default_headers();
        headers.extend(self.headers);

        Ok(ClientConfig {
            base_url: trimmed,
            refresh_path,
            timeout,
            max_response_size: self.max_response_size.unwrap_or(DEFAULT_MAX_RESPONSE_SIZE),
            default_headers: headers,
        })
    }
}

/// Create a new client configuration builder.
pub fn client_config() -> ClientConfigBuilder {
    ClientConfigBuilder::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_success() {
        let config = client_config()
            .base_url("https://todo.example.com/api/")
            .timeout(Duration::from_secs(10))
            .header("X-Client", "cli")
            .build()
            .unwrap();

        assert_eq!(config.base_url, "https://todo.example.com/api");
        assert_eq!(config.refresh_path, "/auth/refresh");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.default_headers.get("x-client").map(String::as_str), Some("cli"));
        assert!(config.default_headers.contains_key("content-type"));
    }

    #[test]
    fn test_builder_defaults() {
        let config = ClientConfigBuilder::new().build().unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_response_size, DEFAULT_MAX_RESPONSE_SIZE);
    }

    #[test]
    fn test_builder_invalid_base_url() {
        let result = client_config().base_url("not a url").build();
        assert!(matches!(
            result,
            Err(ApiError::Configuration(ConfigurationError::InvalidBaseUrl { .. }))
        ));

        let result = client_config().base_url("ftp://example.com").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_zero_timeout() {
        let result = client_config().timeout(Duration::ZERO).build();
        assert!(result.is_err());
    }
}
