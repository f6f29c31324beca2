//! Request Types
//!
//! Request descriptor for the intercepted pipeline.

use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::core::HttpMethod;
use crate::error::{ApiError, ApiResult, ProtocolError};

/// A logical API request.
///
/// Carries the retry marker: once a request has been replayed after a token
/// refresh it is never refreshed-and-replayed again.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Path relative to the configured base URL.
    pub path: String,
    /// Per-request headers, merged over the configured defaults.
    pub headers: HashMap<String, String>,
    /// Serialized JSON body.
    pub body: Option<String>,
    /// Per-request timeout.
    pub timeout: Option<Duration>,
    retried: bool,
}

impl ApiRequest {
    /// Create a request for `method` and `path`.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
            retried: false,
        }
    }

    /// `GET` request to `path`.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// `POST` request to `path`.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// `PUT` request to `path`.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// `PATCH` request to `path`.
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    /// `DELETE` request to `path`.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> ApiResult<Self> {
        let encoded = serde_json::to_string(body).map_err(|e| {
            ApiError::Protocol(ProtocolError::InvalidJson {
                message: e.to_string(),
            })
        })?;
        self.body = Some(encoded);
        Ok(self)
    }

    /// Add a header. Names are stored lower-cased.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_lowercase(), value.into());
        self
    }

    /// Set a per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Whether this request has already been replayed after a refresh.
    pub fn is_retried(&self) -> bool {
        self.retried
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }
}
