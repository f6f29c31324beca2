//! Plain Refresh Transport
//!
//! Exchanges a refresh token for a new token pair. Requests sent from here
//! carry no bearer credential and are never intercepted, so a 401 from the
//! refresh endpoint cannot re-enter the refresh protocol.

use std::sync::Arc;

use tracing::debug;

use crate::core::{HttpMethod, HttpRequest, HttpTransport};
use crate::error::{create_error_from_response, ApiError, ApiResult, ProtocolError};
use crate::types::{ClientConfig, RefreshRequest, TokenEnvelope, TokenPair};

/// Un-intercepted client for the refresh endpoint.
pub struct RefreshClient<T: HttpTransport> {
    config: ClientConfig,
    transport: Arc<T>,
}

impl<T: HttpTransport> RefreshClient<T> {
    /// Create a refresh client sharing `transport` with the session.
    pub fn new(config: ClientConfig, transport: Arc<T>) -> Self {
        Self { config, transport }
    }

    /// Exchange `refresh_token` for a new access/refresh pair.
    ///
    /// Any non-2xx status, transport failure, or body without
    /// `data.tokens.{accessToken,refreshToken}` is an error.
    pub async fn refresh(&self, refresh_token: &str) -> ApiResult<TokenPair> {
        let body = serde_json::to_string(&RefreshRequest { refresh_token }).map_err(|e| {
            ApiError::Protocol(ProtocolError::InvalidJson {
                message: e.to_string(),
            })
        })?;

        let request = HttpRequest {
            method: HttpMethod::Post,
            url: self.config.refresh_url(),
            headers: self.config.default_headers.clone(),
            body: Some(body),
            timeout: None,
        };

        debug!(url = %request.url, "exchanging refresh token");
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            return Err(create_error_from_response(
                response.status,
                &response.status_text,
                &response.body,
            ));
        }

        let body: serde_json::Value = response.parse_json()?;
        TokenEnvelope::extract(&body).ok_or_else(|| {
            ApiError::Protocol(ProtocolError::MissingField {
                field: "data.tokens".to_string(),
            })
        })
    }
}
