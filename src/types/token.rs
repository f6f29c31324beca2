//! Token Types
//!
//! Credential pair and refresh endpoint wire types.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Access/refresh token pair.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived bearer token.
    pub access_token: String,
    /// Long-lived token exchanged for a new pair.
    pub refresh_token: SecretString,
}

impl TokenPair {
    /// Create a pair from raw token strings.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: SecretString::new(refresh_token.into()),
        }
    }

    /// Refresh token value.
    pub fn refresh_token(&self) -> &str {
        self.refresh_token.expose_secret()
    }
}

impl PartialEq for TokenPair {
    fn eq(&self, other: &Self) -> bool {
        self.access_token == other.access_token && self.refresh_token() == other.refresh_token()
    }
}

impl Eq for TokenPair {}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Body of `POST /auth/refresh`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Envelope that carries tokens at `data.tokens`.
#[derive(Debug, Deserialize)]
pub struct TokenEnvelope {
    pub data: TokenEnvelopeData,
}

#[derive(Debug, Deserialize)]
pub struct TokenEnvelopeData {
    pub tokens: TokenPair,
}

impl TokenEnvelope {
    /// Pull a token pair out of an arbitrary response body, if present.
    pub fn extract(body: &serde_json::Value) -> Option<TokenPair> {
        let tokens = body.pointer("/data/tokens")?;
        serde_json::from_value(tokens.clone()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_envelope_deserialize() {
        let body = r#"{"success":true,"data":{"tokens":{"accessToken":"a2","refreshToken":"r2"}}}"#;
        let envelope: TokenEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.data.tokens, TokenPair::new("a2", "r2"));
    }

    #[test]
    fn test_extract_missing_tokens() {
        let body = serde_json::json!({"data": {"user": {"id": 1}}});
        assert!(TokenEnvelope::extract(&body).is_none());

        let body = serde_json::json!({"data": {"tokens": {"accessToken": "a", "refreshToken": "r"}}});
        assert_eq!(TokenEnvelope::extract(&body), Some(TokenPair::new("a", "r")));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let rendered = format!("{:?}", TokenPair::new("secret-access", "secret-refresh"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn test_refresh_request_wire_format() {
        let body = serde_json::to_string(&RefreshRequest { refresh_token: "r1" }).unwrap();
        assert_eq!(body, r#"{"refreshToken":"r1"}"#);
    }
}
