//! Auth service.
//!
//! Sign-in and sign-out endpoints. Tokens returned by `login`/`register` are
//! left to the caller to persist, see [`TokenEnvelope::extract`].
//!
//! [`TokenEnvelope::extract`]: crate::types::TokenEnvelope::extract

use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};

use crate::client::ApiClient;
use crate::core::HttpTransport;
use crate::error::{ApiError, ApiResult, AuthError};
use crate::types::RefreshRequest;

/// `/auth` endpoints.
pub struct AuthService<'a, T: HttpTransport> {
    client: &'a ApiClient<T>,
}

impl<'a, T: HttpTransport> AuthService<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    /// Sign in with email and password. The body carries `data.tokens`.
    pub async fn login(&self, email: &str, password: &SecretString) -> ApiResult<Value> {
        self.client
            .post(
                "/auth/login",
                &json!({ "email": email, "password": password.expose_secret() }),
            )
            .await
    }

    /// Create an account. The body carries `data.tokens` like `login`.
    pub async fn register(&self, email: &str, password: &SecretString) -> ApiResult<Value> {
        self.client
            .post(
                "/auth/register",
                &json!({ "email": email, "password": password.expose_secret() }),
            )
            .await
    }

    /// Force a refresh now. Joins an in-flight refresh if there is one.
    pub async fn refresh(&self) -> ApiResult<String> {
        self.client.refresh_access_token().await
    }

    /// Revoke the stored refresh token on the server.
    pub async fn logout(&self) -> ApiResult<Value> {
        self.post_refresh_token("/auth/logout").await
    }

    /// Revoke every refresh token of the user on the server.
    pub async fn logout_all(&self) -> ApiResult<Value> {
        self.post_refresh_token("/auth/logout-all").await
    }

    async fn post_refresh_token(&self, path: &str) -> ApiResult<Value> {
        let refresh_token = self
            .client
            .credentials()
            .get_refresh_token()
            .ok_or(ApiError::Auth(AuthError::RefreshUnavailable))?;

        self.client
            .post(
                path,
                &RefreshRequest {
                    refresh_token: refresh_token.expose_secret(),
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MockHttpTransport;
    use crate::session::MockSessionListener;
    use crate::token::MockCredentialStore;
    use crate::types::{ClientConfig, TokenEnvelope, TokenPair};
    use std::sync::Arc;

    fn client(
        transport: Arc<MockHttpTransport>,
        store: MockCredentialStore,
    ) -> ApiClient<Arc<MockHttpTransport>> {
        ApiClient::with_components(
            ClientConfig::default(),
            transport,
            Arc::new(store),
            Arc::new(MockSessionListener::new()),
        )
    }

    #[tokio::test]
    async fn test_login_posts_credentials() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_json_response(
            200,
            &json!({"data": {"tokens": {"accessToken": "a1", "refreshToken": "r1"}}}),
        );
        let client = client(transport.clone(), MockCredentialStore::new());

        let body = client
            .auth()
            .login("ada@example.com", &SecretString::new("hunter2".to_string()))
            .await
            .unwrap();

        assert_eq!(TokenEnvelope::extract(&body), Some(TokenPair::new("a1", "r1")));
        let request = transport.get_last_request().unwrap();
        assert!(request.url.ends_with("/auth/login"));
        let sent: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, json!({"email": "ada@example.com", "password": "hunter2"}));
    }

    #[tokio::test]
    async fn test_logout_sends_stored_refresh_token() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_json_response(200, &json!({"success": true}));
        let client = client(
            transport.clone(),
            MockCredentialStore::new()
                .with_access_token("a1")
                .with_refresh_token("r1"),
        );

        client.auth().logout_all().await.unwrap();

        let request = transport.get_last_request().unwrap();
        assert!(request.url.ends_with("/auth/logout-all"));
        assert_eq!(request.body.as_deref(), Some(r#"{"refreshToken":"r1"}"#));
        assert_eq!(request.bearer_token(), Some("a1"));
    }

    #[tokio::test]
    async fn test_logout_without_refresh_token() {
        let transport = Arc::new(MockHttpTransport::new());
        let client = client(transport.clone(), MockCredentialStore::new());

        let error = client.auth().logout().await.unwrap_err();
        assert_eq!(error, ApiError::Auth(AuthError::RefreshUnavailable));
        assert!(transport.get_requests().is_empty());
    }

    #[tokio::test]
    async fn test_explicit_refresh_updates_store() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_json_response(
            200,
            &json!({"data": {"tokens": {"accessToken": "a2", "refreshToken": "r2"}}}),
        );
        let store = MockCredentialStore::new().with_refresh_token("r1");
        let client = client(transport.clone(), store);

        assert_eq!(client.auth().refresh().await.unwrap(), "a2");
        assert_eq!(client.credentials().get_access_token().as_deref(), Some("a2"));
    }
}
