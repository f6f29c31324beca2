//! API Client
//!
//! The intercepted request pipeline. Outbound, every request gets the current
//! access token as a bearer credential. Inbound, a 401 on a request that has
//! not been replayed yet triggers the refresh protocol, and the request is
//! sent once more with the new token.

use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::core::{HttpRequest, HttpResponse, HttpTransport, ReqwestHttpTransport};
use crate::error::{create_error_from_response, ApiError, ApiResult, AuthError};
use crate::services::{AuthService, TodosService, UsersService};
use crate::session::{NoOpSessionListener, SessionListener};
use crate::token::{
    CredentialStore, InMemoryCredentialStore, RefreshClient, RefreshCoordinator, RefreshTicket,
};
use crate::types::{ApiRequest, ClientConfig};

/// Status that marks an authentication rejection.
const UNAUTHORIZED: u16 = 401;

/// Authenticated API client.
///
/// One client is one session: it owns the refresh coordinator, so concurrent
/// requests through the same client share a single refresh.
pub struct ApiClient<T: HttpTransport = ReqwestHttpTransport> {
    config: ClientConfig,
    transport: Arc<T>,
    refresher: RefreshClient<T>,
    credentials: Arc<dyn CredentialStore>,
    session: Arc<dyn SessionListener>,
    coordinator: RefreshCoordinator,
}

impl ApiClient<ReqwestHttpTransport> {
    /// Create a client with the reqwest transport, an in-memory credential
    /// store and no session listener.
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let transport =
            ReqwestHttpTransport::with_options(config.timeout, config.max_response_size)?;
        Ok(Self::with_components(
            config,
            transport,
            Arc::new(InMemoryCredentialStore::new()),
            Arc::new(NoOpSessionListener),
        ))
    }

    /// Create a client configured from the environment.
    pub fn from_env() -> ApiResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }
}

impl<T: HttpTransport> ApiClient<T> {
    /// Create a client with custom implementations.
    pub fn with_components(
        config: ClientConfig,
        transport: T,
        credentials: Arc<dyn CredentialStore>,
        session: Arc<dyn SessionListener>,
    ) -> Self {
        let transport = Arc::new(transport);
        Self {
            refresher: RefreshClient::new(config.clone(), transport.clone()),
            config,
            transport,
            credentials,
            session,
            coordinator: RefreshCoordinator::new(),
        }
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Credential store used by this client.
    pub fn credentials(&self) -> &dyn CredentialStore {
        self.credentials.as_ref()
    }

    /// Refresh coordinator of this session.
    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    /// Auth endpoints.
    pub fn auth(&self) -> AuthService<'_, T> {
        AuthService::new(self)
    }

    /// Todo endpoints.
    pub fn todos(&self) -> TodosService<'_, T> {
        TodosService::new(self)
    }

    /// User endpoints.
    pub fn users(&self) -> UsersService<'_, T> {
        UsersService::new(self)
    }

    /// Build the outgoing HTTP request, attaching a bearer credential.
    ///
    /// `token` takes precedence over the stored access token. Without either
    /// the request goes out unauthenticated.
    pub fn attach_credentials(&self, request: &ApiRequest, token: Option<&str>) -> HttpRequest {
        let mut headers = self.config.default_headers.clone();
        headers.extend(request.headers.clone());

        match token
            .map(str::to_string)
            .or_else(|| self.credentials.get_access_token())
        {
            Some(token) => {
                headers.insert("authorization".to_string(), format!("Bearer {}", token));
            }
            None => debug!("no access token available, sending unauthenticated"),
        }

        HttpRequest {
            method: request.method,
            url: self.config.endpoint_url(&request.path),
            headers,
            body: request.body.clone(),
            timeout: request.timeout,
        }
    }

    /// Send `request` through the pipeline.
    ///
    /// Non-2xx responses become errors. A 401 is answered with one refresh
    /// and one replay; a second 401 is returned to the caller as is.
    #[instrument(skip(self, request), fields(method = request.method.as_str(), path = %request.path))]
    pub async fn execute(&self, mut request: ApiRequest) -> ApiResult<HttpResponse> {
        let mut token: Option<String> = None;

        loop {
            let outgoing = self.attach_credentials(&request, token.as_deref());
            let response = self.transport.send(outgoing).await?;

            if response.is_success() {
                return Ok(response);
            }

            if response.status != UNAUTHORIZED || request.is_retried() {
                return Err(create_error_from_response(
                    response.status,
                    &response.status_text,
                    &response.body,
                ));
            }

            request.mark_retried();
            token = Some(self.refresh_access_token().await?);
            debug!("replaying request with refreshed access token");
        }
    }

    /// Obtain a fresh access token, sharing one refresh between concurrent
    /// callers.
    ///
    /// The caller that starts the cycle performs the exchange; the others
    /// wait for its result. On failure credentials are cleared, the session
    /// listener is signalled once, and every caller receives the same error.
    pub async fn refresh_access_token(&self) -> ApiResult<String> {
        let lease = match self.coordinator.acquire_or_wait() {
            RefreshTicket::Waiter(pending) => return pending.wait().await,
            RefreshTicket::Leader(lease) => lease,
        };

        let Some(refresh_token) = self.credentials.get_refresh_token() else {
            warn!("no refresh token available, ending session");
            self.end_session();
            let error = ApiError::Auth(AuthError::RefreshUnavailable);
            lease.reject_all(&error);
            return Err(error);
        };

        info!("refreshing access token");
        match self.refresher.refresh(refresh_token.expose_secret()).await {
            Ok(tokens) => {
                self.credentials.set_tokens(&tokens);
                let released = lease.resolve_all(&tokens.access_token);
                info!(waiters = released, "access token refreshed");
                Ok(tokens.access_token)
            }
            Err(source) => {
                warn!(error = %source, "token refresh failed, ending session");
                let error = ApiError::Auth(AuthError::RefreshFailed {
                    status: source.status(),
                    message: source.to_string(),
                });
                self.end_session();
                let released = lease.reject_all(&error);
                debug!(waiters = released, "rejected queued requests");
                Err(error)
            }
        }
    }

    fn end_session(&self) {
        self.credentials.clear_tokens();
        self.session.session_terminated();
    }

    /// `GET path`, decoding the JSON body.
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> ApiResult<R> {
        self.execute(ApiRequest::get(path)).await?.parse_json()
    }

    /// `POST path` with a JSON body, decoding the JSON response.
    pub async fn post<B, R>(&self, path: &str, body: &B) -> ApiResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.execute(ApiRequest::post(path).json(body)?)
            .await?
            .parse_json()
    }

    /// `PATCH path` with a JSON body, decoding the JSON response.
    pub async fn patch<B, R>(&self, path: &str, body: &B) -> ApiResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.execute(ApiRequest::patch(path).json(body)?)
            .await?
            .parse_json()
    }

    /// `DELETE path`, decoding the JSON body.
    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> ApiResult<R> {
        self.execute(ApiRequest::delete(path)).await?.parse_json()
    }
}
