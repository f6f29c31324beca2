//! Session Auth Client
//!
//! HTTP client layer for an API that authenticates with short-lived access
//! tokens and longer-lived refresh tokens.
//!
//! # Features
//!
//! - Bearer credential attached to every outgoing request
//! - Transparent refresh on `401 Unauthorized`, with one replay per request
//! - Single-flight refresh: concurrent failures share one refresh call
//! - Refresh performed on an un-intercepted transport, so it cannot loop
//! - Session-termination signal when the refresh token is missing or rejected
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use session_auth_client::{
//!     client_config, ApiClient, InMemoryCredentialStore, ReqwestHttpTransport, TokenPair,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = client_config()
//!         .base_url("http://localhost:5000/api")
//!         .build()?;
//!
//!     let store = Arc::new(InMemoryCredentialStore::with_tokens(TokenPair::new(
//!         "access-token",
//!         "refresh-token",
//!     )));
//!
//!     let client = ApiClient::with_components(
//!         config,
//!         ReqwestHttpTransport::new()?,
//!         store,
//!         Arc::new(|| eprintln!("session ended, please sign in again")),
//!     );
//!
//!     let todos = client.todos().list().await?;
//!     println!("{}", todos);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `types`: configuration, request descriptor, token wire types
//! - `error`: error hierarchy
//! - `core`: HTTP transport abstraction
//! - `token`: credential storage, plain refresh client, refresh coordinator
//! - `session`: session-termination signal
//! - `client`: the intercepted request pipeline
//! - `services`: auth, todos, and users endpoints

pub mod builders;
pub mod client;
pub mod core;
pub mod error;
pub mod services;
pub mod session;
pub mod token;
pub mod types;

// Re-export main client
pub use client::ApiClient;

// Re-export builders
pub use builders::{client_config, ClientConfigBuilder};

// Re-export errors
pub use error::{
    create_error_from_response, get_user_message, parse_error_body, ApiError, ApiErrorBody,
    ApiResult, AuthError, ConfigurationError, NetworkError, ProtocolError, ResponseError,
};

// Re-export types
pub use types::{
    ApiRequest, ClientConfig, RefreshRequest, TokenEnvelope, TokenPair, DEFAULT_BASE_URL,
    DEFAULT_REFRESH_PATH,
};

// Re-export core components
pub use crate::core::{
    create_mock_transport, create_transport, HttpMethod, HttpRequest, HttpResponse, HttpTransport,
    MockHttpTransport, ReqwestHttpTransport,
};

// Re-export token management
pub use token::{
    CredentialEvent, CredentialStore, InMemoryCredentialStore, MockCredentialStore,
    PendingRefresh, RefreshClient, RefreshCoordinator, RefreshLease, RefreshTicket,
};

// Re-export session signal
pub use session::{MockSessionListener, NoOpSessionListener, SessionListener};

// Re-export services
pub use services::{AuthService, TodosService, UsersService};
