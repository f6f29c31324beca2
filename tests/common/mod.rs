//! Shared helpers for the WireMock-backed tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};
use session_auth_client::{
    client_config, ApiClient, InMemoryCredentialStore, ReqwestHttpTransport, SessionListener,
    TokenPair,
};
use wiremock::MockServer;

/// Counts session-termination signals.
#[derive(Default)]
pub struct CountingListener {
    pub hits: AtomicUsize,
}

impl CountingListener {
    pub fn count(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl SessionListener for CountingListener {
    fn session_terminated(&self) {
        self.hits.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct TestClient {
    pub client: Arc<ApiClient>,
    pub store: Arc<InMemoryCredentialStore>,
    pub listener: Arc<CountingListener>,
}

/// Client pointed at `server`'s `/api` prefix, seeded with `tokens`.
pub fn test_client(server: &MockServer, tokens: Option<TokenPair>) -> TestClient {
    let config = client_config()
        .base_url(format!("{}/api", server.uri()))
        .build()
        .expect("valid config");

    let store = Arc::new(match tokens {
        Some(tokens) => InMemoryCredentialStore::with_tokens(tokens),
        None => InMemoryCredentialStore::new(),
    });
    let listener = Arc::new(CountingListener::default());

    let client = ApiClient::with_components(
        config,
        ReqwestHttpTransport::new().expect("transport"),
        store.clone(),
        listener.clone(),
    );

    TestClient {
        client: Arc::new(client),
        store,
        listener,
    }
}

/// Body of a successful refresh.
pub fn tokens_body(access: &str, refresh: &str) -> Value {
    json!({
        "success": true,
        "data": { "tokens": { "accessToken": access, "refreshToken": refresh } }
    })
}
