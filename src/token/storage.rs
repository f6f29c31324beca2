//! Credential Storage
//!
//! The credential store holds the current access/refresh token pair. Only the
//! refresh protocol writes to it; everything else reads.

use parking_lot::{Mutex, RwLock};
use secrecy::SecretString;

use crate::types::TokenPair;

/// Credential store interface.
///
/// Operations are synchronous so that claiming a refresh and reading the
/// refresh token happen without an intervening suspension point.
pub trait CredentialStore: Send + Sync {
    /// Current access token.
    fn get_access_token(&self) -> Option<String>;

    /// Current refresh token.
    fn get_refresh_token(&self) -> Option<SecretString>;

    /// Replace both tokens.
    fn set_tokens(&self, tokens: &TokenPair);

    /// Remove all stored tokens.
    fn clear_tokens(&self);
}

/// In-memory credential store.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    tokens: RwLock<Option<TokenPair>>,
}

impl InMemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `tokens`.
    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self {
            tokens: RwLock::new(Some(tokens)),
        }
    }

    /// Snapshot of the stored pair.
    pub fn tokens(&self) -> Option<TokenPair> {
        self.tokens.read().clone()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn get_access_token(&self) -> Option<String> {
        self.tokens
            .read()
            .as_ref()
            .map(|t| t.access_token.clone())
    }

    fn get_refresh_token(&self) -> Option<SecretString> {
        self.tokens
            .read()
            .as_ref()
            .map(|t| t.refresh_token.clone())
    }

    fn set_tokens(&self, tokens: &TokenPair) {
        *self.tokens.write() = Some(tokens.clone());
    }

    fn clear_tokens(&self) {
        *self.tokens.write() = None;
    }
}

/// Store mutation recorded by [`MockCredentialStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CredentialEvent {
    Set(TokenPair),
    Cleared,
}

/// Mock credential store for testing.
///
/// Access and refresh tokens are optional independently so a test can seed a
/// store that has an access token but no refresh token. Both sit under one
/// lock, so readers never see half of a replaced pair.
#[derive(Default)]
pub struct MockCredentialStore {
    tokens: Mutex<(Option<String>, Option<String>)>,
    events: Mutex<Vec<CredentialEvent>>,
}

impl MockCredentialStore {
    /// Create new mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the access token.
    pub fn with_access_token(self, token: impl Into<String>) -> Self {
        self.tokens.lock().0 = Some(token.into());
        self
    }

    /// Pre-populate the refresh token.
    pub fn with_refresh_token(self, token: impl Into<String>) -> Self {
        self.tokens.lock().1 = Some(token.into());
        self
    }

    /// Stored access token, without recording a read.
    pub fn access_token(&self) -> Option<String> {
        self.tokens.lock().0.clone()
    }

    /// Stored refresh token, without recording a read.
    pub fn refresh_token(&self) -> Option<String> {
        self.tokens.lock().1.clone()
    }

    /// Both stored tokens, read together.
    pub fn token_pair(&self) -> (Option<String>, Option<String>) {
        self.tokens.lock().clone()
    }

    /// Mutations in the order they happened.
    pub fn get_events(&self) -> Vec<CredentialEvent> {
        self.events.lock().clone()
    }

    /// Number of `clear_tokens` calls.
    pub fn clear_count(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, CredentialEvent::Cleared))
            .count()
    }

    /// Number of `set_tokens` calls.
    pub fn set_count(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, CredentialEvent::Set(_)))
            .count()
    }
}

impl CredentialStore for MockCredentialStore {
    fn get_access_token(&self) -> Option<String> {
        self.tokens.lock().0.clone()
    }

    fn get_refresh_token(&self) -> Option<SecretString> {
        self.tokens.lock().1.clone().map(SecretString::new)
    }

    fn set_tokens(&self, tokens: &TokenPair) {
        *self.tokens.lock() = (
            Some(tokens.access_token.clone()),
            Some(tokens.refresh_token().to_string()),
        );
        self.events.lock().push(CredentialEvent::Set(tokens.clone()));
    }

    fn clear_tokens(&self) {
        *self.tokens.lock() = (None, None);
        self.events.lock().push(CredentialEvent::Cleared);
    }
}

/// Create in-memory credential store.
pub fn create_in_memory_credential_store() -> InMemoryCredentialStore {
    InMemoryCredentialStore::new()
}

/// Create mock credential store for testing.
pub fn create_mock_credential_store() -> MockCredentialStore {
    MockCredentialStore::new()
}
