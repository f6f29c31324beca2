//! Token Management
//!
//! Credential storage and the refresh machinery.
//!
//! This module provides:
//!
//! - **Credential Storage**: the store the client reads bearer tokens from
//! - **Refresh Client**: the plain, un-intercepted refresh endpoint call
//! - **Refresh Coordinator**: single-flight guard with fan-out to waiters

pub mod coordinator;
pub mod refresh;
pub mod storage;

// Credential Storage
pub use storage::{
    create_in_memory_credential_store, create_mock_credential_store, CredentialEvent,
    CredentialStore, InMemoryCredentialStore, MockCredentialStore,
};

// Refresh Client
pub use refresh::RefreshClient;

// Refresh Coordinator
pub use coordinator::{PendingRefresh, RefreshCoordinator, RefreshLease, RefreshTicket};
