//! Session Termination
//!
//! Signal raised when credentials are gone for good and the user has to sign
//! in again. What happens next (redirecting to a login page, exiting a CLI)
//! is up to the embedding application.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Receives the "session terminated" signal.
pub trait SessionListener: Send + Sync {
    /// Called once per failed refresh cycle, after credentials were cleared.
    fn session_terminated(&self);
}

impl<F> SessionListener for F
where
    F: Fn() + Send + Sync,
{
    fn session_terminated(&self) {
        self()
    }
}

/// Listener that ignores the signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpSessionListener;

impl SessionListener for NoOpSessionListener {
    fn session_terminated(&self) {}
}

/// Mock listener that counts signals.
#[derive(Debug, Default)]
pub struct MockSessionListener {
    terminated: AtomicUsize,
}

impl MockSessionListener {
    /// Create a listener with a zero count.
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times the session was terminated.
    pub fn terminated_count(&self) -> usize {
        self.terminated.load(Ordering::SeqCst)
    }
}

impl SessionListener for MockSessionListener {
    fn session_terminated(&self) {
        self.terminated.fetch_add(1, Ordering::SeqCst);
    }
}
