//! Refresh Coordinator
//!
//! Single-flight guard for access token refresh. The first caller that needs a
//! new token becomes the leader and performs the refresh; callers that arrive
//! while it is in flight are queued and receive the leader's outcome.
//!
//! The `refreshing` flag and the waiter queue live under one lock. Claiming
//! the flag is a single critical section, and so is draining the queue
//! together with releasing the flag, which means a waiter is either part of
//! the current cycle or starts the next one. It can never be stranded.

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult, AuthError};

type Waiter = oneshot::Sender<ApiResult<String>>;

#[derive(Default)]
struct RefreshState {
    refreshing: bool,
    queue: Vec<Waiter>,
}

/// Coordinates concurrent refresh attempts for one client session.
#[derive(Default)]
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

/// Outcome of [`RefreshCoordinator::acquire_or_wait`].
pub enum RefreshTicket<'a> {
    /// The caller owns this refresh cycle and must settle it.
    Leader(RefreshLease<'a>),
    /// A refresh is already in flight; wait for its outcome.
    Waiter(PendingRefresh),
}

impl RefreshCoordinator {
    /// Create an idle coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the refresh if none is running, otherwise join the queue.
    pub fn acquire_or_wait(&self) -> RefreshTicket<'_> {
        let mut state = self.state.lock();
        if state.refreshing {
            let (sender, receiver) = oneshot::channel();
            state.queue.push(sender);
            debug!(waiters = state.queue.len(), "refresh in flight, queued caller");
            RefreshTicket::Waiter(PendingRefresh { receiver })
        } else {
            state.refreshing = true;
            RefreshTicket::Leader(RefreshLease {
                coordinator: self,
                settled: false,
            })
        }
    }

    /// Whether a refresh cycle is in progress.
    pub fn is_refreshing(&self) -> bool {
        self.state.lock().refreshing
    }

    /// Number of callers waiting on the current cycle.
    pub fn pending(&self) -> usize {
        self.state.lock().queue.len()
    }

    fn settle(&self, outcome: Result<&str, &ApiError>) -> usize {
        let mut state = self.state.lock();
        let waiters = std::mem::take(&mut state.queue);
        let released = waiters.len();
        for waiter in waiters {
            // A waiter whose caller went away has nothing to receive.
            let _ = waiter.send(outcome.map(|t| t.to_string()).map_err(|e| e.clone()));
        }
        state.refreshing = false;
        released
    }
}

/// Exclusive right to run the current refresh cycle.
///
/// Settling consumes the lease. Dropping it unsettled rejects every waiter
/// with [`AuthError::RefreshAbandoned`] and releases the flag.
pub struct RefreshLease<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl RefreshLease<'_> {
    /// Hand `token` to every waiter, then release the flag.
    pub fn resolve_all(mut self, token: &str) -> usize {
        self.settled = true;
        self.coordinator.settle(Ok(token))
    }

    /// Hand `error` to every waiter, then release the flag.
    pub fn reject_all(mut self, error: &ApiError) -> usize {
        self.settled = true;
        self.coordinator.settle(Err(error))
    }
}

impl Drop for RefreshLease<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let released = self
                .coordinator
                .settle(Err(&ApiError::Auth(AuthError::RefreshAbandoned)));
            warn!(waiters = released, "refresh abandoned before completing");
        }
    }
}

/// A caller parked until the in-flight refresh settles.
pub struct PendingRefresh {
    receiver: oneshot::Receiver<ApiResult<String>>,
}

impl PendingRefresh {
    /// Wait for the new access token, or the error that ended the cycle.
    pub async fn wait(self) -> ApiResult<String> {
        self.receiver
            .await
            .unwrap_or(Err(ApiError::Auth(AuthError::RefreshAbandoned)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, assert_ready, assert_ready_err, assert_ready_ok, task};

    fn lease(ticket: RefreshTicket<'_>) -> RefreshLease<'_> {
        match ticket {
            RefreshTicket::Leader(lease) => lease,
            RefreshTicket::Waiter(_) => panic!("expected to lead the refresh"),
        }
    }

    fn waiter(ticket: RefreshTicket<'_>) -> PendingRefresh {
        match ticket {
            RefreshTicket::Waiter(pending) => pending,
            RefreshTicket::Leader(_) => panic!("expected to wait on the refresh"),
        }
    }

    #[test]
    fn test_first_caller_leads_others_wait() {
        let coordinator = RefreshCoordinator::new();
        assert!(!coordinator.is_refreshing());

        let leader = lease(coordinator.acquire_or_wait());
        assert!(coordinator.is_refreshing());

        let _a = waiter(coordinator.acquire_or_wait());
        let _b = waiter(coordinator.acquire_or_wait());
        assert_eq!(coordinator.pending(), 2);

        drop(leader);
    }

    #[test]
    fn test_resolve_all_fans_out_token() {
        let coordinator = RefreshCoordinator::new();
        let leader = lease(coordinator.acquire_or_wait());

        let mut first = task::spawn(waiter(coordinator.acquire_or_wait()).wait());
        let mut second = task::spawn(waiter(coordinator.acquire_or_wait()).wait());
        assert_pending!(first.poll());
        assert_pending!(second.poll());

        assert_eq!(leader.resolve_all("new-access"), 2);

        assert!(first.is_woken());
        assert_eq!(assert_ready_ok!(first.poll()), "new-access");
        assert_eq!(assert_ready_ok!(second.poll()), "new-access");
        assert!(!coordinator.is_refreshing());
        assert_eq!(coordinator.pending(), 0);
    }

    #[test]
    fn test_reject_all_fans_out_same_error() {
        let coordinator = RefreshCoordinator::new();
        let leader = lease(coordinator.acquire_or_wait());

        let mut first = task::spawn(waiter(coordinator.acquire_or_wait()).wait());
        let mut second = task::spawn(waiter(coordinator.acquire_or_wait()).wait());

        let error = ApiError::Auth(AuthError::RefreshFailed {
            status: Some(401),
            message: "refresh token revoked".to_string(),
        });
        assert_eq!(leader.reject_all(&error), 2);

        assert_eq!(assert_ready_err!(first.poll()), error);
        assert_eq!(assert_ready_err!(second.poll()), error);
        assert!(!coordinator.is_refreshing());
    }

    #[test]
    fn test_next_cycle_after_settle() {
        let coordinator = RefreshCoordinator::new();
        lease(coordinator.acquire_or_wait()).resolve_all("t1");

        let leader = lease(coordinator.acquire_or_wait());
        let mut late = task::spawn(waiter(coordinator.acquire_or_wait()).wait());
        leader.resolve_all("t2");
        assert_eq!(assert_ready_ok!(late.poll()), "t2");
    }

    #[test]
    fn test_dropped_lease_rejects_waiters() {
        let coordinator = RefreshCoordinator::new();
        let leader = lease(coordinator.acquire_or_wait());
        let mut pending = task::spawn(waiter(coordinator.acquire_or_wait()).wait());

        drop(leader);

        assert_eq!(
            assert_ready_err!(pending.poll()),
            ApiError::Auth(AuthError::RefreshAbandoned)
        );
        assert!(!coordinator.is_refreshing());
    }

    #[test]
    fn test_dropped_waiter_does_not_block_settle() {
        let coordinator = RefreshCoordinator::new();
        let leader = lease(coordinator.acquire_or_wait());
        drop(waiter(coordinator.acquire_or_wait()));
        let mut kept = task::spawn(waiter(coordinator.acquire_or_wait()).wait());

        assert_eq!(leader.resolve_all("t"), 2);
        let result = assert_ready!(kept.poll());
        assert_eq!(result.unwrap(), "t");
    }
}
