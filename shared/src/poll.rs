//! Bounded status polling.
//!
//! Provisioning has to wait for managed resources to leave their
//! "Creating"/"Building" states. Every wait carries an explicit deadline so
//! a stuck resource surfaces as [`Error::Timeout`] instead of hanging the
//! stack deployment.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::{Error, Result};

/// How often to re-check, and for how long at most.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub deadline: Duration,
}

impl PollPolicy {
    pub const fn new(interval: Duration, deadline: Duration) -> Self {
        Self { interval, deadline }
    }
}

/// Outcome of a single status probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState<T> {
    /// Still in a transitional state; check again.
    Pending,
    /// Reached a terminal state.
    Ready(T),
}

/// Re-run `probe` on a fixed interval until it reports ready or the
/// deadline passes. Probe errors end the wait immediately.
pub async fn poll_until<T, F, Fut>(what: &str, policy: PollPolicy, mut probe: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollState<T>>>,
{
    let started = Instant::now();

    loop {
        if let PollState::Ready(value) = probe().await? {
            return Ok(value);
        }

        if started.elapsed() + policy.interval > policy.deadline {
            return Err(Error::Timeout {
                what: what.to_string(),
                waited: started.elapsed(),
            });
        }

        tokio::time::sleep(policy.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn returns_once_the_probe_is_ready() {
        let probes = AtomicU32::new(0);
        let probes_ref = &probes;
        let policy = PollPolicy::new(Duration::from_millis(1), Duration::from_secs(1));

        let value = poll_until("test resource", policy, move || async move {
            if probes_ref.fetch_add(1, Ordering::SeqCst) < 3 {
                Ok(PollState::Pending)
            } else {
                Ok(PollState::Ready(42))
            }
        })
        .await
        .unwrap();

        assert_eq!(value, 42);
        assert_eq!(probes.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn deadline_expiry_is_a_distinguishable_timeout() {
        let policy = PollPolicy::new(Duration::from_millis(1), Duration::from_millis(5));

        let result: Result<()> =
            poll_until("stuck resource", policy, || async { Ok(PollState::Pending) }).await;

        match result {
            Err(Error::Timeout { what, .. }) => assert_eq!(what, "stuck resource"),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn probe_errors_end_the_wait() {
        let policy = PollPolicy::new(Duration::from_millis(1), Duration::from_secs(1));

        let result: Result<()> = poll_until("failing resource", policy, || async {
            Err(Error::Aws("boom".to_string()))
        })
        .await;

        assert!(matches!(result, Err(Error::Aws(_))));
    }
}
