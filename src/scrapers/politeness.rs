//! Fixed-delay politeness gate.
//!
//! Every network fetch passes through a [`PolitenessGate`] before it is
//! sent. The gate spaces acquisitions at least `delay` apart and carries the
//! page cap for the stage it guards. Clones share the same clock, so the
//! crawler, the sitemap resolver and the extraction loop can all hold a
//! handle to one gate.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Delay and page cap for one stage of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolitenessPolicy {
    /// Minimum spacing between two fetches.
    pub delay: Duration,
    /// Maximum number of pages the stage processes.
    pub max_pages: usize,
}

impl PolitenessPolicy {
    pub const fn new(delay: Duration, max_pages: usize) -> Self {
        Self { delay, max_pages }
    }

    /// Plain-HTTP extraction defaults.
    pub const HTTP: Self = Self::new(Duration::from_millis(1500), 40);

    /// Rendered-browser extraction defaults. Rendering is far more expensive
    /// per page, so the delay is longer and the cap much smaller.
    pub const BROWSER: Self = Self::new(Duration::from_millis(2000), 10);

    /// Discovery defaults; the cap is the crawler's visited-page bound.
    pub const DISCOVERY: Self = Self::new(Duration::from_millis(250), 120);
}

#[derive(Debug, Default)]
struct GateState {
    last_request: Option<Instant>,
    total_requests: u64,
}

/// Spaces out fetches according to a [`PolitenessPolicy`].
#[derive(Debug, Clone)]
pub struct PolitenessGate {
    policy: PolitenessPolicy,
    state: Arc<Mutex<GateState>>,
}

impl PolitenessGate {
    pub fn new(policy: PolitenessPolicy) -> Self {
        Self {
            policy,
            state: Arc::new(Mutex::new(GateState::default())),
        }
    }

    /// Gate with no delay, for tests and single-shot tools.
    pub fn unthrottled(max_pages: usize) -> Self {
        Self::new(PolitenessPolicy::new(Duration::ZERO, max_pages))
    }

    pub fn policy(&self) -> PolitenessPolicy {
        self.policy
    }

    /// Page cap for the guarded stage.
    pub fn max_pages(&self) -> usize {
        self.policy.max_pages
    }

    /// Wait until the delay since the previous acquisition has elapsed, then
    /// record this acquisition. The first acquisition never waits.
    pub async fn acquire(&self) {
        let mut state = self.state.lock().await;

        if let Some(last) = state.last_request {
            let ready_at = last + self.policy.delay;
            let now = Instant::now();
            if ready_at > now {
                let wait = ready_at - now;
                debug!("Politeness delay: waiting {:?}", wait);
                tokio::time::sleep(wait).await;
            }
        }

        state.last_request = Some(Instant::now());
        state.total_requests += 1;
    }

    /// Number of fetches that have passed through the gate.
    pub async fn total_requests(&self) -> u64 {
        self.state.lock().await.total_requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_acquire_does_not_wait() {
        let gate = PolitenessGate::new(PolitenessPolicy::new(Duration::from_secs(5), 10));
        let start = Instant::now();
        gate.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_successive_acquires_are_spaced() {
        let gate = PolitenessGate::new(PolitenessPolicy::new(Duration::from_millis(1500), 10));
        let start = Instant::now();
        gate.acquire().await;
        gate.acquire().await;
        gate.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(3000));
        assert_eq!(gate.total_requests().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_remaining_delay_is_waited() {
        let gate = PolitenessGate::new(PolitenessPolicy::new(Duration::from_millis(1000), 10));
        gate.acquire().await;
        tokio::time::advance(Duration::from_millis(700)).await;

        let before = Instant::now();
        gate.acquire().await;
        let waited = before.elapsed();
        assert!(waited >= Duration::from_millis(300));
        assert!(waited < Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clones_share_clock() {
        let gate = PolitenessGate::new(PolitenessPolicy::new(Duration::from_millis(800), 10));
        let other = gate.clone();
        let start = Instant::now();
        gate.acquire().await;
        other.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(800));
        assert_eq!(gate.total_requests().await, 2);
    }

    #[test]
    fn test_profile_constants() {
        assert!(PolitenessPolicy::BROWSER.delay > PolitenessPolicy::HTTP.delay);
        assert!(PolitenessPolicy::BROWSER.max_pages < PolitenessPolicy::HTTP.max_pages);
    }
}
