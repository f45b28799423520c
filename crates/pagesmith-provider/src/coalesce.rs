//! Request coalescing
//!
//! Identical generate requests in flight at the same time share one backend
//! call. The first caller for a key runs the work; everyone else awaits the
//! same cell and receives a clone of the outcome. Keys are a hash of
//! `(prompt, policy)`, so distinct requests never block each other.

use crate::error::ProviderError;
use crate::orchestrator::{Policy, ProviderResult};
use std::collections::HashMap;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

type Outcome = Result<ProviderResult, ProviderError>;

/// Single-flight map over in-progress generate calls.
#[derive(Default)]
pub struct RequestCoalescer {
    inflight: Mutex<HashMap<u64, Arc<OnceCell<Outcome>>>>,
}

impl RequestCoalescer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Coalescing key for a generate request.
    #[must_use]
    pub fn key(prompt: &str, policy: Policy) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        prompt.hash(&mut hasher);
        policy.hash(&mut hasher);
        hasher.finish()
    }

    /// Run `work` for `key`, or await the call already in flight for it.
    ///
    /// The entry is removed once the outcome is settled; a later request
    /// with the same key starts fresh rather than replaying a cached
    /// result. Failures are shared with the whole cohort as well, so a
    /// burst of identical requests costs at most one backend call either
    /// way.
    pub async fn run<F, Fut>(&self, key: u64, work: F) -> Outcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome>,
    {
        let cell = {
            let mut inflight = self.inflight.lock().await;
            inflight.entry(key).or_default().clone()
        };

        let outcome = cell.get_or_init(|| work()).await.clone();

        let mut inflight = self.inflight.lock().await;
        // Only evict our own cell; a concurrent eviction may already have
        // installed a fresh one under the same key.
        if inflight
            .get(&key)
            .is_some_and(|current| Arc::ptr_eq(current, &cell))
        {
            inflight.remove(&key);
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::BackendKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn result(document: &str) -> ProviderResult {
        ProviderResult {
            document: document.to_string(),
            backend: BackendKind::Local,
            elapsed_ms: 0,
            diagnostics: None,
        }
    }

    #[tokio::test]
    async fn concurrent_identical_requests_share_one_call() {
        let coalescer = Arc::new(RequestCoalescer::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let key = RequestCoalescer::key("a bakery", Policy::Auto);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let coalescer = coalescer.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                coalescer
                    .run(key, || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        // Hold the cell open long enough for the cohort to pile up.
                        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                        Ok(result("<html>shared</html>"))
                    })
                    .await
            }));
        }

        for handle in handles {
            let outcome = handle.await.expect("task panicked").expect("scripted ok");
            assert_eq!(outcome.document, "<html>shared</html>");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_keys_run_independently() {
        let coalescer = RequestCoalescer::new();
        let a = RequestCoalescer::key("a bakery", Policy::Auto);
        let b = RequestCoalescer::key("a record store", Policy::Auto);
        assert_ne!(a, b);

        let first = coalescer.run(a, || async { Ok(result("A")) }).await;
        let second = coalescer.run(b, || async { Ok(result("B")) }).await;
        assert_eq!(first.expect("ok").document, "A");
        assert_eq!(second.expect("ok").document, "B");
    }

    #[tokio::test]
    async fn policy_is_part_of_the_key() {
        assert_ne!(
            RequestCoalescer::key("same prompt", Policy::Auto),
            RequestCoalescer::key("same prompt", Policy::Local)
        );
    }

    #[tokio::test]
    async fn settled_entries_are_evicted() {
        let coalescer = RequestCoalescer::new();
        let calls = AtomicUsize::new(0);
        let key = RequestCoalescer::key("x", Policy::Auto);

        for _ in 0..2 {
            let outcome = coalescer
                .run(key, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(result("fresh"))
                })
                .await;
            assert!(outcome.is_ok());
        }
        // Sequential requests are not deduplicated; the result is not a cache.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(coalescer.inflight.lock().await.is_empty());
    }

    #[tokio::test]
    async fn failures_are_shared_not_retried() {
        let coalescer = RequestCoalescer::new();
        let key = RequestCoalescer::key("y", Policy::Remote);
        let outcome = coalescer
            .run(key, || async { Err(ProviderError::NotConfigured) })
            .await;
        assert!(matches!(outcome, Err(ProviderError::NotConfigured)));
        assert!(coalescer.inflight.lock().await.is_empty());
    }
}
