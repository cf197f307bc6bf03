//! Per-key request coalescing.
//!
//! The first caller for a key starts the computation on its own task; every
//! caller for the same key while it runs gets a receiver for the same result.
//! The key leaves the map once the result is published, so the next caller
//! starts a fresh computation.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::trace;

/// A handle on an in-flight computation.
pub struct Flight<T> {
    rx: watch::Receiver<Option<T>>,
    leader: bool,
}

impl<T: Clone> Flight<T> {
    /// Whether this caller started the computation.
    pub fn is_leader(&self) -> bool {
        self.leader
    }

    /// Waits for the shared result.
    ///
    /// Returns `None` if the computation died without publishing one.
    /// Dropping this future only stops this caller from waiting.
    pub async fn wait(mut self) -> Option<T> {
        self.rx
            .wait_for(Option::is_some)
            .await
            .ok()
            .and_then(|value| (*value).clone())
    }
}

/// Removes the key when the computation task ends, including by panic.
struct CallGuard<T> {
    calls: Arc<DashMap<String, watch::Receiver<Option<T>>>>,
    key: String,
}

impl<T> Drop for CallGuard<T> {
    fn drop(&mut self) {
        self.calls.remove(&self.key);
    }
}

pub struct SingleFlight<T> {
    calls: Arc<DashMap<String, watch::Receiver<Option<T>>>>,
}

impl<T> Clone for SingleFlight<T> {
    fn clone(&self) -> Self {
        Self {
            calls: Arc::clone(&self.calls),
        }
    }
}

impl<T> Default for SingleFlight<T> {
    fn default() -> Self {
        Self {
            calls: Arc::new(DashMap::new()),
        }
    }
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys with a computation in flight.
    pub fn in_flight(&self) -> usize {
        self.calls.len()
    }

    /// Joins the computation in flight for `key`, or spawns `start()` as a
    /// new one. `start` is only called by the leader.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn join<S, Fut>(&self, key: &str, start: S) -> Flight<T>
    where
        S: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        match self.calls.entry(key.to_owned()) {
            Entry::Occupied(call) => {
                trace!(key, "Joining in-flight call");
                Flight {
                    rx: call.get().clone(),
                    leader: false,
                }
            }
            Entry::Vacant(slot) => {
                trace!(key, "Starting new call");
                let (tx, rx) = watch::channel(None);
                slot.insert(rx.clone());

                let guard = CallGuard {
                    calls: Arc::clone(&self.calls),
                    key: key.to_owned(),
                };
                let fut = start();
                tokio::spawn(async move {
                    let _guard = guard;
                    let value = fut.await;
                    tx.send_replace(Some(value));
                });

                Flight { rx, leader: true }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_share_one_computation() {
        let group = SingleFlight::<String>::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let mut handles = vec![];
        for _ in 0..20 {
            let group = group.clone();
            let runs = runs.clone();
            handles.push(tokio::spawn(async move {
                group
                    .join("abc123", || async move {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        runs.fetch_add(1, Ordering::SeqCst);
                        "https://example.com".to_string()
                    })
                    .wait()
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(
                handle.await.unwrap().as_deref(),
                Some("https://example.com")
            );
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_keys_run_independently() {
        let group = SingleFlight::<usize>::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let flights: Vec<_> = (0..5)
            .map(|i| {
                let runs = runs.clone();
                group.join(&format!("code{i}"), move || async move {
                    runs.fetch_add(1, Ordering::SeqCst);
                    i
                })
            })
            .collect();

        assert!(flights.iter().all(Flight::is_leader));
        for (i, flight) in flights.into_iter().enumerate() {
            assert_eq!(flight.wait().await, Some(i));
        }
        assert_eq!(runs.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn only_the_first_caller_leads() {
        let group = SingleFlight::<u8>::new();

        let leader = group.join("k", || async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            1
        });
        let follower = group.join("k", || async { 2 });

        assert!(leader.is_leader());
        assert!(!follower.is_leader());
        assert_eq!(follower.wait().await, Some(1));
        assert_eq!(leader.wait().await, Some(1));
    }

    #[tokio::test]
    async fn key_is_released_after_completion() {
        let group = SingleFlight::<u8>::new();

        assert_eq!(group.join("k", || async { 1 }).wait().await, Some(1));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(group.in_flight(), 0);

        // A later call computes afresh.
        assert_eq!(group.join("k", || async { 2 }).wait().await, Some(2));
    }

    #[tokio::test]
    async fn dropped_waiter_does_not_cancel_computation() {
        let group = SingleFlight::<u8>::new();
        let finished = Arc::new(AtomicUsize::new(0));

        let done = finished.clone();
        let flight = group.join("k", move || async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            done.fetch_add(1, Ordering::SeqCst);
            7
        });

        let waited = tokio::time::timeout(Duration::from_millis(5), flight.wait()).await;
        assert!(waited.is_err());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 1);
        assert_eq!(group.in_flight(), 0);
    }

    #[tokio::test]
    async fn panicking_computation_is_reported_as_abandoned() {
        let group = SingleFlight::<u8>::new();

        let flight = group.join("k", || async {
            let value: Option<u8> = None;
            value.expect("computation failed")
        });

        assert_eq!(flight.wait().await, None);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(group.in_flight(), 0);
    }
}
