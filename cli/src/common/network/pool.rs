//! # Bounded Probe Pool (`common::network::pool`)
//!
//! File: cli/src/common/network/pool.rs
//!
//! Fans work out to tokio tasks with at most `workers` running at once, and
//! fans results back in over an mpsc channel. The channel is the only state
//! shared between tasks. It closes once every task has finished, so draining
//! it until `None` observes every result exactly once.
//!
//! Spawned tasks are never cancelled: dropping the receiver early (as the
//! "first match wins" stage does) lets the remaining probes run to their own
//! timeouts, with their results discarded.
//!
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};

/// Runs `task` for every item with at most `workers` in flight.
///
/// `Some` outputs are delivered on the returned channel in completion order.
/// Must be called from within a tokio runtime.
pub fn fan_out<I, F, Fut, T>(items: I, workers: usize, task: F) -> mpsc::UnboundedReceiver<T>
where
    I: IntoIterator,
    F: Fn(I::Item) -> Fut,
    Fut: Future<Output = Option<T>> + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let permits = Arc::new(Semaphore::new(workers.max(1)));

    for item in items {
        let permits = Arc::clone(&permits);
        let tx = tx.clone();
        let work = task(item);
        tokio::spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            if let Some(output) = work.await {
                // The receiver may already be gone; late results are dropped.
                let _ = tx.send(output);
            }
        });
    }

    rx
}

/// Drains `rx` until every producer has finished.
pub async fn collect<T>(mut rx: mpsc::UnboundedReceiver<T>) -> Vec<T> {
    let mut results = Vec::new();
    while let Some(item) = rx.recv().await {
        results.push(item);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_single_responder_any_pool_size() {
        let responder = Ipv4Addr::new(10, 0, 0, 42);
        for workers in [1, 10, 50] {
            let in_flight = Arc::new(AtomicUsize::new(0));
            let peak = Arc::new(AtomicUsize::new(0));
            let candidates = (1..=254u8).map(|n| Ipv4Addr::new(10, 0, 0, n));

            let rx = fan_out(candidates, workers, |addr| {
                let in_flight = Arc::clone(&in_flight);
                let peak = Arc::clone(&peak);
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    (addr == responder).then_some(addr)
                }
            });
            let reachable = collect(rx).await;

            assert_eq!(reachable, vec![responder], "pool size {}", workers);
            assert!(peak.load(Ordering::SeqCst) <= workers, "pool size {}", workers);
        }
    }

    #[tokio::test]
    async fn test_every_result_delivered_once() {
        let rx = fan_out(0..500u32, 7, |n| async move { (n % 3 == 0).then_some(n) });
        let mut results = collect(rx).await;
        results.sort_unstable();
        let expected: Vec<u32> = (0..500).filter(|n| n % 3 == 0).collect();
        assert_eq!(results, expected);
    }

    #[tokio::test]
    async fn test_zero_workers_still_progresses() {
        let rx = fan_out(0..5u32, 0, |n| async move { Some(n) });
        assert_eq!(collect(rx).await.len(), 5);
    }

    #[tokio::test]
    async fn test_empty_input_closes_channel() {
        let rx = fan_out(Vec::<u32>::new(), 4, |n| async move { Some(n) });
        assert!(collect(rx).await.is_empty());
    }
}
