//! Polling behavior under paused time
//!
//! These tests drive real pollers on a paused tokio clock, so interval
//! arithmetic is exact and no test waits on wall-clock time.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::FutureExt;
use office_stream::{observe, FailurePolicy, KeyedFetch, PollerSupervisor, Reconciliation};
use proptest::prelude::*;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// A fetch that replays scripted outcomes, then keeps failing
fn scripted<T: Send + 'static>(
    outcomes: Vec<Result<T, &'static str>>,
) -> impl FnMut() -> std::future::Ready<Result<T, &'static str>> + Send + 'static {
    let queue = Arc::new(Mutex::new(VecDeque::from(outcomes)));
    move || {
        let next = queue.lock().unwrap().pop_front();
        std::future::ready(next.unwrap_or(Err("script exhausted")))
    }
}

#[tokio::test(start_paused = true)]
async fn test_skip_policy_emits_only_successes() {
    let (task, mut stream) = observe(
        "state",
        scripted(vec![Ok(1), Err("connection refused"), Ok(2)]),
        Duration::from_secs(1),
        FailurePolicy::SkipAndLog,
    );

    let start = Instant::now();
    assert_eq!(stream.recv().await, Some(1));
    assert_eq!(stream.recv().await, Some(2));
    assert_eq!(start.elapsed(), Duration::from_secs(2));

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(stream.try_recv(), None);

    let stats = task.stats();
    assert_eq!(stats.emissions, 2);
    assert!(stats.skips >= 1);
    task.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_fallback_policy_emits_empty_list() {
    let (task, mut stream) = observe(
        "alerts",
        scripted(vec![Ok(vec!["a1"]), Err("timeout")]),
        Duration::from_secs(2),
        FailurePolicy::Fallback(Vec::new()),
    );

    assert_eq!(stream.recv().await, Some(vec!["a1"]));
    assert_eq!(stream.recv().await, Some(vec![]));
    task.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_keep_previous_emits_nothing_on_failure() {
    let (task, mut stream) = observe(
        "heating",
        scripted(vec![Ok(true), Err("timeout"), Err("timeout"), Ok(false)]),
        Duration::from_secs(1),
        FailurePolicy::KeepPrevious,
    );

    let start = Instant::now();
    assert_eq!(stream.recv().await, Some(true));
    assert_eq!(stream.recv().await, Some(false));
    assert_eq!(start.elapsed(), Duration::from_secs(3));
    task.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_emissions_are_one_interval_apart() {
    let interval = Duration::from_millis(750);
    let (task, mut stream) = observe(
        "ticks",
        || async { Ok::<_, &'static str>(()) },
        interval,
        FailurePolicy::SkipAndLog,
    );

    let mut arrivals = Vec::new();
    for _ in 0..4 {
        stream.recv().await.unwrap();
        arrivals.push(Instant::now());
    }

    for pair in arrivals.windows(2) {
        assert_eq!(pair[1] - pair[0], interval);
    }
    task.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_slow_fetch_never_overlaps() {
    let interval = Duration::from_secs(1);
    let fetch_time = Duration::from_millis(300);
    let starts = Arc::new(Mutex::new(Vec::new()));
    let in_flight = Arc::new(Mutex::new(0usize));

    let fetch_starts = Arc::clone(&starts);
    let fetch_in_flight = Arc::clone(&in_flight);
    let (task, mut stream) = observe(
        "slow",
        move || {
            let starts = Arc::clone(&fetch_starts);
            let in_flight = Arc::clone(&fetch_in_flight);
            async move {
                {
                    let mut active = in_flight.lock().unwrap();
                    *active += 1;
                    assert_eq!(*active, 1, "fetches overlapped");
                }
                starts.lock().unwrap().push(Instant::now());
                tokio::time::sleep(fetch_time).await;
                *in_flight.lock().unwrap() -= 1;
                Ok::<_, &'static str>(())
            }
        },
        interval,
        FailurePolicy::SkipAndLog,
    );

    for _ in 0..3 {
        stream.recv().await.unwrap();
    }
    task.shutdown().await.unwrap();

    let starts = starts.lock().unwrap();
    for pair in starts.windows(2) {
        assert_eq!(pair[1] - pair[0], interval + fetch_time);
    }
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_fetch_discards_result() {
    let (task, mut stream) = observe(
        "cancelled",
        || async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, &'static str>(42)
        },
        Duration::from_secs(1),
        FailurePolicy::SkipAndLog,
    );

    tokio::time::sleep(Duration::from_secs(1)).await;
    task.shutdown().await.unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(stream.recv().await, None);
}

#[tokio::test(start_paused = true)]
async fn test_supervisor_reconciles_key_sets() {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let fetch: KeyedFetch<String, String, &'static str> =
        Arc::new(|key: &String| std::future::ready(Ok(key.clone())).boxed());
    let mut supervisor = PollerSupervisor::new(
        "heating",
        fetch,
        Duration::from_secs(1),
        FailurePolicy::KeepPrevious,
        Arc::new(tx),
    );

    let first = supervisor
        .reconcile(["A".to_string(), "B".to_string()])
        .await
        .unwrap();
    assert_eq!(first.started.len(), 2);
    assert!(first.stopped.is_empty());

    tokio::time::sleep(Duration::from_millis(2500)).await;
    let before = supervisor.stats_for(&"B".to_string()).unwrap();
    assert_eq!(before.cycles, 3);

    let second = supervisor
        .reconcile(["B".to_string(), "C".to_string()])
        .await
        .unwrap();
    assert_eq!(
        second,
        Reconciliation {
            started: vec!["C".to_string()],
            stopped: vec!["A".to_string()],
        }
    );
    while rx.try_recv().is_ok() {}

    tokio::time::sleep(Duration::from_secs(3)).await;
    let mut seen = Vec::new();
    while let Ok(key) = rx.try_recv() {
        seen.push(key);
    }

    assert!(!seen.contains(&"A".to_string()));
    assert!(seen.contains(&"B".to_string()));
    assert!(seen.contains(&"C".to_string()));

    let after = supervisor.stats_for(&"B".to_string()).unwrap();
    assert_eq!(after.started_at, before.started_at);
    assert_eq!(after.cycles, 6);

    let unchanged = supervisor
        .reconcile(["C".to_string(), "B".to_string()])
        .await
        .unwrap();
    assert!(unchanged.is_noop());

    supervisor.reconcile(Vec::new()).await.unwrap();
    assert!(supervisor.is_empty());
}

fn run_fallback_poller(pattern: &[bool]) -> Vec<Vec<usize>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap();

    let outcomes = pattern
        .iter()
        .enumerate()
        .map(|(i, ok)| if *ok { Ok(vec![i]) } else { Err("backend down") })
        .collect();

    runtime.block_on(async move {
        let (task, mut stream) = observe(
            "alerts",
            scripted(outcomes),
            Duration::from_secs(2),
            FailurePolicy::Fallback(Vec::new()),
        );

        let mut emitted = Vec::new();
        for _ in 0..pattern.len() {
            emitted.push(stream.recv().await.unwrap());
        }
        task.shutdown().await.unwrap();
        emitted
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A fallback poller emits exactly one list per cycle, whatever fails
    #[test]
    fn prop_fallback_emits_every_cycle(pattern in prop::collection::vec(any::<bool>(), 1..20)) {
        let emitted = run_fallback_poller(&pattern);

        prop_assert_eq!(emitted.len(), pattern.len());
        for (i, (ok, value)) in pattern.iter().zip(&emitted).enumerate() {
            if *ok {
                prop_assert_eq!(value, &vec![i]);
            } else {
                prop_assert!(value.is_empty());
            }
        }
    }
}
