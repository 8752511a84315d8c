// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Eviction rounds over a target set
//!
//! Two modes, fixed for the whole run:
//! - Single pass: evict in order, stop at the first failure and return it.
//! - Until evicted: keep passing over the pods that failed, waiting a constant
//!   interval between rounds, until none are left (or `max_rounds` is hit).

use std::time::Duration;
use tracing::{debug, info, warn};

use super::invoker::evict_target;
use crate::error::{EvictError, Result};
use crate::kubernetes::PodApi;

/// Delay between retry rounds unless configured otherwise
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// How the until-evicted mode paces itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Constant wait between rounds
    pub interval: Duration,
    /// Stop after this many rounds; `None` retries forever
    pub max_rounds: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_RETRY_INTERVAL,
            max_rounds: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RetryMode {
    /// Fail fast on the first rejected eviction
    #[default]
    SinglePass,
    /// Requeue rejected pods until every one is evicted
    UntilEvicted(RetryPolicy),
}

/// Summary of a successful run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub evicted: usize,
    pub rounds: u32,
}

/// Evict every pod in `targets` according to `mode`
pub async fn run<C>(
    cluster: &C,
    targets: &[String],
    namespace: &str,
    mode: &RetryMode,
) -> Result<RunReport>
where
    C: PodApi + ?Sized,
{
    if targets.is_empty() {
        info!(namespace = %namespace, "No pods selected, nothing to evict");
        return Ok(RunReport {
            evicted: 0,
            rounds: 0,
        });
    }

    match mode {
        RetryMode::SinglePass => single_pass(cluster, targets, namespace).await,
        RetryMode::UntilEvicted(policy) => until_evicted(cluster, targets, namespace, policy).await,
    }
}

async fn single_pass<C>(cluster: &C, targets: &[String], namespace: &str) -> Result<RunReport>
where
    C: PodApi + ?Sized,
{
    for pod in targets {
        evict_target(cluster, namespace, pod)
            .await
            .into_result(namespace)?;
    }

    Ok(RunReport {
        evicted: targets.len(),
        rounds: 1,
    })
}

async fn until_evicted<C>(
    cluster: &C,
    targets: &[String],
    namespace: &str,
    policy: &RetryPolicy,
) -> Result<RunReport>
where
    C: PodApi + ?Sized,
{
    let mut pending: Vec<String> = targets.to_vec();
    let mut rounds = 0u32;

    loop {
        rounds += 1;
        debug!(round = rounds, pending = pending.len(), "Starting eviction round");

        let mut failed = Vec::new();
        for pod in pending {
            let outcome = evict_target(cluster, namespace, &pod).await;
            if !outcome.is_evicted() {
                failed.push(outcome.pod);
            }
        }

        if failed.is_empty() {
            return Ok(RunReport {
                evicted: targets.len(),
                rounds,
            });
        }

        if let Some(max) = policy.max_rounds
            && rounds >= max
        {
            return Err(EvictError::RetriesExhausted {
                rounds,
                remaining: failed,
            });
        }

        warn!(
            round = rounds,
            remaining = failed.len(),
            retry_in_secs = policy.interval.as_secs_f64(),
            "{} pod(s) not evicted yet, retrying",
            failed.len()
        );
        tokio::time::sleep(policy.interval).await;
        pending = failed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eviction::testing::FakeCluster;

    fn targets(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn retry_forever() -> RetryMode {
        RetryMode::UntilEvicted(RetryPolicy::default())
    }

    #[tokio::test]
    async fn test_single_pass_all_succeed() {
        let cluster = FakeCluster::with_pods(&["a", "b", "c"]);

        let report = run(&cluster, &targets(&["a", "b", "c"]), "default", &RetryMode::SinglePass)
            .await
            .unwrap();

        assert_eq!(report, RunReport { evicted: 3, rounds: 1 });
        assert_eq!(cluster.evict_calls(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_single_pass_stops_at_first_failure() {
        let cluster = FakeCluster::with_pods(&["a", "b", "c"]).fail_always("b");

        let result = run(
            &cluster,
            &targets(&["a", "b", "c"]),
            "default",
            &RetryMode::SinglePass,
        )
        .await;

        match result {
            Err(EvictError::Eviction { pod, .. }) => assert_eq!(pod, "b"),
            other => panic!("expected eviction error, got {:?}", other),
        }
        assert_eq!(cluster.evict_calls(), vec!["a", "b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_until_all_evicted() {
        let cluster = FakeCluster::with_pods(&["a", "b"]).fail_times("b", 2);
        let start = tokio::time::Instant::now();

        let report = run(&cluster, &targets(&["a", "b"]), "default", &retry_forever())
            .await
            .unwrap();

        assert_eq!(report, RunReport { evicted: 2, rounds: 3 });
        // "a" is never retried once evicted
        assert_eq!(cluster.evict_calls(), vec!["a", "b", "b", "b"]);

        let times = cluster.evict_times();
        assert_eq!(times[1] - start, Duration::ZERO);
        assert_eq!(times[2] - times[1], DEFAULT_RETRY_INTERVAL);
        assert_eq!(times[3] - times[2], DEFAULT_RETRY_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_keeps_failure_order() {
        let cluster = FakeCluster::with_pods(&["a", "b", "c", "d"])
            .fail_times("c", 1)
            .fail_times("a", 1);

        let report = run(&cluster, &targets(&["a", "b", "c", "d"]), "default", &retry_forever())
            .await
            .unwrap();

        assert_eq!(report.rounds, 2);
        assert_eq!(cluster.evict_calls(), vec!["a", "b", "c", "d", "a", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_uses_configured_interval() {
        let cluster = FakeCluster::with_pods(&["a"]).fail_times("a", 1);
        let mode = RetryMode::UntilEvicted(RetryPolicy {
            interval: Duration::from_secs(30),
            max_rounds: None,
        });

        run(&cluster, &targets(&["a"]), "default", &mode).await.unwrap();

        let times = cluster.evict_times();
        assert_eq!(times[1] - times[0], Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_gives_up_after_max_rounds() {
        let cluster = FakeCluster::with_pods(&["a", "b"]);
        let mode = RetryMode::UntilEvicted(RetryPolicy {
            max_rounds: Some(2),
            ..Default::default()
        });

        // "ghost" does not exist, so it can never be evicted
        let result = run(&cluster, &targets(&["a", "ghost", "b"]), "default", &mode).await;

        match result {
            Err(EvictError::RetriesExhausted { rounds, remaining }) => {
                assert_eq!(rounds, 2);
                assert_eq!(remaining, vec!["ghost"]);
            }
            other => panic!("expected retries exhausted, got {:?}", other),
        }
        assert_eq!(cluster.evict_calls(), vec!["a", "ghost", "b", "ghost"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_without_limit_keeps_going() {
        let cluster = FakeCluster::with_pods(&["a"]).fail_always("a");

        let result = tokio::time::timeout(
            Duration::from_secs(60),
            run(&cluster, &targets(&["a"]), "default", &retry_forever()),
        )
        .await;

        assert!(result.is_err(), "unbounded retry must not return on its own");
        assert!(cluster.evict_calls().len() >= 10);
    }

    #[tokio::test]
    async fn test_empty_targets_make_no_calls() {
        let cluster = FakeCluster::with_pods(&["a"]);

        for mode in [RetryMode::SinglePass, retry_forever()] {
            let report = run(&cluster, &[], "default", &mode).await.unwrap();
            assert_eq!(report, RunReport { evicted: 0, rounds: 0 });
        }
        assert!(cluster.evict_calls().is_empty());
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.interval, Duration::from_secs(5));
        assert_eq!(policy.max_rounds, None);
        assert_eq!(RetryMode::default(), RetryMode::SinglePass);
    }
}
