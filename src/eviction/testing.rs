//! In-memory cluster used by the eviction tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::time::Instant;

use crate::kubernetes::{ApiFilters, PodApi};

pub fn api_error(code: u16, reason: &str) -> kube::Error {
    kube::Error::Api(kube::core::ErrorResponse {
        status: "Failure".to_string(),
        message: format!("{} ({})", reason, code),
        reason: reason.to_string(),
        code,
    })
}

/// Pods that exist, evictions that fail a set number of times, and a log of calls
#[derive(Default)]
pub struct FakeCluster {
    pods: Vec<String>,
    list_fails: bool,
    /// Remaining failures per pod before its eviction is accepted
    failures: Mutex<HashMap<String, u32>>,
    list_calls: Mutex<Vec<(String, ApiFilters)>>,
    evict_calls: Mutex<Vec<(String, Instant)>>,
}

impl FakeCluster {
    pub fn with_pods(pods: &[&str]) -> Self {
        Self {
            pods: pods.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn failing_list(mut self) -> Self {
        self.list_fails = true;
        self
    }

    /// Reject the first `times` evictions of `pod` with a disruption budget error
    pub fn fail_times(self, pod: &str, times: u32) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(pod.to_string(), times);
        self
    }

    pub fn fail_always(self, pod: &str) -> Self {
        self.fail_times(pod, u32::MAX)
    }

    pub fn list_calls(&self) -> Vec<(String, ApiFilters)> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn evict_calls(&self) -> Vec<String> {
        self.evict_calls
            .lock()
            .unwrap()
            .iter()
            .map(|(pod, _)| pod.clone())
            .collect()
    }

    pub fn evict_times(&self) -> Vec<Instant> {
        self.evict_calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, at)| *at)
            .collect()
    }
}

#[async_trait]
impl PodApi for FakeCluster {
    async fn list_pod_names(
        &self,
        namespace: &str,
        filters: &ApiFilters,
    ) -> Result<Vec<String>, kube::Error> {
        self.list_calls
            .lock()
            .unwrap()
            .push((namespace.to_string(), filters.clone()));
        if self.list_fails {
            return Err(api_error(403, "Forbidden"));
        }
        Ok(self.pods.clone())
    }

    async fn evict_pod(&self, _namespace: &str, name: &str) -> Result<(), kube::Error> {
        self.evict_calls
            .lock()
            .unwrap()
            .push((name.to_string(), Instant::now()));

        let mut failures = self.failures.lock().unwrap();
        if let Some(remaining) = failures.get_mut(name)
            && *remaining > 0
        {
            *remaining = remaining.saturating_sub(1);
            return Err(api_error(429, "TooManyRequests"));
        }

        if self.pods.iter().any(|p| p == name) {
            Ok(())
        } else {
            Err(api_error(404, "NotFound"))
        }
    }
}
