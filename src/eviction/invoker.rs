// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Single eviction requests

use tracing::{info, warn};

use crate::error::EvictError;
use crate::kubernetes::PodApi;

/// Result of one eviction attempt
#[derive(Debug)]
pub struct EvictionOutcome {
    pub pod: String,
    /// None when the eviction was accepted
    pub error: Option<kube::Error>,
}

impl EvictionOutcome {
    pub fn is_evicted(&self) -> bool {
        self.error.is_none()
    }

    /// Turn a failed outcome into the error that ends a single-pass run
    pub fn into_result(self, namespace: &str) -> Result<(), EvictError> {
        match self.error {
            None => Ok(()),
            Some(source) => Err(EvictError::Eviction {
                pod: self.pod,
                namespace: namespace.to_string(),
                source,
            }),
        }
    }
}

/// Issue one eviction request and log what the cluster said
///
/// Never retries; any failure is reported in the outcome and left to the caller.
pub async fn evict_target<C>(cluster: &C, namespace: &str, pod: &str) -> EvictionOutcome
where
    C: PodApi + ?Sized,
{
    match cluster.evict_pod(namespace, pod).await {
        Ok(()) => {
            info!(
                pod = %pod,
                namespace = %namespace,
                "pod {} in namespace {} evicted successfully",
                pod,
                namespace
            );
            EvictionOutcome {
                pod: pod.to_string(),
                error: None,
            }
        }
        Err(e) => {
            warn!(
                pod = %pod,
                namespace = %namespace,
                cause = describe_failure(&e),
                error = %e,
                "Eviction of pod {} failed",
                pod
            );
            EvictionOutcome {
                pod: pod.to_string(),
                error: Some(e),
            }
        }
    }
}

/// Short human label for why an eviction did not go through
fn describe_failure(err: &kube::Error) -> &'static str {
    match err {
        // The eviction API answers 429 while a PodDisruptionBudget forbids it
        kube::Error::Api(api_err) if api_err.code == 429 => "blocked by disruption budget",
        kube::Error::Api(api_err) if api_err.code == 404 => "pod not found",
        kube::Error::Api(api_err) if api_err.code == 403 => "forbidden",
        kube::Error::Api(api_err) if api_err.code >= 500 => "server error",
        kube::Error::Api(_) => "rejected",
        kube::Error::HyperError(_) | kube::Error::Service(_) => "connection error",
        _ => "request failed",
    }
}
