mod client;

pub use client::{ConnectOptions, KubeCluster};

use async_trait::async_trait;

/// Selector parameters pushed down to the Kubernetes list API
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiFilters {
    /// Label selector string (e.g., "app=nginx,version=v1")
    pub label_selector: Option<String>,
    /// Field selector string (e.g., "status.phase=Running")
    pub field_selector: Option<String>,
}

impl ApiFilters {
    /// Filters that match every pod in the namespace
    pub fn unrestricted() -> Self {
        Self::default()
    }
}

/// The cluster operations the evictor relies on
///
/// Implemented by [`KubeCluster`] against a real API server; tests substitute
/// an in-memory fake. Calls are issued one at a time.
#[async_trait]
pub trait PodApi: Send + Sync {
    /// Names of the pods in `namespace` matching `filters`, in list order
    async fn list_pod_names(
        &self,
        namespace: &str,
        filters: &ApiFilters,
    ) -> Result<Vec<String>, kube::Error>;

    /// Submit an Eviction for a single pod
    async fn evict_pod(&self, namespace: &str, name: &str) -> Result<(), kube::Error>;
}
