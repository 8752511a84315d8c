use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{EvictParams, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config, ResourceExt};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, trace};

use super::{ApiFilters, PodApi};

/// Timeout for connecting to K8s API
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for reading K8s API responses
const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size for paginated list requests
const PAGE_SIZE: u32 = 500;

/// Namespace used when neither the flag nor the kubeconfig context names one
const FALLBACK_NAMESPACE: &str = "default";

/// How to reach the cluster, as given on the command line
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    /// Explicit kubeconfig file (otherwise KUBECONFIG / ~/.kube/config / in-cluster)
    pub kubeconfig: Option<PathBuf>,
    /// Kubeconfig context to use instead of the current one
    pub context: Option<String>,
    /// Namespace override
    pub namespace: Option<String>,
}

/// Pod list/evict operations backed by a kube client
pub struct KubeCluster {
    client: Client,
    namespace: String,
}

impl KubeCluster {
    /// Build a client for the selected kubeconfig context and resolve the namespace
    pub async fn connect(options: &ConnectOptions) -> Result<Self> {
        let mut config = Self::load_config(options).await?;

        config.connect_timeout = Some(CONNECT_TIMEOUT);
        config.read_timeout = Some(READ_TIMEOUT);

        let namespace = resolve_namespace(options.namespace.as_deref(), &config.default_namespace);

        debug!(
            cluster_url = %config.cluster_url,
            namespace = %namespace,
            "Creating Kubernetes client"
        );

        let client = Client::try_from(config).context("Failed to create Kubernetes client")?;

        Ok(Self { client, namespace })
    }

    async fn load_config(options: &ConnectOptions) -> Result<Config> {
        if options.kubeconfig.is_none() && options.context.is_none() {
            return Config::infer()
                .await
                .context("Failed to infer Kubernetes configuration");
        }

        let kubeconfig = match &options.kubeconfig {
            Some(path) => Kubeconfig::read_from(path)
                .with_context(|| format!("Failed to read kubeconfig: {}", path.display()))?,
            None => Kubeconfig::read().context("Failed to read kubeconfig")?,
        };

        if let Some(context) = &options.context
            && !kubeconfig.contexts.iter().any(|c| &c.name == context)
        {
            anyhow::bail!("Context '{}' not found in kubeconfig", context);
        }

        Config::from_custom_kubeconfig(
            kubeconfig,
            &KubeConfigOptions {
                context: options.context.clone(),
                ..Default::default()
            },
        )
        .await
        .with_context(|| match &options.context {
            Some(context) => format!("Failed to load kubeconfig for context '{}'", context),
            None => "Failed to load kubeconfig".to_string(),
        })
    }

    /// Namespace the run operates in
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl PodApi for KubeCluster {
    /// List pods page by page using continue tokens
    async fn list_pod_names(
        &self,
        namespace: &str,
        filters: &ApiFilters,
    ) -> Result<Vec<String>, kube::Error> {
        let api = self.pods(namespace);
        let base_params = build_list_params(filters);
        let mut names = Vec::new();
        let mut continue_token: Option<String> = None;
        let mut page_count = 0u32;

        loop {
            let mut params = base_params.clone().limit(PAGE_SIZE);
            if let Some(ref token) = continue_token {
                params = params.continue_token(token);
            }

            let list = api.list(&params).await?;
            let items_count = list.items.len();
            names.extend(list.items.iter().map(|pod| pod.name_any()));
            page_count += 1;

            match list.metadata.continue_ {
                Some(token) if !token.is_empty() => {
                    debug!(
                        namespace = %namespace,
                        page = page_count,
                        items_this_page = items_count,
                        total_so_far = names.len(),
                        "Fetched page, continuing"
                    );
                    continue_token = Some(token);
                }
                _ => break,
            }
        }

        debug!(
            namespace = %namespace,
            pages = page_count,
            pods = names.len(),
            "Listed pods"
        );

        Ok(names)
    }

    async fn evict_pod(&self, namespace: &str, name: &str) -> Result<(), kube::Error> {
        let status = self
            .pods(namespace)
            .evict(name, &EvictParams::default())
            .await?;
        trace!(pod = %name, namespace = %namespace, status = ?status.status, "Eviction accepted");
        Ok(())
    }
}

/// Build ListParams from API filters (label selectors, field selectors)
fn build_list_params(filters: &ApiFilters) -> ListParams {
    let mut params = ListParams::default();

    if let Some(ref label_sel) = filters.label_selector {
        params = params.labels(label_sel);
    }

    if let Some(ref field_sel) = filters.field_selector {
        params = params.fields(field_sel);
    }

    trace!(
        label_selector = ?filters.label_selector,
        field_selector = ?filters.field_selector,
        "Built ListParams"
    );

    params
}

/// Flag wins, then the context's namespace, then "default"
fn resolve_namespace(flag: Option<&str>, context_namespace: &str) -> String {
    flag.filter(|ns| !ns.is_empty())
        .or(Some(context_namespace).filter(|ns| !ns.is_empty()))
        .unwrap_or(FALLBACK_NAMESPACE)
        .to_string()
}
