// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

mod cli;
mod config;
mod error;
mod eviction;
mod kubernetes;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

use cli::Args;
use eviction::RetryMode;
use kubernetes::KubeCluster;

/// Initialize logging on stderr
fn init_logging(verbose: bool) {
    let filter = if verbose {
        "kubectl_evict_pod=debug"
    } else {
        "kubectl_evict_pod=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider (aws-lc-rs)
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    let args = Args::parse();
    init_logging(args.verbose);

    // Selection is checked before anything touches the cluster
    let target_spec = args.selection().into_target_spec()?;

    let config = config::Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring unreadable config file");
        config::Config::default()
    });
    let mode = args.retry_mode(&config);

    let cluster = KubeCluster::connect(&args.connect_options())
        .await
        .context("Failed to connect to Kubernetes")?;
    let namespace = cluster.namespace().to_string();

    let targets = eviction::resolve_targets(&cluster, &target_spec, &namespace).await?;

    if let RetryMode::UntilEvicted(policy) = &mode {
        info!(
            pods = targets.len(),
            namespace = %namespace,
            interval_secs = policy.interval.as_secs(),
            max_rounds = ?policy.max_rounds,
            "Evicting with retries"
        );
    }

    let report = eviction::run(&cluster, &targets, &namespace, &mode).await?;

    if report.evicted > 0 {
        info!(
            evicted = report.evicted,
            rounds = report.rounds,
            namespace = %namespace,
            "All selected pods evicted"
        );
    }

    Ok(())
}
