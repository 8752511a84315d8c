// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;
use crate::eviction::{RetryMode, SelectionArgs};
use crate::kubernetes::ConnectOptions;

#[derive(Parser, Debug)]
#[command(name = "kubectl-evict-pod")]
#[command(author, version, about = "Evict selected pods through the Kubernetes Eviction API")]
pub struct Args {
    /// Names of the pods to evict
    #[arg(value_name = "POD")]
    pub pods: Vec<String>,

    /// Label selector to evict pods with (e.g. "app=web,tier!=cache")
    #[arg(short = 'l', long = "selector", visible_alias = "labelSelector")]
    pub label_selector: Option<String>,

    /// Field selector to evict pods with (e.g. "status.phase=Running")
    #[arg(long = "field-selector", visible_alias = "fieldSelector")]
    pub field_selector: Option<String>,

    /// Evict every pod in the namespace
    #[arg(long)]
    pub all: bool,

    /// Keep retrying rejected evictions until every pod is gone
    #[arg(long)]
    pub retry: bool,

    /// Seconds to wait between retry rounds [default: 5]
    #[arg(
        long,
        value_name = "SECS",
        requires = "retry",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub retry_interval: Option<u64>,

    /// Give up after this many retry rounds [default: unlimited]
    #[arg(
        long,
        value_name = "N",
        requires = "retry",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_rounds: Option<u32>,

    /// Namespace of the pods (defaults to the context's namespace)
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Kubeconfig context to use
    #[arg(long, value_name = "CONTEXT")]
    pub context: Option<String>,

    /// Path to the kubeconfig file
    #[arg(long, value_name = "PATH")]
    pub kubeconfig: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Raw targeting flags, not yet validated
    pub fn selection(&self) -> SelectionArgs {
        SelectionArgs {
            names: self.pods.clone(),
            label_selector: self.label_selector.clone(),
            field_selector: self.field_selector.clone(),
            all: self.all,
        }
    }

    pub fn retry_mode(&self, config: &Config) -> RetryMode {
        if self.retry {
            RetryMode::UntilEvicted(config.retry_policy(self.retry_interval, self.max_rounds))
        } else {
            RetryMode::SinglePass
        }
    }

    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            kubeconfig: self.kubeconfig.clone(),
            context: self.context.clone(),
            namespace: self.namespace.clone(),
        }
    }
}
