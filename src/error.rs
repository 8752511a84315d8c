// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for pod selection and eviction

use thiserror::Error;

/// Errors that end an eviction run
#[derive(Error, Debug)]
pub enum EvictError {
    /// No pod names, selector or `--all` given
    #[error("nothing given to select pods: pass pod names, --selector, --field-selector or --all")]
    EmptySelection,

    /// More than one targeting mode given
    #[error("conflicting pod selection: {0}")]
    ConflictingSelection(String),

    /// Listing pods for a selector failed
    #[error("failed to list pods in namespace '{namespace}': {source}")]
    List {
        namespace: String,
        #[source]
        source: kube::Error,
    },

    /// A single eviction request was rejected or failed
    #[error("failed to evict pod '{pod}' in namespace '{namespace}': {source}")]
    Eviction {
        pod: String,
        namespace: String,
        #[source]
        source: kube::Error,
    },

    /// Round limit reached with pods still present
    #[error("gave up after {rounds} rounds, {} pod(s) not evicted: {}", .remaining.len(), .remaining.join(", "))]
    RetriesExhausted { rounds: u32, remaining: Vec<String> },
}

pub type Result<T> = std::result::Result<T, EvictError>;
