// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Pod selection: validating the targeting mode and resolving it to pod names
//!
//! A run targets pods in exactly one of these ways:
//! - Explicit names: `kubectl evict-pod web-0 web-1`
//! - Selectors: `-l app=web`, `--field-selector status.phase=Running`, or both (AND)
//! - Everything in the namespace: `--all`

use tracing::debug;

use crate::error::{EvictError, Result};
use crate::kubernetes::{ApiFilters, PodApi};

/// Ordered pod names to evict
pub type TargetSet = Vec<String>;

/// Raw selection flags as given on the command line
#[derive(Debug, Clone, Default)]
pub struct SelectionArgs {
    pub names: Vec<String>,
    pub label_selector: Option<String>,
    pub field_selector: Option<String>,
    pub all: bool,
}

/// A validated targeting mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    /// Pods named explicitly, evicted in the given order
    Names(Vec<String>),
    /// Pods matching a label and/or field selector
    Selector(ApiFilters),
    /// Every pod in the namespace
    All,
}

fn populated(selector: &Option<String>) -> Option<&str> {
    selector.as_deref().filter(|s| !s.is_empty())
}

impl SelectionArgs {
    /// Check that exactly one targeting mode is populated
    ///
    /// Label and field selectors count as one mode and may be combined.
    pub fn validate(&self) -> Result<()> {
        let mut modes = Vec::new();
        if !self.names.is_empty() {
            modes.push("pod names");
        }
        if populated(&self.label_selector).is_some() || populated(&self.field_selector).is_some() {
            modes.push("a selector");
        }
        if self.all {
            modes.push("--all");
        }

        match modes.as_slice() {
            [] => Err(EvictError::EmptySelection),
            [_] => Ok(()),
            [first, rest @ ..] => Err(EvictError::ConflictingSelection(format!(
                "{} cannot be combined with {}",
                first,
                rest.join(" or ")
            ))),
        }
    }

    /// Validate and convert into a [`TargetSpec`]
    pub fn into_target_spec(self) -> Result<TargetSpec> {
        self.validate()?;

        if self.all {
            return Ok(TargetSpec::All);
        }
        if !self.names.is_empty() {
            return Ok(TargetSpec::Names(self.names));
        }

        Ok(TargetSpec::Selector(ApiFilters {
            label_selector: populated(&self.label_selector).map(String::from),
            field_selector: populated(&self.field_selector).map(String::from),
        }))
    }
}

/// Turn a target spec into the ordered list of pod names to evict
///
/// Explicit names are returned as-is without contacting the cluster.
/// Selectors and `--all` issue a single list query against `namespace`.
pub async fn resolve_targets<C>(
    cluster: &C,
    spec: &TargetSpec,
    namespace: &str,
) -> Result<TargetSet>
where
    C: PodApi + ?Sized,
{
    let filters = match spec {
        TargetSpec::Names(names) => return Ok(names.clone()),
        TargetSpec::Selector(filters) => filters.clone(),
        TargetSpec::All => ApiFilters::unrestricted(),
    };

    let names = cluster
        .list_pod_names(namespace, &filters)
        .await
        .map_err(|source| EvictError::List {
            namespace: namespace.to_string(),
            source,
        })?;

    debug!(
        namespace = %namespace,
        label_selector = ?filters.label_selector,
        field_selector = ?filters.field_selector,
        matched = names.len(),
        "Resolved pods from selector"
    );

    Ok(names)
}
