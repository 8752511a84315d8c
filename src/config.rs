// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Configuration for kubectl-evict-pod
//!
//! Optional defaults for retry behaviour, read from
//! ~/.kubectl-evict-pod/config.json. Command-line flags take precedence.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::eviction::{DEFAULT_RETRY_INTERVAL, RetryPolicy};

/// Get the base directory (~/.kubectl-evict-pod/)
pub fn base_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|p| p.join(".kubectl-evict-pod"))
        .context("Could not determine home directory")
}

fn default_retry_interval_secs() -> u64 {
    DEFAULT_RETRY_INTERVAL.as_secs()
}

/// kubectl-evict-pod configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Seconds to wait between retry rounds
    #[serde(default = "default_retry_interval_secs")]
    pub retry_interval_secs: u64,

    /// Give up after this many rounds (unset retries forever)
    #[serde(default)]
    pub max_rounds: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            retry_interval_secs: default_retry_interval_secs(),
            max_rounds: None,
        }
    }
}

impl Config {
    /// Load config from disk, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load config from a specific file, or return default if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Both settings must be at least 1, matching the command-line flags
    fn validate(&self) -> Result<()> {
        if self.retry_interval_secs == 0 {
            bail!("retry_interval_secs must be at least 1");
        }
        if self.max_rounds == Some(0) {
            bail!("max_rounds must be at least 1 (omit it to retry forever)");
        }
        Ok(())
    }

    /// Get the config file path (~/.kubectl-evict-pod/config.json)
    pub fn config_path() -> Result<PathBuf> {
        Ok(base_dir()?.join("config.json"))
    }

    /// Retry policy with command-line overrides applied on top of the file
    pub fn retry_policy(&self, interval_secs: Option<u64>, max_rounds: Option<u32>) -> RetryPolicy {
        RetryPolicy {
            interval: Duration::from_secs(interval_secs.unwrap_or(self.retry_interval_secs)),
            max_rounds: max_rounds.or(self.max_rounds),
        }
    }
}
