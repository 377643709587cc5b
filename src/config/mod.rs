//! Configuration module
//!
//! Layered settings: built-in defaults, then an optional config file,
//! then `ATTEST_*` environment variables, then CLI flags (applied by the
//! binary).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Environment variable prefix
const ENV_PREFIX: &str = "ATTEST";

/// Runner configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of test files executing concurrently
    pub concurrency: usize,

    /// Output format (text, json)
    pub format: String,

    /// Colored output
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency: crate::runner::Runner::default_concurrency(),
            format: "text".to_string(),
            color: true,
        }
    }
}

impl Config {
    /// Load configuration from a yaml or json file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read config file")?;

        let config: Self = if path
            .as_ref()
            .extension()
            .map(|e| e == "yaml" || e == "yml")
            .unwrap_or(false)
        {
            serde_yaml::from_str(&content).context("Failed to parse YAML config")?
        } else {
            serde_json::from_str(&content).context("Failed to parse JSON config")?
        };

        Ok(config)
    }

    /// Apply environment variable overrides. `NO_COLOR` is honored in
    /// addition to `ATTEST_NO_COLOR`.
    pub fn apply_env(&mut self) {
        if let Some(concurrency) = get_env_parse("CONCURRENCY") {
            self.concurrency = concurrency;
        }
        if let Some(format) = get_env("FORMAT") {
            self.format = format;
        }
        if get_env_bool("NO_COLOR").unwrap_or(false) || env::var_os("NO_COLOR").is_some() {
            self.color = false;
        }
    }
}

fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name)?.parse().ok()
}

fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
}
