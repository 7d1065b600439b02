use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use tokio::sync::Semaphore;

use crate::error::ContextError;
use crate::ignore::IgnoreMatcher;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub loader: LoaderConfig,
}

/// What a loader does with an entry whose content is not plain text.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BinaryPolicy {
    /// Collect the path and fail the load once enumeration is done.
    Reject,
    /// Leave the entry out of the context without reporting it.
    Skip,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoaderConfig {
    #[serde(default = "default_max_file_depth")]
    pub max_file_depth: usize,
    #[serde(default = "default_element_name_regex")]
    pub element_name_regex: String,
    #[serde(default)]
    pub ignore: Vec<String>,
    #[serde(default = "default_directory_binary_policy")]
    pub directory_binary_policy: BinaryPolicy,
    #[serde(default = "default_zip_binary_policy")]
    pub zip_binary_policy: BinaryPolicy,
    #[serde(default = "default_decode_concurrency")]
    pub decode_concurrency: usize,
    /// Largest file, in decompressed bytes, a context may hold.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_file_depth: default_max_file_depth(),
            element_name_regex: default_element_name_regex(),
            ignore: Vec::new(),
            directory_binary_policy: default_directory_binary_policy(),
            zip_binary_policy: default_zip_binary_policy(),
            decode_concurrency: default_decode_concurrency(),
            max_file_bytes: default_max_file_bytes(),
            follow_symlinks: false,
        }
    }
}

fn default_max_file_depth() -> usize {
    3
}
fn default_element_name_regex() -> String {
    "^[a-z][a-z0-9]*(-[a-z0-9]+)*$".to_string()
}
fn default_directory_binary_policy() -> BinaryPolicy {
    BinaryPolicy::Reject
}
fn default_zip_binary_policy() -> BinaryPolicy {
    BinaryPolicy::Skip
}
fn default_decode_concurrency() -> usize {
    16
}
fn default_max_file_bytes() -> u64 {
    5 * 1024 * 1024
}

impl LoaderConfig {
    pub fn name_pattern(&self) -> Result<Regex, ContextError> {
        Regex::new(&self.element_name_regex).map_err(|e| ContextError::InvalidPattern {
            pattern: self.element_name_regex.clone(),
            reason: e.to_string(),
        })
    }

    pub fn ignore_matcher(&self) -> Result<IgnoreMatcher, ContextError> {
        IgnoreMatcher::new(self.ignore.as_slice())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_file_depth == 0 {
            anyhow::bail!("loader.max_file_depth must be >= 1");
        }
        if self.decode_concurrency == 0 || self.decode_concurrency > Semaphore::MAX_PERMITS {
            anyhow::bail!(
                "loader.decode_concurrency must be between 1 and {}",
                Semaphore::MAX_PERMITS
            );
        }
        if self.max_file_bytes == 0 {
            anyhow::bail!("loader.max_file_bytes must be >= 1");
        }
        self.name_pattern()
            .with_context(|| "loader.element_name_regex is not a valid regex")?;
        self.ignore_matcher()
            .with_context(|| "loader.ignore contains an invalid glob")?;
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.loader.validate()?;

    Ok(config)
}
