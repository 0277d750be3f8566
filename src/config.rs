//! Analyzer configuration.
//!
//! Loaded from YAML; every field has a default so an empty file (or no file)
//! is a valid configuration.

use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::analysis::DEFAULT_CAPACITY;
use crate::error::AnalysisError;

/// File names probed by [`AnalyzerConfig::discover`], in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["codescan.yaml", ".codescan.yaml"];

/// What to do when a single file cannot be read or parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Record the failure in the report and keep going.
    #[default]
    Continue,
    /// Abort the run on the first failure.
    FailFast,
}

/// Settings for one analysis run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyzerConfig {
    /// Functions treated as reachable roots (qualified or bare names).
    #[serde(default = "default_entry_points")]
    pub entry_points: Vec<String>,
    /// Whether to include `_test.go` files (default: false)
    #[serde(default)]
    pub include_test_files: bool,
    /// Glob patterns, relative to the root, for paths to skip
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    #[serde(default)]
    pub error_policy: ErrorPolicy,
    /// Keep records from files with syntax errors (default: false)
    #[serde(default)]
    pub accept_partial_parses: bool,
    #[serde(default = "default_type_cache_capacity")]
    pub type_cache_capacity: usize,
    /// Worker threads; unset uses the global rayon pool.
    #[serde(default)]
    pub threads: Option<usize>,
}

fn default_entry_points() -> Vec<String> {
    vec!["main".to_string(), "init".to_string()]
}

fn default_type_cache_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            entry_points: default_entry_points(),
            include_test_files: false,
            excluded_paths: Vec::new(),
            error_policy: ErrorPolicy::default(),
            accept_partial_parses: false,
            type_cache_capacity: default_type_cache_capacity(),
            threads: None,
        }
    }
}

impl AnalyzerConfig {
    /// Parse and validate a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AnalysisError> {
        let path = path.as_ref();
        let config_error = |message: String| AnalysisError::Config {
            path: path.to_path_buf(),
            message,
        };

        let content = fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        let config: AnalyzerConfig =
            serde_yaml::from_str(&content).map_err(|e| config_error(e.to_string()))?;
        config.validate().map_err(|e| config_error(e.to_string()))?;
        Ok(config)
    }

    /// Load the first config file found directly in `dir`, if any.
    pub fn discover<P: AsRef<Path>>(dir: P) -> Result<Option<(Self, PathBuf)>, AnalysisError> {
        for name in CONFIG_FILE_NAMES {
            let candidate = dir.as_ref().join(name);
            if candidate.is_file() {
                let config = Self::load(&candidate)?;
                return Ok(Some((config, candidate)));
            }
        }
        Ok(None)
    }

    /// Check values that deserialization alone cannot rule out.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.entry_points.iter().any(|e| e.trim().is_empty()) {
            anyhow::bail!("entry_points must not contain blank names");
        }

        if self.threads == Some(0) {
            anyhow::bail!("threads must be at least 1");
        }

        // Validate excluded_paths glob patterns compile
        for pattern in &self.excluded_paths {
            Glob::new(pattern).map_err(|e| {
                anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e)
            })?;
        }

        Ok(())
    }

    /// Compile `excluded_paths` into one matcher.
    pub fn excluded_matcher(&self) -> anyhow::Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            builder.add(Glob::new(pattern)?);
        }
        Ok(builder.build()?)
    }
}
