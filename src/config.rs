//! Unified configuration for the extraction engine.
//!
//! Configuration can be built in code with the `with_*` methods, taken from
//! one of the presets, or loaded from a YAML or JSON document. Missing
//! fields fall back to their defaults.
//!
//! ```yaml
//! cache:
//!   max_size: 5000
//! compile:
//!   case_insensitive: false
//!   size_limit: 10485760
//! parallel:
//!   enabled: true
//!   min_batch_size_for_parallelism: 256
//! log_level: warn
//! ```

use crate::compiler::CompileOptions;
use crate::error::{ExtractError, Result};
use crate::matcher::cache::CacheConfig;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Configuration for batch extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Enable row-level parallelism within batches
    pub enabled: bool,
    /// Minimum batch size before work is spread across threads
    pub min_batch_size_for_parallelism: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_batch_size_for_parallelism: 1024,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Pattern cache configuration
    pub cache: CacheConfig,
    /// Options applied to every compiled pattern
    pub compile: CompileOptions,
    /// Batch extraction configuration
    pub parallel: ParallelConfig,
    /// Default log filter, overridden by `REGEX_EXTRACT_LOG`
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            compile: CompileOptions::default(),
            parallel: ParallelConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Create a new engine configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration for workloads with many distinct patterns.
    pub fn high_throughput() -> Self {
        Self {
            cache: CacheConfig { max_size: 5000 },
            parallel: ParallelConfig {
                enabled: true,
                min_batch_size_for_parallelism: 256,
            },
            log_level: "warn".to_string(),
            ..Default::default()
        }
    }

    /// Create a configuration optimized for memory efficiency.
    pub fn memory_efficient() -> Self {
        Self {
            cache: CacheConfig { max_size: 64 },
            compile: CompileOptions {
                size_limit: 1 << 20,
                dfa_size_limit: 256 * 1024,
                ..Default::default()
            },
            parallel: ParallelConfig {
                enabled: false,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Create a configuration for development and debugging.
    pub fn development() -> Self {
        Self {
            cache: CacheConfig { max_size: 16 },
            parallel: ParallelConfig {
                enabled: false,
                ..Default::default()
            },
            log_level: "debug".to_string(),
            ..Default::default()
        }
    }

    /// Parse a YAML configuration document.
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON configuration document.
    pub fn from_json_str(source: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, choosing the format by extension.
    ///
    /// `.json` files are read as JSON; everything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&source),
            _ => Self::from_yaml_str(&source),
        }
    }

    /// Reject values that cannot produce a working engine.
    pub fn validate(&self) -> Result<()> {
        self.level_filter()?;
        if self.compile.size_limit == 0 {
            return Err(ExtractError::ConfigError(
                "compile.size_limit must be greater than 0".to_string(),
            ));
        }
        if self.compile.nest_limit == 0 {
            return Err(ExtractError::ConfigError(
                "compile.nest_limit must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Parsed form of `log_level`.
    pub fn level_filter(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(&self.log_level).map_err(|_| {
            ExtractError::ConfigError(format!("unknown log level '{}'", self.log_level))
        })
    }

    pub fn with_cache_size(mut self, size: usize) -> Self {
        self.cache.max_size = size;
        self
    }

    pub fn with_compile_options(mut self, options: CompileOptions) -> Self {
        self.compile = options;
        self
    }

    pub fn with_case_insensitive(mut self, enable: bool) -> Self {
        self.compile.case_insensitive = enable;
        self
    }

    pub fn with_parallel_processing(mut self, enable: bool) -> Self {
        self.parallel.enabled = enable;
        self
    }

    pub fn with_min_batch_size_for_parallelism(mut self, min_size: usize) -> Self {
        self.parallel.min_batch_size_for_parallelism = min_size;
        self
    }

    pub fn with_log_level(mut self, level: LevelFilter) -> Self {
        self.log_level = level.to_string().to_lowercase();
        self
    }
}
