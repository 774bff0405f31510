//! Primary extraction engine interface.
//!
//! [`RegexExtractEngine`] composes the pattern compiler, the pattern cache
//! and the extractor behind the per-call operation a host function needs:
//! `(pattern, subject, group?) -> substring | absent | error`.

use crate::compiler::PatternCompiler;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::matcher::cache::{CacheStats, PatternCache};
use crate::matcher::extract::{extract_index, resolve_selector};
use crate::matcher::{CompiledMatcher, Match};
use rayon::prelude::*;
use std::sync::Arc;

/// Regex extraction engine.
///
/// The engine owns its cache through an `Arc`, so several engines (one per
/// host connection, say) can share compiled patterns while tests build
/// fully isolated instances.
///
/// # Examples
///
/// ## Single Call
/// ```rust
/// use regex_extract::RegexExtractEngine;
///
/// let engine = RegexExtractEngine::new();
/// assert_eq!(engine.extract("x(ab)", "xxabaa", None)?.as_deref(), Some("xab"));
/// assert_eq!(engine.extract("x(ab)", "xxabaa", Some(1))?.as_deref(), Some("ab"));
/// assert_eq!(engine.extract("[Cc]at", "hello", None)?, None);
/// # Ok::<(), regex_extract::ExtractError>(())
/// ```
///
/// ## Column Extraction
/// ```rust
/// use regex_extract::RegexExtractEngine;
///
/// let engine = RegexExtractEngine::new();
/// let rows = [Some("100-200"), None, Some("n/a")];
/// let out = engine.extract_batch(r"(\d+)-(\d+)", &rows, Some(2))?;
/// assert_eq!(out, vec![Some("200".to_string()), None, None]);
/// # Ok::<(), regex_extract::ExtractError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RegexExtractEngine {
    compiler: PatternCompiler,
    cache: Arc<PatternCache>,
    config: EngineConfig,
}

impl RegexExtractEngine {
    /// Create an engine with default configuration and a fresh cache.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine with a fresh cache built from `config.cache`.
    pub fn with_config(config: EngineConfig) -> Self {
        let cache = Arc::new(PatternCache::with_config(config.cache.clone()));
        Self::with_cache(config, cache)
    }

    /// Create an engine around an existing, possibly shared, cache.
    ///
    /// The cache keeps its own capacity; `config.cache` is ignored. Engines
    /// with different `config.compile` options may share a cache: entries
    /// are keyed by options as well as pattern.
    pub fn with_cache(config: EngineConfig, cache: Arc<PatternCache>) -> Self {
        Self {
            compiler: PatternCompiler::with_options(config.compile.clone()),
            cache,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<PatternCache> {
        &self.cache
    }

    pub fn compiler(&self) -> &PatternCompiler {
        &self.compiler
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Fetch or compile the matcher for `pattern`.
    pub fn matcher(&self, pattern: &str) -> Result<Arc<CompiledMatcher>> {
        self.cache.get_or_compile(pattern, &self.compiler)
    }

    /// Extract the selected group of the leftmost match of `pattern`.
    ///
    /// `group` defaults to 0, the whole match.
    ///
    /// # Returns
    /// * `Ok(Some(text))` - the group matched
    /// * `Ok(None)` - no match, or the group did not participate
    /// * `Err(CompileError)` - the pattern is invalid
    /// * `Err(SelectorError)` - the pattern has no such group
    pub fn extract(
        &self,
        pattern: &str,
        subject: &str,
        group: Option<i64>,
    ) -> Result<Option<String>> {
        let matcher = self.matcher(pattern)?;
        let index = resolve_selector(&matcher, group)?;
        Ok(extract_index(&matcher, subject, index).map(str::to_string))
    }

    /// Leftmost match of `pattern` with every group's span.
    pub fn captures(&self, pattern: &str, subject: &str) -> Result<Option<Match>> {
        Ok(self.matcher(pattern)?.captures(subject))
    }

    /// Extract from a column of subjects with one pattern.
    ///
    /// The pattern is compiled and the selector validated once for the
    /// whole batch. `None` subjects produce `None`. Output order matches
    /// input order and every element equals what [`extract`](Self::extract)
    /// returns for that row.
    pub fn extract_batch(
        &self,
        pattern: &str,
        subjects: &[Option<&str>],
        group: Option<i64>,
    ) -> Result<Vec<Option<String>>> {
        let matcher = self.matcher(pattern)?;
        let index = resolve_selector(&matcher, group)?;

        let extract_row = |subject: &Option<&str>| {
            subject.and_then(|s| extract_index(&matcher, s, index).map(str::to_string))
        };

        let parallel = self.config.parallel.enabled
            && subjects.len() >= self.config.parallel.min_batch_size_for_parallelism;

        let results: Vec<Option<String>> = if parallel {
            subjects.par_iter().map(extract_row).collect()
        } else {
            subjects.iter().map(extract_row).collect()
        };
        Ok(results)
    }
}

impl Default for RegexExtractEngine {
    fn default() -> Self {
        Self::new()
    }
}
