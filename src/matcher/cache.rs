//! Bounded pattern cache shared by extraction calls.
//!
//! Row-by-row query evaluation calls the extractor with the same pattern
//! string over and over. The cache maps each pattern string, under the
//! compile options in effect, to one shared [`CompiledMatcher`] so the
//! pattern is compiled once, not once per row.
//!
//! Caching never changes results: a miss compiles exactly what a hit would
//! have returned.

use crate::compiler::{CompileOptions, PatternCompiler};
use crate::error::Result;
use crate::matcher::compiled::CompiledMatcher;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Cache configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of patterns to retain; 0 disables retention
    pub max_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_size: 1000 }
    }
}

/// Cache performance statistics.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Total cache lookups
    pub total_lookups: usize,

    /// Lookups that found an existing entry
    pub hits: usize,

    /// Lookups that had to create an entry
    pub misses: usize,

    /// Pattern compilations actually performed
    pub compilations: usize,

    /// Entries evicted to stay within capacity
    pub evictions: usize,

    /// Entries currently retained
    pub size: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache.
    pub fn hit_ratio(&self) -> f64 {
        if self.total_lookups == 0 {
            return 0.0;
        }
        self.hits as f64 / self.total_lookups as f64
    }
}

/// One cache entry.
///
/// The slot is inserted before its matcher exists; every caller waits on
/// the same `OnceLock`, so a pattern is compiled exactly once no matter how
/// many callers race on it, and nobody sees a partially built matcher.
#[derive(Debug)]
struct CacheSlot {
    cell: OnceLock<Result<Arc<CompiledMatcher>>>,
    last_used: AtomicU64,
}

impl CacheSlot {
    fn ready(matcher: Arc<CompiledMatcher>, tick: u64) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(Ok(matcher));
        Self {
            cell,
            last_used: AtomicU64::new(tick),
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    total_lookups: AtomicUsize,
    hits: AtomicUsize,
    misses: AtomicUsize,
    compilations: AtomicUsize,
    evictions: AtomicUsize,
}

/// Thread-safe, bounded, least-recently-used pattern cache.
///
/// # Thread Safety
/// The map sits behind an `RwLock`. Hits only take the read lock and bump
/// an atomic recency tick; the write lock is held just long enough to
/// insert an empty slot or evict. Compilation itself runs outside the map
/// lock, so a slow pattern does not stall lookups of other patterns.
///
/// # Example
/// ```rust
/// use regex_extract::{CacheConfig, PatternCache, PatternCompiler};
///
/// let cache = PatternCache::with_config(CacheConfig { max_size: 16 });
/// let compiler = PatternCompiler::new();
///
/// let first = cache.get_or_compile("x(ab)", &compiler)?;
/// let second = cache.get_or_compile("x(ab)", &compiler)?;
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// assert_eq!(cache.stats().compilations, 1);
/// # Ok::<(), regex_extract::ExtractError>(())
/// ```
#[derive(Debug)]
pub struct PatternCache {
    table: RwLock<Table>,
    config: CacheConfig,
    clock: AtomicU64,
    counters: Counters,
}

/// Entries for one set of compile options, keyed by pattern string.
type Entries = HashMap<Arc<str>, Arc<CacheSlot>>;

/// Option sets in use, each with its own entries. Lookups by `&str` stay
/// allocation free because the pattern is the inner key.
type Table = HashMap<CompileOptions, Entries>;

impl PatternCache {
    /// Create a cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Create a cache with custom configuration.
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            table: RwLock::new(HashMap::new()),
            config,
            clock: AtomicU64::new(0),
            counters: Counters::default(),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Fetch the matcher for `pattern` under the compiler's options,
    /// compiling it on first use.
    ///
    /// Entries are keyed by options and pattern together, so compilers with
    /// different options never see each other's matchers.
    ///
    /// # Errors
    /// Returns the compile error if the pattern is invalid. Failed patterns
    /// are not retained, so a later call reports the same error again.
    pub fn get_or_compile(
        &self,
        pattern: &str,
        compiler: &PatternCompiler,
    ) -> Result<Arc<CompiledMatcher>> {
        self.counters.total_lookups.fetch_add(1, Ordering::Relaxed);

        if self.config.max_size == 0 {
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
            self.counters.compilations.fetch_add(1, Ordering::Relaxed);
            return compiler.compile(pattern).map(Arc::new);
        }

        let options = compiler.options();
        let slot = self.slot_for(options, pattern);
        slot.last_used.store(self.tick(), Ordering::Relaxed);

        let result = slot
            .cell
            .get_or_init(|| {
                self.counters.compilations.fetch_add(1, Ordering::Relaxed);
                compiler.compile(pattern).map(Arc::new)
            })
            .clone();

        if result.is_err() {
            let mut table = self.write_table();
            if let Some(entries) = table.get_mut(options) {
                if entries
                    .get(pattern)
                    .is_some_and(|current| Arc::ptr_eq(current, &slot))
                {
                    entries.remove(pattern);
                }
                if entries.is_empty() {
                    table.remove(options);
                }
            }
        }

        result
    }

    /// Insert an already compiled matcher, replacing any entry for its
    /// pattern and options.
    pub fn insert(&self, matcher: CompiledMatcher) -> Arc<CompiledMatcher> {
        let matcher = Arc::new(matcher);
        if self.config.max_size == 0 {
            return matcher;
        }

        let slot = Arc::new(CacheSlot::ready(matcher.clone(), self.tick()));
        let mut table = self.write_table();
        let present = table
            .get(matcher.options())
            .is_some_and(|entries| entries.contains_key(matcher.pattern()));
        if !present {
            self.make_room(&mut table);
        }
        table
            .entry(matcher.options().clone())
            .or_default()
            .insert(matcher.pattern().into(), slot);
        matcher
    }

    /// Compile and retain a set of patterns ahead of evaluation.
    pub fn precompile(&self, patterns: &[&str], compiler: &PatternCompiler) -> Result<()> {
        for &pattern in patterns {
            self.get_or_compile(pattern, compiler)?;
        }
        Ok(())
    }

    /// Whether a pattern is currently retained under any options.
    pub fn contains(&self, pattern: &str) -> bool {
        self.read_table()
            .values()
            .any(|entries| entries.contains_key(pattern))
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        entry_count(&self.read_table())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics for monitoring.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_lookups: self.counters.total_lookups.load(Ordering::Relaxed),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            compilations: self.counters.compilations.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            size: self.len(),
        }
    }

    pub fn hit_ratio(&self) -> f64 {
        self.stats().hit_ratio()
    }

    /// Drop every entry and reset statistics.
    pub fn clear(&self) {
        self.write_table().clear();
        self.counters.total_lookups.store(0, Ordering::Relaxed);
        self.counters.hits.store(0, Ordering::Relaxed);
        self.counters.misses.store(0, Ordering::Relaxed);
        self.counters.compilations.store(0, Ordering::Relaxed);
        self.counters.evictions.store(0, Ordering::Relaxed);
    }

    fn slot_for(&self, options: &CompileOptions, pattern: &str) -> Arc<CacheSlot> {
        if let Some(slot) = lookup(&self.read_table(), options, pattern) {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            return slot;
        }

        let mut table = self.write_table();
        // Another caller may have inserted it between the two locks
        if let Some(slot) = lookup(&table, options, pattern) {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            return slot;
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        self.make_room(&mut table);
        let slot = Arc::new(CacheSlot {
            cell: OnceLock::new(),
            last_used: AtomicU64::new(self.tick()),
        });
        table
            .entry(options.clone())
            .or_default()
            .insert(pattern.into(), slot.clone());
        slot
    }

    /// Evict least recently used entries until one more fits.
    fn make_room(&self, table: &mut Table) {
        while entry_count(table) >= self.config.max_size {
            let oldest = table
                .iter()
                .flat_map(|(options, entries)| {
                    entries.iter().map(move |(pattern, slot)| {
                        (options, pattern, slot.last_used.load(Ordering::Relaxed))
                    })
                })
                .min_by_key(|&(_, _, last_used)| last_used)
                .map(|(options, pattern, _)| (options.clone(), pattern.clone()));

            let Some((options, pattern)) = oldest else { break };
            if let Some(entries) = table.get_mut(&options) {
                entries.remove(&pattern);
                if entries.is_empty() {
                    table.remove(&options);
                }
            }
            self.counters.evictions.fetch_add(1, Ordering::Relaxed);
            log::debug!("evicted pattern '{}' from cache", pattern);
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn read_table(&self) -> RwLockReadGuard<'_, Table> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_table(&self) -> RwLockWriteGuard<'_, Table> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn lookup(table: &Table, options: &CompileOptions, pattern: &str) -> Option<Arc<CacheSlot>> {
    table.get(options)?.get(pattern).cloned()
}

fn entry_count(table: &Table) -> usize {
    table.values().map(HashMap::len).sum()
}

impl Default for PatternCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;

    fn cache_with_size(max_size: usize) -> PatternCache {
        PatternCache::with_config(CacheConfig { max_size })
    }

    #[test]
    fn test_cache_basic_functionality() {
        let cache = PatternCache::new();
        let compiler = PatternCompiler::new();

        let matcher1 = cache.get_or_compile("test", &compiler).unwrap();
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.compilations, 1);

        let matcher2 = cache.get_or_compile("test", &compiler).unwrap();
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.compilations, 1);
        assert_eq!(stats.total_lookups, 2);
        assert_eq!(stats.size, 1);

        assert!(Arc::ptr_eq(&matcher1, &matcher2));
        assert!((cache.hit_ratio() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cache_eviction() {
        let cache = cache_with_size(3);
        let compiler = PatternCompiler::new();

        for pattern in ["pattern1", "pattern2", "pattern3", "pattern4"] {
            cache.get_or_compile(pattern, &compiler).unwrap();
        }

        let stats = cache.stats();
        assert_eq!(stats.evictions, 1);
        assert_eq!(cache.len(), 3);
        assert!(!cache.contains("pattern1"));
        assert!(cache.contains("pattern4"));
    }

    #[test]
    fn test_eviction_is_least_recently_used() {
        let cache = cache_with_size(2);
        let compiler = PatternCompiler::new();

        cache.get_or_compile("a", &compiler).unwrap();
        cache.get_or_compile("b", &compiler).unwrap();
        // Touch "a" so "b" becomes the oldest
        cache.get_or_compile("a", &compiler).unwrap();
        cache.get_or_compile("c", &compiler).unwrap();

        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn test_evicted_pattern_recompiles_identically() {
        let cache = cache_with_size(1);
        let compiler = PatternCompiler::new();

        let before = cache.get_or_compile("x(ab)", &compiler).unwrap();
        cache.get_or_compile("other", &compiler).unwrap();
        let after = cache.get_or_compile("x(ab)", &compiler).unwrap();

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(before.captures("xxabaa"), after.captures("xxabaa"));
        assert_eq!(cache.stats().compilations, 3);
    }

    #[test]
    fn test_compile_errors_are_not_retained() {
        let cache = PatternCache::new();
        let compiler = PatternCompiler::new();

        let first = cache.get_or_compile("(unclosed", &compiler).unwrap_err();
        assert!(matches!(first, ExtractError::CompileError { .. }));
        assert!(!cache.contains("(unclosed"));

        let second = cache.get_or_compile("(unclosed", &compiler).unwrap_err();
        assert_eq!(first, second);
        assert_eq!(cache.stats().compilations, 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_capacity_disables_retention() {
        let cache = cache_with_size(0);
        let compiler = PatternCompiler::new();

        cache.get_or_compile("abc", &compiler).unwrap();
        cache.get_or_compile("abc", &compiler).unwrap();

        assert!(cache.is_empty());
        assert_eq!(cache.stats().compilations, 2);
        assert_eq!(cache.stats().hits, 0);
    }

    #[test]
    fn test_insert_preseeds_cache() {
        let cache = PatternCache::new();
        let compiler = PatternCompiler::new();

        let seeded = cache.insert(compiler.compile("[Cc]at").unwrap());
        let fetched = cache.get_or_compile("[Cc]at", &compiler).unwrap();

        assert!(Arc::ptr_eq(&seeded, &fetched));
        assert_eq!(cache.stats().compilations, 0);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_precompile_and_clear() {
        let cache = PatternCache::new();
        let compiler = PatternCompiler::new();

        cache.precompile(&["a", "b", "c"], &compiler).unwrap();
        assert_eq!(cache.len(), 3);

        assert!(cache.precompile(&["d", "(bad"], &compiler).is_err());
        assert!(cache.contains("d"));

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn test_options_are_part_of_the_key() {
        let cache = PatternCache::new();
        let sensitive = PatternCompiler::new();
        let insensitive = PatternCompiler::with_options(CompileOptions {
            case_insensitive: true,
            ..CompileOptions::default()
        });

        let folded = cache.get_or_compile("cat", &insensitive).unwrap();
        let exact = cache.get_or_compile("cat", &sensitive).unwrap();

        assert!(!Arc::ptr_eq(&folded, &exact));
        assert!(folded.is_match("CAT"));
        assert!(!exact.is_match("CAT"));
        assert_eq!(exact.options(), sensitive.options());
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().compilations, 2);

        let again = cache.get_or_compile("cat", &sensitive).unwrap();
        assert!(Arc::ptr_eq(&exact, &again));
    }

    #[test]
    fn test_eviction_spans_option_sets() {
        let cache = cache_with_size(2);
        let sensitive = PatternCompiler::new();
        let insensitive = PatternCompiler::with_options(CompileOptions {
            case_insensitive: true,
            ..CompileOptions::default()
        });

        cache.get_or_compile("a", &sensitive).unwrap();
        cache.get_or_compile("a", &insensitive).unwrap();
        cache.get_or_compile("b", &insensitive).unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().evictions, 1);
        // The insensitive "a" is still retained
        assert!(cache.contains("a"));
        assert!(cache.contains("b"));
    }

    #[test]
    fn test_hit_ratio_empty() {
        assert_eq!(PatternCache::new().hit_ratio(), 0.0);
    }
}
