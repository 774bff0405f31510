//! Pattern compilation.
//!
//! This module turns a pattern string into a [`CompiledMatcher`]. Syntax
//! follows the `regex` crate: literals, character classes, alternation,
//! groups, the `*`, `+`, `?` and `{m,n}` repetitions, and anchors.
//!
//! Compilation is deterministic: the same pattern under the same
//! [`CompileOptions`] always yields an equivalent matcher. The cache relies
//! on this to stay invisible to callers.
//!
//! ## Example
//!
//! ```rust
//! use regex_extract::PatternCompiler;
//!
//! let compiler = PatternCompiler::new();
//! let matcher = compiler.compile("x(ab)")?;
//! assert_eq!(matcher.group_count(), 1);
//! # Ok::<(), regex_extract::ExtractError>(())
//! ```

use crate::error::{ExtractError, Result};
use crate::matcher::CompiledMatcher;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

/// Options applied to every pattern a compiler builds.
///
/// Options are fixed per compiler. A cache entry is identified by the
/// options together with the pattern string, so engines with different
/// options can share one cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Approximate size limit of the compiled program, in bytes
    pub size_limit: usize,

    /// Approximate size limit of the lazy DFA cache, in bytes
    pub dfa_size_limit: usize,

    /// Maximum nesting depth of the parsed pattern
    pub nest_limit: u32,

    /// Match letters regardless of case
    pub case_insensitive: bool,

    /// `^` and `$` match at line boundaries
    pub multi_line: bool,

    /// `.` also matches `\n`
    pub dot_matches_new_line: bool,

    /// Swap the meaning of greedy and lazy repetition
    pub swap_greed: bool,

    /// Unicode-aware classes and case folding
    pub unicode: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            size_limit: 10 * (1 << 20),
            dfa_size_limit: 2 * (1 << 20),
            nest_limit: 250,
            case_insensitive: false,
            multi_line: false,
            dot_matches_new_line: false,
            swap_greed: false,
            unicode: true,
        }
    }
}

/// Compiles pattern strings into immutable matchers.
#[derive(Debug, Clone, Default)]
pub struct PatternCompiler {
    options: CompileOptions,
}

impl PatternCompiler {
    /// Create a compiler with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a compiler with custom options.
    pub fn with_options(options: CompileOptions) -> Self {
        Self { options }
    }

    /// Options used for every compilation.
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile a pattern.
    ///
    /// # Errors
    /// Returns [`ExtractError::CompileError`] carrying the offending pattern
    /// and the parser's reason (unbalanced parentheses, invalid escape,
    /// invalid repetition bound, exceeded size limit, ...).
    pub fn compile(&self, pattern: &str) -> Result<CompiledMatcher> {
        let regex = RegexBuilder::new(pattern)
            .size_limit(self.options.size_limit)
            .dfa_size_limit(self.options.dfa_size_limit)
            .nest_limit(self.options.nest_limit)
            .case_insensitive(self.options.case_insensitive)
            .multi_line(self.options.multi_line)
            .dot_matches_new_line(self.options.dot_matches_new_line)
            .swap_greed(self.options.swap_greed)
            .unicode(self.options.unicode)
            .build()
            .map_err(|e| ExtractError::compile(pattern, &e))?;

        let matcher = CompiledMatcher::new(pattern, regex, self.options.clone());
        log::debug!(
            "compiled pattern '{}' with {} capture group(s)",
            pattern,
            matcher.group_count()
        );
        Ok(matcher)
    }
}
