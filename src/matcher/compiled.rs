//! Compiled matcher shared across extraction calls.

use crate::compiler::CompileOptions;
use crate::matcher::types::{Match, Span};
use regex::Regex;
use std::sync::Arc;

/// Immutable executable form of a pattern.
///
/// A `CompiledMatcher` is created once per pattern string, then shared
/// read-only (usually as `Arc<CompiledMatcher>`) by every caller that uses
/// the same pattern. `Regex` keeps its scratch space in an internal pool, so
/// concurrent searches need no outside locking.
///
/// # Example
/// ```rust
/// use regex_extract::PatternCompiler;
///
/// let matcher = PatternCompiler::new().compile("g(oog)+le")?;
/// let m = matcher.captures("googoogoogle").unwrap();
/// assert_eq!(m.span.start, 0);
/// assert_eq!(m.group(1).unwrap().slice("googoogoogle"), "oog");
/// # Ok::<(), regex_extract::ExtractError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CompiledMatcher {
    /// Source pattern
    pattern: Arc<str>,

    /// Options the pattern was compiled under; with `pattern`, the cache key
    options: CompileOptions,

    /// Compiled program
    regex: Regex,

    /// Declared capture groups, excluding group 0
    group_count: usize,
}

impl CompiledMatcher {
    pub(crate) fn new(pattern: &str, regex: Regex, options: CompileOptions) -> Self {
        let group_count = regex.captures_len().saturating_sub(1);
        Self {
            pattern: pattern.into(),
            options,
            regex,
            group_count,
        }
    }

    /// The pattern this matcher was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Number of capture groups the pattern declares.
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    /// Names of the declared groups, indexed like [`Match::group`].
    pub fn group_names(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.regex.capture_names()
    }

    /// Index of a named group, if the pattern declares it.
    pub fn group_index(&self, name: &str) -> Option<usize> {
        self.regex.capture_names().position(|n| n == Some(name))
    }

    /// Whether the pattern matches anywhere in `subject`.
    pub fn is_match(&self, subject: &str) -> bool {
        self.regex.is_match(subject)
    }

    /// Find the leftmost match and record every group's span.
    ///
    /// A group inside a repetition reports the span of its last iteration.
    pub fn captures(&self, subject: &str) -> Option<Match> {
        let caps = self.regex.captures(subject)?;
        let span = Span::from(caps.get(0)?);
        let groups = (1..=self.group_count)
            .map(|i| caps.get(i).map(Span::from))
            .collect();
        Some(Match { span, groups })
    }

    /// Find the leftmost match and return only its overall span.
    ///
    /// Cheaper than [`captures`](Self::captures) when no group is needed.
    pub fn find(&self, subject: &str) -> Option<Span> {
        self.regex.find(subject).map(Span::from)
    }

    /// Find the leftmost match and return the span of group `index`.
    pub(crate) fn group_span(&self, subject: &str, index: usize) -> Option<Span> {
        if index == 0 {
            return self.find(subject);
        }
        let mut locs = self.regex.capture_locations();
        self.regex.captures_read(&mut locs, subject)?;
        locs.get(index).map(|(start, end)| Span::new(start, end))
    }
}
