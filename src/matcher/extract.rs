//! Group selection and substring extraction.
//!
//! The outcome of an extraction is three-way:
//! - `Ok(Some(text))` - the selected group matched
//! - `Ok(None)` - no match, or the group did not take part in the match
//! - `Err(SelectorError)` - the pattern has no such group
//!
//! The selector is checked against the pattern before the subject is
//! searched, so an invalid selector fails the same way whether or not the
//! subject matches.

use crate::error::{ExtractError, Result};
use crate::matcher::compiled::CompiledMatcher;

/// Resolve an optional host selector into a validated group index.
///
/// `None` selects the whole match, like an explicit 0.
pub fn resolve_selector(matcher: &CompiledMatcher, selector: Option<i64>) -> Result<usize> {
    let group = selector.unwrap_or(0);
    match usize::try_from(group) {
        Ok(index) if index <= matcher.group_count() => Ok(index),
        _ => Err(ExtractError::SelectorError {
            group,
            group_count: matcher.group_count(),
        }),
    }
}

/// Extract the selected group of the leftmost match.
///
/// # Example
/// ```rust
/// use regex_extract::{extract, PatternCompiler};
///
/// let matcher = PatternCompiler::new().compile("x(ab)")?;
/// assert_eq!(extract(&matcher, "xxabaa", None)?, Some("xab"));
/// assert_eq!(extract(&matcher, "xxabaa", Some(1))?, Some("ab"));
/// assert_eq!(extract(&matcher, "yyy", Some(1))?, None);
/// assert!(extract(&matcher, "xxabaa", Some(2)).is_err());
/// # Ok::<(), regex_extract::ExtractError>(())
/// ```
pub fn extract<'s>(
    matcher: &CompiledMatcher,
    subject: &'s str,
    selector: Option<i64>,
) -> Result<Option<&'s str>> {
    let index = resolve_selector(matcher, selector)?;
    Ok(extract_index(matcher, subject, index))
}

/// Extract with an already validated group index.
pub(crate) fn extract_index<'s>(
    matcher: &CompiledMatcher,
    subject: &'s str,
    index: usize,
) -> Option<&'s str> {
    matcher
        .group_span(subject, index)
        .map(|span| span.slice(subject))
}
