//! Match result types.

use std::ops::Range;

/// Half-open byte range `start..end` into a subject.
///
/// Offsets always fall on UTF-8 codepoint boundaries, so slicing the
/// subject with a span never splits a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Slice `subject` with this span.
    ///
    /// `subject` must be the text the span was produced from.
    ///
    /// # Panics
    /// Panics if the span runs past the end of `subject` or does not fall
    /// on codepoint boundaries, which can only happen when it came from a
    /// different string.
    pub fn slice<'s>(&self, subject: &'s str) -> &'s str {
        &subject[self.range()]
    }

    /// Convert byte offsets to codepoint offsets within `subject`.
    ///
    /// # Panics
    /// Same conditions as [`slice`](Self::slice).
    pub fn char_span(&self, subject: &str) -> Span {
        let start = subject[..self.start].chars().count();
        let len = subject[self.range()].chars().count();
        Span::new(start, start + len)
    }
}

impl From<regex::Match<'_>> for Span {
    fn from(m: regex::Match<'_>) -> Self {
        Span::new(m.start(), m.end())
    }
}

/// A successful match: the overall span plus one slot per declared group.
///
/// Group 0 is the overall span and is never stored in `groups`; group `k`
/// lives at `groups[k - 1]`. A `None` slot means the group did not take
/// part in this match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub span: Span,
    pub groups: Vec<Option<Span>>,
}

impl Match {
    /// Number of declared capture groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Span of group `index`, where 0 is the whole match.
    ///
    /// Returns `None` when the group did not participate or does not exist.
    pub fn group(&self, index: usize) -> Option<Span> {
        match index {
            0 => Some(self.span),
            k => self.groups.get(k - 1).copied().flatten(),
        }
    }

    /// Whether group `index` took part in the match.
    pub fn participated(&self, index: usize) -> bool {
        self.group(index).is_some()
    }
}
