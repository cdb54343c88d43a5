//! Invocation locator
//!
//! Finds every `Name(` in a buffer and pairs its open delimiter with the
//! matching close delimiter by depth counting. No grammar is involved:
//! delimiters inside string or character literals are counted like any
//! other.

use crate::error::{BackfillError, BackfillResult};
use crate::span::{at_ident_boundary, Delimiters, InvocationSpan};

/// Scanner for invocations of one construct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    construct: String,
    delimiters: Delimiters,
}

impl Locator {
    /// Create locator with parentheses
    #[inline]
    #[must_use]
    pub fn new(construct: impl Into<String>) -> Self {
        Self::with_delimiters(construct, Delimiters::default())
    }

    /// Create locator with a custom bracket pair
    #[inline]
    #[must_use]
    pub fn with_delimiters(construct: impl Into<String>, delimiters: Delimiters) -> Self {
        Self {
            construct: construct.into(),
            delimiters,
        }
    }

    /// Construct name being located
    #[inline]
    #[must_use]
    pub fn construct(&self) -> &str {
        &self.construct
    }

    /// Bracket pair in use
    #[inline]
    #[must_use]
    pub fn delimiters(&self) -> Delimiters {
        self.delimiters
    }

    /// Lazily iterate invocations in ascending offset order
    ///
    /// Nested invocations are yielded too, after their enclosing one.
    /// The iterator stops after the first error.
    #[must_use]
    pub fn locate<'a>(&'a self, buffer: &'a str) -> Invocations<'a> {
        Invocations {
            locator: self,
            buffer,
            cursor: 0,
            done: self.construct.is_empty(),
        }
    }

    /// Collect all spans, failing on the first unbalanced one
    ///
    /// # Errors
    /// Returns [`BackfillError::UnbalancedDelimiters`] if any invocation
    /// never closes
    pub fn locate_all(&self, buffer: &str) -> BackfillResult<Vec<InvocationSpan>> {
        self.locate(buffer).collect()
    }

    /// Re-measure a span after its argument list was edited
    ///
    /// Only `args_end` can move, since edits happen inside the list.
    ///
    /// # Errors
    /// Returns [`BackfillError::UnbalancedDelimiters`] if the list no longer closes
    pub fn rescan(&self, buffer: &str, span: InvocationSpan) -> BackfillResult<InvocationSpan> {
        let args_end = self.matching_close(buffer, span.open_offset())?;
        Ok(InvocationSpan::new(
            span.construct_start,
            span.args_start,
            args_end,
        ))
    }

    /// Offset of the close delimiter matching the open one at `open_offset`
    fn matching_close(&self, buffer: &str, open_offset: usize) -> BackfillResult<usize> {
        let Delimiters { open, close } = self.delimiters;
        let body_start = open_offset + open.len_utf8();
        let mut depth = 1usize;
        for (i, c) in buffer[body_start..].char_indices() {
            if c == open {
                depth += 1;
            } else if c == close {
                depth -= 1;
                if depth == 0 {
                    return Ok(body_start + i);
                }
            }
        }
        Err(BackfillError::unbalanced(&self.construct, open_offset))
    }

    /// Open delimiter offset for a name occurrence at `at`, if it is a call
    fn open_after_name(&self, buffer: &str, at: usize) -> Option<usize> {
        if !at_ident_boundary(buffer, at) {
            return None;
        }
        let after = at + self.construct.len();
        let rest = &buffer[after..];
        let trimmed = rest.trim_start();
        trimmed
            .starts_with(self.delimiters.open)
            .then(|| after + (rest.len() - trimmed.len()))
    }
}

/// Lazy sequence of located invocations
///
/// Borrows the buffer, so it cannot outlive a mutation: re-locate after
/// every edit.
#[derive(Debug)]
pub struct Invocations<'a> {
    locator: &'a Locator,
    buffer: &'a str,
    cursor: usize,
    done: bool,
}

impl Iterator for Invocations<'_> {
    type Item = BackfillResult<InvocationSpan>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let name = self.locator.construct.as_str();
        while let Some(rel) = self.buffer[self.cursor..].find(name) {
            let at = self.cursor + rel;
            self.cursor = at + name.len();

            let Some(open_offset) = self.locator.open_after_name(self.buffer, at) else {
                continue;
            };
            return match self.locator.matching_close(self.buffer, open_offset) {
                Ok(args_end) => {
                    let span = InvocationSpan::new(
                        at,
                        open_offset + self.locator.delimiters.open.len_utf8(),
                        args_end,
                    );
                    tracing::trace!(construct = name, %span, "located invocation");
                    Some(Ok(span))
                }
                Err(err) => {
                    self.done = true;
                    Some(Err(err))
                }
            };
        }
        self.done = true;
        None
    }
}

impl std::iter::FusedIterator for Invocations<'_> {}

/// Locate all invocations of `construct` using parentheses
///
/// # Errors
/// Returns [`BackfillError::UnbalancedDelimiters`] if any invocation never closes
pub fn locate(buffer: &str, construct: &str) -> BackfillResult<Vec<InvocationSpan>> {
    Locator::new(construct).locate_all(buffer)
}
