//! Byte spans over a source buffer
//!
//! Provides [`InvocationSpan`] for addressing one located invocation,
//! [`Delimiters`] for the argument-list bracket pair, and [`LineIndex`] for
//! turning byte offsets into line/column positions.
//!
//! Every offset here is only meaningful until the buffer is next mutated.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::ops::Range;

/// One located invocation
///
/// `construct_start` is the first byte of the construct name. The argument
/// list is the half-open range `[args_start, args_end)`: `args_start` is the
/// byte right after the open delimiter, `args_end` is the close delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InvocationSpan {
    /// First byte of the construct name
    pub construct_start: usize,
    /// First byte of the argument list
    pub args_start: usize,
    /// Offset of the matching close delimiter
    pub args_end: usize,
}

impl InvocationSpan {
    /// Create new span
    #[inline]
    #[must_use]
    pub fn new(construct_start: usize, args_start: usize, args_end: usize) -> Self {
        debug_assert!(construct_start < args_start && args_start <= args_end);
        Self {
            construct_start,
            args_start,
            args_end,
        }
    }

    /// Offset of the open delimiter
    #[inline]
    #[must_use]
    pub fn open_offset(&self) -> usize {
        self.args_start - 1
    }

    /// Argument list range
    #[inline]
    #[must_use]
    pub fn args(&self) -> Range<usize> {
        self.args_start..self.args_end
    }

    /// Argument list text
    #[inline]
    #[must_use]
    pub fn args_text<'a>(&self, buffer: &'a str) -> &'a str {
        &buffer[self.args()]
    }

    /// Whole invocation range, name through close delimiter inclusive
    #[inline]
    #[must_use]
    pub fn full(&self) -> Range<usize> {
        self.construct_start..self.args_end + 1
    }

    /// Check if `other` lies entirely inside this span's argument list
    #[inline]
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        other.construct_start >= self.args_start && other.args_end < self.args_end
    }
}

impl Display for InvocationSpan {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.construct_start, self.args_end + 1)
    }
}

/// Argument list bracket pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Delimiters {
    /// Opening character
    pub open: char,
    /// Closing character
    pub close: char,
}

impl Delimiters {
    /// Parentheses, the usual call syntax
    pub const PARENS: Self = Self {
        open: '(',
        close: ')',
    };

    /// Create custom pair
    #[inline]
    #[must_use]
    pub fn new(open: char, close: char) -> Self {
        Self { open, close }
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::PARENS
    }
}

/// Byte offset to 1-based line/column lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Build index over a buffer
    #[must_use]
    pub fn new(buffer: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            buffer
                .bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { line_starts }
    }

    /// Number of lines
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Line and column (both 1-based, column in bytes) of an offset
    #[must_use]
    pub fn position(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next - 1,
        };
        (line + 1, offset - self.line_starts[line] + 1)
    }
}

/// Identifier character test shared by the scanners
#[inline]
pub(crate) fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// True if the byte before `offset` cannot continue an identifier
#[inline]
pub(crate) fn at_ident_boundary(buffer: &str, offset: usize) -> bool {
    offset == 0 || !is_ident_byte(buffer.as_bytes()[offset - 1])
}

/// Whether `name` is a non-empty run of identifier characters
///
/// `extra` lists further characters allowed, e.g. `.` for qualified names.
pub(crate) fn is_identifier_like(name: &str, extra: &[char]) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '$' || extra.contains(&c))
}

/// Whether `key:` occurs anywhere in `text` at an identifier boundary
///
/// Plain substring search: quotes, comments and nesting are not tracked.
/// Spaces between the key and the colon are allowed.
pub(crate) fn contains_key(text: &str, key: &str) -> bool {
    if key.is_empty() {
        return false;
    }
    let bytes = text.as_bytes();
    text.match_indices(key).any(|(at, _)| {
        let mut after = at + key.len();
        while matches!(bytes.get(after), Some(b' ' | b'\t')) {
            after += 1;
        }
        at_ident_boundary(text, at) && bytes.get(after) == Some(&b':')
    })
}

/// Offset of the first anchorable `key:` in an argument list
///
/// Anchorable means at an identifier boundary, outside quoted text, and at
/// bracket depth 0 of `text`, so keys of nested calls or collections do not
/// count. Spaces between the key and the colon are allowed.
pub(crate) fn find_key(text: &str, key: &str) -> Option<usize> {
    if key.is_empty() {
        return None;
    }
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ if depth == 0 && text[i..].starts_with(key) && at_ident_boundary(text, i) => {
                let mut after = i + key.len();
                while matches!(bytes.get(after), Some(b' ' | b'\t')) {
                    after += 1;
                }
                if bytes.get(after) == Some(&b':') {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
