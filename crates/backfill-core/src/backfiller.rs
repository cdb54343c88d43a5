//! Argument backfiller
//!
//! Pure queries over one invocation's argument list: which rules are
//! missing, and where a rule's text would go. Nothing here mutates the
//! buffer.

use crate::error::{BackfillError, BackfillResult};
use crate::rule::InsertionRule;
use crate::span::{contains_key, find_key, InvocationSpan};

/// Whether `key:` occurs anywhere in the span's argument list
///
/// A plain substring check at an identifier boundary. Quotes, comments and
/// nested invocations are not looked into, so a key that appears in any of
/// them counts as present. Over-reporting presence only ever skips an
/// insertion; it never duplicates a key.
#[inline]
#[must_use]
pub fn is_present(buffer: &str, span: &InvocationSpan, key: &str) -> bool {
    contains_key(span.args_text(buffer), key)
}

/// Rules whose required key is absent, in caller order
#[must_use]
pub fn missing_rules<'r>(
    buffer: &str,
    span: &InvocationSpan,
    rules: &'r [InsertionRule],
) -> Vec<&'r InsertionRule> {
    rules
        .iter()
        .filter(|rule| !is_present(buffer, span, &rule.required_key))
        .collect()
}

/// Offset right after the separator that ends the anchor's value
///
/// The first anchor occurrence whose value is terminated by a comma wins.
/// The value scan tracks bracket depth and skips quoted text, so commas in
/// nested calls, collections or string values do not end it.
///
/// # Errors
/// Returns [`BackfillError::AnchorNotFound`] if no occurrence of the anchor
/// has a terminated value inside the span
pub fn insertion_point(
    buffer: &str,
    span: &InvocationSpan,
    rule: &InsertionRule,
) -> BackfillResult<usize> {
    let args = span.args_text(buffer);
    let key = rule.anchor_key.as_str();
    let mut from = 0;
    while let Some(rel) = find_key(&args[from..], key) {
        let key_at = from + rel;
        // find_key guarantees a colon follows the key
        let colon = key_at + args[key_at..].find(':').unwrap_or(key.len());
        if let Some(end) = value_end(&args[colon + 1..]) {
            return Ok(span.args_start + colon + 1 + end);
        }
        from = key_at + key.len();
    }
    Err(BackfillError::anchor_not_found(&rule.anchor_key, &rule.required_key))
}

/// Leading whitespace of the line containing `offset`
#[must_use]
pub fn line_indent(buffer: &str, offset: usize) -> &str {
    let line_start = buffer[..offset].rfind('\n').map_or(0, |nl| nl + 1);
    let line = &buffer[line_start..];
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

/// Offset just past the first depth-0 comma of a value, if any
fn value_end(value: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in value.char_indices() {
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
            ')' | ']' | '}' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => return Some(i + 1),
            _ => {}
        }
    }
    None
}
