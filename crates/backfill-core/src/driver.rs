//! Rewrite driver
//!
//! Orchestrates locate → backfill over a whole buffer.
//!
//! Invocations are rewritten right to left: an insertion only moves bytes
//! after it, so spans further left stay valid. Within one invocation the
//! span is re-measured after every insertion before the next rule is
//! checked.

use crate::backfiller::{insertion_point, is_present, line_indent, missing_rules};
use crate::error::{BackfillError, BackfillResult};
use crate::locator::Locator;
use crate::report::{Insertion, RewriteReport, SkippedRule};
use crate::rule::{validate_construct_name, IndentStyle, InsertionRule, RewriteOptions};
use crate::span::InvocationSpan;

/// Backfills one construct's invocations with an ordered rule list
///
/// # Invariants
/// - Construct name and every rule are validated on creation
/// - Rules are tried in list order; a rule may anchor on an earlier rule's key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewriter {
    locator: Locator,
    rules: Vec<InsertionRule>,
    options: RewriteOptions,
}

impl Rewriter {
    /// Create rewriter with default options
    ///
    /// # Errors
    /// Returns [`crate::BackfillError::InvalidInput`] for an empty or
    /// malformed construct name or an invalid rule
    pub fn new(construct: impl Into<String>, rules: Vec<InsertionRule>) -> BackfillResult<Self> {
        Self::with_options(construct, rules, RewriteOptions::default())
    }

    /// Create rewriter with explicit options
    ///
    /// # Errors
    /// Same as [`Rewriter::new`]
    pub fn with_options(
        construct: impl Into<String>,
        rules: Vec<InsertionRule>,
        options: RewriteOptions,
    ) -> BackfillResult<Self> {
        let construct = construct.into();
        validate_construct_name(&construct)?;
        for rule in &rules {
            rule.validate()?;
        }
        Ok(Self {
            locator: Locator::with_delimiters(construct, options.delimiters),
            rules,
            options,
        })
    }

    /// Construct being rewritten
    #[inline]
    #[must_use]
    pub fn construct(&self) -> &str {
        self.locator.construct()
    }

    /// Rules in application order
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &[InsertionRule] {
        &self.rules
    }

    /// Options in use
    #[inline]
    #[must_use]
    pub fn options(&self) -> RewriteOptions {
        self.options
    }

    /// Rewrite a buffer, returning the new text
    ///
    /// # Errors
    /// Returns [`crate::BackfillError::UnbalancedDelimiters`] if any
    /// invocation never closes; the input is left as it was
    pub fn apply(&self, buffer: &str) -> BackfillResult<String> {
        self.apply_with_report(buffer).map(|(text, _)| text)
    }

    /// Rewrite a buffer, returning the new text and what was done
    ///
    /// # Errors
    /// Same as [`Rewriter::apply`]
    pub fn apply_with_report(&self, buffer: &str) -> BackfillResult<(String, RewriteReport)> {
        let mut text = buffer.to_owned();
        let mut report = RewriteReport::new(self.construct());

        let spans = self.locator.locate_all(&text)?;
        report.invocations = spans.len();
        tracing::debug!(
            construct = self.construct(),
            invocations = spans.len(),
            rules = self.rules.len(),
            "rewriting buffer"
        );

        if self.rules.is_empty() {
            return Ok((text, report));
        }
        for span in spans.into_iter().rev() {
            self.backfill_invocation(&mut text, span, &mut report)?;
        }
        Ok((text, report))
    }

    /// Apply rules to one invocation until none is missing or all left are skipped
    fn backfill_invocation(
        &self,
        text: &mut String,
        span: InvocationSpan,
        report: &mut RewriteReport,
    ) -> BackfillResult<()> {
        let mut skipped: Vec<&InsertionRule> = Vec::new();
        loop {
            let current = self.locator.rescan(text, span)?;
            let next = missing_rules(text, &current, &self.rules)
                .into_iter()
                .find(|rule| !skipped.contains(rule));
            let Some(rule) = next else {
                return Ok(());
            };

            match insertion_point(text, &current, rule) {
                Ok(offset) => {
                    let indent = match self.options.indent {
                        IndentStyle::None => "",
                        IndentStyle::MatchAnchor => line_indent(text, offset),
                    };
                    let insert = rule.insertion_text(indent);
                    text.insert_str(offset, &insert);
                    // the next pass would pick the same rule forever
                    let grown = self.locator.rescan(text, span)?;
                    if !is_present(text, &grown, &rule.required_key) {
                        return Err(BackfillError::InvalidInput(format!(
                            "inserted key '{}' is not found again in the argument list",
                            rule.required_key
                        )));
                    }
                    tracing::debug!(
                        construct = self.construct(),
                        at = span.construct_start,
                        key = %rule.required_key,
                        offset,
                        "inserted argument"
                    );
                    report.insertions.push(Insertion {
                        construct_start: span.construct_start,
                        offset,
                        required_key: rule.required_key.clone(),
                    });
                }
                Err(err) if err.is_recoverable() => {
                    tracing::warn!(
                        construct = self.construct(),
                        at = span.construct_start,
                        "skipping rule: {err}"
                    );
                    report.skipped.push(SkippedRule {
                        construct_start: span.construct_start,
                        required_key: rule.required_key.clone(),
                        anchor_key: rule.anchor_key.clone(),
                    });
                    skipped.push(rule);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Backfill every `construct` invocation in `buffer`
///
/// # Errors
/// Returns [`crate::BackfillError::InvalidInput`] for bad arguments and
/// [`crate::BackfillError::UnbalancedDelimiters`] for malformed invocations
pub fn apply(buffer: &str, construct: &str, rules: &[InsertionRule]) -> BackfillResult<String> {
    Rewriter::new(construct, rules.to_vec())?.apply(buffer)
}

/// Like [`apply`], also returning the [`RewriteReport`]
///
/// # Errors
/// Same as [`apply`]
pub fn apply_with_report(
    buffer: &str,
    construct: &str,
    rules: &[InsertionRule],
) -> BackfillResult<(String, RewriteReport)> {
    Rewriter::new(construct, rules.to_vec())?.apply_with_report(buffer)
}
