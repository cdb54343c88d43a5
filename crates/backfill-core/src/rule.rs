//! Insertion rules and rewrite options

use crate::error::{BackfillError, BackfillResult};
use crate::span::{is_identifier_like, Delimiters};
use serde::{Deserialize, Serialize};

/// One required named argument
///
/// If `required_key` is absent from an invocation, `required_key: literal`
/// is inserted right after the separator that ends `anchor_key`'s value.
///
/// # Invariants
/// - All three fields are non-empty
/// - Both keys are identifier-like, so an inserted key is always found again
/// - `literal` is inserted verbatim; producing valid text is the caller's job
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InsertionRule {
    /// Key that must be present
    pub required_key: String,
    /// Key whose value the insertion follows
    pub anchor_key: String,
    /// Default value text
    pub literal: String,
}

impl InsertionRule {
    /// Create validated rule
    ///
    /// # Errors
    /// Returns [`BackfillError::InvalidInput`] if any field is empty or a key
    /// is not identifier-like
    pub fn new(
        required_key: impl Into<String>,
        anchor_key: impl Into<String>,
        literal: impl Into<String>,
    ) -> BackfillResult<Self> {
        let rule = Self {
            required_key: required_key.into(),
            anchor_key: anchor_key.into(),
            literal: literal.into(),
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Check field invariants
    ///
    /// # Errors
    /// Returns [`BackfillError::InvalidInput`] naming the first bad field
    pub fn validate(&self) -> BackfillResult<()> {
        for (field, value) in [
            ("required_key", &self.required_key),
            ("anchor_key", &self.anchor_key),
            ("literal", &self.literal),
        ] {
            if value.trim().is_empty() {
                return Err(BackfillError::InvalidInput(format!(
                    "rule field '{field}' must not be empty"
                )));
            }
        }
        for (field, value) in [
            ("required_key", &self.required_key),
            ("anchor_key", &self.anchor_key),
        ] {
            if !is_identifier_like(value, &[]) {
                return Err(BackfillError::InvalidInput(format!(
                    "rule field '{field}' ('{value}') is not identifier-like"
                )));
            }
        }
        Ok(())
    }

    /// Text spliced into the buffer for this rule
    ///
    /// `indent` is placed between the newline and the key.
    #[must_use]
    pub fn insertion_text(&self, indent: &str) -> String {
        format!("\n{indent}{}: {},", self.required_key, self.literal)
    }
}

/// Leading whitespace of inserted arguments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndentStyle {
    /// No indentation: `"\n" + key + ": " + literal + ","`
    #[default]
    None,
    /// Reuse the indentation of the anchor's line
    MatchAnchor,
}

/// Knobs for one rewrite
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Argument list bracket pair
    pub delimiters: Delimiters,
    /// Indentation of inserted arguments
    pub indent: IndentStyle,
}

impl RewriteOptions {
    /// Create default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With delimiter pair
    #[inline]
    #[must_use]
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// With indentation style
    #[inline]
    #[must_use]
    pub fn with_indent(mut self, indent: IndentStyle) -> Self {
        self.indent = indent;
        self
    }
}

/// Check a construct name is usable for scanning
///
/// # Errors
/// Returns [`BackfillError::InvalidInput`] unless the name is a non-empty
/// run of identifier characters and dots
pub fn validate_construct_name(name: &str) -> BackfillResult<()> {
    if name.is_empty() {
        return Err(BackfillError::InvalidInput(
            "construct name must not be empty".to_string(),
        ));
    }
    if !is_identifier_like(name, &['.']) {
        return Err(BackfillError::InvalidInput(format!(
            "construct name '{name}' is not identifier-like"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_new_validates() {
        assert!(InsertionRule::new("type", "id", "Kind.basic").is_ok());
        let err = InsertionRule::new("type", "", "Kind.basic").unwrap_err();
        assert_eq!(
            err,
            BackfillError::InvalidInput("rule field 'anchor_key' must not be empty".to_string())
        );
        assert!(InsertionRule::new("  ", "id", "x").is_err());
    }

    #[test]
    fn rule_keys_must_be_identifier_like() {
        let err = InsertionRule::new("'type'", "id", "1").unwrap_err();
        assert_eq!(
            err,
            BackfillError::InvalidInput(
                "rule field 'required_key' (''type'') is not identifier-like".to_string()
            )
        );
        assert!(InsertionRule::new("type", "(id", "1").is_err());
        assert!(InsertionRule::new("type:", "id", "1").is_err());
        assert!(InsertionRule::new("listing type", "id", "1").is_err());
        assert!(InsertionRule::new("$type_2", "sellerId", "'a b'").is_ok());
    }

    #[test]
    fn insertion_text_format() {
        let rule = InsertionRule::new("tags", "sellerId", "[]").unwrap();
        assert_eq!(rule.insertion_text(""), "\ntags: [],");
        assert_eq!(rule.insertion_text("    "), "\n    tags: [],");
    }

    #[test]
    fn options_builder() {
        let opts = RewriteOptions::new()
            .with_delimiters(Delimiters::new('{', '}'))
            .with_indent(IndentStyle::MatchAnchor);
        assert_eq!(opts.delimiters.open, '{');
        assert_eq!(opts.indent, IndentStyle::MatchAnchor);
        assert_eq!(RewriteOptions::default().indent, IndentStyle::None);
    }

    #[test]
    fn construct_name_validation() {
        assert!(validate_construct_name("Product").is_ok());
        assert!(validate_construct_name("models.Product").is_ok());
        assert!(validate_construct_name("").is_err());
        assert!(validate_construct_name("Pro duct").is_err());
        assert!(validate_construct_name("Product(").is_err());
    }
}
