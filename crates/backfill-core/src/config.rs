//! Rule set configuration
//!
//! Rule sets are written in TOML. A file holds either a single rule set at
//! top level or a `[[profiles]]` array of them:
//!
//! ```toml
//! construct = "Product"
//! indent = "match-anchor"
//!
//! [[rules]]
//! required_key = "type"
//! anchor_key = "id"
//! literal = "ProductType.crop"
//! ```
//!
//! Profiles run in file order over the same buffer.

use crate::driver::Rewriter;
use crate::error::BackfillError;
use crate::report::RewriteReport;
use crate::rule::{IndentStyle, InsertionRule, RewriteOptions};
use crate::span::Delimiters;
use serde::{Deserialize, Serialize};

/// Errors while loading rule sets
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Not valid TOML, or wrong shape
    #[error("malformed rule file: {0}")]
    Malformed(#[from] toml::de::Error),

    /// Well-formed but violates a rule invariant
    #[error("invalid rule set for '{construct}': {source}")]
    Invalid {
        construct: String,
        #[source]
        source: BackfillError,
    },

    /// Open and close delimiter are the same character
    #[error("delimiters for '{0}' must differ")]
    DelimiterClash(String),

    /// `profiles` array present but empty
    #[error("rule file declares no profiles")]
    NoProfiles,
}

/// Rule list for one construct
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSet {
    /// Construct name to locate
    pub construct: String,
    /// Indentation of inserted arguments
    #[serde(default)]
    pub indent: IndentStyle,
    /// Opening delimiter
    #[serde(default = "default_open")]
    pub open: char,
    /// Closing delimiter
    #[serde(default = "default_close")]
    pub close: char,
    /// Rules in application order
    #[serde(default)]
    pub rules: Vec<InsertionRule>,
}

fn default_open() -> char {
    Delimiters::PARENS.open
}

fn default_close() -> char {
    Delimiters::PARENS.close
}

impl RuleSet {
    /// Create rule set with default options
    #[must_use]
    pub fn new(construct: impl Into<String>, rules: Vec<InsertionRule>) -> Self {
        Self {
            construct: construct.into(),
            indent: IndentStyle::default(),
            open: default_open(),
            close: default_close(),
            rules,
        }
    }

    /// Options derived from this rule set
    #[inline]
    #[must_use]
    pub fn options(&self) -> RewriteOptions {
        RewriteOptions::new()
            .with_delimiters(Delimiters::new(self.open, self.close))
            .with_indent(self.indent)
    }

    /// Build a validated rewriter
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the construct, a rule or the delimiters
    /// are invalid
    pub fn rewriter(&self) -> Result<Rewriter, ConfigError> {
        if self.open == self.close {
            return Err(ConfigError::DelimiterClash(self.construct.clone()));
        }
        Rewriter::with_options(self.construct.clone(), self.rules.clone(), self.options()).map_err(
            |source| ConfigError::Invalid {
                construct: self.construct.clone(),
                source,
            },
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfilesFile {
    profiles: Vec<RuleSet>,
}

/// Validated contents of a rule file
#[derive(Debug, Clone)]
pub struct RuleFile {
    rewriters: Vec<Rewriter>,
}

impl RuleFile {
    /// Parse and validate TOML text
    ///
    /// # Errors
    /// Returns [`ConfigError`] for malformed TOML or invalid rule sets
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(text)?;
        let profiles = if table.contains_key("profiles") {
            let file: ProfilesFile = toml::from_str(text)?;
            if file.profiles.is_empty() {
                return Err(ConfigError::NoProfiles);
            }
            file.profiles
        } else {
            vec![toml::from_str::<RuleSet>(text)?]
        };
        Self::from_rule_sets(&profiles)
    }

    /// Validate already-built rule sets
    ///
    /// # Errors
    /// Returns [`ConfigError`] for the first invalid rule set
    pub fn from_rule_sets(profiles: &[RuleSet]) -> Result<Self, ConfigError> {
        let rewriters = profiles
            .iter()
            .map(RuleSet::rewriter)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rewriters })
    }

    /// Rewriters in application order
    #[inline]
    #[must_use]
    pub fn rewriters(&self) -> &[Rewriter] {
        &self.rewriters
    }

    /// Run every profile over the buffer in order
    ///
    /// # Errors
    /// Returns the first fatal [`BackfillError`]; earlier profiles' work is
    /// discarded with it
    pub fn apply(&self, buffer: &str) -> Result<(String, RewriteReport), BackfillError> {
        let mut text = buffer.to_owned();
        let mut report = RewriteReport::default();
        for rewriter in &self.rewriters {
            let (next, pass) = rewriter.apply_with_report(&text)?;
            text = next;
            report.merge(pass);
        }
        Ok((text, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE: &str = r#"
construct = "Product"
indent = "match-anchor"

[[rules]]
required_key = "type"
anchor_key = "id"
literal = "ProductType.crop"

[[rules]]
required_key = "listingType"
anchor_key = "type"
literal = "ListingType.sell"
"#;

    #[test]
    fn parses_single_rule_set() {
        let file = RuleFile::from_toml(SINGLE).unwrap();
        assert_eq!(file.rewriters().len(), 1);
        let rewriter = &file.rewriters()[0];
        assert_eq!(rewriter.construct(), "Product");
        assert_eq!(rewriter.rules().len(), 2);
        assert_eq!(rewriter.options().indent, IndentStyle::MatchAnchor);
        assert_eq!(rewriter.options().delimiters, Delimiters::PARENS);
    }

    #[test]
    fn parses_profiles() {
        let text = r#"
[[profiles]]
construct = "Product"
rules = [{ required_key = "tags", anchor_key = "sellerId", literal = "[]" }]

[[profiles]]
construct = "Order"
open = "{"
close = "}"
rules = [{ required_key = "status", anchor_key = "id", literal = "Status.open" }]
"#;
        let file = RuleFile::from_toml(text).unwrap();
        assert_eq!(file.rewriters().len(), 2);
        assert_eq!(file.rewriters()[1].options().delimiters.open, '{');
    }

    #[test]
    fn rejects_empty_rule_fields() {
        let text = r#"
construct = "Product"
rules = [{ required_key = "", anchor_key = "id", literal = "x" }]
"#;
        let err = RuleFile::from_toml(text).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn rejects_unknown_fields() {
        let text = "construct = \"Product\"\nrulez = []\n";
        assert!(matches!(
            RuleFile::from_toml(text),
            Err(ConfigError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_clashing_delimiters() {
        let text = "construct = \"Product\"\nopen = \"|\"\nclose = \"|\"\n";
        assert!(matches!(
            RuleFile::from_toml(text),
            Err(ConfigError::DelimiterClash(_))
        ));
    }

    #[test]
    fn rejects_empty_profiles() {
        assert!(matches!(
            RuleFile::from_toml("profiles = []\n"),
            Err(ConfigError::NoProfiles)
        ));
    }

    #[test]
    fn profiles_apply_in_order() {
        let sets = vec![
            RuleSet::new(
                "Product",
                vec![InsertionRule::new("type", "id", "T.crop").unwrap()],
            ),
            RuleSet::new(
                "Product",
                vec![InsertionRule::new("listingType", "type", "L.sell").unwrap()],
            ),
        ];
        let file = RuleFile::from_rule_sets(&sets).unwrap();
        let (out, report) = file.apply("Product(id: 'p',)").unwrap();
        assert_eq!(out, "Product(id: 'p',\ntype: T.crop,\nlistingType: L.sell,)");
        assert_eq!(report.insertions.len(), 2);
        assert_eq!(report.invocations, 2);
    }
}
