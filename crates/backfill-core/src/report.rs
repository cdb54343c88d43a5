//! Rewrite reports
//!
//! What a rewrite did to one buffer: every insertion made and every rule
//! skipped because its anchor was absent.

use serde::{Deserialize, Serialize};

/// One applied insertion
///
/// `offset` is where the text went in the buffer as it was at that moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insertion {
    /// Invocation the argument was added to
    pub construct_start: usize,
    /// Splice offset
    pub offset: usize,
    /// Key that was added
    pub required_key: String,
}

/// One rule skipped for one invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRule {
    /// Invocation the rule was skipped for
    pub construct_start: usize,
    /// Key that stays missing
    pub required_key: String,
    /// Anchor that could not be found
    pub anchor_key: String,
}

/// Summary of one rewrite pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteReport {
    /// Construct the pass targeted
    pub construct: String,
    /// Invocations located
    pub invocations: usize,
    /// Insertions in application order
    pub insertions: Vec<Insertion>,
    /// Skipped rules in encounter order
    pub skipped: Vec<SkippedRule>,
}

impl RewriteReport {
    /// Create empty report for a construct
    #[inline]
    #[must_use]
    pub fn new(construct: impl Into<String>) -> Self {
        Self {
            construct: construct.into(),
            ..Self::default()
        }
    }

    /// Whether the buffer was changed
    #[inline]
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.insertions.is_empty()
    }

    /// Number of invocations that received at least one insertion
    #[must_use]
    pub fn invocations_changed(&self) -> usize {
        let mut starts: Vec<usize> = self.insertions.iter().map(|i| i.construct_start).collect();
        starts.sort_unstable();
        starts.dedup();
        starts.len()
    }

    /// Fold another pass into this one (multi-profile runs)
    pub fn merge(&mut self, other: RewriteReport) {
        if self.construct.is_empty() {
            self.construct = other.construct;
        } else if !other.construct.is_empty() && other.construct != self.construct {
            self.construct = format!("{},{}", self.construct, other.construct);
        }
        self.invocations += other.invocations;
        self.insertions.extend(other.insertions);
        self.skipped.extend(other.skipped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insertion(start: usize, key: &str) -> Insertion {
        Insertion {
            construct_start: start,
            offset: start + 10,
            required_key: key.to_string(),
        }
    }

    #[test]
    fn empty_report_is_unchanged() {
        let report = RewriteReport::new("Widget");
        assert!(!report.changed());
        assert_eq!(report.invocations_changed(), 0);
    }

    #[test]
    fn counts_distinct_invocations() {
        let mut report = RewriteReport::new("Widget");
        report.insertions = vec![insertion(40, "type"), insertion(40, "tags"), insertion(0, "type")];
        assert!(report.changed());
        assert_eq!(report.invocations_changed(), 2);
    }

    #[test]
    fn merge_combines_passes() {
        let mut a = RewriteReport::new("Product");
        a.invocations = 2;
        a.insertions.push(insertion(0, "type"));
        let mut b = RewriteReport::new("Order");
        b.invocations = 1;
        b.skipped.push(SkippedRule {
            construct_start: 5,
            required_key: "tags".to_string(),
            anchor_key: "sellerId".to_string(),
        });
        a.merge(b);
        assert_eq!(a.construct, "Product,Order");
        assert_eq!(a.invocations, 3);
        assert_eq!(a.insertions.len(), 1);
        assert_eq!(a.skipped.len(), 1);
    }
}
