//! Error types for the backfill core
//!
//! Two failure classes exist:
//! - Scanning failures that invalidate the whole buffer (fatal)
//! - Per-rule failures that only skip one insertion (recoverable)

/// Errors raised by locating and backfilling
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackfillError {
    /// An invocation's argument list never closes
    ///
    /// Fatal for the whole rewrite: the buffer does not hold
    /// well-formed invocations.
    #[error("unbalanced delimiters in '{construct}' invocation opened at byte {open_offset}")]
    UnbalancedDelimiters {
        /// Construct name being scanned
        construct: String,
        /// Byte offset of the open delimiter with no match
        open_offset: usize,
    },

    /// The anchor key of a rule is absent from an invocation
    ///
    /// Recoverable: the rule is skipped for that invocation only.
    #[error("anchor '{anchor_key}' for '{required_key}' not found")]
    AnchorNotFound {
        /// Key the insertion should follow
        anchor_key: String,
        /// Key that could not be inserted
        required_key: String,
    },

    /// Caller supplied an empty or malformed name, key or literal
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl BackfillError {
    /// Create unbalanced delimiter error
    pub fn unbalanced(construct: impl Into<String>, open_offset: usize) -> Self {
        Self::UnbalancedDelimiters {
            construct: construct.into(),
            open_offset,
        }
    }

    /// Create anchor-not-found error
    pub fn anchor_not_found(anchor_key: impl Into<String>, required_key: impl Into<String>) -> Self {
        Self::AnchorNotFound {
            anchor_key: anchor_key.into(),
            required_key: required_key.into(),
        }
    }

    /// Whether the driver may skip this error and keep going
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::AnchorNotFound { .. })
    }
}

/// Result type alias for backfill operations
pub type BackfillResult<T> = Result<T, BackfillError>;
