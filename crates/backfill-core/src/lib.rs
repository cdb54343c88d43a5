//! Backfill Core
//!
//! Adds missing named arguments to constructor-style invocations in raw
//! source text, using delimiter-balance scanning instead of a parser.
//!
//! # Core Concepts
//!
//! - [`Locator`]: finds `Name(` ... `)` invocations by depth counting
//! - [`InsertionRule`]: "`required_key` must be present; if not, add
//!   `required_key: literal` after `anchor_key`'s value"
//! - [`Rewriter`]: applies an ordered rule list to every invocation,
//!   right to left so pending offsets stay valid
//! - [`RewriteReport`]: insertions made and rules skipped
//!
//! # Example
//!
//! ```rust
//! use backfill_core::{apply, InsertionRule};
//!
//! let rules = vec![
//!     InsertionRule::new("type", "id", "Kind.basic")?,
//!     InsertionRule::new("tags", "sellerId", "[]")?,
//! ];
//! let out = apply("Widget(\n  id: 'a',\n  sellerId: 's1',\n)", "Widget", &rules)?;
//! assert!(out.contains("id: 'a',\ntype: Kind.basic,"));
//! assert!(out.contains("sellerId: 's1',\ntags: [],"));
//! # Ok::<(), backfill_core::BackfillError>(())
//! ```
//!
//! # Limitations
//!
//! Delimiters inside string or character literals are counted like any
//! other, and key presence is a substring check on the argument list.

#![warn(unreachable_pub)]
#![warn(missing_docs)]

// Core modules
pub mod backfiller;
pub mod config;
pub mod driver;
pub mod error;
pub mod locator;
pub mod report;
pub mod rule;
pub mod span;

// Re-exports
pub use backfiller::{insertion_point, is_present, missing_rules};
pub use config::{ConfigError, RuleFile, RuleSet};
pub use driver::{apply, apply_with_report, Rewriter};
pub use error::{BackfillError, BackfillResult};
pub use locator::{locate, Invocations, Locator};
pub use report::{Insertion, RewriteReport, SkippedRule};
pub use rule::{IndentStyle, InsertionRule, RewriteOptions};
pub use span::{Delimiters, InvocationSpan, LineIndex};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
