//! Pagesmith Patch - structured HTML patch engine
//!
//! Takes a batch of independently targeted subtree replacements proposed by
//! an unreliable generator and merges them into an existing document
//! without corrupting the rest of the page. Each edit is resolved against
//! the current tree state, applied or skipped on its own, and reported as
//! an explicit outcome; one bad edit never aborts the batch.
//!
//! # Example
//!
//! ```rust
//! use pagesmith_patch::{apply_edits, Edit, EditBatch, EditTarget};
//!
//! let base = r#"<html><body><section id="hero">A</section></body></html>"#;
//! let batch = EditBatch::from_edits(vec![Edit {
//!     target: EditTarget::Id("hero".to_string()),
//!     replacement: r#"<section id="hero">B</section>"#.to_string(),
//! }]);
//!
//! let report = apply_edits(base, &batch);
//! assert_eq!(
//!     report.document,
//!     r#"<html><body><section id="hero">B</section></body></html>"#
//! );
//! ```

#![warn(unreachable_pub)]

pub mod engine;
pub mod types;

pub use engine::{apply_edits, EditOutcome, PatchReport, SkipReason};
pub use types::{Edit, EditBatch, EditTarget};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
