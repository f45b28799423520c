//! Edit data model
//!
//! Wire shape, as produced by the remote backend:
//!
//! ```json
//! {
//!   "edits": [
//!     {"target": {"kind": "id", "value": "hero"}, "replacement": "<section id=\"hero\">…</section>"}
//!   ],
//!   "notes": "optional commentary"
//! }
//! ```
//!
//! Edits are applied in listed order. A batch is constructed from a model
//! response, consumed immediately by the engine, and never persisted.

use serde::{Deserialize, Serialize};

/// Locator naming exactly one element to replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum EditTarget {
    /// The element whose `id` attribute equals this literal value.
    Id(String),
    /// The first element, in document order, matching this structural query.
    Selector(String),
}

impl std::fmt::Display for EditTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditTarget::Id(value) => write!(f, "#{value}"),
            EditTarget::Selector(value) => write!(f, "{value}"),
        }
    }
}

/// Replace the element located by `target`, in its entirety, with the
/// subtree parsed from `replacement`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub target: EditTarget,
    pub replacement: String,
}

/// Ordered sequence of edits against one base document, plus optional
/// free-text notes (diagnostic commentary, never applied).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EditBatch {
    #[serde(default)]
    pub edits: Vec<Edit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl EditBatch {
    /// Batch with no edits and no notes.
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Batch from a list of edits.
    #[inline]
    #[must_use]
    pub fn from_edits(edits: Vec<Edit>) -> Self {
        Self { edits, notes: None }
    }

    /// Attach a diagnostic note.
    #[inline]
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes = Some(note.into());
        self
    }

    /// Whether the batch carries no edits.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}
