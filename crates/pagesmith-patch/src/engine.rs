//! Patch application
//!
//! The base document is parsed into a tree exactly once per batch; each
//! edit resolves its target against the current tree state, so later edits
//! see what earlier edits changed. Every edit lands on one of three
//! outcomes rather than raising: applied, no match, or bad fragment.
//!
//! If nothing was applied (including the empty batch), the base text is
//! returned byte-for-byte unchanged.

use crate::types::{Edit, EditBatch, EditTarget};
use pagesmith_dom::{find_by_id, find_by_selector, parse_document, parse_fragment, serialize};
use pagesmith_dom::{Node, NodePath, Selector};
use serde::Serialize;

/// Why an edit was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The target resolved to zero elements.
    NoMatch,
    /// The target's selector expression could not be parsed.
    InvalidSelector,
    /// The replacement did not parse to any HTML nodes.
    BadFragment,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoMatch => write!(f, "no matching element"),
            SkipReason::InvalidSelector => write!(f, "invalid selector"),
            SkipReason::BadFragment => write!(f, "replacement fragment unparseable"),
        }
    }
}

/// Resolution of a single edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EditOutcome {
    Applied { target: EditTarget },
    Skipped { target: EditTarget, reason: SkipReason },
}

impl EditOutcome {
    #[inline]
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, EditOutcome::Applied { .. })
    }
}

/// Result of applying one batch: the merged document plus one outcome per
/// edit, in batch order.
#[derive(Debug, Clone, Serialize)]
pub struct PatchReport {
    pub document: String,
    pub outcomes: Vec<EditOutcome>,
}

impl PatchReport {
    /// Number of edits that were applied.
    #[must_use]
    pub fn applied_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_applied()).count()
    }

    /// Number of edits that were skipped.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.outcomes.len() - self.applied_count()
    }
}

/// Apply an ordered batch of edits to a base document.
#[must_use]
pub fn apply_edits(base: &str, batch: &EditBatch) -> PatchReport {
    if batch.is_empty() {
        return PatchReport {
            document: base.to_string(),
            outcomes: Vec::new(),
        };
    }

    let mut tree = parse_document(base);
    let mut outcomes = Vec::with_capacity(batch.edits.len());

    for edit in &batch.edits {
        let outcome = apply_one(&mut tree, edit);
        if let EditOutcome::Skipped { target, reason } = &outcome {
            tracing::warn!(%target, %reason, "edit skipped");
        }
        outcomes.push(outcome);
    }

    let report = PatchReport {
        document: String::new(),
        outcomes,
    };
    let document = if report.applied_count() == 0 {
        base.to_string()
    } else {
        serialize(&tree)
    };
    PatchReport { document, ..report }
}

fn apply_one(tree: &mut Node, edit: &Edit) -> EditOutcome {
    let skipped = |reason| EditOutcome::Skipped {
        target: edit.target.clone(),
        reason,
    };

    let path = match &edit.target {
        EditTarget::Id(value) => find_by_id(tree, value),
        EditTarget::Selector(value) => match Selector::parse(value) {
            Ok(selector) => find_by_selector(tree, &selector),
            Err(_) => return skipped(SkipReason::InvalidSelector),
        },
    };
    let Some(path) = path else {
        return skipped(SkipReason::NoMatch);
    };

    if edit.replacement.trim().is_empty() {
        return skipped(SkipReason::BadFragment);
    }
    let replacement = parse_fragment(&edit.replacement);
    if replacement.is_empty() {
        return skipped(SkipReason::BadFragment);
    }

    if splice(tree, &path, replacement) {
        EditOutcome::Applied {
            target: edit.target.clone(),
        }
    } else {
        skipped(SkipReason::NoMatch)
    }
}

/// Replace the node at `path` with `replacement` nodes, in place.
fn splice(root: &mut Node, path: &NodePath, replacement: Vec<Node>) -> bool {
    let Some((&last, parents)) = path.split_last() else {
        return false;
    };
    let mut current = root;
    for &index in parents {
        let Some(children) = current.children_mut() else {
            return false;
        };
        let Some(child) = children.get_mut(index) else {
            return false;
        };
        current = child;
    }
    let Some(children) = current.children_mut() else {
        return false;
    };
    if last >= children.len() {
        return false;
    }
    children.splice(last..=last, replacement);
    true
}
