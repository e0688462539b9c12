//! # Data Tree Candidates
//!
//! A candidate is a validated modification, resolved against a specific
//! tree version and ready to commit. It carries the root before and after,
//! and one change record per modified path.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use yangkit_core::YangInstanceIdentifier;

use crate::node::NormalizedNode;

/// How a modified path changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModificationType {
    /// The subtree was written whole.
    Write,
    /// Some descendants changed.
    SubtreeModified,
    /// The subtree was removed.
    Delete,
    /// Operations ran but left the subtree as it was.
    Unmodified,
}

impl fmt::Display for ModificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Write => "write",
            Self::SubtreeModified => "subtree-modified",
            Self::Delete => "delete",
            Self::Unmodified => "unmodified",
        };
        f.write_str(s)
    }
}

/// The change at one modified path.
#[derive(Debug, Clone)]
pub struct DataTreeCandidateNode {
    /// Modified path.
    pub path: YangInstanceIdentifier,
    /// Kind of change.
    pub modification_type: ModificationType,
    /// Subtree before, if it existed.
    pub before: Option<Arc<NormalizedNode>>,
    /// Subtree after, if it exists.
    pub after: Option<Arc<NormalizedNode>>,
}

/// A prepared modification.
#[derive(Debug, Clone)]
pub struct DataTreeCandidate {
    pub(crate) base_version: u64,
    pub(crate) before_root: Arc<NormalizedNode>,
    pub(crate) after_root: Arc<NormalizedNode>,
    pub(crate) changes: Vec<DataTreeCandidateNode>,
}

impl DataTreeCandidate {
    /// Tree version the candidate was prepared against.
    pub fn base_version(&self) -> u64 {
        self.base_version
    }

    /// Tree root before the change.
    pub fn before_root(&self) -> &Arc<NormalizedNode> {
        &self.before_root
    }

    /// Tree root after the change.
    pub fn after_root(&self) -> &Arc<NormalizedNode> {
        &self.after_root
    }

    /// One record per modified path, in first-modified order.
    pub fn changes(&self) -> &[DataTreeCandidateNode] {
        &self.changes
    }

    /// Whether any path actually changed.
    pub fn is_empty(&self) -> bool {
        self.changes
            .iter()
            .all(|c| c.modification_type == ModificationType::Unmodified)
    }
}

/// Classify the change at a path from its subtrees and the last operation.
pub(crate) fn classify(
    before: Option<&Arc<NormalizedNode>>,
    after: Option<&Arc<NormalizedNode>>,
    last_was_write: bool,
) -> ModificationType {
    match (before, after) {
        (None, None) => ModificationType::Unmodified,
        (Some(_), None) => ModificationType::Delete,
        (None, Some(_)) => ModificationType::Write,
        (Some(b), Some(a)) if Arc::ptr_eq(b, a) || b == a => ModificationType::Unmodified,
        (Some(_), Some(_)) if last_was_write => ModificationType::Write,
        (Some(_), Some(_)) => ModificationType::SubtreeModified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yangkit_core::{QName, QNameModule};

    fn leaf(v: &str) -> Arc<NormalizedNode> {
        let q = QName::create(&QNameModule::create("urn:test", None).unwrap(), "l").unwrap();
        Arc::new(NormalizedNode::leaf(q, v))
    }

    #[test]
    fn test_classify() {
        let a = leaf("a");
        let b = leaf("b");
        assert_eq!(classify(None, None, true), ModificationType::Unmodified);
        assert_eq!(classify(Some(&a), None, false), ModificationType::Delete);
        assert_eq!(classify(None, Some(&a), false), ModificationType::Write);
        assert_eq!(classify(Some(&a), Some(&leaf("a")), true), ModificationType::Unmodified);
        assert_eq!(classify(Some(&a), Some(&b), true), ModificationType::Write);
        assert_eq!(classify(Some(&a), Some(&b), false), ModificationType::SubtreeModified);
    }

    #[test]
    fn test_modification_type_display() {
        assert_eq!(ModificationType::SubtreeModified.to_string(), "subtree-modified");
        assert_eq!(
            serde_json::to_string(&ModificationType::SubtreeModified).unwrap(),
            "\"subtree-modified\""
        );
    }
}
