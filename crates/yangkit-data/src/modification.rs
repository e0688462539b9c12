//! # Data Tree Modifications
//!
//! A modification records writes, merges, and deletes against a snapshot.
//! Its lifecycle is a typestate. Each state is a distinct type, so sealing
//! and validation order is checked at compile time.
//!
//! ## States
//!
//! - `Open`: accepts `write`, `merge`, `delete`, `read_node`.
//! - `Ready`: sealed. The only state [`InMemoryDataTree::validate`] and
//!   [`InMemoryDataTree::prepare`] accept.
//!
//! ```text
//! snapshot.new_modification() ──▶ Open ──ready()──▶ Ready ──prepare()──▶ DataTreeCandidate
//! ```
//!
//! Writing to a sealed modification does not compile:
//!
//! ```compile_fail
//! use yangkit_core::YangInstanceIdentifier;
//! use yangkit_data::{InMemoryDataTree, NormalizedNode, DEFAULT_CONFIGURATION};
//!
//! let tree = InMemoryDataTree::new(DEFAULT_CONFIGURATION);
//! let mut sealed = tree.take_snapshot().new_modification().ready();
//! // ERROR: no method named `delete` found for `DataTreeModification<Ready>`
//! sealed.delete(&YangInstanceIdentifier::empty());
//! ```
//!
//! ## Application
//!
//! Operations apply immediately to a private working copy of the tree, so
//! `read_node` sees them. They are also recorded, and replayed on the
//! tree's current root when the modification is prepared.
//!
//! [`InMemoryDataTree::validate`]: crate::InMemoryDataTree::validate
//! [`InMemoryDataTree::prepare`]: crate::InMemoryDataTree::prepare

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;
use yangkit_core::{PathArgument, QName, YangInstanceIdentifier};

use crate::error::{DataTreeError, DataTreeResult};
use crate::node::{find_arc, NormalizedNode};
use crate::tree::DataTreeSnapshot;

// ─── State Types ─────────────────────────────────────────────────────

/// Modification state: accepting operations.
#[derive(Debug, Clone, Copy)]
pub struct Open;

/// Modification state: sealed, ready for validation.
#[derive(Debug, Clone, Copy)]
pub struct Ready;

mod private {
    pub trait Sealed {}
    impl Sealed for super::Open {}
    impl Sealed for super::Ready {}
}

/// Marker trait for modification states.
pub trait ModificationState: private::Sealed + std::fmt::Debug {
    /// State name, for logs.
    fn name() -> &'static str;
}

impl ModificationState for Open {
    fn name() -> &'static str {
        "open"
    }
}

impl ModificationState for Ready {
    fn name() -> &'static str {
        "ready"
    }
}

// ─── Operations ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub(crate) enum OperationKind {
    Write(Arc<NormalizedNode>),
    Merge(Arc<NormalizedNode>),
    Delete,
}

#[derive(Debug, Clone)]
pub(crate) struct Operation {
    pub(crate) path: YangInstanceIdentifier,
    pub(crate) kind: OperationKind,
}

/// A set of changes against one snapshot.
#[derive(Debug, Clone)]
pub struct DataTreeModification<S: ModificationState> {
    base: DataTreeSnapshot,
    working: Arc<NormalizedNode>,
    operations: Vec<Operation>,
    _state: PhantomData<S>,
}

impl<S: ModificationState> DataTreeModification<S> {
    /// Read a node as this modification would leave it.
    pub fn read_node(&self, path: &YangInstanceIdentifier) -> Option<Arc<NormalizedNode>> {
        find_arc(&self.working, path.path_arguments())
    }

    /// The snapshot this modification started from.
    pub fn base(&self) -> &DataTreeSnapshot {
        &self.base
    }

    /// Number of recorded operations.
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// Current state name.
    pub fn state(&self) -> &'static str {
        S::name()
    }

    pub(crate) fn operations(&self) -> &[Operation] {
        &self.operations
    }
}

impl DataTreeModification<Open> {
    pub(crate) fn new(base: DataTreeSnapshot) -> Self {
        let working = Arc::clone(base.root());
        Self {
            base,
            working,
            operations: Vec::new(),
            _state: PhantomData,
        }
    }

    /// Replace the subtree at `path` with `node`.
    ///
    /// The node's identifier must equal the last path argument. Writing at
    /// the root requires a container named like the tree root. Missing
    /// parents are created.
    pub fn write(&mut self, path: &YangInstanceIdentifier, node: NormalizedNode) -> DataTreeResult<()> {
        check_identifier(path, &node)?;
        let node = Arc::new(node);
        self.working = write_at(&self.working, path, Some(Arc::clone(&node)))?;
        debug!(path = %path, node = node.kind(), "write recorded");
        self.operations.push(Operation {
            path: path.clone(),
            kind: OperationKind::Write(node),
        });
        Ok(())
    }

    /// Merge `node` into the subtree at `path`.
    ///
    /// Containers, maps, and entries merge child by child; leaves are
    /// replaced; leaf-lists take the union of values.
    pub fn merge(&mut self, path: &YangInstanceIdentifier, node: NormalizedNode) -> DataTreeResult<()> {
        check_identifier(path, &node)?;
        let node = Arc::new(node);
        self.working = merge_at(&self.working, path, &node)?;
        debug!(path = %path, node = node.kind(), "merge recorded");
        self.operations.push(Operation {
            path: path.clone(),
            kind: OperationKind::Merge(node),
        });
        Ok(())
    }

    /// Remove the subtree at `path`. Removing an absent node does nothing.
    /// Deleting the root empties the tree.
    pub fn delete(&mut self, path: &YangInstanceIdentifier) -> DataTreeResult<()> {
        self.working = write_at(&self.working, path, None)?;
        debug!(path = %path, "delete recorded");
        self.operations.push(Operation {
            path: path.clone(),
            kind: OperationKind::Delete,
        });
        Ok(())
    }

    /// Seal the modification.
    pub fn ready(self) -> DataTreeModification<Ready> {
        debug!(operations = self.operations.len(), "modification ready");
        DataTreeModification {
            base: self.base,
            working: self.working,
            operations: self.operations,
            _state: PhantomData,
        }
    }
}

impl DataTreeModification<Ready> {
    /// Replay the recorded operations on `root`.
    pub(crate) fn apply_to(&self, root: &Arc<NormalizedNode>) -> DataTreeResult<Arc<NormalizedNode>> {
        if Arc::ptr_eq(root, self.base.root()) {
            return Ok(Arc::clone(&self.working));
        }
        let mut current = Arc::clone(root);
        for op in &self.operations {
            current = match &op.kind {
                OperationKind::Write(node) => write_at(&current, &op.path, Some(Arc::clone(node)))?,
                OperationKind::Merge(node) => merge_at(&current, &op.path, node)?,
                OperationKind::Delete => write_at(&current, &op.path, None)?,
            };
        }
        Ok(current)
    }
}

// ─── Tree Surgery ────────────────────────────────────────────────────

fn check_identifier(path: &YangInstanceIdentifier, node: &NormalizedNode) -> DataTreeResult<()> {
    let matches = match path.last() {
        None => matches!(node, NormalizedNode::Container(_)) && node.node_type() == &QName::data_root(),
        Some(last) => &node.identifier() == last,
    };
    if matches {
        Ok(())
    } else {
        Err(DataTreeError::IdentifierMismatch {
            path: path.to_string(),
            actual: node.identifier().to_string(),
        })
    }
}

/// Place `node` at `path` below `root` (or remove what is there, for
/// `None`), returning the new root.
pub(crate) fn write_at(
    root: &Arc<NormalizedNode>,
    path: &YangInstanceIdentifier,
    node: Option<Arc<NormalizedNode>>,
) -> DataTreeResult<Arc<NormalizedNode>> {
    if path.is_empty() {
        return Ok(node.unwrap_or_else(|| Arc::new(NormalizedNode::empty_root())));
    }
    replace(root, path.path_arguments(), node, path)
}

fn replace(
    parent: &Arc<NormalizedNode>,
    args: &[PathArgument],
    node: Option<Arc<NormalizedNode>>,
    full: &YangInstanceIdentifier,
) -> DataTreeResult<Arc<NormalizedNode>> {
    let Some((arg, rest)) = args.split_first() else {
        return Ok(Arc::clone(parent));
    };
    check_step(parent, arg, full)?;
    if rest.is_empty() {
        if node.is_none() && parent.child(arg).is_none() {
            return Ok(Arc::clone(parent));
        }
        return Ok(Arc::new(parent.with_child(arg, node)));
    }
    let child = match parent.child(arg) {
        Some(existing) => Arc::clone(existing),
        None if node.is_none() => return Ok(Arc::clone(parent)),
        None => Arc::new(structural_parent(arg, &rest[0])),
    };
    let updated = replace(&child, rest, node, full)?;
    Ok(Arc::new(parent.with_child(arg, Some(updated))))
}

/// The node a write creates for a missing path step.
fn structural_parent(arg: &PathArgument, next: &PathArgument) -> NormalizedNode {
    match arg {
        PathArgument::NodeIdentifierWithPredicates { node_type, keys } => {
            NormalizedNode::entry_with_keys(node_type.clone(), keys.clone())
        }
        PathArgument::NodeIdentifier(qname) => match next {
            PathArgument::NodeIdentifierWithPredicates { node_type, .. } if node_type == qname => {
                NormalizedNode::empty_map(qname.clone())
            }
            _ => NormalizedNode::empty_container(qname.clone()),
        },
    }
}

/// Entries live only in a map of their own list; maps hold only entries.
fn check_step(parent: &NormalizedNode, arg: &PathArgument, full: &YangInstanceIdentifier) -> DataTreeResult<()> {
    let invalid = |reason: String| DataTreeError::InvalidPath {
        path: full.to_string(),
        reason,
    };
    match (parent, arg) {
        (NormalizedNode::Leaf(_) | NormalizedNode::LeafSet(_), _) => {
            Err(invalid(format!("{} {} has no children", parent.kind(), parent.node_type().local_name())))
        }
        (NormalizedNode::Map(map), PathArgument::NodeIdentifierWithPredicates { node_type, .. }) => {
            if &map.identifier == node_type {
                Ok(())
            } else {
                Err(invalid(format!("entry {arg} is not an entry of list {}", map.identifier.local_name())))
            }
        }
        (NormalizedNode::Map(map), PathArgument::NodeIdentifier(_)) => Err(invalid(format!(
            "list {} can only hold entries with key predicates",
            map.identifier.local_name()
        ))),
        (_, PathArgument::NodeIdentifierWithPredicates { .. }) => {
            Err(invalid(format!("entry {arg} must sit directly inside its list")))
        }
        _ => Ok(()),
    }
}

fn merge_at(
    root: &Arc<NormalizedNode>,
    path: &YangInstanceIdentifier,
    node: &Arc<NormalizedNode>,
) -> DataTreeResult<Arc<NormalizedNode>> {
    let merged = match find_arc(root, path.path_arguments()) {
        Some(existing) => merge_nodes(&existing, node),
        None => Arc::clone(node),
    };
    write_at(root, path, Some(merged))
}

/// Recursive merge of `incoming` over `existing`.
pub(crate) fn merge_nodes(existing: &Arc<NormalizedNode>, incoming: &Arc<NormalizedNode>) -> Arc<NormalizedNode> {
    match (existing.as_ref(), incoming.as_ref()) {
        (NormalizedNode::Container(_), NormalizedNode::Container(_))
        | (NormalizedNode::Map(_), NormalizedNode::Map(_))
        | (NormalizedNode::MapEntry(_), NormalizedNode::MapEntry(_)) => {
            let mut result = NormalizedNode::clone(existing);
            if let Some(children) = incoming.children() {
                for (arg, child) in children {
                    let merged = match existing.child(arg) {
                        Some(old) => merge_nodes(old, child),
                        None => Arc::clone(child),
                    };
                    result = result.with_child(arg, Some(merged));
                }
            }
            Arc::new(result)
        }
        (NormalizedNode::LeafSet(old), NormalizedNode::LeafSet(new)) => {
            let mut union = old.clone();
            for value in &new.values {
                if !union.values.contains(value) {
                    union.values.push(value.clone());
                }
            }
            Arc::new(NormalizedNode::LeafSet(union))
        }
        _ => Arc::clone(incoming),
    }
}
