//! # In-Memory Data Tree
//!
//! A versioned, schema-validated document store. The tree holds one root
//! behind an `Arc`; a commit swaps it for a new root that shares every
//! untouched subtree with the old one. Snapshots are cheap clones of the
//! root pointer and never observe later commits.
//!
//! ## Transaction Flow
//!
//! ```text
//! take_snapshot() ─▶ new_modification() ─▶ write/merge/delete ─▶ ready()
//!     ─▶ validate() ─▶ prepare() ─▶ commit()
//! ```
//!
//! ## Concurrency
//!
//! Validation is optimistic. For every path a modification touched, the
//! subtree in the current tree must be the same version the modification
//! was based on; otherwise another commit got there first and the
//! modification is rejected with `ConflictingModification`. A candidate
//! prepared against version `n` commits only while the tree is still at
//! version `n`.
//!
//! The tree is `Send + Sync`. Readers and writers share a
//! `parking_lot::RwLock` held only long enough to copy or swap the root.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};
use yangkit_core::YangInstanceIdentifier;
use yangkit_model::SchemaContext;

use crate::candidate::{classify, DataTreeCandidate, DataTreeCandidateNode};
use crate::config::DataTreeConfiguration;
use crate::error::{DataTreeError, DataTreeResult};
use crate::modification::{DataTreeModification, Open, OperationKind, Ready};
use crate::node::{find_arc, NormalizedNode};
use crate::validate::validate_tree;

/// An immutable view of the tree at one version.
#[derive(Debug, Clone)]
pub struct DataTreeSnapshot {
    root: Arc<NormalizedNode>,
    version: u64,
    schema: Option<Arc<SchemaContext>>,
}

impl DataTreeSnapshot {
    /// Read the node at `path`, or `None` if absent.
    pub fn read_node(&self, path: &YangInstanceIdentifier) -> Option<Arc<NormalizedNode>> {
        find_arc(&self.root, path.path_arguments())
    }

    /// Start a modification based on this snapshot.
    pub fn new_modification(&self) -> DataTreeModification<Open> {
        DataTreeModification::new(self.clone())
    }

    /// The tree root.
    pub fn root(&self) -> &Arc<NormalizedNode> {
        &self.root
    }

    /// Tree version this snapshot was taken at.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Schema context bound when the snapshot was taken.
    pub fn schema_context(&self) -> Option<&Arc<SchemaContext>> {
        self.schema.as_ref()
    }
}

#[derive(Debug)]
struct TreeState {
    root: Arc<NormalizedNode>,
    version: u64,
    schema: Option<Arc<SchemaContext>>,
}

/// The data tree.
#[derive(Debug)]
pub struct InMemoryDataTree {
    config: DataTreeConfiguration,
    state: RwLock<TreeState>,
}

/// Result of checking a modification against the current tree.
struct Resolved {
    before: Arc<NormalizedNode>,
    after: Arc<NormalizedNode>,
    version: u64,
}

impl InMemoryDataTree {
    /// An empty tree at version 0 with no schema bound.
    pub fn new(config: DataTreeConfiguration) -> Self {
        debug!(tree_type = %config.tree_type, "data tree created");
        Self {
            config,
            state: RwLock::new(TreeState {
                root: Arc::new(NormalizedNode::empty_root()),
                version: 0,
                schema: None,
            }),
        }
    }

    /// The configuration fixed at creation.
    pub fn configuration(&self) -> &DataTreeConfiguration {
        &self.config
    }

    /// Bind the schema used to validate later modifications.
    pub fn set_schema_context(&self, schema: Arc<SchemaContext>) {
        info!(modules = schema.modules().len(), "schema context bound to data tree");
        self.state.write().schema = Some(schema);
    }

    /// A snapshot of the current tree.
    pub fn take_snapshot(&self) -> DataTreeSnapshot {
        let state = self.state.read();
        DataTreeSnapshot {
            root: Arc::clone(&state.root),
            version: state.version,
            schema: state.schema.clone(),
        }
    }

    /// Number of commits so far.
    pub fn version(&self) -> u64 {
        self.state.read().version
    }

    /// Check a modification for conflicts and validate the tree it would
    /// produce.
    pub fn validate(&self, modification: &DataTreeModification<Ready>) -> DataTreeResult<()> {
        self.resolve(modification).map(|_| ())
    }

    /// Validate a modification and resolve it into a candidate against the
    /// current tree.
    pub fn prepare(&self, modification: DataTreeModification<Ready>) -> DataTreeResult<DataTreeCandidate> {
        let Resolved { before, after, version } = self.resolve(&modification)?;

        let mut changes: Vec<DataTreeCandidateNode> = Vec::new();
        for op in modification.operations() {
            let last_was_write = modification
                .operations()
                .iter()
                .rev()
                .find(|o| o.path == op.path)
                .is_some_and(|o| matches!(o.kind, OperationKind::Write(_)));
            if changes.iter().any(|c| c.path == op.path) {
                continue;
            }
            let old = find_arc(&before, op.path.path_arguments());
            let new = find_arc(&after, op.path.path_arguments());
            changes.push(DataTreeCandidateNode {
                path: op.path.clone(),
                modification_type: classify(old.as_ref(), new.as_ref(), last_was_write),
                before: old,
                after: new,
            });
        }
        debug!(base_version = version, changes = changes.len(), "candidate prepared");
        Ok(DataTreeCandidate {
            base_version: version,
            before_root: before,
            after_root: after,
            changes,
        })
    }

    /// Install a prepared candidate. Fails if the tree moved since the
    /// candidate was prepared.
    pub fn commit(&self, candidate: DataTreeCandidate) -> DataTreeResult<()> {
        let mut state = self.state.write();
        if state.version != candidate.base_version {
            return Err(DataTreeError::StaleCandidate {
                base_version: candidate.base_version,
                current_version: state.version,
            });
        }
        state.root = candidate.after_root;
        state.version += 1;
        info!(version = state.version, changes = candidate.changes.len(), "candidate committed");
        Ok(())
    }

    fn resolve(&self, modification: &DataTreeModification<Ready>) -> DataTreeResult<Resolved> {
        let (current, version, schema) = {
            let state = self.state.read();
            (Arc::clone(&state.root), state.version, state.schema.clone())
        };
        let schema = schema.ok_or(DataTreeError::NoSchemaContext)?;

        let base = modification.base().root();
        for op in modification.operations() {
            let args = op.path.path_arguments();
            let unchanged = match (find_arc(base, args), find_arc(&current, args)) {
                (None, None) => true,
                (Some(a), Some(b)) => Arc::ptr_eq(&a, &b),
                _ => false,
            };
            if !unchanged {
                return Err(DataTreeError::ConflictingModification {
                    path: op.path.to_string(),
                });
            }
        }

        let after = modification.apply_to(&current)?;
        validate_tree(&schema, &self.config, &after)?;
        debug!(version, operations = modification.operation_count(), "modification validated");
        Ok(Resolved {
            before: current,
            after,
            version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CONFIGURATION;
    use yangkit_core::{QName, QNameModule};

    fn q(name: &str) -> QName {
        QName::create(&QNameModule::create("urn:test", None).unwrap(), name).unwrap()
    }

    #[test]
    fn test_new_tree_is_empty_at_version_zero() {
        let tree = InMemoryDataTree::new(DEFAULT_CONFIGURATION);
        let snapshot = tree.take_snapshot();
        assert_eq!(tree.version(), 0);
        assert_eq!(snapshot.version(), 0);
        assert!(snapshot.schema_context().is_none());
        assert_eq!(snapshot.root().children().map(|c| c.len()), Some(0));
        assert!(snapshot.read_node(&YangInstanceIdentifier::of(q("a"))).is_none());
    }

    #[test]
    fn test_validate_without_schema_fails() {
        let tree = InMemoryDataTree::new(DEFAULT_CONFIGURATION);
        let mut m = tree.take_snapshot().new_modification();
        m.write(&YangInstanceIdentifier::of(q("a")), NormalizedNode::leaf(q("a"), "x"))
            .unwrap();
        let m = m.ready();
        assert_eq!(tree.validate(&m), Err(DataTreeError::NoSchemaContext));
        assert!(matches!(tree.prepare(m), Err(DataTreeError::NoSchemaContext)));
    }

    #[test]
    fn test_commit_of_empty_modification_bumps_version() {
        let tree = InMemoryDataTree::new(DEFAULT_CONFIGURATION);
        tree.set_schema_context(Arc::new(SchemaContext::default()));
        let m = tree.take_snapshot().new_modification().ready();
        let candidate = tree.prepare(m).unwrap();
        assert!(candidate.is_empty());
        tree.commit(candidate).unwrap();
        assert_eq!(tree.version(), 1);
    }

    #[test]
    fn test_tree_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<InMemoryDataTree>();
        assert_send_sync::<DataTreeSnapshot>();
    }
}
