//! # yangkit-data — Schema-Validated In-Memory Data Tree
//!
//! Stores YANG-modeled data as a tree of normalized nodes, versioned and
//! validated against a [`SchemaContext`](yangkit_model::SchemaContext).
//!
//! ## Components
//!
//! - **Nodes** (`node.rs`, `builder.rs`): containers, maps (lists), map
//!   entries, leaves, and leaf-sets, with builders that enforce structural
//!   rules.
//!
//! - **Tree** (`tree.rs`): [`InMemoryDataTree`] holds the current root
//!   and version; [`DataTreeSnapshot`] is an immutable view of one version.
//!
//! - **Modifications** (`modification.rs`): typestate
//!   `DataTreeModification<Open>` → `DataTreeModification<Ready>`. Only a
//!   sealed modification can be validated or prepared.
//!
//! - **Validation** (`validate.rs`): the whole resulting tree is checked
//!   against the schema before a candidate is produced.
//!
//! - **Candidates** (`candidate.rs`): the before/after roots and per-path
//!   changes of a prepared modification.
//!
//! - **JSON** (`json.rs`): RFC 7951 rendering of nodes and snapshots.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use yangkit_core::YangInstanceIdentifier;
//! use yangkit_data::{InMemoryDataTree, NormalizedNode, DEFAULT_CONFIGURATION};
//! # fn demo(schema: yangkit_model::SchemaContext, cont: yangkit_core::QName) -> Result<(), yangkit_data::DataTreeError> {
//! let tree = InMemoryDataTree::new(DEFAULT_CONFIGURATION);
//! tree.set_schema_context(Arc::new(schema));
//!
//! let mut modification = tree.take_snapshot().new_modification();
//! modification.write(&YangInstanceIdentifier::of(cont.clone()), NormalizedNode::empty_container(cont))?;
//! let modification = modification.ready();
//! tree.validate(&modification)?;
//! let candidate = tree.prepare(modification)?;
//! tree.commit(candidate)?;
//! assert_eq!(tree.version(), 1);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod candidate;
pub mod config;
pub mod error;
pub mod json;
pub mod modification;
pub mod node;
pub mod tree;
mod validate;

pub use builder::{ContainerNodeBuilder, LeafNodeBuilder, LeafSetNodeBuilder, MapEntryNodeBuilder, MapNodeBuilder};
pub use candidate::{DataTreeCandidate, DataTreeCandidateNode, ModificationType};
pub use config::{DataTreeConfiguration, TreeType, DEFAULT_CONFIGURATION, DEFAULT_OPERATIONAL};
pub use error::{DataTreeError, DataTreeResult};
pub use json::to_json;
pub use modification::{DataTreeModification, ModificationState, Open, Ready};
pub use node::{ContainerNode, LeafNode, LeafSetNode, MapEntryNode, MapNode, NormalizedNode};
pub use tree::{DataTreeSnapshot, InMemoryDataTree};
