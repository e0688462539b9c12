//! # Node Builders
//!
//! Fluent builders for [`NormalizedNode`]s. Each `build()` checks the
//! structural rules a node must satisfy on its own: unique child
//! identifiers, map entries belonging to their map, entries carrying
//! predicates. Schema rules (key leaves present, value types) are checked
//! later, when the tree is validated.
//!
//! ```
//! use yangkit_core::{PathArgument, QName, QNameModule};
//! use yangkit_data::builder::{ContainerNodeBuilder, MapEntryNodeBuilder, MapNodeBuilder};
//! use yangkit_data::NormalizedNode;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ns = QNameModule::create("urn:example", None)?;
//! let q = |n: &str| QName::create(&ns, n);
//! let entry = MapEntryNodeBuilder::new()
//!     .with_node_identifier(PathArgument::with_predicate(q("list1")?, q("name")?, "a"))
//!     .with_child(NormalizedNode::leaf(q("name")?, "a"))
//!     .build()?;
//! let list = MapNodeBuilder::new().with_node_identifier(q("list1")?).with_child(entry).build()?;
//! let cont = ContainerNodeBuilder::new().with_node_identifier(q("cont")?).with_child(list).build()?;
//! assert_eq!(cont.children().map(|c| c.len()), Some(1));
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use yangkit_core::{PathArgument, QName, Value};

use crate::error::{DataTreeError, DataTreeResult};
use crate::node::{Children, ContainerNode, LeafNode, LeafSetNode, MapEntryNode, MapNode, NormalizedNode};

fn missing_identifier(node: &'static str) -> DataTreeError {
    DataTreeError::IncompleteNode {
        node: node.to_string(),
        reason: "no node identifier set".to_string(),
    }
}

fn collect_children(parent: &str, children: Vec<NormalizedNode>) -> DataTreeResult<Children> {
    let mut out = Children::new();
    for child in children {
        let id = child.identifier();
        if out.contains_key(&id) {
            return Err(DataTreeError::DuplicateChild {
                parent: parent.to_string(),
                child: id.to_string(),
            });
        }
        out.insert(id, Arc::new(child));
    }
    Ok(out)
}

// ─── Container ───────────────────────────────────────────────────────

/// Builds a container node.
#[derive(Debug, Default)]
pub struct ContainerNodeBuilder {
    identifier: Option<QName>,
    children: Vec<NormalizedNode>,
}

impl ContainerNodeBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the container's name.
    pub fn with_node_identifier(mut self, identifier: QName) -> Self {
        self.identifier = Some(identifier);
        self
    }

    /// Add a child.
    pub fn with_child(mut self, child: NormalizedNode) -> Self {
        self.children.push(child);
        self
    }

    /// Build the container.
    pub fn build(self) -> DataTreeResult<NormalizedNode> {
        let identifier = self.identifier.ok_or_else(|| missing_identifier("container"))?;
        let children = collect_children(identifier.local_name(), self.children)?;
        Ok(NormalizedNode::Container(ContainerNode { identifier, children }))
    }
}

// ─── Map ─────────────────────────────────────────────────────────────

/// Builds a map node, the data of one list.
#[derive(Debug, Default)]
pub struct MapNodeBuilder {
    identifier: Option<QName>,
    entries: Vec<NormalizedNode>,
}

impl MapNodeBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the list's name.
    pub fn with_node_identifier(mut self, identifier: QName) -> Self {
        self.identifier = Some(identifier);
        self
    }

    /// Add an entry. It must be a map entry of this list.
    pub fn with_child(mut self, entry: NormalizedNode) -> Self {
        self.entries.push(entry);
        self
    }

    /// Build the map. Fails on an entry of another list, a node that is
    /// not a map entry, or two entries with the same keys.
    pub fn build(self) -> DataTreeResult<NormalizedNode> {
        let identifier = self.identifier.ok_or_else(|| missing_identifier("map"))?;
        for entry in &self.entries {
            let matches = matches!(entry, NormalizedNode::MapEntry(e) if e.node_type == identifier);
            if !matches {
                return Err(DataTreeError::EntryTypeMismatch {
                    map: identifier.local_name().to_string(),
                    entry: entry.identifier().to_string(),
                });
            }
        }
        let entries = collect_children(identifier.local_name(), self.entries)?;
        Ok(NormalizedNode::Map(MapNode { identifier, entries }))
    }
}

// ─── Map Entry ───────────────────────────────────────────────────────

/// Builds one list entry.
///
/// Key leaves are not added automatically; add them as children.
#[derive(Debug, Default)]
pub struct MapEntryNodeBuilder {
    identifier: Option<PathArgument>,
    children: Vec<NormalizedNode>,
}

impl MapEntryNodeBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry identifier. Must carry predicates.
    pub fn with_node_identifier(mut self, identifier: PathArgument) -> Self {
        self.identifier = Some(identifier);
        self
    }

    /// Add a child.
    pub fn with_child(mut self, child: NormalizedNode) -> Self {
        self.children.push(child);
        self
    }

    /// Build the entry.
    pub fn build(self) -> DataTreeResult<NormalizedNode> {
        let identifier = self.identifier.ok_or_else(|| missing_identifier("map entry"))?;
        let (node_type, keys) = match identifier {
            PathArgument::NodeIdentifierWithPredicates { node_type, keys } => (node_type, keys),
            PathArgument::NodeIdentifier(q) => {
                return Err(DataTreeError::IncompleteNode {
                    node: q.local_name().to_string(),
                    reason: "map entry identifier has no key predicates".to_string(),
                })
            }
        };
        let label = PathArgument::with_predicates(node_type.clone(), keys.clone()).to_string();
        let children = collect_children(&label, self.children)?;
        Ok(NormalizedNode::MapEntry(MapEntryNode {
            node_type,
            keys,
            children,
        }))
    }
}

// ─── Leaf ────────────────────────────────────────────────────────────

/// Builds a leaf.
#[derive(Debug, Default)]
pub struct LeafNodeBuilder {
    identifier: Option<QName>,
    value: Option<Value>,
}

impl LeafNodeBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the leaf's name.
    pub fn with_node_identifier(mut self, identifier: QName) -> Self {
        self.identifier = Some(identifier);
        self
    }

    /// Set the value.
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Build the leaf.
    pub fn build(self) -> DataTreeResult<NormalizedNode> {
        let identifier = self.identifier.ok_or_else(|| missing_identifier("leaf"))?;
        let value = self.value.ok_or_else(|| DataTreeError::IncompleteNode {
            node: identifier.local_name().to_string(),
            reason: "leaf has no value".to_string(),
        })?;
        Ok(NormalizedNode::Leaf(LeafNode { identifier, value }))
    }
}

// ─── Leaf Set ────────────────────────────────────────────────────────

/// Builds a leaf-list.
#[derive(Debug, Default)]
pub struct LeafSetNodeBuilder {
    identifier: Option<QName>,
    values: Vec<Value>,
}

impl LeafSetNodeBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the leaf-list's name.
    pub fn with_node_identifier(mut self, identifier: QName) -> Self {
        self.identifier = Some(identifier);
        self
    }

    /// Append a value.
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.values.push(value.into());
        self
    }

    /// Build the leaf-list. Values must be distinct.
    pub fn build(self) -> DataTreeResult<NormalizedNode> {
        let identifier = self.identifier.ok_or_else(|| missing_identifier("leaf-list"))?;
        let mut seen = BTreeSet::new();
        for value in &self.values {
            if !seen.insert(value) {
                return Err(DataTreeError::DuplicateChild {
                    parent: identifier.local_name().to_string(),
                    child: value.to_string(),
                });
            }
        }
        Ok(NormalizedNode::LeafSet(LeafSetNode {
            identifier,
            values: self.values,
        }))
    }
}
