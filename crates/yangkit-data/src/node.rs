//! # Normalized Nodes
//!
//! The data representation stored in the tree. Each node is identified by
//! a [`PathArgument`]; containers, maps, and map entries hold their
//! children behind `Arc` so that successive tree versions share every
//! subtree a modification did not touch.
//!
//! A YANG list is a [`MapNode`] named after the list, whose children are
//! [`MapEntryNode`]s identified by the list name plus key predicates. The
//! instance path of an entry therefore names the list twice:
//! `/cont/cont2/list1/list1[name='x']`.

use std::collections::BTreeMap;
use std::sync::Arc;

use yangkit_core::{PathArgument, QName, Value};

/// Children of a container, map, or map entry, keyed by identifier.
pub type Children = BTreeMap<PathArgument, Arc<NormalizedNode>>;

/// A `container`, and the data tree root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerNode {
    pub(crate) identifier: QName,
    pub(crate) children: Children,
}

/// All entries of one `list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapNode {
    pub(crate) identifier: QName,
    pub(crate) entries: Children,
}

/// One `list` entry, identified by its key values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntryNode {
    pub(crate) node_type: QName,
    pub(crate) keys: BTreeMap<QName, Value>,
    pub(crate) children: Children,
}

/// A `leaf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafNode {
    pub(crate) identifier: QName,
    pub(crate) value: Value,
}

/// A `leaf-list`, values in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafSetNode {
    pub(crate) identifier: QName,
    pub(crate) values: Vec<Value>,
}

/// A node of the data tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedNode {
    /// Container or tree root.
    Container(ContainerNode),
    /// List.
    Map(MapNode),
    /// List entry.
    MapEntry(MapEntryNode),
    /// Leaf.
    Leaf(LeafNode),
    /// Leaf-list.
    LeafSet(LeafSetNode),
}

impl ContainerNode {
    /// Child nodes.
    pub fn children(&self) -> &Children {
        &self.children
    }
}

impl MapNode {
    /// Entries, keyed by their predicates.
    pub fn entries(&self) -> &Children {
        &self.entries
    }
}

impl MapEntryNode {
    /// Key leaf values from the entry's identifier.
    pub fn keys(&self) -> &BTreeMap<QName, Value> {
        &self.keys
    }

    /// Child nodes, key leaves included.
    pub fn children(&self) -> &Children {
        &self.children
    }
}

impl LeafNode {
    /// The leaf value.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl LeafSetNode {
    /// Leaf-list values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl NormalizedNode {
    /// A leaf.
    pub fn leaf(identifier: QName, value: impl Into<Value>) -> Self {
        Self::Leaf(LeafNode {
            identifier,
            value: value.into(),
        })
    }

    /// An empty container.
    pub fn empty_container(identifier: QName) -> Self {
        Self::Container(ContainerNode {
            identifier,
            children: Children::new(),
        })
    }

    /// An empty tree root.
    pub fn empty_root() -> Self {
        Self::empty_container(QName::data_root())
    }

    /// An empty map.
    pub(crate) fn empty_map(identifier: QName) -> Self {
        Self::Map(MapNode {
            identifier,
            entries: Children::new(),
        })
    }

    /// A map entry holding only its key leaves.
    pub(crate) fn entry_with_keys(node_type: QName, keys: BTreeMap<QName, Value>) -> Self {
        let children = keys
            .iter()
            .map(|(k, v)| {
                (
                    PathArgument::NodeIdentifier(k.clone()),
                    Arc::new(Self::leaf(k.clone(), v.clone())),
                )
            })
            .collect();
        Self::MapEntry(MapEntryNode {
            node_type,
            keys,
            children,
        })
    }

    /// The identifier this node sits under in its parent.
    pub fn identifier(&self) -> PathArgument {
        match self {
            Self::MapEntry(e) => PathArgument::NodeIdentifierWithPredicates {
                node_type: e.node_type.clone(),
                keys: e.keys.clone(),
            },
            other => PathArgument::NodeIdentifier(other.node_type().clone()),
        }
    }

    /// The node's name. For a map entry, the list name.
    pub fn node_type(&self) -> &QName {
        match self {
            Self::Container(n) => &n.identifier,
            Self::Map(n) => &n.identifier,
            Self::MapEntry(n) => &n.node_type,
            Self::Leaf(n) => &n.identifier,
            Self::LeafSet(n) => &n.identifier,
        }
    }

    /// Node kind, for messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Container(_) => "container",
            Self::Map(_) => "list",
            Self::MapEntry(_) => "list entry",
            Self::Leaf(_) => "leaf",
            Self::LeafSet(_) => "leaf-list",
        }
    }

    /// Children of a container, map, or map entry.
    pub fn children(&self) -> Option<&Children> {
        match self {
            Self::Container(n) => Some(&n.children),
            Self::Map(n) => Some(&n.entries),
            Self::MapEntry(n) => Some(&n.children),
            Self::Leaf(_) | Self::LeafSet(_) => None,
        }
    }

    fn children_mut(&mut self) -> Option<&mut Children> {
        match self {
            Self::Container(n) => Some(&mut n.children),
            Self::Map(n) => Some(&mut n.entries),
            Self::MapEntry(n) => Some(&mut n.children),
            Self::Leaf(_) | Self::LeafSet(_) => None,
        }
    }

    /// One child by identifier.
    pub fn child(&self, arg: &PathArgument) -> Option<&Arc<NormalizedNode>> {
        self.children()?.get(arg)
    }

    /// The value of a leaf.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Leaf(n) => Some(&n.value),
            _ => None,
        }
    }

    /// A copy of this node with the child at `arg` replaced, inserted, or
    /// (with `None`) removed. Other children are shared.
    ///
    /// Leaves and leaf-lists have no children and are returned unchanged.
    pub(crate) fn with_child(&self, arg: &PathArgument, child: Option<Arc<NormalizedNode>>) -> Self {
        let mut copy = self.clone();
        if let Some(children) = copy.children_mut() {
            match child {
                Some(c) => {
                    children.insert(arg.clone(), c);
                }
                None => {
                    children.remove(arg);
                }
            }
        }
        copy
    }

    /// Follow `path` below this node.
    pub fn find(&self, path: &[PathArgument]) -> Option<&NormalizedNode> {
        let mut node = self;
        for arg in path {
            node = node.child(arg)?;
        }
        Some(node)
    }
}

/// Follow `path` from `root`, returning the shared subtree.
pub(crate) fn find_arc(root: &Arc<NormalizedNode>, path: &[PathArgument]) -> Option<Arc<NormalizedNode>> {
    let mut node = root;
    for arg in path {
        node = node.child(arg)?;
    }
    Some(Arc::clone(node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use yangkit_core::QNameModule;

    fn q(name: &str) -> QName {
        QName::create(&QNameModule::create("urn:test", None).unwrap(), name).unwrap()
    }

    #[test]
    fn test_entry_with_keys_holds_key_leaves() {
        let mut keys = BTreeMap::new();
        keys.insert(q("name"), Value::from("a"));
        let entry = NormalizedNode::entry_with_keys(q("list1"), keys.clone());
        assert_eq!(entry.identifier(), PathArgument::with_predicates(q("list1"), keys));
        let leaf = entry.child(&PathArgument::node(q("name"))).unwrap();
        assert_eq!(leaf.value(), Some(&Value::from("a")));
    }

    #[test]
    fn test_with_child_shares_untouched_children() {
        let a = Arc::new(NormalizedNode::leaf(q("a"), "1"));
        let root = NormalizedNode::empty_root().with_child(&PathArgument::node(q("a")), Some(Arc::clone(&a)));
        let updated = root.with_child(&PathArgument::node(q("b")), Some(Arc::new(NormalizedNode::leaf(q("b"), "2"))));
        let shared = updated.child(&PathArgument::node(q("a"))).unwrap();
        assert!(Arc::ptr_eq(shared, &a));
        assert_eq!(updated.children().unwrap().len(), 2);

        let removed = updated.with_child(&PathArgument::node(q("a")), None);
        assert!(removed.child(&PathArgument::node(q("a"))).is_none());
    }

    #[test]
    fn test_find_walks_nested_path() {
        let inner = NormalizedNode::empty_container(q("inner"))
            .with_child(&PathArgument::node(q("x")), Some(Arc::new(NormalizedNode::leaf(q("x"), true))));
        let root = NormalizedNode::empty_root().with_child(&PathArgument::node(q("inner")), Some(Arc::new(inner)));
        let found = root.find(&[PathArgument::node(q("inner")), PathArgument::node(q("x"))]).unwrap();
        assert_eq!(found.value(), Some(&Value::Boolean(true)));
        assert!(root.find(&[PathArgument::node(q("missing"))]).is_none());
    }
}
