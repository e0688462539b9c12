//! # Instance Identifiers
//!
//! A `YangInstanceIdentifier` addresses one node in a data tree as a
//! sequence of `PathArgument`s from the root. Containers, maps, and leaves
//! are addressed by a plain `NodeIdentifier`; individual list entries are
//! addressed by `NodeIdentifierWithPredicates`, which adds the entry's key
//! values.

use std::collections::BTreeMap;
use std::fmt;

use crate::qname::QName;
use crate::value::Value;

/// One step of an instance identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathArgument {
    /// A container, map, leaf, or leaf-set, identified by name.
    NodeIdentifier(QName),
    /// A list entry, identified by list name and key values.
    NodeIdentifierWithPredicates {
        /// The list's name.
        node_type: QName,
        /// Key leaf name to key value, ordered by key name.
        keys: BTreeMap<QName, Value>,
    },
}

impl PathArgument {
    /// Plain node identifier.
    pub fn node(qname: QName) -> Self {
        Self::NodeIdentifier(qname)
    }

    /// List entry identifier with a single key.
    pub fn with_predicate(node_type: QName, key: QName, value: impl Into<Value>) -> Self {
        let mut keys = BTreeMap::new();
        keys.insert(key, value.into());
        Self::NodeIdentifierWithPredicates { node_type, keys }
    }

    /// List entry identifier with an arbitrary key set.
    pub fn with_predicates(node_type: QName, keys: BTreeMap<QName, Value>) -> Self {
        Self::NodeIdentifierWithPredicates { node_type, keys }
    }

    /// The name of the node this argument addresses.
    pub fn node_type(&self) -> &QName {
        match self {
            Self::NodeIdentifier(q) => q,
            Self::NodeIdentifierWithPredicates { node_type, .. } => node_type,
        }
    }

    /// Key values, if this argument addresses a list entry.
    pub fn keys(&self) -> Option<&BTreeMap<QName, Value>> {
        match self {
            Self::NodeIdentifier(_) => None,
            Self::NodeIdentifierWithPredicates { keys, .. } => Some(keys),
        }
    }
}

impl fmt::Display for PathArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeIdentifier(q) => f.write_str(q.local_name()),
            Self::NodeIdentifierWithPredicates { node_type, keys } => {
                f.write_str(node_type.local_name())?;
                for (k, v) in keys {
                    write!(f, "[{}='{}']", k.local_name(), v)?;
                }
                Ok(())
            }
        }
    }
}

impl From<QName> for PathArgument {
    fn from(value: QName) -> Self {
        Self::NodeIdentifier(value)
    }
}

/// Path from the data tree root to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YangInstanceIdentifier(Vec<PathArgument>);

impl YangInstanceIdentifier {
    /// The root of the tree.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// A one-step path addressing a top-level node.
    pub fn of(qname: QName) -> Self {
        Self(vec![PathArgument::NodeIdentifier(qname)])
    }

    /// Build a path from its arguments.
    pub fn create(args: Vec<PathArgument>) -> Self {
        Self(args)
    }

    /// Extend this path by one step.
    pub fn node(mut self, arg: impl Into<PathArgument>) -> Self {
        self.0.push(arg.into());
        self
    }

    /// All path arguments, root first.
    pub fn path_arguments(&self) -> &[PathArgument] {
        &self.0
    }

    /// The last step, or `None` for the root.
    pub fn last(&self) -> Option<&PathArgument> {
        self.0.last()
    }

    /// The parent path, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the root path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `self` equals `other` or is one of its ancestors.
    pub fn contains(&self, other: &YangInstanceIdentifier) -> bool {
        other.0.len() >= self.0.len() && other.0[..self.0.len()] == self.0[..]
    }
}

impl fmt::Display for YangInstanceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for arg in &self.0 {
            write!(f, "/{arg}")?;
        }
        Ok(())
    }
}

impl FromIterator<PathArgument> for YangInstanceIdentifier {
    fn from_iter<T: IntoIterator<Item = PathArgument>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
