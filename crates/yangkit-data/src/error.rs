//! # Data Tree Errors
//!
//! Failures from building nodes, applying modifications, validating data
//! against the schema, and committing candidates. Every variant names the
//! instance path it concerns, rendered as `/cont/cont2/list1[name='x']`.

use thiserror::Error;
use yangkit_model::ValueError;

/// Error raised by the data tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataTreeError {
    /// Validation needs a schema context and none was set.
    #[error("no schema context has been set on the data tree")]
    NoSchemaContext,

    // ─── Building and Applying ───────────────────────────────────────
    /// A builder was given two children with the same identifier.
    #[error("duplicate child {child} in {parent}")]
    DuplicateChild {
        /// The node being built.
        parent: String,
        /// The repeated child identifier.
        child: String,
    },

    /// A map builder was given an entry of another list.
    #[error("map {map} cannot hold entry {entry}")]
    EntryTypeMismatch {
        /// The map's name.
        map: String,
        /// The offending entry identifier.
        entry: String,
    },

    /// A builder is missing a required part.
    #[error("incomplete {node}: {reason}")]
    IncompleteNode {
        /// The node being built.
        node: String,
        /// What is missing.
        reason: String,
    },

    /// The node written does not carry the identifier the path ends in.
    #[error("node {actual} cannot be written at {path}")]
    IdentifierMismatch {
        /// The target path.
        path: String,
        /// The node's own identifier.
        actual: String,
    },

    /// A path runs through something that cannot have children, or
    /// addresses a list entry outside its map.
    #[error("invalid path {path}: {reason}")]
    InvalidPath {
        /// The offending path.
        path: String,
        /// Why it cannot be followed.
        reason: String,
    },

    // ─── Schema Validation ───────────────────────────────────────────
    /// Data names a node the schema does not define at that position.
    #[error("unknown node {node} at {path}")]
    UnknownNode {
        /// Parent path.
        path: String,
        /// The unknown child identifier.
        node: String,
    },

    /// Data has a different shape from its schema node.
    #[error("{path}: schema expects a {expected}, data holds a {actual}")]
    NodeKindMismatch {
        /// Node path.
        path: String,
        /// Schema node kind.
        expected: &'static str,
        /// Data node kind.
        actual: &'static str,
    },

    /// A leaf value is outside its type.
    #[error("invalid value at {path}: {source}")]
    InvalidValue {
        /// Leaf path.
        path: String,
        /// What the type rejected.
        #[source]
        source: ValueError,
    },

    /// List entry predicates and key leaves disagree with the schema or
    /// with each other.
    #[error("key mismatch at {path}: {reason}")]
    KeyMismatch {
        /// Entry path.
        path: String,
        /// What disagrees.
        reason: String,
    },

    /// A mandatory node is absent.
    #[error("missing mandatory node {node} under {path}")]
    MandatoryMissing {
        /// Parent path.
        path: String,
        /// The missing node.
        node: String,
    },

    /// A list or leaf-list violates min-elements or max-elements.
    #[error("{path} has {count} elements, allowed {allowed}")]
    Cardinality {
        /// List or leaf-list path.
        path: String,
        /// Actual number of elements.
        count: usize,
        /// Allowed range, e.g. `1..unbounded`.
        allowed: String,
    },

    /// Two list entries share values for a `unique` constraint.
    #[error("unique constraint ({leaves}) violated in {path} by entries {first} and {second}")]
    UniqueViolation {
        /// List path.
        path: String,
        /// The constrained leaves.
        leaves: String,
        /// First entry.
        first: String,
        /// Second entry.
        second: String,
    },

    /// Data is present in more than one case of a choice.
    #[error("choice {choice} at {path} has data in cases {cases}")]
    ChoiceConflict {
        /// Parent path.
        path: String,
        /// Choice name.
        choice: String,
        /// The cases that hold data.
        cases: String,
    },

    /// Configuration trees cannot hold `config false` data.
    #[error("{path} is state data and cannot be written to a configuration tree")]
    ConfigFalseWrite {
        /// Node path.
        path: String,
    },

    /// A leafref path does not lead to a leaf in the schema.
    #[error("leafref at {path} does not resolve: {target}")]
    LeafrefUnresolved {
        /// Leaf path.
        path: String,
        /// The leafref path text.
        target: String,
    },

    /// A `require-instance` leafref names a value no target leaf holds.
    #[error("leafref at {path} requires an instance of {target} with value {value}")]
    LeafrefMissingInstance {
        /// Leaf path.
        path: String,
        /// The leafref path text.
        target: String,
        /// The referring value.
        value: String,
    },

    // ─── Concurrency ─────────────────────────────────────────────────
    /// Another commit changed data this modification touches.
    #[error("data at {path} changed since the modification's base snapshot")]
    ConflictingModification {
        /// Modified path.
        path: String,
    },

    /// The tree moved on after the candidate was prepared.
    #[error("candidate prepared at version {base_version} but the tree is at version {current_version}")]
    StaleCandidate {
        /// Version the candidate was prepared against.
        base_version: u64,
        /// Current tree version.
        current_version: u64,
    },
}

/// Result type for data tree operations.
pub type DataTreeResult<T> = Result<T, DataTreeError>;
