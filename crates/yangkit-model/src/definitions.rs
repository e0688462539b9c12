//! # Module-Level Definitions
//!
//! Groupings, augmentations, RPCs, notifications, identities, features, and
//! imports: the statements a module declares besides its data tree.

use yangkit_core::{QName, Revision};

use crate::node::{DataSchemaNode, Status};

/// A `grouping`, instantiated in its defining module's namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupingDefinition {
    /// Grouping name.
    pub qname: QName,
    /// `description`.
    pub description: Option<String>,
    /// `status`.
    pub status: Status,
    /// Nodes the grouping defines.
    pub children: Vec<DataSchemaNode>,
}

/// A top-level `augment`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AugmentationSchemaNode {
    /// Absolute schema node identifier of the target, resolved to QNames.
    pub target_path: Vec<QName>,
    /// `when` expression text.
    pub when: Option<String>,
    /// `description`.
    pub description: Option<String>,
    /// `status`.
    pub status: Status,
    /// Nodes added to the target.
    pub children: Vec<DataSchemaNode>,
}

/// An `rpc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcDefinition {
    /// RPC name.
    pub qname: QName,
    /// `description`.
    pub description: Option<String>,
    /// `status`.
    pub status: Status,
    /// `input` children.
    pub input: Vec<DataSchemaNode>,
    /// `output` children.
    pub output: Vec<DataSchemaNode>,
}

/// A top-level `notification`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDefinition {
    /// Notification name.
    pub qname: QName,
    /// `description`.
    pub description: Option<String>,
    /// `status`.
    pub status: Status,
    /// Notification content.
    pub children: Vec<DataSchemaNode>,
}

/// An `identity`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySchemaNode {
    /// Identity name.
    pub qname: QName,
    /// Direct base identities.
    pub bases: Vec<QName>,
    /// `description`.
    pub description: Option<String>,
    /// `status`.
    pub status: Status,
}

/// A `feature`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureDefinition {
    /// Feature name.
    pub qname: QName,
    /// `description`.
    pub description: Option<String>,
    /// Whether the feature was enabled for this build.
    pub supported: bool,
}

/// An `import`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleImport {
    /// Imported module name.
    pub module_name: String,
    /// Local prefix for the imported module.
    pub prefix: String,
    /// `revision-date`, when pinned.
    pub revision: Option<Revision>,
    /// Revision that was actually linked.
    pub resolved_revision: Option<Revision>,
}
