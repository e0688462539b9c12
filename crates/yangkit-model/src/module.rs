//! # Modules
//!
//! A `Module` is one parsed schema unit after linking: included submodules
//! are merged in, `uses` are expanded, and augmentations from other modules
//! have been applied to its data tree.

use std::fmt;

use yangkit_core::{QName, QNameModule, Revision};

use crate::definitions::{
    AugmentationSchemaNode, FeatureDefinition, GroupingDefinition, IdentitySchemaNode, ModuleImport,
    NotificationDefinition, RpcDefinition,
};
use crate::node::{find_data_tree_child, find_in_children, DataSchemaNode};
use crate::types::TypeDefinitionNode;

/// `yang-version`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum YangVersion {
    /// YANG 1.0 (RFC 6020), the default when the statement is absent.
    #[default]
    V1,
    /// YANG 1.1 (RFC 7950).
    V1_1,
}

impl fmt::Display for YangVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => f.write_str("1"),
            Self::V1_1 => f.write_str("1.1"),
        }
    }
}

/// A linked module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Module name.
    pub name: String,
    /// Namespace and latest revision.
    pub qname_module: QNameModule,
    /// Module prefix.
    pub prefix: String,
    /// `yang-version`.
    pub yang_version: YangVersion,
    /// `organization`.
    pub organization: Option<String>,
    /// `contact`.
    pub contact: Option<String>,
    /// `description`.
    pub description: Option<String>,
    /// Revision history, newest first.
    pub revisions: Vec<Revision>,
    /// Imports.
    pub imports: Vec<ModuleImport>,
    /// Names of included submodules.
    pub submodules: Vec<String>,
    /// Module-level typedefs.
    pub typedefs: Vec<TypeDefinitionNode>,
    /// Module-level groupings.
    pub groupings: Vec<GroupingDefinition>,
    /// Top-level augmentations this module declares.
    pub augmentations: Vec<AugmentationSchemaNode>,
    /// RPCs.
    pub rpcs: Vec<RpcDefinition>,
    /// Notifications.
    pub notifications: Vec<NotificationDefinition>,
    /// Identities.
    pub identities: Vec<IdentitySchemaNode>,
    /// Features.
    pub features: Vec<FeatureDefinition>,
    /// Top-level data nodes, including nodes other modules augmented in.
    pub child_nodes: Vec<DataSchemaNode>,
}

impl Module {
    /// Module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Latest revision, if any.
    pub fn revision(&self) -> Option<Revision> {
        self.qname_module.revision()
    }

    /// Namespace and revision as a `QNameModule`.
    pub fn qname_module(&self) -> &QNameModule {
        &self.qname_module
    }

    /// Create a QName in this module's namespace.
    pub fn qname(&self, local_name: &str) -> Result<QName, yangkit_core::CoreError> {
        QName::create(&self.qname_module, local_name)
    }

    /// Module-level groupings.
    pub fn groupings(&self) -> &[GroupingDefinition] {
        &self.groupings
    }

    /// Augmentations this module declares.
    pub fn augmentations(&self) -> &[AugmentationSchemaNode] {
        &self.augmentations
    }

    /// RPCs.
    pub fn rpcs(&self) -> &[RpcDefinition] {
        &self.rpcs
    }

    /// Top-level data nodes.
    pub fn child_nodes(&self) -> &[DataSchemaNode] {
        &self.child_nodes
    }

    /// Find a top-level data node, looking through choices.
    pub fn data_child(&self, qname: &QName) -> Option<&DataSchemaNode> {
        find_in_children(&self.child_nodes, qname)
    }

    /// Walk a data-tree path starting at this module's top-level nodes.
    pub fn find_data_tree_child(&self, path: &[QName]) -> Option<&DataSchemaNode> {
        find_data_tree_child(&self.child_nodes, path)
    }

    /// Find an identity declared by this module.
    pub fn identity(&self, local_name: &str) -> Option<&IdentitySchemaNode> {
        self.identities.iter().find(|i| i.qname.local_name() == local_name)
    }

    /// `name@revision`, or just `name` when unrevisioned.
    pub fn source_name(&self) -> String {
        match self.revision() {
            Some(rev) => format!("{}@{}", self.name, rev),
            None => self.name.clone(),
        }
    }
}
