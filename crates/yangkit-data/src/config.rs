//! # Data Tree Configuration
//!
//! What kind of data a tree holds and which schema checks run at
//! validation.

use serde::{Deserialize, Serialize};

/// Which data a tree holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeType {
    /// Configuration data only. `config false` nodes are rejected.
    Configuration,
    /// Configuration and state data.
    Operational,
}

impl std::fmt::Display for TreeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration => f.write_str("configuration"),
            Self::Operational => f.write_str("operational"),
        }
    }
}

/// Settings fixed when a data tree is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTreeConfiguration {
    /// Which data the tree holds.
    pub tree_type: TreeType,
    /// Reject trees missing mandatory nodes.
    pub mandatory_validation: bool,
    /// Enforce `unique` statements on lists.
    pub unique_validation: bool,
}

/// Configuration tree, mandatory and unique checks on.
pub const DEFAULT_CONFIGURATION: DataTreeConfiguration = DataTreeConfiguration {
    tree_type: TreeType::Configuration,
    mandatory_validation: true,
    unique_validation: true,
};

/// Operational tree, mandatory and unique checks on.
pub const DEFAULT_OPERATIONAL: DataTreeConfiguration = DEFAULT_CONFIGURATION.with_tree_type(TreeType::Operational);

impl DataTreeConfiguration {
    /// Change the tree type.
    pub const fn with_tree_type(mut self, tree_type: TreeType) -> Self {
        self.tree_type = tree_type;
        self
    }

    /// Toggle mandatory-node validation.
    pub const fn with_mandatory_validation(mut self, enabled: bool) -> Self {
        self.mandatory_validation = enabled;
        self
    }

    /// Toggle unique-constraint validation.
    pub const fn with_unique_validation(mut self, enabled: bool) -> Self {
        self.unique_validation = enabled;
        self
    }
}

impl Default for DataTreeConfiguration {
    fn default() -> Self {
        DEFAULT_CONFIGURATION
    }
}
