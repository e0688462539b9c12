//! # Validator Configuration
//!
//! Which schema sources the validation procedure loads, which module and
//! node it inspects, and what kind of data tree it writes to. Loaded from
//! YAML with `--config`; every field is optional and defaults to the
//! bundled resources.
//!
//! ```yaml
//! resource_root: resources
//! main_sources:
//!   - /mainSources/ietf-network@2018-02-26.yang
//!   - /mainSources/ietf-network-topology@2018-02-26.yang
//! lib_sources:
//!   - /all_the_modules/ietf-inet-types@2013-07-15.yang
//! target_module: ietf-network-topology
//! target_revision: "2018-02-26"
//! target_node: cont/cont2/foo
//! tree_type: configuration
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use yangkit_core::Revision;
use yangkit_data::TreeType;

/// Settings for the validation procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Directory resource paths are relative to. Relative values are
    /// resolved against the repository root.
    pub resource_root: PathBuf,
    /// Sources that always take part in the schema context.
    pub main_sources: Vec<String>,
    /// Sources that take part only when imported.
    pub lib_sources: Vec<String>,
    /// Module to look up after the context is built.
    pub target_module: String,
    /// Revision of the target module, `YYYY-MM-DD`. Latest if absent.
    pub target_revision: Option<String>,
    /// Slash-separated data-tree path of the node to look up.
    pub target_node: String,
    /// `module:feature` names to support. All features if absent.
    pub supported_features: Option<BTreeSet<String>>,
    /// Kind of data tree to write to.
    pub tree_type: TreeType,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            resource_root: PathBuf::from("resources"),
            main_sources: vec![
                "/mainSources/ietf-network@2018-02-26.yang".to_string(),
                "/mainSources/ietf-network-topology@2018-02-26.yang".to_string(),
            ],
            lib_sources: vec!["/all_the_modules/ietf-inet-types@2013-07-15.yang".to_string()],
            target_module: "ietf-network-topology".to_string(),
            target_revision: Some("2018-02-26".to_string()),
            target_node: "cont/cont2/foo".to_string(),
            supported_features: None,
            tree_type: TreeType::Configuration,
        }
    }
}

impl ValidatorConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("parsing validator config YAML")
    }

    /// Read and parse a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading validator config: {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// The target revision, parsed.
    pub fn revision(&self) -> Result<Option<Revision>> {
        self.target_revision
            .as_deref()
            .map(|r| Revision::of(r).with_context(|| format!("invalid target_revision '{r}'")))
            .transpose()
    }

    /// Path segments of `target_node`.
    pub fn target_segments(&self) -> Vec<&str> {
        self.target_node.split('/').filter(|s| !s.is_empty()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reproduces_bundled_procedure() {
        let config = ValidatorConfig::default();
        assert_eq!(config.main_sources.len(), 2);
        assert_eq!(config.lib_sources.len(), 1);
        assert_eq!(config.target_segments(), vec!["cont", "cont2", "foo"]);
        assert_eq!(config.revision().unwrap().unwrap().to_string(), "2018-02-26");
        assert_eq!(config.tree_type, TreeType::Configuration);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ValidatorConfig::from_yaml_str("tree_type: operational\ntarget_revision: null\n").unwrap();
        assert_eq!(config.tree_type, TreeType::Operational);
        assert!(config.revision().unwrap().is_none());
        assert_eq!(config.target_module, "ietf-network-topology");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = ValidatorConfig::from_yaml_str("target_modul: x\n").unwrap_err();
        assert!(format!("{err:#}").contains("target_modul"), "{err:#}");
    }

    #[test]
    fn test_invalid_revision_rejected() {
        let config = ValidatorConfig {
            target_revision: Some("2018-13-40".to_string()),
            ..ValidatorConfig::default()
        };
        assert!(config.revision().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("validator.yaml");
        std::fs::write(&path, "supported_features:\n  - ietf-network:foo\n").unwrap();
        let config = ValidatorConfig::load(&path).unwrap();
        let features = config.supported_features.unwrap();
        assert!(features.contains("ietf-network:foo"));
        assert!(ValidatorConfig::load(&dir.path().join("missing.yaml")).is_err());
    }
}
