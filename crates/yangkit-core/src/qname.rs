//! # Qualified Names
//!
//! Every schema and data node is named by a `QName`: the namespace and
//! revision of the module that defines it, plus a local name. Nodes that a
//! module contributes through `augment` keep that module's namespace even
//! though they live under another module's tree.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::revision::Revision;

/// Namespace of the NETCONF `data` element, which names the data tree root.
pub const DATA_ROOT_NAMESPACE: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// Whether `s` matches the YANG identifier grammar
/// `[A-Za-z_][A-Za-z0-9_.-]*`.
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// The namespace half of a qualified name: module namespace URI and
/// optional revision.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QNameModule {
    namespace: String,
    revision: Option<Revision>,
}

impl QNameModule {
    /// Create a module namespace.
    pub fn create(namespace: impl Into<String>, revision: Option<Revision>) -> Result<Self, CoreError> {
        let namespace = namespace.into();
        if namespace.is_empty() {
            return Err(CoreError::EmptyNamespace);
        }
        Ok(Self {
            namespace,
            revision,
        })
    }

    /// The namespace URI.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The module revision, if the module declares one.
    pub fn revision(&self) -> Option<Revision> {
        self.revision
    }
}

impl fmt::Display for QNameModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.revision {
            Some(rev) => write!(f, "{}?revision={}", self.namespace, rev),
            None => f.write_str(&self.namespace),
        }
    }
}

/// A namespace-qualified node name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QName {
    module: QNameModule,
    local_name: String,
}

impl QName {
    /// Create a qualified name, validating the local name.
    pub fn create(module: &QNameModule, local_name: impl Into<String>) -> Result<Self, CoreError> {
        let local_name = local_name.into();
        if !is_valid_identifier(&local_name) {
            return Err(CoreError::InvalidIdentifier { value: local_name });
        }
        Ok(Self {
            module: module.clone(),
            local_name,
        })
    }

    /// The name of the data tree root: `data` in [`DATA_ROOT_NAMESPACE`].
    pub fn data_root() -> Self {
        Self {
            module: QNameModule {
                namespace: DATA_ROOT_NAMESPACE.to_string(),
                revision: None,
            },
            local_name: "data".to_string(),
        }
    }

    /// The defining module's namespace.
    pub fn module(&self) -> &QNameModule {
        &self.module
    }

    /// The namespace URI.
    pub fn namespace(&self) -> &str {
        self.module.namespace()
    }

    /// The defining module's revision.
    pub fn revision(&self) -> Option<Revision> {
        self.module.revision()
    }

    /// The local name.
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// A name with the same local part in another module.
    pub fn bind_to(&self, module: &QNameModule) -> Self {
        Self {
            module: module.clone(),
            local_name: self.local_name.clone(),
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}){}", self.module, self.local_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn topo() -> QNameModule {
        QNameModule::create(
            "urn:ietf:params:xml:ns:yang:ietf-network-topology",
            Some(Revision::of("2018-02-26").unwrap()),
        )
        .unwrap()
    }

    #[test]
    fn test_data_root_name() {
        let root = QName::data_root();
        assert_eq!(root.local_name(), "data");
        assert_eq!(root.namespace(), DATA_ROOT_NAMESPACE);
        assert!(root.revision().is_none());
    }

    #[test]
    fn test_create_qname() {
        let q = QName::create(&topo(), "cont").unwrap();
        assert_eq!(q.local_name(), "cont");
        assert_eq!(q.revision().unwrap().to_string(), "2018-02-26");
    }

    #[test]
    fn test_reject_bad_identifiers() {
        assert!(QName::create(&topo(), "").is_err());
        assert!(QName::create(&topo(), "1abc").is_err());
        assert!(QName::create(&topo(), "a b").is_err());
        assert!(QName::create(&topo(), "a:b").is_err());
    }

    #[test]
    fn test_identifier_allows_dots_and_dashes() {
        assert!(is_valid_identifier("ietf-inet-types"));
        assert!(is_valid_identifier("_x.y-z"));
    }

    #[test]
    fn test_empty_namespace_rejected() {
        assert_eq!(QNameModule::create("", None), Err(CoreError::EmptyNamespace));
    }

    #[test]
    fn test_display_includes_namespace_and_revision() {
        let q = QName::create(&topo(), "list1").unwrap();
        assert_eq!(
            q.to_string(),
            "(urn:ietf:params:xml:ns:yang:ietf-network-topology?revision=2018-02-26)list1"
        );
    }

    #[test]
    fn test_same_local_name_different_module_differs() {
        let other = QNameModule::create("urn:example", None).unwrap();
        let a = QName::create(&topo(), "name").unwrap();
        let b = a.bind_to(&other);
        assert_ne!(a, b);
        assert_eq!(a.local_name(), b.local_name());
    }

    proptest! {
        #[test]
        fn prop_generated_identifiers_are_valid(s in "[A-Za-z_][A-Za-z0-9_.-]{0,20}") {
            prop_assert!(is_valid_identifier(&s));
            prop_assert!(QName::create(&topo(), s).is_ok());
        }
    }
}
