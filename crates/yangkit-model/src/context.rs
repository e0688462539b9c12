//! # Schema Context
//!
//! The immutable, linked set of modules a data tree is validated against.
//! Built once by the parser and shared behind an `Arc`.
//!
//! ## Lookups
//!
//! - [`SchemaContext::find_module`] by name and optional revision. Without
//!   a revision the latest one is returned.
//! - [`SchemaContext::data_child`] / [`SchemaContext::find_data_tree_child`]
//!   by QName path from the root of the combined data tree.
//! - [`SchemaContext::resolve_leafref`] follows a leafref path (predicates
//!   ignored) to its target leaf.

use std::collections::HashSet;
use std::sync::Arc;

use yangkit_core::{QName, QNameModule};

use crate::definitions::{IdentitySchemaNode, RpcDefinition};
use crate::module::Module;
use crate::node::{find_data_tree_child, DataSchemaNode};
use crate::types::{IdentityResolver, LeafRefPath, LeafRefStep};

/// A linked set of modules.
#[derive(Debug, Clone, Default)]
pub struct SchemaContext {
    /// Modules sorted by (name, revision).
    modules: Vec<Arc<Module>>,
}

impl SchemaContext {
    /// Assemble a context from linked modules.
    pub fn new(modules: Vec<Module>) -> Self {
        let mut modules: Vec<Arc<Module>> = modules.into_iter().map(Arc::new).collect();
        modules.sort_by(|a, b| a.name.cmp(&b.name).then(a.revision().cmp(&b.revision())));
        Self { modules }
    }

    /// All modules, sorted by name then revision.
    pub fn modules(&self) -> &[Arc<Module>] {
        &self.modules
    }

    /// Find a module by name. With `revision == None` the latest revision
    /// is returned.
    pub fn find_module(&self, name: &str, revision: Option<yangkit_core::Revision>) -> Option<&Module> {
        let mut candidates = self.modules.iter().filter(|m| m.name == name);
        match revision {
            Some(rev) => candidates.find(|m| m.revision() == Some(rev)).map(Arc::as_ref),
            None => candidates.max_by_key(|m| m.revision()).map(Arc::as_ref),
        }
    }

    /// Find the module that owns a namespace and revision.
    pub fn find_module_by_namespace(&self, module: &QNameModule) -> Option<&Module> {
        self.modules
            .iter()
            .find(|m| &m.qname_module == module)
            .map(Arc::as_ref)
    }

    /// Find a top-level data node of any module.
    pub fn data_child(&self, qname: &QName) -> Option<&DataSchemaNode> {
        self.find_module_by_namespace(qname.module())?.data_child(qname)
    }

    /// Walk a data-tree path from the root.
    pub fn find_data_tree_child(&self, path: &[QName]) -> Option<&DataSchemaNode> {
        let first = path.first()?;
        let module = self.find_module_by_namespace(first.module())?;
        find_data_tree_child(&module.child_nodes, path)
    }

    /// All RPCs across modules.
    pub fn rpcs(&self) -> impl Iterator<Item = &RpcDefinition> {
        self.modules.iter().flat_map(|m| m.rpcs.iter())
    }

    /// Find an identity by QName.
    pub fn find_identity(&self, qname: &QName) -> Option<&IdentitySchemaNode> {
        self.find_module_by_namespace(qname.module())?
            .identities
            .iter()
            .find(|i| &i.qname == qname)
    }

    /// Whether `derived` is derived, directly or transitively, from `base`.
    pub fn is_identity_derived_from(&self, derived: &QName, base: &QName) -> bool {
        IdentityResolver::is_derived_from(self, derived, base)
    }

    /// Follow a leafref path to its target leaf or leaf-list.
    ///
    /// `context` is the data-tree path of the leaf holding the reference.
    /// Predicates are not evaluated; the result is the schema node the path
    /// names.
    pub fn resolve_leafref(&self, context: &[QName], path: &LeafRefPath) -> Option<&DataSchemaNode> {
        let mut target: Vec<QName> = if path.absolute { Vec::new() } else { context.to_vec() };
        for step in &path.steps {
            match step {
                LeafRefStep::Parent => {
                    target.pop()?;
                }
                LeafRefStep::Child { name, .. } => target.push(name.clone()),
            }
        }
        match self.find_data_tree_child(&target)? {
            node @ (DataSchemaNode::Leaf(_) | DataSchemaNode::LeafList(_)) => Some(node),
            _ => None,
        }
    }
}

impl IdentityResolver for SchemaContext {
    fn resolve_identity(&self, text: &str, default_module: &QNameModule) -> Option<QName> {
        let (module, local) = match text.split_once(':') {
            Some((module_name, local)) => (self.find_module(module_name, None)?, local),
            None => (self.find_module_by_namespace(default_module)?, text),
        };
        module.identity(local).map(|i| i.qname.clone())
    }

    fn is_derived_from(&self, identity: &QName, base: &QName) -> bool {
        let mut seen = HashSet::new();
        let mut stack: Vec<&QName> = match self.find_identity(identity) {
            Some(node) => node.bases.iter().collect(),
            None => return false,
        };
        while let Some(current) = stack.pop() {
            if current == base {
                return true;
            }
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(node) = self.find_identity(current) {
                stack.extend(node.bases.iter());
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::YangVersion;
    use crate::node::{ContainerSchemaNode, LeafSchemaNode, SchemaNodeInfo};
    use crate::types::YangType;
    use yangkit_core::Revision;

    fn module(name: &str, rev: Option<&str>) -> Module {
        let qm = QNameModule::create(format!("urn:{name}"), rev.map(|r| Revision::of(r).unwrap())).unwrap();
        Module {
            name: name.to_string(),
            qname_module: qm,
            prefix: name.to_string(),
            yang_version: YangVersion::V1_1,
            organization: None,
            contact: None,
            description: None,
            revisions: Vec::new(),
            imports: Vec::new(),
            submodules: Vec::new(),
            typedefs: Vec::new(),
            groupings: Vec::new(),
            augmentations: Vec::new(),
            rpcs: Vec::new(),
            notifications: Vec::new(),
            identities: Vec::new(),
            features: Vec::new(),
            child_nodes: Vec::new(),
        }
    }

    fn identity(m: &Module, name: &str, bases: &[&str]) -> IdentitySchemaNode {
        IdentitySchemaNode {
            qname: m.qname(name).unwrap(),
            bases: bases.iter().map(|b| m.qname(b).unwrap()).collect(),
            description: None,
            status: Default::default(),
        }
    }

    #[test]
    fn test_find_module_latest_revision() {
        let ctx = SchemaContext::new(vec![
            module("m", Some("2013-07-15")),
            module("m", Some("2018-02-26")),
            module("other", None),
        ]);
        assert_eq!(ctx.find_module("m", None).unwrap().revision().unwrap().to_string(), "2018-02-26");
        let pinned = ctx.find_module("m", Some(Revision::of("2013-07-15").unwrap())).unwrap();
        assert_eq!(pinned.revision().unwrap().to_string(), "2013-07-15");
        assert!(ctx.find_module("m", Some(Revision::of("2000-01-01").unwrap())).is_none());
        assert!(ctx.find_module("other", None).is_some());
        assert!(ctx.find_module("missing", None).is_none());
    }

    #[test]
    fn test_identity_derivation_is_transitive_and_strict() {
        let mut m = module("ids", None);
        m.identities = vec![
            identity(&m, "base", &[]),
            identity(&m, "mid", &["base"]),
            identity(&m, "leaf", &["mid"]),
        ];
        let base = m.qname("base").unwrap();
        let leaf = m.qname("leaf").unwrap();
        let ns = m.qname_module.clone();
        let ctx = SchemaContext::new(vec![m]);

        assert!(ctx.is_derived_from(&leaf, &base));
        assert!(!ctx.is_derived_from(&base, &base));
        assert_eq!(ctx.resolve_identity("leaf", &ns), Some(leaf.clone()));
        assert_eq!(ctx.resolve_identity("ids:leaf", &ns), Some(leaf));
        assert_eq!(ctx.resolve_identity("nope", &ns), None);
    }

    #[test]
    fn test_resolve_leafref_relative() {
        let mut m = module("lr", None);
        let leaf = |name: &str| {
            DataSchemaNode::Leaf(LeafSchemaNode {
                info: SchemaNodeInfo::new(m.qname(name).unwrap()),
                type_: YangType::string(),
                default: None,
                mandatory: false,
                units: None,
            })
        };
        let top = DataSchemaNode::Container(ContainerSchemaNode {
            info: SchemaNodeInfo::new(m.qname("top").unwrap()),
            presence: None,
            children: vec![leaf("target"), leaf("ref")],
        });
        m.child_nodes = vec![top];
        let top_q = m.qname("top").unwrap();
        let ref_q = m.qname("ref").unwrap();
        let target_q = m.qname("target").unwrap();
        let ctx = SchemaContext::new(vec![m]);

        let path = LeafRefPath {
            text: "../target".into(),
            absolute: false,
            steps: vec![
                LeafRefStep::Parent,
                LeafRefStep::Child {
                    name: target_q.clone(),
                    has_predicate: false,
                },
            ],
        };
        let resolved = ctx.resolve_leafref(&[top_q, ref_q], &path).unwrap();
        assert_eq!(resolved.qname(), &target_q);
    }
}
