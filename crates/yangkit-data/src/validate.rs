//! # Schema Validation
//!
//! Checks a whole data tree against a [`SchemaContext`]:
//!
//! - every node is defined by the schema at its position, with a matching
//!   node kind;
//! - leaf values satisfy their types, leafrefs resolve and, with
//!   `require-instance`, name a value some target leaf holds;
//! - list entries carry predicates equal to their key leaves;
//! - min-elements and max-elements;
//! - `unique` constraints (when enabled);
//! - at most one case of each choice holds data;
//! - mandatory leaves, choices, and lists are present (when enabled);
//! - configuration trees hold no `config false` data.
//!
//! `must` and `when` expressions are not evaluated.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::trace;
use yangkit_core::{PathArgument, QName, Value, YangInstanceIdentifier};
use yangkit_model::{
    BaseType, ChoiceSchemaNode, DataSchemaNode, LeafRefPath, LeafRefStep, ListSchemaNode, SchemaContext, YangType,
};
use yangkit_model::node::find_in_children;

use crate::config::{DataTreeConfiguration, TreeType};
use crate::error::{DataTreeError, DataTreeResult};
use crate::node::{Children, MapEntryNode, NormalizedNode};

/// Leafrefs may point at leafrefs; stop following after this many hops.
pub(crate) const MAX_LEAFREF_CHAIN: usize = 16;

static EMPTY: Children = Children::new();

/// Validates one tree root.
pub(crate) struct Validator<'a> {
    schema: &'a SchemaContext,
    config: &'a DataTreeConfiguration,
    root: &'a NormalizedNode,
}

fn render(path: &[PathArgument]) -> String {
    YangInstanceIdentifier::create(path.to_vec()).to_string()
}

fn render_child(path: &[PathArgument], child: &QName) -> String {
    let mut full = path.to_vec();
    full.push(PathArgument::node(child.clone()));
    render(&full)
}

fn allowed_range(min: u64, max: Option<u64>) -> String {
    match max {
        Some(max) => format!("{min}..{max}"),
        None => format!("{min}..unbounded"),
    }
}

impl<'a> Validator<'a> {
    pub(crate) fn new(schema: &'a SchemaContext, config: &'a DataTreeConfiguration, root: &'a NormalizedNode) -> Self {
        Self { schema, config, root }
    }

    /// Validate the tree root and everything below it.
    pub(crate) fn validate(&self) -> DataTreeResult<()> {
        let children = match self.root {
            NormalizedNode::Container(c) if c.identifier == QName::data_root() => &c.children,
            other => {
                return Err(DataTreeError::NodeKindMismatch {
                    path: "/".to_string(),
                    expected: "container",
                    actual: other.kind(),
                })
            }
        };
        let mut path = Vec::new();
        let mut schema_path = Vec::new();
        for (arg, child) in children {
            let Some(node) = self.schema.data_child(arg.node_type()) else {
                return Err(DataTreeError::UnknownNode {
                    path: "/".to_string(),
                    node: arg.to_string(),
                });
            };
            self.validate_child(node, arg, child, &mut path, &mut schema_path)?;
        }
        for module in self.schema.modules() {
            self.check_choices(&module.child_nodes, children, &path)?;
            if self.config.mandatory_validation {
                self.check_mandatory(&module.child_nodes, children, &mut path)?;
            }
        }
        Ok(())
    }

    fn validate_child(
        &self,
        schema: &DataSchemaNode,
        arg: &PathArgument,
        data: &NormalizedNode,
        path: &mut Vec<PathArgument>,
        schema_path: &mut Vec<QName>,
    ) -> DataTreeResult<()> {
        path.push(arg.clone());
        schema_path.push(schema.qname().clone());
        let result = self.validate_node(schema, data, path, schema_path);
        schema_path.pop();
        path.pop();
        result
    }

    fn validate_node(
        &self,
        schema: &DataSchemaNode,
        data: &NormalizedNode,
        path: &mut Vec<PathArgument>,
        schema_path: &mut Vec<QName>,
    ) -> DataTreeResult<()> {
        trace!(path = %render(path), "validating");
        if self.config.tree_type == TreeType::Configuration && !schema.is_config() {
            return Err(DataTreeError::ConfigFalseWrite { path: render(path) });
        }
        match (schema, data) {
            (DataSchemaNode::Container(s), NormalizedNode::Container(d)) => {
                self.validate_children(&s.children, &d.children, path, schema_path)
            }
            (DataSchemaNode::List(s), NormalizedNode::Map(d)) => {
                self.check_cardinality(s.min_elements, s.max_elements, d.entries.len(), path)?;
                for (arg, entry) in &d.entries {
                    let NormalizedNode::MapEntry(e) = entry.as_ref() else {
                        return Err(DataTreeError::NodeKindMismatch {
                            path: render(path),
                            expected: "list entry",
                            actual: entry.kind(),
                        });
                    };
                    path.push(arg.clone());
                    let result = self
                        .check_keys(s, e, path)
                        .and_then(|()| self.validate_children(&s.children, &e.children, path, schema_path));
                    path.pop();
                    result?;
                }
                if self.config.unique_validation {
                    self.check_unique(s, &d.entries, path)?;
                }
                Ok(())
            }
            (DataSchemaNode::Leaf(s), NormalizedNode::Leaf(d)) => {
                self.check_value(&s.type_, &d.value, path, schema_path)
            }
            (DataSchemaNode::LeafList(s), NormalizedNode::LeafSet(d)) => {
                self.check_cardinality(s.min_elements, s.max_elements, d.values.len(), path)?;
                for value in &d.values {
                    self.check_value(&s.type_, value, path, schema_path)?;
                }
                Ok(())
            }
            (s, d) => Err(DataTreeError::NodeKindMismatch {
                path: render(path),
                expected: s.kind(),
                actual: d.kind(),
            }),
        }
    }

    fn validate_children(
        &self,
        schema: &[DataSchemaNode],
        children: &Children,
        path: &mut Vec<PathArgument>,
        schema_path: &mut Vec<QName>,
    ) -> DataTreeResult<()> {
        for (arg, child) in children {
            let Some(node) = find_in_children(schema, arg.node_type()) else {
                return Err(DataTreeError::UnknownNode {
                    path: render(path),
                    node: arg.to_string(),
                });
            };
            self.validate_child(node, arg, child, path, schema_path)?;
        }
        self.check_choices(schema, children, path)?;
        if self.config.mandatory_validation {
            self.check_mandatory(schema, children, path)?;
        }
        Ok(())
    }

    // ─── Structural Constraints ──────────────────────────────────────

    fn check_cardinality(&self, min: u64, max: Option<u64>, count: usize, path: &[PathArgument]) -> DataTreeResult<()> {
        let n = count as u64;
        if n < min || max.is_some_and(|m| n > m) {
            return Err(DataTreeError::Cardinality {
                path: render(path),
                count,
                allowed: allowed_range(min, max),
            });
        }
        Ok(())
    }

    fn check_keys(&self, list: &ListSchemaNode, entry: &MapEntryNode, path: &[PathArgument]) -> DataTreeResult<()> {
        if list.key.is_empty() {
            return Ok(());
        }
        let mismatch = |reason: String| DataTreeError::KeyMismatch {
            path: render(path),
            reason,
        };
        let declared: BTreeSet<&QName> = list.key.iter().collect();
        let given: BTreeSet<&QName> = entry.keys.keys().collect();
        if declared != given {
            let names = |set: &BTreeSet<&QName>| set.iter().map(|q| q.local_name()).collect::<Vec<_>>().join(" ");
            return Err(mismatch(format!(
                "list {} is keyed by [{}], entry names [{}]",
                list.info.qname.local_name(),
                names(&declared),
                names(&given)
            )));
        }
        for (key, expected) in &entry.keys {
            match entry.children.get(&PathArgument::node(key.clone())).and_then(|n| n.value()) {
                None => return Err(mismatch(format!("key leaf {} is missing", key.local_name()))),
                Some(actual) if actual != expected => {
                    return Err(mismatch(format!(
                        "key leaf {} holds '{actual}' but the entry is identified by '{expected}'",
                        key.local_name()
                    )))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn check_unique(&self, list: &ListSchemaNode, entries: &Children, path: &[PathArgument]) -> DataTreeResult<()> {
        for constraint in &list.unique {
            let mut seen: BTreeMap<Vec<&Value>, &PathArgument> = BTreeMap::new();
            for (arg, entry) in entries {
                let values: Option<Vec<&Value>> = constraint
                    .iter()
                    .map(|leaf_path| {
                        let args: Vec<PathArgument> = leaf_path.iter().cloned().map(PathArgument::node).collect();
                        entry.find(&args).and_then(NormalizedNode::value)
                    })
                    .collect();
                // Entries missing any constrained leaf are not compared.
                let Some(values) = values else { continue };
                if let Some(first) = seen.insert(values, arg) {
                    let leaves = constraint
                        .iter()
                        .map(|p| p.iter().map(|q| q.local_name()).collect::<Vec<_>>().join("/"))
                        .collect::<Vec<_>>()
                        .join(" ");
                    return Err(DataTreeError::UniqueViolation {
                        path: render(path),
                        leaves,
                        first: first.to_string(),
                        second: arg.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Whether any data node below the given schema nodes is present.
    fn has_data(schema: &[DataSchemaNode], children: &Children) -> bool {
        schema.iter().any(|node| match node {
            DataSchemaNode::Choice(choice) => choice.cases.iter().any(|c| Self::has_data(&c.children, children)),
            other => children.contains_key(&PathArgument::node(other.qname().clone())),
        })
    }

    fn cases_with_data<'s>(choice: &'s ChoiceSchemaNode, children: &Children) -> Vec<&'s yangkit_model::CaseSchemaNode> {
        choice
            .cases
            .iter()
            .filter(|c| Self::has_data(&c.children, children))
            .collect()
    }

    fn check_choices(&self, schema: &[DataSchemaNode], children: &Children, path: &[PathArgument]) -> DataTreeResult<()> {
        for node in schema {
            let DataSchemaNode::Choice(choice) = node else { continue };
            let active = Self::cases_with_data(choice, children);
            if active.len() > 1 {
                return Err(DataTreeError::ChoiceConflict {
                    path: render(path),
                    choice: choice.info.qname.local_name().to_string(),
                    cases: active
                        .iter()
                        .map(|c| c.info.qname.local_name())
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
            if let Some(case) = active.first() {
                self.check_choices(&case.children, children, path)?;
            }
        }
        Ok(())
    }

    fn check_mandatory(
        &self,
        schema: &[DataSchemaNode],
        children: &Children,
        path: &mut Vec<PathArgument>,
    ) -> DataTreeResult<()> {
        let missing = |node: &QName, path: &[PathArgument]| DataTreeError::MandatoryMissing {
            path: render(path),
            node: node.local_name().to_string(),
        };
        for node in schema {
            if self.config.tree_type == TreeType::Configuration && !node.is_config() {
                continue;
            }
            let present = children.contains_key(&PathArgument::node(node.qname().clone()));
            match node {
                DataSchemaNode::Leaf(leaf) if leaf.mandatory && !present => {
                    return Err(missing(node.qname(), path.as_slice()));
                }
                DataSchemaNode::List(list) if list.min_elements > 0 && !present => {
                    return Err(DataTreeError::Cardinality {
                        path: render_child(path, node.qname()),
                        count: 0,
                        allowed: allowed_range(list.min_elements, list.max_elements),
                    });
                }
                DataSchemaNode::LeafList(ll) if ll.min_elements > 0 && !present => {
                    return Err(DataTreeError::Cardinality {
                        path: render_child(path, node.qname()),
                        count: 0,
                        allowed: allowed_range(ll.min_elements, ll.max_elements),
                    });
                }
                DataSchemaNode::Container(c) if c.presence.is_none() && !present => {
                    path.push(PathArgument::node(node.qname().clone()));
                    let result = self.check_mandatory(&c.children, &EMPTY, path);
                    path.pop();
                    result?;
                }
                DataSchemaNode::Choice(choice) => match Self::cases_with_data(choice, children).first() {
                    Some(case) => self.check_mandatory(&case.children, children, path)?,
                    None if choice.mandatory => return Err(missing(node.qname(), path.as_slice())),
                    None => {}
                },
                _ => {}
            }
        }
        Ok(())
    }

    // ─── Values ──────────────────────────────────────────────────────

    fn check_value(
        &self,
        type_: &YangType,
        value: &Value,
        path: &[PathArgument],
        schema_path: &[QName],
    ) -> DataTreeResult<()> {
        let invalid = |source| DataTreeError::InvalidValue {
            path: render(path),
            source,
        };
        type_.check_value(value, self.schema).map_err(invalid)?;

        let mut current_type = type_;
        let mut context = schema_path.to_vec();
        for _ in 0..MAX_LEAFREF_CHAIN {
            let BaseType::LeafRef {
                path: leafref,
                require_instance,
            } = &current_type.base
            else {
                return Ok(());
            };
            let unresolved = || DataTreeError::LeafrefUnresolved {
                path: render(path),
                target: leafref.text.clone(),
            };
            let target_path = leafref_target(&context, leafref).ok_or_else(unresolved)?;
            let target_type = match self.schema.resolve_leafref(&context, leafref) {
                Some(DataSchemaNode::Leaf(l)) => &l.type_,
                Some(DataSchemaNode::LeafList(l)) => &l.type_,
                _ => return Err(unresolved()),
            };
            target_type.check_value(value, self.schema).map_err(invalid)?;
            if *require_instance && !self.instance_exists(&target_path, value) {
                return Err(DataTreeError::LeafrefMissingInstance {
                    path: render(path),
                    target: leafref.text.clone(),
                    value: value.to_string(),
                });
            }
            current_type = target_type;
            context = target_path;
        }
        Ok(())
    }

    /// Whether any leaf or leaf-list at the schema path holds `value`.
    fn instance_exists(&self, schema_path: &[QName], value: &Value) -> bool {
        let mut frontier: Vec<&NormalizedNode> = vec![self.root];
        for qname in schema_path {
            let arg = PathArgument::node(qname.clone());
            let mut next = Vec::new();
            for node in frontier {
                match node.child(&arg).map(Arc::as_ref) {
                    Some(NormalizedNode::Map(map)) => next.extend(map.entries.values().map(Arc::as_ref)),
                    Some(other) => next.push(other),
                    None => {}
                }
            }
            frontier = next;
        }
        frontier.into_iter().any(|node| match node {
            NormalizedNode::Leaf(l) => &l.value == value,
            NormalizedNode::LeafSet(s) => s.values.contains(value),
            _ => false,
        })
    }
}

/// The data-tree path a leafref names, predicates dropped.
pub(crate) fn leafref_target(context: &[QName], path: &LeafRefPath) -> Option<Vec<QName>> {
    let mut target: Vec<QName> = if path.absolute { Vec::new() } else { context.to_vec() };
    for step in &path.steps {
        match step {
            LeafRefStep::Parent => {
                target.pop()?;
            }
            LeafRefStep::Child { name, .. } => target.push(name.clone()),
        }
    }
    Some(target)
}

/// Validate `root` against `schema`.
pub(crate) fn validate_tree(
    schema: &SchemaContext,
    config: &DataTreeConfiguration,
    root: &NormalizedNode,
) -> DataTreeResult<()> {
    Validator::new(schema, config, root).validate()
}
