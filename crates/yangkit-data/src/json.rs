//! # JSON Rendering
//!
//! Renders normalized nodes as RFC 7951 JSON.
//!
//! - A member name is `module:local` when its namespace differs from the
//!   parent's, and bare `local` otherwise. Top-level members are always
//!   qualified.
//! - Lists render as arrays of entry objects; leaf-lists as arrays.
//! - `empty` renders as `[null]`.
//! - Integers are numbers, except `int64` and `uint64`, which are strings.
//!   `decimal64` is always a string. Union members and leafref targets are
//!   resolved to the type that encodes the value.
//! - Identityref values are qualified when the identity's module differs
//!   from the leaf's.
//!
//! Without a schema context, namespaces stand in for module names and an
//! integer is a number when it lies between -2^31 and 2^32-1.

use std::sync::Arc;

use serde_json::{Map, Value as Json};
use yangkit_core::{QName, QNameModule, Value};
use yangkit_model::{BaseType, DataSchemaNode, IntKind, SchemaContext};

use crate::node::{Children, NormalizedNode};
use crate::tree::DataTreeSnapshot;
use crate::validate::{leafref_target, MAX_LEAFREF_CHAIN};

/// Render `node` as a JSON object with one member for the node itself, or
/// for the tree root, one member per top-level node.
pub fn to_json(schema: &SchemaContext, node: &NormalizedNode) -> Json {
    JsonWriter { schema: Some(schema) }.top_level(node)
}

impl DataTreeSnapshot {
    /// Render the whole snapshot as JSON.
    pub fn to_json(&self) -> Json {
        JsonWriter {
            schema: self.schema_context().map(Arc::as_ref),
        }
        .top_level(self.root())
    }
}

struct JsonWriter<'a> {
    schema: Option<&'a SchemaContext>,
}

impl<'a> JsonWriter<'a> {
    fn top_level(&self, node: &NormalizedNode) -> Json {
        let mut out = Map::new();
        let mut path = Vec::new();
        match node {
            NormalizedNode::Container(c) if c.identifier == QName::data_root() => {
                self.members(&c.children, None, &mut out, &mut path);
            }
            NormalizedNode::MapEntry(e) => {
                path.push(e.node_type.clone());
                out.insert(self.member_name(&e.node_type, None), self.body(node, &mut path));
            }
            other => {
                out.insert(self.member_name(other.node_type(), None), self.body(other, &mut path));
            }
        }
        Json::Object(out)
    }

    fn module_name(&self, module: &QNameModule) -> String {
        self.schema
            .and_then(|s| s.find_module_by_namespace(module))
            .map(|m| m.name.clone())
            .unwrap_or_else(|| module.namespace().to_string())
    }

    fn member_name(&self, qname: &QName, parent: Option<&QNameModule>) -> String {
        if parent == Some(qname.module()) {
            qname.local_name().to_string()
        } else {
            format!("{}:{}", self.module_name(qname.module()), qname.local_name())
        }
    }

    fn members(
        &self,
        children: &Children,
        parent: Option<&QNameModule>,
        out: &mut Map<String, Json>,
        path: &mut Vec<QName>,
    ) {
        for child in children.values() {
            out.insert(self.member_name(child.node_type(), parent), self.body(child, path));
        }
    }

    /// Render `node`. `path` is the schema path of its parent; list
    /// entries share the path of their list.
    fn body(&self, node: &NormalizedNode, path: &mut Vec<QName>) -> Json {
        let ns = Some(node.node_type().module());
        if !matches!(node, NormalizedNode::MapEntry(_)) {
            path.push(node.node_type().clone());
        }
        let json = match node {
            NormalizedNode::Container(c) => {
                let mut out = Map::new();
                self.members(&c.children, ns, &mut out, path);
                Json::Object(out)
            }
            NormalizedNode::MapEntry(e) => {
                let mut out = Map::new();
                self.members(&e.children, ns, &mut out, path);
                Json::Object(out)
            }
            NormalizedNode::Map(m) => Json::Array(m.entries.values().map(|e| self.body(e, path)).collect()),
            NormalizedNode::Leaf(l) => {
                let base = self.encoding_base(path);
                self.value(&l.value, l.identifier.module(), base)
            }
            NormalizedNode::LeafSet(s) => {
                let base = self.encoding_base(path);
                Json::Array(s.values.iter().map(|v| self.value(v, s.identifier.module(), base)).collect())
            }
        };
        if !matches!(node, NormalizedNode::MapEntry(_)) {
            path.pop();
        }
        json
    }

    /// The base type of the leaf at `path`, following leafrefs to their
    /// target.
    fn encoding_base(&self, path: &[QName]) -> Option<&'a BaseType> {
        let schema = self.schema?;
        let mut type_ = match schema.find_data_tree_child(path)? {
            DataSchemaNode::Leaf(l) => &l.type_,
            DataSchemaNode::LeafList(l) => &l.type_,
            _ => return None,
        };
        let mut context = path.to_vec();
        for _ in 0..MAX_LEAFREF_CHAIN {
            let BaseType::LeafRef { path: leafref, .. } = &type_.base else {
                return Some(&type_.base);
            };
            type_ = match schema.resolve_leafref(&context, leafref)? {
                DataSchemaNode::Leaf(l) => &l.type_,
                DataSchemaNode::LeafList(l) => &l.type_,
                _ => return None,
            };
            context = leafref_target(&context, leafref)?;
        }
        None
    }

    fn is_number(&self, value: &Value, base: Option<&BaseType>) -> bool {
        match base {
            Some(BaseType::Integer { kind, .. }) => !matches!(kind, IntKind::Int64 | IntKind::Uint64),
            Some(BaseType::Union { members }) => {
                let member = self
                    .schema
                    .and_then(|s| members.iter().find(|m| m.check_value(value, s).is_ok()));
                match member {
                    Some(m) if !matches!(m.base, BaseType::Union { .. } | BaseType::LeafRef { .. }) => {
                        self.is_number(value, Some(&m.base))
                    }
                    _ => fits_number(value),
                }
            }
            Some(_) => false,
            None => fits_number(value),
        }
    }

    fn value(&self, value: &Value, leaf_module: &QNameModule, base: Option<&BaseType>) -> Json {
        match value {
            Value::Boolean(b) => Json::Bool(*b),
            Value::Int(i) if self.is_number(value, base) => Json::from(*i),
            Value::Uint(u) if self.is_number(value, base) => Json::from(*u),
            Value::Empty => Json::Array(vec![Json::Null]),
            Value::Identityref(id) => Json::String(self.member_name(id, Some(leaf_module))),
            other => Json::String(other.to_string()),
        }
    }
}

/// Whether an integer fits the 32-bit JSON number range.
fn fits_number(value: &Value) -> bool {
    const MIN_NUMBER: i64 = i32::MIN as i64;
    const MAX_NUMBER: u64 = u32::MAX as u64;
    match value {
        Value::Int(i) => *i >= MIN_NUMBER && *i <= MAX_NUMBER as i64,
        Value::Uint(u) => *u <= MAX_NUMBER,
        _ => false,
    }
}
