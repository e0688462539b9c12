//! # Data Schema Nodes
//!
//! The schema tree: containers, lists, leaves, leaf-lists, and choices with
//! their cases. Every node carries a [`SchemaNodeInfo`] with its name and
//! the statements common to all data definitions.
//!
//! ## Data Tree Children
//!
//! `choice` and `case` are schema-only: they never appear in instance
//! data. [`DataSchemaNode::data_child`] and [`find_data_tree_child`]
//! therefore look through choices and cases transparently, the way a
//! data tree path would.

use yangkit_core::QName;

use crate::types::YangType;

/// `status` statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Status {
    /// Definition is current (default).
    #[default]
    Current,
    /// Definition is deprecated.
    Deprecated,
    /// Definition is obsolete.
    Obsolete,
}

impl Status {
    /// Parse a `status` argument.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "current" => Some(Self::Current),
            "deprecated" => Some(Self::Deprecated),
            "obsolete" => Some(Self::Obsolete),
            _ => None,
        }
    }
}

/// Statements shared by every schema node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaNodeInfo {
    /// Node name, in the namespace of the module that instantiated it.
    pub qname: QName,
    /// `description`.
    pub description: Option<String>,
    /// `reference`.
    pub reference: Option<String>,
    /// `status`.
    pub status: Status,
    /// Effective `config` value (inherited from the parent when absent).
    pub config: bool,
    /// `when` expression text. Retained, not evaluated.
    pub when: Option<String>,
    /// `must` expression texts. Retained, not evaluated.
    pub must: Vec<String>,
    /// Whether the node was added by an `augment`.
    pub augmenting: bool,
    /// Whether the node was instantiated by a `uses`.
    pub added_by_uses: bool,
}

impl SchemaNodeInfo {
    /// Info for a plain, current, config-true node.
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            description: None,
            reference: None,
            status: Status::Current,
            config: true,
            when: None,
            must: Vec::new(),
            augmenting: false,
            added_by_uses: false,
        }
    }
}

/// `container`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSchemaNode {
    /// Common statements.
    pub info: SchemaNodeInfo,
    /// `presence` argument; `None` for a non-presence container.
    pub presence: Option<String>,
    /// Child nodes.
    pub children: Vec<DataSchemaNode>,
}

/// `list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSchemaNode {
    /// Common statements.
    pub info: SchemaNodeInfo,
    /// Key leaf names, in `key` statement order.
    pub key: Vec<QName>,
    /// `min-elements`.
    pub min_elements: u64,
    /// `max-elements`; `None` for unbounded.
    pub max_elements: Option<u64>,
    /// `unique` constraints; each is a set of descendant leaf paths.
    pub unique: Vec<Vec<Vec<QName>>>,
    /// `ordered-by user`.
    pub ordered_by_user: bool,
    /// Child nodes.
    pub children: Vec<DataSchemaNode>,
}

/// `leaf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafSchemaNode {
    /// Common statements.
    pub info: SchemaNodeInfo,
    /// Resolved type.
    pub type_: YangType,
    /// Effective default (own or inherited from the typedef).
    pub default: Option<String>,
    /// `mandatory true`.
    pub mandatory: bool,
    /// `units`.
    pub units: Option<String>,
}

/// `leaf-list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafListSchemaNode {
    /// Common statements.
    pub info: SchemaNodeInfo,
    /// Resolved type.
    pub type_: YangType,
    /// `default` values (YANG 1.1).
    pub defaults: Vec<String>,
    /// `min-elements`.
    pub min_elements: u64,
    /// `max-elements`; `None` for unbounded.
    pub max_elements: Option<u64>,
    /// `ordered-by user`.
    pub ordered_by_user: bool,
    /// `units`.
    pub units: Option<String>,
}

/// `case`, explicit or implied by a shorthand choice member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseSchemaNode {
    /// Common statements.
    pub info: SchemaNodeInfo,
    /// Child nodes.
    pub children: Vec<DataSchemaNode>,
}

/// `choice`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceSchemaNode {
    /// Common statements.
    pub info: SchemaNodeInfo,
    /// Cases in declaration order.
    pub cases: Vec<CaseSchemaNode>,
    /// `default` case name.
    pub default_case: Option<QName>,
    /// `mandatory true`.
    pub mandatory: bool,
}

impl ChoiceSchemaNode {
    /// The case that contains the data child `qname`, if any.
    pub fn case_containing(&self, qname: &QName) -> Option<&CaseSchemaNode> {
        self.cases
            .iter()
            .find(|c| c.children.iter().any(|n| n.data_child_matches(qname)))
    }
}

/// A node in the schema tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSchemaNode {
    /// `container`
    Container(ContainerSchemaNode),
    /// `list`
    List(ListSchemaNode),
    /// `leaf`
    Leaf(LeafSchemaNode),
    /// `leaf-list`
    LeafList(LeafListSchemaNode),
    /// `choice`
    Choice(ChoiceSchemaNode),
}

impl DataSchemaNode {
    /// Common statements.
    pub fn info(&self) -> &SchemaNodeInfo {
        match self {
            Self::Container(n) => &n.info,
            Self::List(n) => &n.info,
            Self::Leaf(n) => &n.info,
            Self::LeafList(n) => &n.info,
            Self::Choice(n) => &n.info,
        }
    }

    /// Mutable common statements.
    pub fn info_mut(&mut self) -> &mut SchemaNodeInfo {
        match self {
            Self::Container(n) => &mut n.info,
            Self::List(n) => &mut n.info,
            Self::Leaf(n) => &mut n.info,
            Self::LeafList(n) => &mut n.info,
            Self::Choice(n) => &mut n.info,
        }
    }

    /// Node name.
    pub fn qname(&self) -> &QName {
        &self.info().qname
    }

    /// Statement keyword, for messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Container(_) => "container",
            Self::List(_) => "list",
            Self::Leaf(_) => "leaf",
            Self::LeafList(_) => "leaf-list",
            Self::Choice(_) => "choice",
        }
    }

    /// Whether the node is configuration data.
    pub fn is_config(&self) -> bool {
        self.info().config
    }

    /// Direct schema children of a container or list.
    pub fn children(&self) -> &[DataSchemaNode] {
        match self {
            Self::Container(n) => &n.children,
            Self::List(n) => &n.children,
            _ => &[],
        }
    }

    /// Mutable direct schema children of a container or list.
    pub fn children_mut(&mut self) -> Option<&mut Vec<DataSchemaNode>> {
        match self {
            Self::Container(n) => Some(&mut n.children),
            Self::List(n) => Some(&mut n.children),
            _ => None,
        }
    }

    /// Find a data child, looking through choices and cases.
    pub fn data_child(&self, qname: &QName) -> Option<&DataSchemaNode> {
        find_in_children(self.children(), qname)
    }

    /// Data children of this node with choices and cases flattened away.
    pub fn data_children(&self) -> Vec<&DataSchemaNode> {
        let mut out = Vec::new();
        flatten_into(self.children(), &mut out);
        out
    }

    /// Whether `qname` names this node, or (for a choice) a data node
    /// somewhere below one of its cases.
    fn data_child_matches(&self, qname: &QName) -> bool {
        match self {
            Self::Choice(c) => c
                .cases
                .iter()
                .any(|case| case.children.iter().any(|n| n.data_child_matches(qname))),
            other => other.qname() == qname,
        }
    }
}

/// Find a data child among `children`, looking through choices and cases.
pub fn find_in_children<'a>(children: &'a [DataSchemaNode], qname: &QName) -> Option<&'a DataSchemaNode> {
    for child in children {
        match child {
            DataSchemaNode::Choice(choice) => {
                for case in &choice.cases {
                    if let Some(found) = find_in_children(&case.children, qname) {
                        return Some(found);
                    }
                }
            }
            other if other.qname() == qname => return Some(other),
            _ => {}
        }
    }
    None
}

/// Walk a data-tree path through `children`.
pub fn find_data_tree_child<'a>(children: &'a [DataSchemaNode], path: &[QName]) -> Option<&'a DataSchemaNode> {
    let (first, rest) = path.split_first()?;
    let mut node = find_in_children(children, first)?;
    for qname in rest {
        node = node.data_child(qname)?;
    }
    Some(node)
}

/// Collect data nodes from `children`, flattening choices and cases.
pub fn flatten_into<'a>(children: &'a [DataSchemaNode], out: &mut Vec<&'a DataSchemaNode>) {
    for child in children {
        match child {
            DataSchemaNode::Choice(choice) => {
                for case in &choice.cases {
                    flatten_into(&case.children, out);
                }
            }
            other => out.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yangkit_core::QNameModule;

    fn q(name: &str) -> QName {
        QName::create(&QNameModule::create("urn:t", None).unwrap(), name).unwrap()
    }

    fn leaf(name: &str) -> DataSchemaNode {
        DataSchemaNode::Leaf(LeafSchemaNode {
            info: SchemaNodeInfo::new(q(name)),
            type_: YangType::string(),
            default: None,
            mandatory: false,
            units: None,
        })
    }

    fn container(name: &str, children: Vec<DataSchemaNode>) -> DataSchemaNode {
        DataSchemaNode::Container(ContainerSchemaNode {
            info: SchemaNodeInfo::new(q(name)),
            presence: None,
            children,
        })
    }

    #[test]
    fn test_find_data_tree_child_through_choice() {
        let choice = DataSchemaNode::Choice(ChoiceSchemaNode {
            info: SchemaNodeInfo::new(q("ch")),
            cases: vec![
                CaseSchemaNode {
                    info: SchemaNodeInfo::new(q("a")),
                    children: vec![leaf("x")],
                },
                CaseSchemaNode {
                    info: SchemaNodeInfo::new(q("b")),
                    children: vec![leaf("y")],
                },
            ],
            default_case: None,
            mandatory: false,
        });
        let root = vec![container("cont", vec![container("cont2", vec![choice, leaf("foo")])])];

        let found = find_data_tree_child(&root, &[q("cont"), q("cont2"), q("y")]).unwrap();
        assert_eq!(found.qname(), &q("y"));
        assert!(find_data_tree_child(&root, &[q("cont"), q("cont2"), q("ch")]).is_none());
        assert!(find_data_tree_child(&root, &[q("cont"), q("cont2"), q("foo")]).is_some());

        let cont2 = find_data_tree_child(&root, &[q("cont"), q("cont2")]).unwrap();
        let names: Vec<_> = cont2.data_children().iter().map(|n| n.qname().local_name().to_string()).collect();
        assert_eq!(names, vec!["x", "y", "foo"]);

        let DataSchemaNode::Choice(ch) = &cont2.children()[0] else {
            panic!("expected choice");
        };
        assert_eq!(ch.case_containing(&q("y")).unwrap().info.qname, q("b"));
    }

    #[test]
    fn test_leaf_has_no_children() {
        let l = leaf("x");
        assert!(l.children().is_empty());
        assert_eq!(l.kind(), "leaf");
        assert!(l.is_config());
    }
}
