//! `augment` placement.
//!
//! Top-level augments are collected while modules compile and applied
//! afterwards, repeatedly, so an augment may target nodes another augment
//! adds. `uses`-level augments go through the same [`Linker::augment_target`]
//! with the instantiated grouping as their tree.

use tracing::debug;
use yangkit_core::QName;
use yangkit_model::{AugmentationSchemaNode, CaseSchemaNode, DataSchemaNode, Module, RpcDefinition};

use super::{Linker, NodeCtx, Scope};
use crate::error::{ParserError, ParserResult};
use crate::statement::Statement;

/// A top-level augment waiting for its target.
#[derive(Debug)]
pub(crate) struct PendingAugment<'a> {
    /// Index of the augmenting module.
    pub module: usize,
    /// File the statement appears in.
    pub file: usize,
    pub stmt: &'a Statement,
}

/// A located augment or refine target.
pub(crate) enum Target<'n> {
    Node(&'n mut DataSchemaNode),
    Case(&'n mut CaseSchemaNode),
    /// RPC input/output or notification content.
    Body(&'n mut Vec<DataSchemaNode>),
}

/// Walk a schema node identifier through `nodes`. Choice and case names
/// are path steps.
pub(crate) fn find_target_mut<'n>(nodes: &'n mut [DataSchemaNode], path: &[QName]) -> Option<Target<'n>> {
    let (first, rest) = path.split_first()?;
    let node = nodes.iter_mut().find(|n| n.qname() == first)?;
    descend(node, rest)
}

fn descend<'n>(node: &'n mut DataSchemaNode, rest: &[QName]) -> Option<Target<'n>> {
    let Some((next, remaining)) = rest.split_first() else {
        return Some(Target::Node(node));
    };
    match node {
        DataSchemaNode::Choice(choice) => {
            let case = choice.cases.iter_mut().find(|c| &c.info.qname == next)?;
            if remaining.is_empty() {
                Some(Target::Case(case))
            } else {
                find_target_mut(&mut case.children, remaining)
            }
        }
        other => find_target_mut(other.children_mut()?, rest),
    }
}

/// Remove the node (or case) a path names. Returns whether anything was
/// removed.
pub(crate) fn remove_target(nodes: &mut Vec<DataSchemaNode>, path: &[QName]) -> bool {
    let Some((last, parent)) = path.split_last() else {
        return false;
    };
    if parent.is_empty() {
        return retain_named(nodes, last);
    }
    match find_target_mut(nodes, parent) {
        Some(Target::Node(DataSchemaNode::Choice(choice))) => {
            let before = choice.cases.len();
            choice.cases.retain(|c| &c.info.qname != last);
            choice.cases.len() != before
        }
        Some(Target::Node(node)) => node.children_mut().map_or(false, |c| retain_named(c, last)),
        Some(Target::Case(case)) => retain_named(&mut case.children, last),
        Some(Target::Body(children)) => retain_named(children, last),
        None => false,
    }
}

fn retain_named(nodes: &mut Vec<DataSchemaNode>, qname: &QName) -> bool {
    let before = nodes.len();
    nodes.retain(|n| n.qname() != qname);
    nodes.len() != before
}

fn operation_target<'n>(rpc: &'n mut RpcDefinition, rest: &[QName]) -> Option<Target<'n>> {
    let (step, remaining) = rest.split_first()?;
    let body = match step.local_name() {
        "input" => &mut rpc.input,
        "output" => &mut rpc.output,
        _ => return None,
    };
    if remaining.is_empty() {
        Some(Target::Body(body))
    } else {
        find_target_mut(body, remaining)
    }
}

impl<'a> Linker<'a> {
    /// Compile the body of `stmt` into `target`. Returns the nodes added,
    /// for recording on the augmenting module.
    pub(super) fn augment_target(
        &self,
        target: Target<'_>,
        stmt: &'a Statement,
        scope: &Scope<'a, '_>,
        ctx: &NodeCtx,
    ) -> ParserResult<Vec<DataSchemaNode>> {
        let file = scope.file;
        let with_config = |config: bool| NodeCtx {
            config,
            augmenting: true,
            ..ctx.clone()
        };
        let when = stmt.child_arg("when");

        let (siblings, nodes) = match target {
            Target::Node(DataSchemaNode::Choice(choice)) => {
                let cases = self.compile_cases(stmt, scope, &with_config(choice.info.config))?;
                let mut added = Vec::new();
                for mut case in cases {
                    if choice.cases.iter().any(|c| c.info.qname == case.info.qname) {
                        return Err(self.semantic(
                            file,
                            stmt.line,
                            format!("augment adds case '{}' twice", case.info.qname),
                        ));
                    }
                    if let Some(w) = when {
                        case.info.when.get_or_insert_with(|| w.to_string());
                    }
                    added.extend(case.children.iter().cloned());
                    choice.cases.push(case);
                }
                return Ok(added);
            }
            Target::Node(DataSchemaNode::Leaf(_) | DataSchemaNode::LeafList(_)) => {
                return Err(self.semantic(
                    file,
                    stmt.line,
                    format!("augment target '{}' is a leaf and cannot take children", stmt.arg()),
                ))
            }
            Target::Node(node) => {
                let nodes = self.compile_body(stmt, scope, &with_config(node.is_config()))?;
                match node.children_mut() {
                    Some(children) => (children, nodes),
                    None => return Err(self.semantic(file, stmt.line, "augment target cannot take children")),
                }
            }
            Target::Case(case) => {
                let nodes = self.compile_body(stmt, scope, &with_config(case.info.config))?;
                (&mut case.children, nodes)
            }
            Target::Body(children) => {
                let nodes = self.compile_body(
                    stmt,
                    scope,
                    &NodeCtx {
                        checks_config: false,
                        ..with_config(true)
                    },
                )?;
                (children, nodes)
            }
        };

        let mut added = Vec::with_capacity(nodes.len());
        for mut node in nodes {
            if let Some(w) = when {
                node.info_mut().when.get_or_insert_with(|| w.to_string());
            }
            added.push(node.clone());
            self.push_child(siblings, node, file, stmt.line)?;
        }
        Ok(added)
    }

    /// Place every pending top-level augment, retrying until no progress
    /// is made.
    pub(super) fn apply_augments(&self, modules: &mut [Module], pending: Vec<PendingAugment<'a>>) -> ParserResult<()> {
        let mut remaining = pending;
        while !remaining.is_empty() {
            let before = remaining.len();
            let mut deferred = Vec::new();
            for aug in remaining {
                if !self.apply_augment(modules, &aug)? {
                    deferred.push(aug);
                }
            }
            if deferred.len() == before {
                if let Some(aug) = deferred.first() {
                    return Err(ParserError::InvalidAugmentTarget {
                        module: self.module_name(aug.file).to_string(),
                        line: aug.stmt.line,
                        target: aug.stmt.arg().to_string(),
                    });
                }
            }
            remaining = deferred;
        }
        Ok(())
    }

    /// Try to place one augment. `Ok(false)` means the target does not
    /// exist yet.
    fn apply_augment(&self, modules: &mut [Module], aug: &PendingAugment<'a>) -> ParserResult<bool> {
        let (file, stmt) = (aug.file, aug.stmt);
        if !self.if_features_satisfied(stmt, file)? {
            debug!(module = self.module_name(file), target = stmt.arg(), "augment excluded by if-feature");
            return Ok(true);
        }
        if !stmt.arg().trim_start().starts_with('/') {
            return Err(self.semantic(
                file,
                stmt.line,
                format!("top-level augment target '{}' must be an absolute path", stmt.arg()),
            ));
        }
        let own_ns = self.ns(aug.module).clone();
        let path = self.schema_path(stmt.arg(), file, &own_ns, stmt.line)?;
        let Some((first, rest)) = path.split_first() else {
            return Ok(false);
        };
        let Some(target_module) = modules.iter_mut().find(|m| &m.qname_module == first.module()) else {
            return Ok(false);
        };

        let mut in_operation = false;
        let target = if target_module.child_nodes.iter().any(|n| n.qname() == first) {
            find_target_mut(&mut target_module.child_nodes, &path)
        } else if let Some(rpc) = target_module.rpcs.iter_mut().find(|r| &r.qname == first) {
            in_operation = true;
            operation_target(rpc, rest)
        } else if let Some(notification) = target_module.notifications.iter_mut().find(|n| &n.qname == first) {
            in_operation = true;
            if rest.is_empty() {
                Some(Target::Body(&mut notification.children))
            } else {
                find_target_mut(&mut notification.children, rest)
            }
        } else {
            None
        };
        let Some(target) = target else {
            return Ok(false);
        };

        let ctx = NodeCtx {
            checks_config: !in_operation,
            ..NodeCtx::data(own_ns)
        };
        let root = Scope::root(file);
        let scope = root.nested(stmt);
        let children = self.augment_target(target, stmt, &scope, &ctx)?;
        debug!(
            module = self.module_name(file),
            target = stmt.arg(),
            nodes = children.len(),
            "augment applied"
        );

        modules[aug.module].augmentations.push(AugmentationSchemaNode {
            target_path: path,
            when: stmt.child_arg("when").map(str::to_string),
            description: stmt.child_arg("description").map(str::to_string),
            status: self.status(stmt, file)?,
            children,
        });
        Ok(true)
    }
}
