//! Data node compilation: containers, lists, leaves, leaf-lists, choices,
//! and `uses` expansion with `refine` and relative `augment`.

use tracing::{debug, warn};
use yangkit_core::QNameModule;
use yangkit_model::node::find_data_tree_child;
use yangkit_model::{
    CaseSchemaNode, ChoiceSchemaNode, ContainerSchemaNode, DataSchemaNode, LeafListSchemaNode, LeafSchemaNode,
    ListSchemaNode, SchemaNodeInfo,
};

use super::augment::{find_target_mut, remove_target, Target};
use super::{split_prefix, Linker, Origin, Scope};
use crate::error::{ParserError, ParserResult};
use crate::statement::Statement;

const MAX_USES_DEPTH: usize = 32;

/// Where a node is being instantiated.
#[derive(Debug, Clone)]
pub(crate) struct NodeCtx {
    /// Namespace new nodes are named in.
    pub ns: QNameModule,
    /// Effective config of the parent.
    pub config: bool,
    /// Whether config consistency and list keys are enforced. Off inside
    /// groupings, RPCs, and notifications.
    pub checks_config: bool,
    pub augmenting: bool,
    pub added_by_uses: bool,
    pub uses_depth: usize,
}

impl NodeCtx {
    /// Top-level configuration data of a module.
    pub fn data(ns: QNameModule) -> Self {
        Self {
            ns,
            config: true,
            checks_config: true,
            augmenting: false,
            added_by_uses: false,
            uses_depth: 0,
        }
    }

    /// Grouping bodies and operation payloads.
    pub fn unchecked(ns: QNameModule) -> Self {
        Self {
            checks_config: false,
            ..Self::data(ns)
        }
    }
}

impl<'a> Linker<'a> {
    /// Compile the data definition substatements of `parent`.
    pub(super) fn compile_body(
        &self,
        parent: &'a Statement,
        scope: &Scope<'a, '_>,
        ctx: &NodeCtx,
    ) -> ParserResult<Vec<DataSchemaNode>> {
        let mut out = Vec::new();
        for sub in &parent.substatements {
            match sub.keyword.as_str() {
                "container" | "list" | "leaf" | "leaf-list" | "choice" => {
                    if let Some(node) = self.compile_node(sub, scope, ctx)? {
                        self.push_child(&mut out, node, scope.file, sub.line)?;
                    }
                }
                "uses" => {
                    for node in self.expand_uses(sub, scope, ctx)? {
                        self.push_child(&mut out, node, scope.file, sub.line)?;
                    }
                }
                "anydata" | "anyxml" => warn!(
                    module = self.module_name(scope.file),
                    node = sub.arg(),
                    "{} nodes are not supported and were skipped",
                    sub.keyword
                ),
                "action" | "notification" => debug!(
                    module = self.module_name(scope.file),
                    name = sub.arg(),
                    "nested {} skipped",
                    sub.keyword
                ),
                _ => {}
            }
        }
        Ok(out)
    }

    /// Append `node`, rejecting a sibling with the same name.
    pub(super) fn push_child(
        &self,
        siblings: &mut Vec<DataSchemaNode>,
        node: DataSchemaNode,
        file: usize,
        line: usize,
    ) -> ParserResult<()> {
        if siblings.iter().any(|s| s.qname() == node.qname()) {
            return Err(self.semantic(file, line, format!("node '{}' is defined twice", node.qname())));
        }
        siblings.push(node);
        Ok(())
    }

    /// Compile one data definition statement. Returns `None` when an
    /// `if-feature` excludes it.
    pub(super) fn compile_node(
        &self,
        stmt: &'a Statement,
        scope: &Scope<'a, '_>,
        ctx: &NodeCtx,
    ) -> ParserResult<Option<DataSchemaNode>> {
        let file = scope.file;
        if !self.if_features_satisfied(stmt, file)? {
            debug!(module = self.module_name(file), node = stmt.arg(), "node excluded by if-feature");
            return Ok(None);
        }
        let info = self.node_info(stmt, ctx, file)?;
        let child_ctx = NodeCtx {
            config: info.config,
            ..ctx.clone()
        };
        let scope = scope.nested(stmt);
        let node = match stmt.keyword.as_str() {
            "container" => DataSchemaNode::Container(ContainerSchemaNode {
                presence: stmt.child_arg("presence").map(str::to_string),
                children: self.compile_body(stmt, &scope, &child_ctx)?,
                info,
            }),
            "list" => self.compile_list(stmt, info, &scope, &child_ctx)?,
            "leaf" => self.compile_leaf(stmt, info, &scope, ctx)?,
            "leaf-list" => self.compile_leaf_list(stmt, info, &scope, ctx)?,
            "choice" => self.compile_choice(stmt, info, &scope, &child_ctx)?,
            other => {
                return Err(self.semantic(file, stmt.line, format!("'{other}' is not a data definition statement")))
            }
        };
        Ok(Some(node))
    }

    fn node_info(&self, stmt: &Statement, ctx: &NodeCtx, file: usize) -> ParserResult<SchemaNodeInfo> {
        let qname = self.qname(&ctx.ns, stmt.arg(), file, stmt.line)?;
        let explicit = stmt.child("config").map(|c| self.parse_bool(c, file)).transpose()?;
        if ctx.checks_config && explicit == Some(true) && !ctx.config {
            return Err(self.semantic(
                file,
                stmt.line,
                format!("'{}' is config true under a config false parent", stmt.arg()),
            ));
        }
        let mut info = SchemaNodeInfo::new(qname);
        info.description = stmt.child_arg("description").map(str::to_string);
        info.reference = stmt.child_arg("reference").map(str::to_string);
        info.status = self.status(stmt, file)?;
        info.config = explicit.unwrap_or(ctx.config);
        info.when = stmt.child_arg("when").map(str::to_string);
        info.must = stmt.children("must").map(|m| m.arg().to_string()).collect();
        info.augmenting = ctx.augmenting;
        info.added_by_uses = ctx.added_by_uses;
        Ok(info)
    }

    fn compile_list(
        &self,
        stmt: &'a Statement,
        info: SchemaNodeInfo,
        scope: &Scope<'a, '_>,
        ctx: &NodeCtx,
    ) -> ParserResult<DataSchemaNode> {
        let file = scope.file;
        let children = self.compile_body(stmt, scope, ctx)?;

        let mut key = Vec::new();
        if let Some(k) = stmt.child("key") {
            for name in k.arg().split_whitespace() {
                let (prefix, local) = split_prefix(name);
                let key_ns = match prefix {
                    None => ctx.ns.clone(),
                    Some(_) => self.ns(self.resolve_module(file, prefix, k.line)?).clone(),
                };
                let qname = self.qname(&key_ns, local, file, k.line)?;
                match children.iter().find(|c| c.qname() == &qname) {
                    Some(DataSchemaNode::Leaf(leaf)) => {
                        if ctx.checks_config && leaf.info.config != info.config {
                            return Err(self.semantic(
                                file,
                                k.line,
                                format!("key leaf '{name}' must have the same config as list '{}'", stmt.arg()),
                            ));
                        }
                    }
                    _ => {
                        return Err(self.semantic(
                            file,
                            k.line,
                            format!("invalid key '{name}' in list '{}': not a leaf child", stmt.arg()),
                        ))
                    }
                }
                if key.contains(&qname) {
                    return Err(self.semantic(file, k.line, format!("key '{name}' is listed twice")));
                }
                key.push(qname);
            }
        }
        if key.is_empty() && info.config && ctx.checks_config {
            return Err(self.semantic(
                file,
                stmt.line,
                format!("configuration list '{}' must declare a key", stmt.arg()),
            ));
        }

        let mut unique = Vec::new();
        for u in stmt.children("unique") {
            let mut paths = Vec::new();
            for part in u.arg().split_whitespace() {
                let path = self.schema_path(part, file, &ctx.ns, u.line)?;
                match find_data_tree_child(&children, &path) {
                    Some(DataSchemaNode::Leaf(_)) => paths.push(path),
                    _ => {
                        return Err(self.semantic(
                            file,
                            u.line,
                            format!("unique '{part}' in list '{}' does not name a descendant leaf", stmt.arg()),
                        ))
                    }
                }
            }
            unique.push(paths);
        }

        let (min_elements, max_elements) = self.cardinality(stmt, file)?;
        Ok(DataSchemaNode::List(ListSchemaNode {
            info,
            key,
            min_elements,
            max_elements,
            unique,
            ordered_by_user: self.ordered_by_user(stmt, file)?,
            children,
        }))
    }

    fn compile_leaf(
        &self,
        stmt: &'a Statement,
        info: SchemaNodeInfo,
        scope: &Scope<'a, '_>,
        ctx: &NodeCtx,
    ) -> ParserResult<DataSchemaNode> {
        let file = scope.file;
        let type_stmt = stmt
            .child("type")
            .ok_or_else(|| self.semantic(file, stmt.line, format!("leaf '{}' has no type", stmt.arg())))?;
        let resolved = self.resolve_type(type_stmt, scope, &ctx.ns, 0)?;
        let mandatory = stmt
            .child("mandatory")
            .map(|m| self.parse_bool(m, file))
            .transpose()?
            .unwrap_or(false);
        let default = match stmt.child("default") {
            Some(d) if mandatory => {
                return Err(self.semantic(
                    file,
                    d.line,
                    format!("leaf '{}' cannot be mandatory and have a default", stmt.arg()),
                ))
            }
            Some(d) => {
                self.check_default(&resolved.type_, d.arg(), file, d.line, stmt.arg())?;
                Some(d.arg().to_string())
            }
            None if mandatory => None,
            None => resolved.default,
        };
        Ok(DataSchemaNode::Leaf(LeafSchemaNode {
            info,
            type_: resolved.type_,
            default,
            mandatory,
            units: stmt.child_arg("units").map(str::to_string).or(resolved.units),
        }))
    }

    fn compile_leaf_list(
        &self,
        stmt: &'a Statement,
        info: SchemaNodeInfo,
        scope: &Scope<'a, '_>,
        ctx: &NodeCtx,
    ) -> ParserResult<DataSchemaNode> {
        let file = scope.file;
        let type_stmt = stmt
            .child("type")
            .ok_or_else(|| self.semantic(file, stmt.line, format!("leaf-list '{}' has no type", stmt.arg())))?;
        let resolved = self.resolve_type(type_stmt, scope, &ctx.ns, 0)?;
        let (min_elements, max_elements) = self.cardinality(stmt, file)?;
        let mut defaults = Vec::new();
        for d in stmt.children("default") {
            self.check_default(&resolved.type_, d.arg(), file, d.line, stmt.arg())?;
            defaults.push(d.arg().to_string());
        }
        if !defaults.is_empty() && min_elements > 0 {
            return Err(self.semantic(
                file,
                stmt.line,
                format!("leaf-list '{}' has defaults and min-elements", stmt.arg()),
            ));
        }
        if defaults.is_empty() && min_elements == 0 {
            defaults.extend(resolved.default);
        }
        Ok(DataSchemaNode::LeafList(LeafListSchemaNode {
            info,
            type_: resolved.type_,
            defaults,
            min_elements,
            max_elements,
            ordered_by_user: self.ordered_by_user(stmt, file)?,
            units: stmt.child_arg("units").map(str::to_string).or(resolved.units),
        }))
    }

    fn compile_choice(
        &self,
        stmt: &'a Statement,
        info: SchemaNodeInfo,
        scope: &Scope<'a, '_>,
        ctx: &NodeCtx,
    ) -> ParserResult<DataSchemaNode> {
        let file = scope.file;
        let cases = self.compile_cases(stmt, scope, ctx)?;
        let mandatory = stmt
            .child("mandatory")
            .map(|m| self.parse_bool(m, file))
            .transpose()?
            .unwrap_or(false);
        let default_case = match stmt.child("default") {
            None => None,
            Some(d) if mandatory => {
                return Err(self.semantic(
                    file,
                    d.line,
                    format!("choice '{}' cannot be mandatory and have a default", stmt.arg()),
                ))
            }
            Some(d) => {
                let qname = self.qname(&ctx.ns, d.arg(), file, d.line)?;
                if !cases.iter().any(|c| c.info.qname == qname) {
                    return Err(self.semantic(
                        file,
                        d.line,
                        format!("default case '{}' not found in choice '{}'", d.arg(), stmt.arg()),
                    ));
                }
                Some(qname)
            }
        };
        Ok(DataSchemaNode::Choice(ChoiceSchemaNode {
            info,
            cases,
            default_case,
            mandatory,
        }))
    }

    /// Compile the cases of a choice (or of an augment into one). Shorthand
    /// members get an implicit case named after the node.
    pub(super) fn compile_cases(
        &self,
        parent: &'a Statement,
        scope: &Scope<'a, '_>,
        ctx: &NodeCtx,
    ) -> ParserResult<Vec<CaseSchemaNode>> {
        let file = scope.file;
        let mut cases: Vec<CaseSchemaNode> = Vec::new();
        for sub in &parent.substatements {
            let case = match sub.keyword.as_str() {
                "case" => {
                    if !self.if_features_satisfied(sub, file)? {
                        continue;
                    }
                    let info = self.node_info(sub, ctx, file)?;
                    let case_scope = scope.nested(sub);
                    let case_ctx = NodeCtx {
                        config: info.config,
                        ..ctx.clone()
                    };
                    let children = self.compile_body(sub, &case_scope, &case_ctx)?;
                    CaseSchemaNode { info, children }
                }
                "container" | "list" | "leaf" | "leaf-list" | "choice" => {
                    let Some(node) = self.compile_node(sub, scope, ctx)? else {
                        continue;
                    };
                    let mut info = SchemaNodeInfo::new(node.qname().clone());
                    info.config = node.is_config();
                    info.augmenting = ctx.augmenting;
                    info.added_by_uses = ctx.added_by_uses;
                    CaseSchemaNode {
                        info,
                        children: vec![node],
                    }
                }
                "anydata" | "anyxml" => {
                    warn!(
                        module = self.module_name(file),
                        node = sub.arg(),
                        "{} nodes are not supported and were skipped",
                        sub.keyword
                    );
                    continue;
                }
                _ => continue,
            };
            if cases.iter().any(|c| c.info.qname == case.info.qname) {
                return Err(self.semantic(file, sub.line, format!("case '{}' is defined twice", sub.arg())));
            }
            cases.push(case);
        }
        Ok(cases)
    }

    fn cardinality(&self, stmt: &Statement, file: usize) -> ParserResult<(u64, Option<u64>)> {
        let min = match stmt.child("min-elements") {
            Some(m) => self.min_elements(m, file)?,
            None => 0,
        };
        let max = match stmt.child("max-elements") {
            Some(m) => self.max_elements(m, file)?,
            None => None,
        };
        if let Some(max) = max {
            if min > max {
                return Err(self.semantic(
                    file,
                    stmt.line,
                    format!("min-elements {min} exceeds max-elements {max} in '{}'", stmt.arg()),
                ));
            }
        }
        Ok((min, max))
    }

    fn min_elements(&self, stmt: &Statement, file: usize) -> ParserResult<u64> {
        stmt.arg()
            .parse::<u64>()
            .map_err(|_| self.semantic(file, stmt.line, format!("invalid min-elements '{}'", stmt.arg())))
    }

    fn max_elements(&self, stmt: &Statement, file: usize) -> ParserResult<Option<u64>> {
        match stmt.arg() {
            "unbounded" => Ok(None),
            text => match text.parse::<u64>() {
                Ok(n) if n > 0 => Ok(Some(n)),
                _ => Err(self.semantic(file, stmt.line, format!("invalid max-elements '{text}'"))),
            },
        }
    }

    fn ordered_by_user(&self, stmt: &Statement, file: usize) -> ParserResult<bool> {
        match stmt.child("ordered-by") {
            None => Ok(false),
            Some(o) => match o.arg() {
                "user" => Ok(true),
                "system" => Ok(false),
                other => Err(self.semantic(file, o.line, format!("invalid ordered-by '{other}'"))),
            },
        }
    }

    // ─── Uses ────────────────────────────────────────────────────────

    /// Instantiate the grouping a `uses` names, then apply its `refine` and
    /// `augment` substatements.
    pub(super) fn expand_uses(
        &self,
        stmt: &'a Statement,
        scope: &Scope<'a, '_>,
        ctx: &NodeCtx,
    ) -> ParserResult<Vec<DataSchemaNode>> {
        let file = scope.file;
        if !self.if_features_satisfied(stmt, file)? {
            return Ok(Vec::new());
        }
        if ctx.uses_depth >= MAX_USES_DEPTH {
            return Err(self.semantic(
                file,
                stmt.line,
                format!("uses of '{}' nests too deeply; the grouping probably uses itself", stmt.arg()),
            ));
        }
        let (grouping, origin) = self
            .lookup_grouping(scope, stmt.arg(), stmt.line)?
            .ok_or_else(|| self.unresolved(file, stmt.line, "grouping", stmt.arg()))?;
        let root;
        let def_scope: &Scope<'a, '_> = match origin {
            Origin::Lexical(s) => s,
            Origin::Root(def_file) => {
                root = Scope::root(def_file);
                &root
            }
        };
        let grouping_scope = def_scope.nested(grouping);
        let grouping_ctx = NodeCtx {
            added_by_uses: true,
            uses_depth: ctx.uses_depth + 1,
            ..ctx.clone()
        };
        let mut nodes = self.compile_body(grouping, &grouping_scope, &grouping_ctx)?;

        for refine in stmt.children("refine") {
            self.apply_refine(&mut nodes, refine, scope, ctx)?;
        }
        let uses_scope = scope.nested(stmt);
        for augment in stmt.children("augment") {
            self.apply_uses_augment(&mut nodes, augment, &uses_scope, ctx)?;
        }
        if let Some(when) = stmt.child_arg("when") {
            for node in &mut nodes {
                node.info_mut().when.get_or_insert_with(|| when.to_string());
            }
        }
        Ok(nodes)
    }

    fn apply_refine(
        &self,
        nodes: &mut Vec<DataSchemaNode>,
        refine: &'a Statement,
        scope: &Scope<'a, '_>,
        ctx: &NodeCtx,
    ) -> ParserResult<()> {
        let file = scope.file;
        let path = self.schema_path(refine.arg(), file, &ctx.ns, refine.line)?;
        let not_found = || self.semantic(file, refine.line, format!("refine target '{}' not found", refine.arg()));

        if !self.if_features_satisfied(refine, file)? {
            return if remove_target(nodes, &path) {
                Ok(())
            } else {
                Err(not_found())
            };
        }

        let node = match find_target_mut(nodes, &path) {
            Some(Target::Node(node)) => node,
            Some(Target::Case(case)) => {
                refine_common(&mut case.info, refine);
                return Ok(());
            }
            Some(Target::Body(_)) | None => return Err(not_found()),
        };
        refine_common(node.info_mut(), refine);
        if let Some(c) = refine.child("config") {
            let config = self.parse_bool(c, file)?;
            set_config(node, config);
        }
        let mandatory = refine.child("mandatory").map(|m| self.parse_bool(m, file)).transpose()?;
        let defaults: Vec<&Statement> = refine.children("default").collect();

        match node {
            DataSchemaNode::Container(c) => {
                if let Some(p) = refine.child_arg("presence") {
                    c.presence = Some(p.to_string());
                }
            }
            DataSchemaNode::Leaf(l) => {
                if let Some(m) = mandatory {
                    l.mandatory = m;
                    if m && defaults.is_empty() {
                        l.default = None;
                    }
                }
                if let Some(d) = defaults.first() {
                    self.check_default(&l.type_, d.arg(), file, d.line, refine.arg())?;
                    l.default = Some(d.arg().to_string());
                }
                if l.mandatory && l.default.is_some() {
                    return Err(self.semantic(
                        file,
                        refine.line,
                        format!("refine of '{}' leaves it mandatory with a default", refine.arg()),
                    ));
                }
            }
            DataSchemaNode::LeafList(l) => {
                if !defaults.is_empty() {
                    l.defaults.clear();
                    for d in &defaults {
                        self.check_default(&l.type_, d.arg(), file, d.line, refine.arg())?;
                        l.defaults.push(d.arg().to_string());
                    }
                }
                if let Some(m) = refine.child("min-elements") {
                    l.min_elements = self.min_elements(m, file)?;
                }
                if let Some(m) = refine.child("max-elements") {
                    l.max_elements = self.max_elements(m, file)?;
                }
            }
            DataSchemaNode::List(l) => {
                if let Some(m) = refine.child("min-elements") {
                    l.min_elements = self.min_elements(m, file)?;
                }
                if let Some(m) = refine.child("max-elements") {
                    l.max_elements = self.max_elements(m, file)?;
                }
            }
            DataSchemaNode::Choice(c) => {
                if let Some(m) = mandatory {
                    c.mandatory = m;
                }
                if let Some(d) = defaults.first() {
                    let qname = self.qname(&ctx.ns, d.arg(), file, d.line)?;
                    if !c.cases.iter().any(|case| case.info.qname == qname) {
                        return Err(not_found());
                    }
                    c.default_case = Some(qname);
                }
            }
        }
        Ok(())
    }

    fn apply_uses_augment(
        &self,
        nodes: &mut Vec<DataSchemaNode>,
        augment: &'a Statement,
        scope: &Scope<'a, '_>,
        ctx: &NodeCtx,
    ) -> ParserResult<()> {
        let file = scope.file;
        if !self.if_features_satisfied(augment, file)? {
            return Ok(());
        }
        let path = self.schema_path(augment.arg(), file, &ctx.ns, augment.line)?;
        let target = find_target_mut(nodes, &path).ok_or_else(|| ParserError::InvalidAugmentTarget {
            module: self.module_name(file).to_string(),
            line: augment.line,
            target: augment.arg().to_string(),
        })?;
        let augment_scope = scope.nested(augment);
        self.augment_target(target, augment, &augment_scope, ctx)?;
        Ok(())
    }
}

fn refine_common(info: &mut SchemaNodeInfo, refine: &Statement) {
    if let Some(d) = refine.child_arg("description") {
        info.description = Some(d.to_string());
    }
    if let Some(r) = refine.child_arg("reference") {
        info.reference = Some(r.to_string());
    }
    info.must.extend(refine.children("must").map(|m| m.arg().to_string()));
}

/// Set config on a node; `false` propagates to every descendant.
fn set_config(node: &mut DataSchemaNode, config: bool) {
    node.info_mut().config = config;
    if config {
        return;
    }
    match node {
        DataSchemaNode::Choice(choice) => {
            for case in &mut choice.cases {
                case.info.config = false;
                for child in &mut case.children {
                    set_config(child, false);
                }
            }
        }
        other => {
            if let Some(children) = other.children_mut() {
                for child in children {
                    set_config(child, false);
                }
            }
        }
    }
}
