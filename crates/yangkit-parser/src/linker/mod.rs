//! # Schema Linker
//!
//! Turns selected statement trees into a [`SchemaContext`].
//!
//! ## Phases
//!
//! 1. **Units.** Each selected module and its submodules become files with
//!    their own prefix tables. Module-level typedefs, groupings, identities
//!    and features are indexed across all files of a module.
//! 2. **Modules.** In import order, each module's definitions and data
//!    nodes are compiled: types resolved through typedef chains with
//!    restrictions merged, `uses` expanded with `refine` and `augment`
//!    applied, choices and cases normalized, config inherited, list keys
//!    checked.
//! 3. **Augments.** Top-level `augment` statements are applied until no
//!    more can be placed; an augment whose target never appears fails the
//!    build.
//!
//! Nodes instantiated from a grouping take the namespace of the module
//! that uses it. Type and prefix resolution inside the grouping follow
//! the grouping's own lexical scope.

mod augment;
mod features;
mod nodes;
mod scope;
mod types;

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info, warn};
use yangkit_core::{QName, QNameModule, Revision};
use yangkit_model::{
    DataSchemaNode, FeatureDefinition, GroupingDefinition, IdentitySchemaNode, Module, ModuleImport,
    NotificationDefinition, RpcDefinition, SchemaContext, Status, TypeDefinitionNode, YangVersion,
};

use crate::error::{ParserError, ParserResult};
use crate::select::{select, ParsedSource, Selection};
use crate::statement::Statement;

use augment::PendingAugment;
use nodes::NodeCtx;
use scope::{split_prefix, Origin, Scope};

/// One source file taking part in linking.
struct FileUnit<'a> {
    stmt: &'a Statement,
    module: usize,
    prefixes: HashMap<String, usize>,
}

/// One module, with indexes over all of its files.
struct ModuleUnit<'a> {
    name: &'a str,
    qname_module: QNameModule,
    files: Vec<usize>,
    imports: Vec<ModuleImport>,
    typedefs: Vec<(&'a Statement, usize)>,
    groupings: Vec<(&'a Statement, usize)>,
    identities: Vec<&'a Statement>,
    features: Vec<(&'a Statement, usize)>,
}

pub(crate) struct Linker<'a> {
    files: Vec<FileUnit<'a>>,
    modules: Vec<ModuleUnit<'a>>,
    supported_features: Option<&'a BTreeSet<String>>,
}

/// Select, link, and assemble a schema context.
pub(crate) fn link(sources: &[ParsedSource], supported_features: Option<&BTreeSet<String>>) -> ParserResult<SchemaContext> {
    let selection = select(sources)?;
    let linker = Linker::new(&selection, supported_features)?;
    let mut modules = Vec::with_capacity(linker.modules.len());
    let mut pending = Vec::new();
    for idx in 0..linker.modules.len() {
        let (module, augments) = linker.build_module(idx)?;
        modules.push(module);
        pending.extend(augments);
    }
    linker.apply_augments(&mut modules, pending)?;
    info!(modules = modules.len(), "schema context linked");
    Ok(SchemaContext::new(modules))
}

impl<'a> Linker<'a> {
    fn new(selection: &Selection<'a>, supported_features: Option<&'a BTreeSet<String>>) -> ParserResult<Self> {
        let mut files: Vec<FileUnit<'a>> = Vec::new();
        let mut modules: Vec<ModuleUnit<'a>> = Vec::new();

        for (idx, (&source, subs)) in selection.modules.iter().zip(&selection.submodules).enumerate() {
            let root = &source.root;
            let semantic = |line: usize, message: String| ParserError::Semantic {
                module: source.name().to_string(),
                line,
                message,
            };
            let namespace = root
                .child_arg("namespace")
                .ok_or_else(|| semantic(root.line, "module has no namespace".to_string()))?;
            let qname_module =
                QNameModule::create(namespace, source.revision).map_err(|e| semantic(root.line, e.to_string()))?;

            let mut unit = ModuleUnit {
                name: source.name(),
                qname_module,
                files: Vec::new(),
                imports: Vec::new(),
                typedefs: Vec::new(),
                groupings: Vec::new(),
                identities: Vec::new(),
                features: Vec::new(),
            };

            for file_source in std::iter::once(source).chain(subs.iter().copied()) {
                let file_root = &file_source.root;
                let own_prefix = if file_source.is_submodule() {
                    file_root.child("belongs-to").and_then(|b| b.child_arg("prefix"))
                } else {
                    file_root.child_arg("prefix")
                }
                .ok_or_else(|| semantic(file_root.line, format!("'{}' declares no prefix", file_source.name())))?;

                let mut prefixes = HashMap::new();
                prefixes.insert(own_prefix.to_string(), idx);
                for import in file_root.children("import") {
                    let prefix = import
                        .child_arg("prefix")
                        .ok_or_else(|| semantic(import.line, format!("import of '{}' has no prefix", import.arg())))?;
                    let revision = import
                        .child_arg("revision-date")
                        .map(Revision::of)
                        .transpose()
                        .map_err(|e| semantic(import.line, e.to_string()))?;
                    let target = selection.find(import.arg(), revision).ok_or_else(|| ParserError::MissingImport {
                        module: file_source.name().to_string(),
                        import: import.arg().to_string(),
                        revision: revision.map(|r| format!(" revision-date {r}")).unwrap_or_default(),
                    })?;
                    if prefixes.insert(prefix.to_string(), target).is_some() {
                        return Err(semantic(import.line, format!("prefix '{prefix}' is declared twice")));
                    }
                    if !unit.imports.iter().any(|i| i.module_name == import.arg() && i.prefix == prefix) {
                        unit.imports.push(ModuleImport {
                            module_name: import.arg().to_string(),
                            prefix: prefix.to_string(),
                            revision,
                            resolved_revision: selection.modules[target].revision,
                        });
                    }
                }

                let file = files.len();
                for sub in &file_root.substatements {
                    let index = match sub.keyword.as_str() {
                        "typedef" => &mut unit.typedefs,
                        "grouping" => &mut unit.groupings,
                        "feature" => &mut unit.features,
                        "identity" => {
                            unit.identities.push(sub);
                            continue;
                        }
                        _ => continue,
                    };
                    if index.iter().any(|(s, _)| s.arg() == sub.arg()) {
                        return Err(semantic(sub.line, format!("{} '{}' is defined twice", sub.keyword, sub.arg())));
                    }
                    index.push((sub, file));
                }
                unit.files.push(file);
                files.push(FileUnit {
                    stmt: file_root,
                    module: idx,
                    prefixes,
                });
            }
            debug!(module = %source.display_id(), files = unit.files.len(), "module unit prepared");
            modules.push(unit);
        }

        Ok(Self {
            files,
            modules,
            supported_features,
        })
    }

    // ─── Errors and Names ────────────────────────────────────────────

    fn module_name(&self, file: usize) -> &str {
        self.modules[self.files[file].module].name
    }

    fn semantic(&self, file: usize, line: usize, message: impl Into<String>) -> ParserError {
        ParserError::Semantic {
            module: self.module_name(file).to_string(),
            line,
            message: message.into(),
        }
    }

    fn unresolved(&self, file: usize, line: usize, kind: &'static str, name: &str) -> ParserError {
        ParserError::Unresolved {
            module: self.module_name(file).to_string(),
            line,
            kind,
            name: name.to_string(),
        }
    }

    fn ns(&self, module: usize) -> &QNameModule {
        &self.modules[module].qname_module
    }

    /// Module index a prefix names in `file`; `None` means the file's own module.
    fn resolve_module(&self, file: usize, prefix: Option<&str>, line: usize) -> ParserResult<usize> {
        match prefix {
            None => Ok(self.files[file].module),
            Some(p) => self.files[file]
                .prefixes
                .get(p)
                .copied()
                .ok_or_else(|| self.unresolved(file, line, "prefix", p)),
        }
    }

    fn qname(&self, ns: &QNameModule, local: &str, file: usize, line: usize) -> ParserResult<QName> {
        QName::create(ns, local).map_err(|e| self.semantic(file, line, e.to_string()))
    }

    /// Resolve a schema node identifier (`/a:b/a:c` or `b/c`). Unprefixed
    /// steps take `default_ns`.
    fn schema_path(&self, text: &str, file: usize, default_ns: &QNameModule, line: usize) -> ParserResult<Vec<QName>> {
        let trimmed = text.trim();
        let body = trimmed.strip_prefix('/').unwrap_or(trimmed);
        if body.is_empty() {
            return Err(self.semantic(file, line, format!("empty schema node identifier '{text}'")));
        }
        body.split('/')
            .map(|step| {
                let (prefix, local) = split_prefix(step.trim());
                let ns = match prefix {
                    None => default_ns.clone(),
                    Some(_) => self.ns(self.resolve_module(file, prefix, line)?).clone(),
                };
                self.qname(&ns, local, file, line)
            })
            .collect()
    }

    fn parse_bool(&self, stmt: &Statement, file: usize) -> ParserResult<bool> {
        match stmt.arg() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(self.semantic(
                file,
                stmt.line,
                format!("'{}' expects true or false, found '{other}'", stmt.keyword),
            )),
        }
    }

    fn status(&self, stmt: &Statement, file: usize) -> ParserResult<Status> {
        match stmt.child("status") {
            None => Ok(Status::Current),
            Some(s) => Status::parse(s.arg()).ok_or_else(|| self.semantic(file, s.line, format!("invalid status '{}'", s.arg()))),
        }
    }

    // ─── Definition Lookup ───────────────────────────────────────────

    fn lookup_typedef<'p>(
        &self,
        scope: &'p Scope<'a, 'p>,
        text: &str,
        line: usize,
    ) -> ParserResult<Option<(&'a Statement, Origin<'a, 'p>)>> {
        let (prefix, name) = split_prefix(text);
        let module = self.resolve_module(scope.file, prefix, line)?;
        if module == self.files[scope.file].module {
            if let Some(found) = scope.find_typedef(name) {
                return Ok(Some(found));
            }
        }
        Ok(self.modules[module]
            .typedefs
            .iter()
            .find(|(s, _)| s.arg() == name)
            .map(|(s, file)| (*s, Origin::Root(*file))))
    }

    fn lookup_grouping<'p>(
        &self,
        scope: &'p Scope<'a, 'p>,
        text: &str,
        line: usize,
    ) -> ParserResult<Option<(&'a Statement, Origin<'a, 'p>)>> {
        let (prefix, name) = split_prefix(text);
        let module = self.resolve_module(scope.file, prefix, line)?;
        if module == self.files[scope.file].module {
            if let Some(found) = scope.find_grouping(name) {
                return Ok(Some(found));
            }
        }
        Ok(self.modules[module]
            .groupings
            .iter()
            .find(|(s, _)| s.arg() == name)
            .map(|(s, file)| (*s, Origin::Root(*file))))
    }

    /// Resolve an identity reference such as `nw:base-identity`.
    fn resolve_identity(&self, text: &str, file: usize, line: usize) -> ParserResult<QName> {
        let (prefix, name) = split_prefix(text);
        let module = self.resolve_module(file, prefix, line)?;
        if !self.modules[module].identities.iter().any(|s| s.arg() == name) {
            return Err(self.unresolved(file, line, "identity", text));
        }
        self.qname(self.ns(module), name, file, line)
    }

    // ─── Module Assembly ─────────────────────────────────────────────

    fn build_module(&self, idx: usize) -> ParserResult<(Module, Vec<PendingAugment<'a>>)> {
        let unit = &self.modules[idx];
        let main = unit.files[0];
        let root = self.files[main].stmt;
        let ns = unit.qname_module.clone();

        let yang_version = match root.child("yang-version") {
            None => YangVersion::V1,
            Some(v) => match v.arg() {
                "1" | "1.0" => YangVersion::V1,
                "1.1" => YangVersion::V1_1,
                other => return Err(self.semantic(main, v.line, format!("unsupported yang-version '{other}'"))),
            },
        };
        let mut revisions: Vec<Revision> = root
            .children("revision")
            .filter_map(|r| Revision::of(r.arg()).ok())
            .collect();
        revisions.sort_by(|a, b| b.cmp(a));
        revisions.dedup();

        let text = |keyword: &str| root.child_arg(keyword).map(str::to_string);
        let mut module = Module {
            name: unit.name.to_string(),
            qname_module: ns.clone(),
            prefix: root.child_arg("prefix").unwrap_or_default().to_string(),
            yang_version,
            organization: text("organization"),
            contact: text("contact"),
            description: text("description"),
            revisions,
            imports: unit.imports.clone(),
            submodules: unit.files[1..]
                .iter()
                .map(|f| self.files[*f].stmt.arg().to_string())
                .collect(),
            typedefs: Vec::new(),
            groupings: Vec::new(),
            augmentations: Vec::new(),
            rpcs: Vec::new(),
            notifications: Vec::new(),
            identities: Vec::new(),
            features: Vec::new(),
            child_nodes: Vec::new(),
        };

        let mut pending = Vec::new();
        for &file in &unit.files {
            let stmt = self.files[file].stmt;
            let scope = Scope::root(file);
            for sub in &stmt.substatements {
                match sub.keyword.as_str() {
                    "typedef" => module.typedefs.push(self.typedef_node(sub, &scope)?),
                    "grouping" => module.groupings.push(self.grouping_definition(sub, &scope, &ns)?),
                    "identity" => module.identities.push(self.identity(sub, file, &ns)?),
                    "feature" => module.features.push(FeatureDefinition {
                        qname: self.qname(&ns, sub.arg(), file, sub.line)?,
                        description: sub.child_arg("description").map(str::to_string),
                        supported: self.feature_supported(idx, sub.arg(), file, sub.line, 0)?,
                    }),
                    "rpc" => {
                        if self.if_features_satisfied(sub, file)? {
                            module.rpcs.push(self.rpc(sub, &scope, &ns)?);
                        }
                    }
                    "notification" => {
                        if self.if_features_satisfied(sub, file)? {
                            module.notifications.push(self.notification(sub, &scope, &ns)?);
                        }
                    }
                    "augment" => pending.push(PendingAugment {
                        module: idx,
                        file,
                        stmt: sub,
                    }),
                    "deviation" => warn!(module = unit.name, target = sub.arg(), "deviation statements are not applied"),
                    "extension" => debug!(module = unit.name, extension = sub.arg(), "extension definition ignored"),
                    _ => {}
                }
            }
            let nodes = self.compile_body(stmt, &scope, &NodeCtx::data(ns.clone()))?;
            for node in nodes {
                self.push_child(&mut module.child_nodes, node, file, stmt.line)?;
            }
        }

        debug!(
            module = %module.source_name(),
            nodes = module.child_nodes.len(),
            groupings = module.groupings.len(),
            rpcs = module.rpcs.len(),
            "module compiled"
        );
        Ok((module, pending))
    }

    fn typedef_node(&self, stmt: &'a Statement, scope: &Scope<'a, '_>) -> ParserResult<TypeDefinitionNode> {
        let resolved = self.resolve_typedef(stmt, scope, 0)?;
        let qname = self.qname(self.ns(self.files[scope.file].module), stmt.arg(), scope.file, stmt.line)?;
        Ok(TypeDefinitionNode {
            qname,
            type_: resolved.type_,
            units: resolved.units,
            default: resolved.default,
            description: stmt.child_arg("description").map(str::to_string),
        })
    }

    fn grouping_definition(
        &self,
        stmt: &'a Statement,
        scope: &Scope<'a, '_>,
        ns: &QNameModule,
    ) -> ParserResult<GroupingDefinition> {
        let inner = scope.nested(stmt);
        Ok(GroupingDefinition {
            qname: self.qname(ns, stmt.arg(), scope.file, stmt.line)?,
            description: stmt.child_arg("description").map(str::to_string),
            status: self.status(stmt, scope.file)?,
            children: self.compile_body(stmt, &inner, &NodeCtx::unchecked(ns.clone()))?,
        })
    }

    fn identity(&self, stmt: &Statement, file: usize, ns: &QNameModule) -> ParserResult<IdentitySchemaNode> {
        let bases = stmt
            .children("base")
            .map(|b| self.resolve_identity(b.arg(), file, b.line))
            .collect::<ParserResult<Vec<_>>>()?;
        Ok(IdentitySchemaNode {
            qname: self.qname(ns, stmt.arg(), file, stmt.line)?,
            bases,
            description: stmt.child_arg("description").map(str::to_string),
            status: self.status(stmt, file)?,
        })
    }

    fn rpc(&self, stmt: &'a Statement, scope: &Scope<'a, '_>, ns: &QNameModule) -> ParserResult<RpcDefinition> {
        let rpc_scope = scope.nested(stmt);
        Ok(RpcDefinition {
            qname: self.qname(ns, stmt.arg(), scope.file, stmt.line)?,
            description: stmt.child_arg("description").map(str::to_string),
            status: self.status(stmt, scope.file)?,
            input: self.operation_body(stmt.child("input"), &rpc_scope, ns)?,
            output: self.operation_body(stmt.child("output"), &rpc_scope, ns)?,
        })
    }

    fn notification(
        &self,
        stmt: &'a Statement,
        scope: &Scope<'a, '_>,
        ns: &QNameModule,
    ) -> ParserResult<NotificationDefinition> {
        Ok(NotificationDefinition {
            qname: self.qname(ns, stmt.arg(), scope.file, stmt.line)?,
            description: stmt.child_arg("description").map(str::to_string),
            status: self.status(stmt, scope.file)?,
            children: self.operation_body(Some(stmt), scope, ns)?,
        })
    }

    fn operation_body(
        &self,
        stmt: Option<&'a Statement>,
        scope: &Scope<'a, '_>,
        ns: &QNameModule,
    ) -> ParserResult<Vec<DataSchemaNode>> {
        match stmt {
            None => Ok(Vec::new()),
            Some(body) => {
                let inner = scope.nested(body);
                self.compile_body(body, &inner, &NodeCtx::unchecked(ns.clone()))
            }
        }
    }
}
