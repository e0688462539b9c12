//! # Source Selection
//!
//! Decides which of the supplied sources take part in a schema context and
//! in what order they are linked.
//!
//! Main sources always take part. Library sources take part only when a
//! selected module imports them, or a selected module includes them as a
//! submodule, directly or transitively. An import with a `revision-date`
//! needs that exact revision; otherwise the latest supplied revision wins.
//!
//! Selected modules come out in import order: every module appears after
//! all modules it imports. YANG forbids import cycles, so a cycle is an
//! error.

use std::collections::{BTreeMap, HashSet};

use yangkit_core::Revision;

use crate::error::{ParserError, ParserResult};
use crate::source::{SourceIdentifier, YangTextSchemaSource};
use crate::statement::{parse_statements, Statement};

/// A source parsed into its statement tree.
#[derive(Debug, Clone)]
pub(crate) struct ParsedSource {
    pub source_name: String,
    pub root: Statement,
    pub revision: Option<Revision>,
    pub is_lib: bool,
}

impl ParsedSource {
    /// Parse a source and check its header against its identifier.
    pub fn parse(source: &YangTextSchemaSource, is_lib: bool) -> ParserResult<Self> {
        let root = parse_statements(source.source_name(), source.text())?;
        let mut revision: Option<Revision> = None;
        for stmt in root.children("revision") {
            let rev = Revision::of(stmt.arg()).map_err(|e| ParserError::Semantic {
                module: root.arg().to_string(),
                line: stmt.line,
                message: e.to_string(),
            })?;
            revision = revision.max(Some(rev));
        }
        let parsed = Self {
            source_name: source.source_name().to_string(),
            root,
            revision,
            is_lib,
        };
        let declared = SourceIdentifier::new(parsed.name(), parsed.revision);
        let expected = source.identifier();
        let revision_matches = expected.revision.is_none() || expected.revision == declared.revision;
        if declared.name != expected.name || !revision_matches {
            return Err(ParserError::SourceMismatch {
                source_name: parsed.source_name.clone(),
                declared: declared.to_string(),
                expected: expected.to_string(),
            });
        }
        Ok(parsed)
    }

    pub fn name(&self) -> &str {
        self.root.arg()
    }

    pub fn is_submodule(&self) -> bool {
        self.root.keyword == "submodule"
    }

    pub fn display_id(&self) -> String {
        SourceIdentifier::new(self.name(), self.revision).to_string()
    }
}

/// The outcome of selection.
#[derive(Debug)]
pub(crate) struct Selection<'a> {
    /// Modules in import order.
    pub modules: Vec<&'a ParsedSource>,
    /// Submodules of each selected module, parallel to `modules`.
    pub submodules: Vec<Vec<&'a ParsedSource>>,
}

impl<'a> Selection<'a> {
    /// Index of the selected module `name`, at `revision` or the latest.
    pub fn find(&self, name: &str, revision: Option<Revision>) -> Option<usize> {
        let candidates = self
            .modules
            .iter()
            .enumerate()
            .filter(|(_, m)| m.name() == name);
        match revision {
            Some(rev) => candidates
                .filter(|(_, m)| m.revision == Some(rev))
                .map(|(i, _)| i)
                .next(),
            None => candidates.max_by_key(|(_, m)| m.revision).map(|(i, _)| i),
        }
    }
}

type Key = (String, Option<Revision>);

fn key_of(source: &ParsedSource) -> Key {
    (source.name().to_string(), source.revision)
}

fn import_revision(stmt: &Statement, module: &str) -> ParserResult<Option<Revision>> {
    stmt.child("revision-date")
        .map(|r| {
            Revision::of(r.arg()).map_err(|e| ParserError::Semantic {
                module: module.to_string(),
                line: r.line,
                message: e.to_string(),
            })
        })
        .transpose()
}

fn pick<'a>(pool: &BTreeMap<Key, &'a ParsedSource>, name: &str, revision: Option<Revision>) -> Option<&'a ParsedSource> {
    match revision {
        Some(rev) => pool.get(&(name.to_string(), Some(rev))).copied(),
        None => pool
            .iter()
            .filter(|((n, _), _)| n == name)
            .max_by_key(|((_, r), _)| *r)
            .map(|(_, s)| *s),
    }
}

/// Select and order the sources to link.
pub(crate) fn select(sources: &[ParsedSource]) -> ParserResult<Selection<'_>> {
    let mut modules: BTreeMap<Key, &ParsedSource> = BTreeMap::new();
    let mut submodules: BTreeMap<Key, &ParsedSource> = BTreeMap::new();
    for source in sources {
        let pool = if source.is_submodule() {
            &mut submodules
        } else {
            &mut modules
        };
        if pool.insert(key_of(source), source).is_some() {
            return Err(ParserError::DuplicateModule {
                module: source.display_id(),
            });
        }
    }

    if !sources.iter().any(|s| !s.is_lib) {
        return Err(ParserError::NoSources);
    }

    // Roots: main modules, plus the parents of main submodules.
    let mut queue: Vec<&ParsedSource> = Vec::new();
    let mut main_submodules: Vec<&ParsedSource> = Vec::new();
    for source in sources.iter().filter(|s| !s.is_lib) {
        if source.is_submodule() {
            let parent = source.root.child_arg("belongs-to").unwrap_or("");
            let parent_source = pick(&modules, parent, None).ok_or_else(|| ParserError::OrphanSubmodule {
                submodule: source.name().to_string(),
                parent: parent.to_string(),
            })?;
            queue.push(parent_source);
            main_submodules.push(source);
        } else {
            queue.push(source);
        }
    }

    let mut selected: Vec<&ParsedSource> = Vec::new();
    let mut seen: HashSet<Key> = HashSet::new();
    let mut includes: BTreeMap<Key, Vec<&ParsedSource>> = BTreeMap::new();
    let mut imports: BTreeMap<Key, Vec<Key>> = BTreeMap::new();

    while let Some(module) = queue.pop() {
        let key = key_of(module);
        if !seen.insert(key.clone()) {
            continue;
        }
        selected.push(module);

        // Walk the module and, transitively, its included submodules.
        let mut files: Vec<&ParsedSource> = vec![module];
        let mut included: Vec<&ParsedSource> = Vec::new();
        let mut imported: Vec<Key> = Vec::new();
        while let Some(file) = files.pop() {
            for import in file.root.children("import") {
                let revision = import_revision(import, module.name())?;
                let target = pick(&modules, import.arg(), revision).ok_or_else(|| ParserError::MissingImport {
                    module: file.name().to_string(),
                    import: import.arg().to_string(),
                    revision: revision.map(|r| format!(" revision-date {r}")).unwrap_or_default(),
                })?;
                imported.push(key_of(target));
                queue.push(target);
            }
            for include in file.root.children("include") {
                let revision = import_revision(include, module.name())?;
                let sub = pick(&submodules, include.arg(), revision).ok_or_else(|| ParserError::MissingInclude {
                    module: file.name().to_string(),
                    submodule: include.arg().to_string(),
                })?;
                if sub.root.child_arg("belongs-to") != Some(module.name()) {
                    return Err(ParserError::OrphanSubmodule {
                        submodule: sub.name().to_string(),
                        parent: module.name().to_string(),
                    });
                }
                if !included.iter().any(|s| key_of(s) == key_of(sub)) {
                    included.push(sub);
                    files.push(sub);
                }
            }
        }
        includes.insert(key.clone(), included);
        imports.insert(key, imported);
    }

    for sub in main_submodules {
        let parent = sub.root.child_arg("belongs-to").unwrap_or("");
        let is_included = includes
            .iter()
            .any(|((name, _), subs)| name == parent && subs.iter().any(|s| key_of(s) == key_of(sub)));
        if !is_included {
            return Err(ParserError::OrphanSubmodule {
                submodule: sub.name().to_string(),
                parent: parent.to_string(),
            });
        }
    }

    // Depth-first topological sort over imports.
    let by_key: BTreeMap<Key, &ParsedSource> = selected.iter().map(|s| (key_of(s), *s)).collect();
    let mut order: Vec<&ParsedSource> = Vec::new();
    let mut done: HashSet<Key> = HashSet::new();
    let mut on_stack: HashSet<Key> = HashSet::new();
    for key in by_key.keys() {
        visit(key, &imports, &by_key, &mut done, &mut on_stack, &mut order)?;
    }

    let submodules = order
        .iter()
        .map(|m| includes.get(&key_of(m)).cloned().unwrap_or_default())
        .collect();
    Ok(Selection {
        modules: order,
        submodules,
    })
}

fn visit<'a>(
    key: &Key,
    imports: &BTreeMap<Key, Vec<Key>>,
    by_key: &BTreeMap<Key, &'a ParsedSource>,
    done: &mut HashSet<Key>,
    on_stack: &mut HashSet<Key>,
    order: &mut Vec<&'a ParsedSource>,
) -> ParserResult<()> {
    if done.contains(key) {
        return Ok(());
    }
    if !on_stack.insert(key.clone()) {
        return Err(ParserError::ImportCycle { module: key.0.clone() });
    }
    for dep in imports.get(key).into_iter().flatten() {
        visit(dep, imports, by_key, done, on_stack, order)?;
    }
    on_stack.remove(key);
    done.insert(key.clone());
    if let Some(&source) = by_key.get(key) {
        order.push(source);
    }
    Ok(())
}
