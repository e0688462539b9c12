//! Lexical scopes for `typedef` and `grouping` lookup.
//!
//! Typedefs and groupings are visible in the statement that declares them
//! and in all its descendants (RFC 7950 §5.5). A [`Scope`] records the
//! definitions one statement declares and links to its enclosing scope;
//! the chain ends at a file's root, after which module-level definitions
//! (from the module and all its submodules) are consulted.

use crate::statement::Statement;

/// One level of lexical scope.
#[derive(Debug)]
pub(crate) struct Scope<'a, 'p> {
    parent: Option<&'p Scope<'a, 'p>>,
    /// File whose prefix table applies.
    pub file: usize,
    typedefs: Vec<&'a Statement>,
    groupings: Vec<&'a Statement>,
}

/// Where a definition was found.
pub(crate) enum Origin<'a, 'p> {
    /// In a nested scope; the definition's own scope is this one.
    Lexical(&'p Scope<'a, 'p>),
    /// At module level, in the given file.
    Root(usize),
}

impl<'a, 'p> Scope<'a, 'p> {
    /// The root scope of a file.
    pub fn root(file: usize) -> Self {
        Self {
            parent: None,
            file,
            typedefs: Vec::new(),
            groupings: Vec::new(),
        }
    }

    /// A child scope holding the definitions `stmt` declares.
    pub fn nested<'q>(&'q self, stmt: &'a Statement) -> Scope<'a, 'q> {
        Scope {
            parent: Some(self),
            file: self.file,
            typedefs: stmt.children("typedef").collect(),
            groupings: stmt.children("grouping").collect(),
        }
    }

    /// Find a nested typedef, innermost first.
    pub fn find_typedef(&'p self, name: &str) -> Option<(&'a Statement, Origin<'a, 'p>)> {
        let mut current = Some(self);
        while let Some(scope) = current {
            if let Some(td) = scope.typedefs.iter().find(|t| t.arg() == name) {
                return Some((td, Origin::Lexical(scope)));
            }
            current = scope.parent;
        }
        None
    }

    /// Find a nested grouping, innermost first.
    pub fn find_grouping(&'p self, name: &str) -> Option<(&'a Statement, Origin<'a, 'p>)> {
        let mut current = Some(self);
        while let Some(scope) = current {
            if let Some(g) = scope.groupings.iter().find(|g| g.arg() == name) {
                return Some((g, Origin::Lexical(scope)));
            }
            current = scope.parent;
        }
        None
    }
}

/// Split `prefix:name`.
pub(crate) fn split_prefix(text: &str) -> (Option<&str>, &str) {
    match text.split_once(':') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, text),
    }
}
