//! # Parser Errors
//!
//! Every failure carries the source or module it came from. Syntax errors
//! also carry a line and column; linking errors carry the statement line.

use thiserror::Error;

/// Error while reading, parsing, or linking YANG sources.
#[derive(Error, Debug)]
pub enum ParserError {
    /// A source could not be read.
    #[error("cannot read schema source '{source_name}': {reason}")]
    Io {
        /// Resource path or file name.
        source_name: String,
        /// Underlying I/O error text.
        reason: String,
    },

    /// The text is not well-formed YANG.
    #[error("syntax error in '{source_name}' at {line}:{column}: {message}")]
    Syntax {
        /// Source name.
        source_name: String,
        /// 1-based line.
        line: usize,
        /// 1-based column.
        column: usize,
        /// What went wrong.
        message: String,
    },

    /// The file name and the module header disagree.
    #[error("source '{source_name}' declares {declared}, but its identifier says {expected}")]
    SourceMismatch {
        /// Source name.
        source_name: String,
        /// What the header declares.
        declared: String,
        /// What the file name implies.
        expected: String,
    },

    /// The same module revision was supplied twice.
    #[error("duplicate module {module}")]
    DuplicateModule {
        /// `name@revision`.
        module: String,
    },

    /// An imported module is not among the sources.
    #[error("module '{module}' imports '{import}'{revision}, which was not supplied")]
    MissingImport {
        /// Importing module.
        module: String,
        /// Imported module.
        import: String,
        /// ` revision-date X` suffix, or empty.
        revision: String,
    },

    /// An included submodule is not among the sources.
    #[error("module '{module}' includes submodule '{submodule}', which was not supplied")]
    MissingInclude {
        /// Including module.
        module: String,
        /// Included submodule.
        submodule: String,
    },

    /// A submodule's `belongs-to` does not name a supplied module.
    #[error("submodule '{submodule}' belongs to '{parent}', which does not include it")]
    OrphanSubmodule {
        /// Submodule name.
        submodule: String,
        /// Declared parent.
        parent: String,
    },

    /// Imports form a cycle.
    #[error("import cycle involving module '{module}'")]
    ImportCycle {
        /// One module on the cycle.
        module: String,
    },

    /// A statement is semantically invalid.
    #[error("{module}:{line}: {message}")]
    Semantic {
        /// Module being linked.
        module: String,
        /// Line of the offending statement.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// A name could not be resolved.
    #[error("{module}:{line}: unresolved {kind} '{name}'")]
    Unresolved {
        /// Module being linked.
        module: String,
        /// Line of the referencing statement.
        line: usize,
        /// What kind of name: prefix, type, grouping, identity, feature.
        kind: &'static str,
        /// The unresolved name as written.
        name: String,
    },

    /// An `augment` target does not exist.
    #[error("{module}:{line}: augment target '{target}' not found")]
    InvalidAugmentTarget {
        /// Augmenting module.
        module: String,
        /// Line of the augment statement.
        line: usize,
        /// Target path as written.
        target: String,
    },

    /// No main sources were added before building.
    #[error("no main sources were added to the parser")]
    NoSources,
}

/// Result alias for the parser.
pub type ParserResult<T> = Result<T, ParserError>;
