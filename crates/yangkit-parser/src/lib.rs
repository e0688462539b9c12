//! # yangkit-parser — YANG Text to Schema Context
//!
//! Reads YANG 1.0/1.1 modules and submodules and links them into a
//! [`SchemaContext`](yangkit_model::SchemaContext).
//!
//! ## Pipeline
//!
//! 1. [`lexer`] splits text into tokens (RFC 7950 §6).
//! 2. [`statement`] builds the generic statement tree.
//! 3. Source selection picks the modules that take part: all main sources,
//!    plus library sources they import or include.
//! 4. The linker resolves prefixes, typedefs, groupings, identities,
//!    features, and augments into the schema object model.
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use yangkit_parser::{DefaultYangParserFactory, YangParser, YangParserFactory, YangTextSchemaSource};
//!
//! # fn main() -> Result<(), yangkit_parser::ParserError> {
//! let root = Path::new("resources");
//! let mut parser = DefaultYangParserFactory.create_parser();
//! parser
//!     .add_source(&YangTextSchemaSource::for_resource(root, "/mainSources/ietf-network@2018-02-26.yang")?)?
//!     .add_lib_source(&YangTextSchemaSource::for_resource(root, "/all_the_modules/ietf-inet-types@2013-07-15.yang")?)?;
//! let context = parser.build_schema_context()?;
//! # let _ = context;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod factory;
pub mod lexer;
mod linker;
mod select;
pub mod source;
pub mod statement;

pub use error::{ParserError, ParserResult};
pub use factory::{DefaultYangParserFactory, StatementParser, YangParser, YangParserFactory};
pub use source::{SourceIdentifier, YangTextSchemaSource};
pub use statement::{parse_statements, Statement};
