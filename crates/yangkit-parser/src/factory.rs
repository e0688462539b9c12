//! # Parser Factory
//!
//! A [`YangParserFactory`] hands out fresh [`YangParser`]s. Callers receive
//! the factory as a value; there is no global registry to consult.
//!
//! A parser accumulates sources and builds one [`SchemaContext`] from them.
//! Sources are parsed into statement trees as they are added, so syntax
//! errors surface at `add_source` time; linking happens in
//! [`YangParser::build_schema_context`].

use std::collections::BTreeSet;

use tracing::{debug, info};
use yangkit_model::SchemaContext;

use crate::error::{ParserError, ParserResult};
use crate::linker::link;
use crate::select::ParsedSource;
use crate::source::YangTextSchemaSource;

/// Creates parsers.
pub trait YangParserFactory {
    /// The parser type produced.
    type Parser: YangParser;

    /// A parser with no sources.
    fn create_parser(&self) -> Self::Parser;
}

/// Collects sources and builds a schema context.
pub trait YangParser {
    /// Add a source that always takes part in the context.
    fn add_source(&mut self, source: &YangTextSchemaSource) -> ParserResult<&mut Self>;

    /// Add a source that takes part only if a main source needs it.
    fn add_lib_source(&mut self, source: &YangTextSchemaSource) -> ParserResult<&mut Self>;

    /// Restrict supported features to `features`, each written
    /// `module-name:feature-name`. Without this call every feature is
    /// supported.
    fn set_supported_features(&mut self, features: BTreeSet<String>) -> &mut Self;

    /// Link the collected sources.
    fn build_schema_context(&self) -> ParserResult<SchemaContext>;
}

/// The factory for [`StatementParser`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultYangParserFactory;

impl YangParserFactory for DefaultYangParserFactory {
    type Parser = StatementParser;

    fn create_parser(&self) -> StatementParser {
        StatementParser::default()
    }
}

/// A parser over YANG text sources.
#[derive(Debug, Default)]
pub struct StatementParser {
    sources: Vec<ParsedSource>,
    supported_features: Option<BTreeSet<String>>,
}

impl StatementParser {
    fn add(&mut self, source: &YangTextSchemaSource, is_lib: bool) -> ParserResult<&mut Self> {
        let parsed = ParsedSource::parse(source, is_lib)?;
        debug!(
            source = source.source_name(),
            module = %parsed.display_id(),
            library = is_lib,
            "schema source added"
        );
        self.sources.push(parsed);
        Ok(self)
    }

    /// Number of sources added so far.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

impl YangParser for StatementParser {
    fn add_source(&mut self, source: &YangTextSchemaSource) -> ParserResult<&mut Self> {
        self.add(source, false)
    }

    fn add_lib_source(&mut self, source: &YangTextSchemaSource) -> ParserResult<&mut Self> {
        self.add(source, true)
    }

    fn set_supported_features(&mut self, features: BTreeSet<String>) -> &mut Self {
        self.supported_features = Some(features);
        self
    }

    fn build_schema_context(&self) -> ParserResult<SchemaContext> {
        if self.sources.iter().all(|s| s.is_lib) {
            return Err(ParserError::NoSources);
        }
        info!(sources = self.sources.len(), "building schema context");
        link(&self.sources, self.supported_features.as_ref())
    }
}
