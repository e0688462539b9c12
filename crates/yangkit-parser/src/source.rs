//! # Schema Sources
//!
//! A [`YangTextSchemaSource`] is YANG text plus the identity its file name
//! announces. The `name@YYYY-MM-DD.yang` convention (RFC 7950 §5.2) yields
//! a [`SourceIdentifier`]; the builder cross-checks it against the parsed
//! module header.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use yangkit_core::Revision;

use crate::error::{ParserError, ParserResult};

/// Module name and optional revision a source claims to contain.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceIdentifier {
    /// Module or submodule name.
    pub name: String,
    /// Revision from the file name, if present.
    pub revision: Option<Revision>,
}

impl SourceIdentifier {
    /// Identifier with an explicit name and revision.
    pub fn new(name: impl Into<String>, revision: Option<Revision>) -> Self {
        Self {
            name: name.into(),
            revision,
        }
    }

    /// Derive an identifier from a file name such as
    /// `ietf-network@2018-02-26.yang`. Directory components are ignored.
    pub fn from_file_name(file_name: &str) -> ParserResult<Self> {
        let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
        let stem = base.strip_suffix(".yang").unwrap_or(base);
        match stem.split_once('@') {
            Some((name, rev)) => {
                let revision = Revision::of(rev).map_err(|e| ParserError::Io {
                    source_name: file_name.to_string(),
                    reason: e.to_string(),
                })?;
                Ok(Self::new(name, Some(revision)))
            }
            None => Ok(Self::new(stem, None)),
        }
    }
}

impl fmt::Display for SourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.revision {
            Some(rev) => write!(f, "{}@{}", self.name, rev),
            None => f.write_str(&self.name),
        }
    }
}

/// YANG source text with its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YangTextSchemaSource {
    identifier: SourceIdentifier,
    source_name: String,
    text: String,
}

impl YangTextSchemaSource {
    /// Load a bundled resource. `resource_path` is relative to
    /// `resource_root`; a leading `/` is accepted, as in
    /// `/mainSources/ietf-network@2018-02-26.yang`.
    pub fn for_resource(resource_root: &Path, resource_path: &str) -> ParserResult<Self> {
        let relative = resource_path.trim_start_matches('/');
        let full: PathBuf = resource_root.join(relative);
        let text = fs::read_to_string(&full).map_err(|e| ParserError::Io {
            source_name: resource_path.to_string(),
            reason: format!("{} ({})", e, full.display()),
        })?;
        Ok(Self {
            identifier: SourceIdentifier::from_file_name(relative)?,
            source_name: resource_path.to_string(),
            text,
        })
    }

    /// Load a file from disk.
    pub fn for_file(path: &Path) -> ParserResult<Self> {
        let display = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|e| ParserError::Io {
            source_name: display.clone(),
            reason: e.to_string(),
        })?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ParserError::Io {
                source_name: display.clone(),
                reason: "path has no UTF-8 file name".to_string(),
            })?;
        Ok(Self {
            identifier: SourceIdentifier::from_file_name(file_name)?,
            source_name: display,
            text,
        })
    }

    /// Wrap in-memory text. `name` follows the file-name convention.
    pub fn from_string(name: &str, text: impl Into<String>) -> ParserResult<Self> {
        Ok(Self {
            identifier: SourceIdentifier::from_file_name(name)?,
            source_name: name.to_string(),
            text: text.into(),
        })
    }

    /// Identifier derived from the name.
    pub fn identifier(&self) -> &SourceIdentifier {
        &self.identifier
    }

    /// Name used in error messages.
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// The YANG text.
    pub fn text(&self) -> &str {
        &self.text
    }
}
