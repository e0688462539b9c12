//! # yangkit-core — Foundational Types
//!
//! This crate defines the identifiers and values shared by every other
//! crate in the workspace: the schema model, the parser, and the data tree.
//! It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Validated newtypes.** `Revision` is a real calendar date and
//!    `QName` local names follow the YANG identifier grammar. Neither can be
//!    constructed in an invalid state.
//!
//! 2. **Namespace-qualified names everywhere.** Nodes are addressed by
//!    `QName` (namespace + revision + local name), never by bare strings.
//!    Two modules may define the same local name without collision.
//!
//! 3. **Typed leaf values.** `Value` carries the built-in YANG value space
//!    (integers, decimal64, strings, bits, identities, ...) and is totally
//!    ordered so it can participate in list keys.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `yangkit-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod instance_id;
pub mod qname;
pub mod revision;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use error::CoreError;
pub use instance_id::{PathArgument, YangInstanceIdentifier};
pub use qname::{is_valid_identifier, QName, QNameModule, DATA_ROOT_NAMESPACE};
pub use revision::Revision;
pub use value::Value;
