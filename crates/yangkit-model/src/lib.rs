//! # yangkit-model — Schema Object Model
//!
//! The linked, immutable representation of YANG modules that the parser
//! produces and the data tree validates against.
//!
//! ## Structure
//!
//! - [`SchemaContext`]: all linked modules, with lookups by name,
//!   revision, namespace, and data-tree path.
//! - [`Module`]: one module after submodule merging, `uses` expansion,
//!   and augmentation.
//! - [`DataSchemaNode`]: container, list, leaf, leaf-list, choice.
//! - [`YangType`]: a resolved leaf type with merged restrictions and a
//!   lexical/typed value codec.
//!
//! ## Crate Policy
//!
//! - Depends only on `yangkit-core` internally.
//! - The model is plain data: public fields, no interior mutability.
//!   Schema contexts are shared across threads behind `Arc`.

pub mod context;
pub mod definitions;
pub mod module;
pub mod node;
pub mod types;

pub use context::SchemaContext;
pub use definitions::{
    AugmentationSchemaNode, FeatureDefinition, GroupingDefinition, IdentitySchemaNode, ModuleImport,
    NotificationDefinition, RpcDefinition,
};
pub use module::{Module, YangVersion};
pub use node::{
    CaseSchemaNode, ChoiceSchemaNode, ContainerSchemaNode, DataSchemaNode, LeafListSchemaNode, LeafSchemaNode,
    ListSchemaNode, SchemaNodeInfo, Status,
};
pub use types::{
    BaseType, BitMember, EnumMember, IdentityResolver, IntKind, LeafRefPath, LeafRefStep, LengthConstraint,
    NoIdentities, PatternConstraint, RangeConstraint, TypeDefinitionNode, ValueError, YangType,
};
