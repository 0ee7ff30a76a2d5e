//! Intermediate Representation (IR) module.
//!
//! Target-language-agnostic description of the generated types: the type
//! reference model ([`types`]) and the class/property models ([`model`]).
//! The IR is produced by inference and consumed by code generators.

pub mod model;
pub mod types;

pub use model::{
    ClassModel, ClassSet, DefaultLiteral, EnumLiteral, EnumMember, EnumModel, PropertyModel,
    Requirement, SerializationDirective, TypeModel,
};
pub use types::{ClassId, Format, PrimitiveKind, TypeRef};
