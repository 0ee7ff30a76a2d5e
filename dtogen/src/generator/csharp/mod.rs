//! C# generator.
//!
//! # Components
//!
//! - [`CSharpGenerator`] - class and enum files, implements [`CodeGenerator`]
//! - [`CSharpTypeMapper`] - type references to C# type names
//! - [`ComparerSynthesizer`] - `IEqualityComparer<T>` companions
//!
//! [`CodeGenerator`]: crate::generator::CodeGenerator

pub mod comparer;
pub mod emitter;
pub mod formatter;
pub mod type_mapper;

pub use comparer::{comparer_name, ComparerSynthesizer, HASH_MULTIPLIER, HASH_SEED};
pub use emitter::CSharpGenerator;
pub use type_mapper::CSharpTypeMapper;
