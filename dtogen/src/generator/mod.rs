//! Code generator module.
//!
//! Defines the [`CodeGenerator`] trait and the C# implementation.

pub mod csharp;
pub mod traits;

pub use csharp::CSharpGenerator;
pub use traits::{
    CodeGenerator, FileKind, GeneratedFile, GeneratorConfig, IndentStyle, LineEnding,
    RenderedClass, DEFAULT_HEADER, DEFAULT_NAMESPACE,
};
