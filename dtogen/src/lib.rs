//! # dtogen
//!
//! Compile JSON Schema documents into typed C# data-transfer classes.
//!
//! The compiler walks a parsed schema, infers a target type for every node,
//! deduplicates structurally identical inline objects into single classes
//! and renders one file per class. Classes that hold anything other than
//! plain primitives, and every class that comes from a named definition, get
//! an `IEqualityComparer<T>` companion that compares instances structurally,
//! nested arrays of any depth included.
//!
//! ## Pipeline
//!
//! ```text
//! JSON text -> schema::SchemaParser -> SchemaDocument
//!           -> inference::infer     -> ClassSet (via registry::ClassRegistry)
//!           -> generator::CodeGenerator::render -> Vec<GeneratedFile>
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use dtogen::{compile_source, CompileOptions};
//!
//! let schema = r#"{
//!     "type": "object",
//!     "properties": {
//!         "tags": { "type": ["array", "null"], "items": { "type": "string" } }
//!     }
//! }"#;
//!
//! let output = compile_source(schema, &CompileOptions::new().with_root_name("Post")).unwrap();
//! let names: Vec<&str> = output.files.iter().map(|f| f.file_name.as_str()).collect();
//! assert_eq!(names, ["Post.cs", "PostEqualityComparer.cs"]);
//! ```
//!
//! ## Modules
//!
//! | Module | Role |
//! |--------|------|
//! | [`schema`] | Schema Tree and its loader |
//! | [`ir`] | Type references and class models |
//! | [`registry`] | Class Registry with structural dedup |
//! | [`inference`] | Type Inference Engine |
//! | [`generator`] | Code generator trait and the C# generator |
//! | [`structural`] | Reference evaluation of the generated comparers |

pub mod error;
pub mod generator;
pub mod inference;
pub mod ir;
pub mod naming;
pub mod registry;
pub mod schema;
pub mod structural;

pub use error::{CompileError, CompileResult, ErrorKind};
pub use generator::{CSharpGenerator, CodeGenerator, GeneratedFile, GeneratorConfig};
pub use inference::{infer, DEFAULT_ROOT_NAME};
pub use ir::{ClassId, ClassModel, ClassSet, EnumModel, PropertyModel, TypeModel, TypeRef};
pub use schema::{SchemaDocument, SchemaNode, SchemaParser};
pub use structural::StructuralComparer;

/// Options for a whole compilation.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Root class name; falls back to the schema title, then `Root`
    pub root_name: Option<String>,

    pub generator: GeneratorConfig,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = Some(name.into());
        self
    }

    pub fn with_generator(mut self, config: GeneratorConfig) -> Self {
        self.generator = config;
        self
    }

    /// Root name used for `document`.
    pub fn resolve_root_name<'a>(&'a self, document: &'a SchemaDocument) -> &'a str {
        self.root_name
            .as_deref()
            .or_else(|| document.title())
            .unwrap_or(DEFAULT_ROOT_NAME)
    }
}

/// Result of compiling one schema document.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub classes: ClassSet,

    /// Rendered files in class registration order
    pub files: Vec<GeneratedFile>,
}

/// Compile a parsed document and render it as C#.
pub fn compile(document: &SchemaDocument, options: &CompileOptions) -> CompileResult<Compilation> {
    let classes = infer(document, options.resolve_root_name(document))?;
    let files = CSharpGenerator::new().render(&classes, &options.generator)?;
    Ok(Compilation { classes, files })
}

/// Parse JSON Schema text, compile it and render it as C#.
pub fn compile_source(source: &str, options: &CompileOptions) -> CompileResult<Compilation> {
    let document = SchemaDocument::from_json_str(source)?;
    compile(&document, options)
}
