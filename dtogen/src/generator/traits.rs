//! Code generator trait definition.
//!
//! A [`CodeGenerator`] turns a frozen [`ClassSet`] into source files. Each
//! class renders to its own file plus, when the class needs structural
//! equality, a companion comparer file.

use serde::{Deserialize, Serialize};

use crate::error::CompileResult;
use crate::ir::{ClassModel, ClassSet, EnumModel, TypeModel};

/// Trait for target-language code generators.
///
/// # Example
///
/// ```rust,ignore
/// use dtogen::generator::{CodeGenerator, CSharpGenerator, GeneratorConfig};
///
/// let generator = CSharpGenerator::new();
/// let files = generator.render(&classes, &GeneratorConfig::default())?;
/// for file in &files {
///     println!("{}", file.file_name);
/// }
/// ```
pub trait CodeGenerator: Send + Sync {
    /// Short lowercase identifier, e.g. `"csharp"`.
    fn id(&self) -> &'static str;

    /// Human-readable name.
    fn name(&self) -> &'static str;

    /// Extension of generated files, without the dot.
    fn file_extension(&self) -> &'static str;

    /// File name for a generated type.
    fn file_name(&self, type_name: &str) -> String {
        format!("{}.{}", type_name, self.file_extension())
    }

    /// Render one class and, when it needs one, its equality comparer.
    ///
    /// `classes` is the set the class belongs to; referenced types are
    /// looked up there.
    fn render_class(
        &self,
        class: &ClassModel,
        classes: &ClassSet,
        config: &GeneratorConfig,
    ) -> CompileResult<RenderedClass>;

    /// Render one enumeration.
    fn render_enum(
        &self,
        enumeration: &EnumModel,
        config: &GeneratorConfig,
    ) -> CompileResult<GeneratedFile>;

    /// Render every type of a class set in registration order.
    ///
    /// A class file is directly followed by its comparer file.
    fn render(
        &self,
        classes: &ClassSet,
        config: &GeneratorConfig,
    ) -> CompileResult<Vec<GeneratedFile>> {
        let mut files = Vec::with_capacity(classes.len() * 2);
        for model in &classes.types {
            match model {
                TypeModel::Class(class) => {
                    let rendered = self.render_class(class, classes, config)?;
                    files.push(rendered.class);
                    files.extend(rendered.comparer);
                }
                TypeModel::Enum(enumeration) => {
                    files.push(self.render_enum(enumeration, config)?);
                }
            }
        }
        tracing::debug!(generator = self.id(), files = files.len(), "rendered class set");
        Ok(files)
    }
}

/// Generator configuration options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Namespace that qualifies every generated type
    pub namespace: String,

    /// Comment written at the top of every file, one comment line per line
    pub header: Option<String>,

    /// Whether to emit documentation comments from schema descriptions
    pub generate_docs: bool,

    pub indent: IndentStyle,

    pub line_ending: LineEnding,
}

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "Generated";

/// Header used when none is configured.
pub const DEFAULT_HEADER: &str = "<auto-generated />";

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            header: Some(DEFAULT_HEADER.to_string()),
            generate_docs: true,
            indent: IndentStyle::default(),
            line_ending: LineEnding::default(),
        }
    }
}

impl GeneratorConfig {
    /// Create a new generator config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the file header comment. `None` disables it.
    pub fn with_header(mut self, header: Option<String>) -> Self {
        self.header = header;
        self
    }

    /// Set whether to generate documentation comments.
    pub fn with_generate_docs(mut self, generate: bool) -> Self {
        self.generate_docs = generate;
        self
    }

    /// Set the indentation style.
    pub fn with_indent(mut self, indent: IndentStyle) -> Self {
        self.indent = indent;
        self
    }

    /// Set the line ending style.
    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }
}

/// Indentation style for generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentStyle {
    Spaces2,

    /// The usual C# layout
    #[default]
    Spaces4,

    Tabs,
}

impl IndentStyle {
    /// Get the indentation string.
    pub fn as_str(&self) -> &'static str {
        match self {
            IndentStyle::Spaces2 => "  ",
            IndentStyle::Spaces4 => "    ",
            IndentStyle::Tabs => "\t",
        }
    }

    /// Create an indentation string for the given depth.
    pub fn indent(&self, depth: usize) -> String {
        self.as_str().repeat(depth)
    }
}

/// Line ending style for generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// Get the line ending string.
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// What a generated file contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Class,
    Comparer,
    Enum,
}

/// One rendered source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// File name relative to the output directory
    pub file_name: String,

    /// Name of the generated type the file declares
    pub type_name: String,

    pub kind: FileKind,

    pub contents: String,
}

impl GeneratedFile {
    /// Create a new generated file.
    pub fn new(
        file_name: impl Into<String>,
        type_name: impl Into<String>,
        kind: FileKind,
        contents: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            type_name: type_name.into(),
            kind,
            contents: contents.into(),
        }
    }
}

/// Output of rendering one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedClass {
    pub class: GeneratedFile,

    /// Present only when the class needs structural equality
    pub comparer: Option<GeneratedFile>,
}
