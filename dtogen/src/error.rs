//! Error types for the compiler.
//!
//! Every failure aborts the whole compilation. Errors carry the JSON pointer
//! of the offending schema node so callers can point the user at it.

use std::fmt;
use thiserror::Error;

/// Result type alias for compiler operations.
pub type CompileResult<T> = Result<T, CompileError>;

/// Error raised while loading or compiling a schema document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// A `$ref` names a definition that does not exist.
    #[error("Unresolved reference '{reference}' at {pointer}")]
    UnresolvedReference { reference: String, pointer: String },

    /// The schema uses a construct this compiler does not translate.
    #[error("Unsupported schema construct ({construct}) at {pointer}")]
    UnsupportedSchemaConstruct { construct: String, pointer: String },

    /// An array schema without `items`.
    #[error("Array schema without 'items' at {pointer}")]
    MissingArrayItemSchema { pointer: String },

    /// Suffixing failed to produce a fresh class name.
    #[error("Could not resolve a unique name for '{name}'")]
    NameCollisionUnresolvable { name: String },

    /// The document is not valid JSON or not a schema object.
    #[error("Invalid schema{}: {message}", format_location(.line, .column, .pointer))]
    InvalidSchema {
        message: String,
        pointer: Option<String>,
        line: Option<usize>,
        column: Option<usize>,
    },
}

/// Kind of a [`CompileError`], independent of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnresolvedReference,
    UnsupportedSchemaConstruct,
    MissingArrayItemSchema,
    NameCollisionUnresolvable,
    InvalidSchema,
}

impl ErrorKind {
    /// Stable name used in reports.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::UnresolvedReference => "UnresolvedReference",
            ErrorKind::UnsupportedSchemaConstruct => "UnsupportedSchemaConstruct",
            ErrorKind::MissingArrayItemSchema => "MissingArrayItemSchema",
            ErrorKind::NameCollisionUnresolvable => "NameCollisionUnresolvable",
            ErrorKind::InvalidSchema => "InvalidSchema",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl CompileError {
    /// Create an unresolved reference error.
    pub fn unresolved(reference: impl Into<String>, pointer: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            reference: reference.into(),
            pointer: pointer.into(),
        }
    }

    /// Create an unsupported construct error.
    pub fn unsupported(construct: impl Into<String>, pointer: impl Into<String>) -> Self {
        Self::UnsupportedSchemaConstruct {
            construct: construct.into(),
            pointer: pointer.into(),
        }
    }

    /// Create a missing `items` error.
    pub fn missing_items(pointer: impl Into<String>) -> Self {
        Self::MissingArrayItemSchema {
            pointer: pointer.into(),
        }
    }

    /// Create an invalid schema error located by JSON pointer.
    pub fn invalid(message: impl Into<String>, pointer: impl Into<String>) -> Self {
        Self::InvalidSchema {
            message: message.into(),
            pointer: Some(pointer.into()),
            line: None,
            column: None,
        }
    }

    /// Create an invalid schema error from a JSON syntax error.
    pub fn syntax(error: &serde_json::Error) -> Self {
        Self::InvalidSchema {
            message: error.to_string(),
            pointer: None,
            line: Some(error.line()),
            column: Some(error.column()),
        }
    }

    /// Kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::UnresolvedReference { .. } => ErrorKind::UnresolvedReference,
            CompileError::UnsupportedSchemaConstruct { .. } => {
                ErrorKind::UnsupportedSchemaConstruct
            }
            CompileError::MissingArrayItemSchema { .. } => ErrorKind::MissingArrayItemSchema,
            CompileError::NameCollisionUnresolvable { .. } => {
                ErrorKind::NameCollisionUnresolvable
            }
            CompileError::InvalidSchema { .. } => ErrorKind::InvalidSchema,
        }
    }

    /// JSON pointer of the offending node, when known.
    pub fn pointer(&self) -> Option<&str> {
        match self {
            CompileError::UnresolvedReference { pointer, .. }
            | CompileError::UnsupportedSchemaConstruct { pointer, .. }
            | CompileError::MissingArrayItemSchema { pointer } => Some(pointer),
            CompileError::InvalidSchema { pointer, .. } => pointer.as_deref(),
            CompileError::NameCollisionUnresolvable { .. } => None,
        }
    }
}

fn format_location(line: &Option<usize>, column: &Option<usize>, pointer: &Option<String>) -> String {
    match (line, column, pointer) {
        (Some(line), Some(column), _) => format!(" at line {}, column {}", line, column),
        (_, _, Some(pointer)) => format!(" at {}", pointer),
        _ => String::new(),
    }
}
