//! Error types for the CLI.
//!
//! Every failure the binary can report is a [`CliError`]. Compiler failures
//! keep the underlying [`CompileError`] so its kind and schema location stay
//! available to callers.

use std::path::PathBuf;

use dtogen::CompileError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Main error type for CLI operations.
#[derive(Debug, Error)]
pub enum CliError {
    /// Error resolving input schema files.
    #[error("Failed to resolve inputs: {0}")]
    Scan(#[from] ScanError),

    /// A schema failed to compile.
    #[error("Failed to compile {}: {source}", .path.display())]
    Compile {
        path: PathBuf,
        #[source]
        source: CompileError,
    },

    /// Error loading configuration.
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    /// Error writing output files.
    #[error("Failed to write output: {0}")]
    Write(#[from] WriteError),

    /// An instance document could not be read as JSON.
    #[error("Invalid instance {}: {message}", .path.display())]
    Instance { path: PathBuf, message: String },

    /// Validation failed (generated files out of date).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Generic IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error resolving input schema files.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A path or pattern matched no schema file.
    #[error("No schema files match: {pattern}")]
    NoMatches { pattern: String },

    /// Invalid glob pattern.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// IO error reading a schema file.
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the glob walker.
    #[error("Glob error: {0}")]
    Glob(#[from] glob::GlobError),
}

/// Error loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid TOML syntax.
    #[error("Invalid TOML in {path}: {message}")]
    InvalidToml { path: PathBuf, message: String },

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// IO error reading config.
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error writing output files.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Failed to create directory.
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to stage file contents.
    #[error("Failed to write file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Target exists and the overwrite policy forbids replacing it.
    #[error("File already exists: {path} (use --force to replace)")]
    FileExists { path: PathBuf },

    /// Two compiled schemas render a file with the same name.
    #[error("Duplicate output file {file_name} from {first} and {second}")]
    DuplicateOutput {
        file_name: String,
        first: PathBuf,
        second: PathBuf,
    },
}

impl CliError {
    /// Wrap a compiler failure for the schema at `path`.
    pub fn compile(path: impl Into<PathBuf>, source: CompileError) -> Self {
        Self::Compile {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Validation(_) => 2,
            _ => 1,
        }
    }
}

impl ScanError {
    /// Create a no matches error.
    pub fn no_matches(pattern: impl Into<String>) -> Self {
        Self::NoMatches {
            pattern: pattern.into(),
        }
    }

    /// Create an invalid pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}

impl ConfigError {
    /// Create a not found error.
    pub fn not_found(path: PathBuf) -> Self {
        Self::NotFound { path }
    }

    /// Create an invalid TOML error.
    pub fn invalid_toml(path: PathBuf, message: impl Into<String>) -> Self {
        Self::InvalidToml {
            path,
            message: message.into(),
        }
    }

    /// Create an invalid value error.
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_error_keeps_kind_and_location() {
        let err = CliError::compile(
            "schemas/order.json",
            CompileError::missing_items("#/properties/lines"),
        );
        let message = err.to_string();
        assert!(message.contains("schemas/order.json"));
        assert!(message.contains("#/properties/lines"));

        match err {
            CliError::Compile { source, .. } => {
                assert_eq!(source.kind(), dtogen::ErrorKind::MissingArrayItemSchema)
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Validation("stale".to_string()).exit_code(), 2);
        assert_eq!(
            CliError::from(ScanError::no_matches("*.json")).exit_code(),
            1
        );
    }
}
