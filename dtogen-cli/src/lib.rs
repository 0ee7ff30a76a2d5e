//! # dtogen-cli
//!
//! CLI library for generating C# data-transfer classes from JSON Schema files.
//!
//! This crate provides the functionality behind the `dtogen` binary: input
//! resolution, per-schema compilation, transactional file output and
//! configuration.
//!
//! ## Architecture
//!
//! - [`config`] - Configuration management and TOML parsing
//! - [`scanner`] - Schema file discovery from paths, directories and globs
//! - [`compiler`] - Root naming and parallel batch compilation
//! - [`writer`] - All-or-nothing file output, dry runs and drift checks
//! - [`logging`] - Tracing subscriber setup
//! - [`error`] - Error types and handling

pub mod compiler;
pub mod config;
pub mod error;
pub mod logging;
pub mod scanner;
pub mod writer;

// Re-export main types for convenience
pub use compiler::{collect_files, CompiledSchema, SchemaCompiler};
pub use config::{Config, ConfigManager, OverwritePolicy};
pub use error::{CliError, CliResult};
pub use scanner::{SchemaScanner, SchemaSource};
pub use writer::{Drift, OutputWriter, WriteResult};
