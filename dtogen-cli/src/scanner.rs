//! Input resolution for schema files.
//!
//! Each input is a file path, a directory (every `*.json` below it) or a glob
//! pattern. The result is sorted and deduplicated so batch output does not
//! depend on argument order or directory iteration order.

use std::path::{Path, PathBuf};

use crate::error::{CliResult, ScanError};

/// A discovered schema file with its content.
#[derive(Debug, Clone)]
pub struct SchemaSource {
    pub path: PathBuf,

    /// File content.
    pub content: String,
}

impl SchemaSource {
    /// File stem, used as a root name candidate.
    pub fn stem(&self) -> Option<&str> {
        self.path.file_stem().and_then(|s| s.to_str())
    }
}

/// Scanner for schema inputs.
#[derive(Debug)]
pub struct SchemaScanner {
    inputs: Vec<String>,
}

impl SchemaScanner {
    /// Create a scanner over paths, directories or glob patterns.
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
        }
    }

    /// Resolve every input to schema file paths.
    ///
    /// An input that matches nothing is an error.
    pub fn resolve(&self) -> CliResult<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for input in &self.inputs {
            let path = Path::new(input);
            let matched = if path.is_file() {
                vec![path.to_path_buf()]
            } else if path.is_dir() {
                let pattern = path.join("**").join("*.json");
                glob_paths(&pattern.to_string_lossy())?
            } else {
                glob_paths(input)?
            };

            if matched.is_empty() {
                return Err(ScanError::no_matches(input.as_str()).into());
            }
            tracing::debug!(input = %input, files = matched.len(), "resolved input");
            paths.extend(matched);
        }
        paths.sort();
        paths.dedup();
        Ok(paths)
    }

    /// Resolve inputs and read every schema file.
    pub fn scan(&self) -> CliResult<Vec<SchemaSource>> {
        self.resolve()?
            .into_iter()
            .map(|path| {
                let content = std::fs::read_to_string(&path).map_err(|e| ScanError::Io {
                    path: path.clone(),
                    source: e,
                })?;
                Ok(SchemaSource { path, content })
            })
            .collect()
    }
}

fn glob_paths(pattern: &str) -> Result<Vec<PathBuf>, ScanError> {
    let entries = glob::glob(pattern)
        .map_err(|e| ScanError::invalid_pattern(pattern, e.to_string()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?;
        if path.is_file() {
            paths.push(path);
        }
    }
    Ok(paths)
}
