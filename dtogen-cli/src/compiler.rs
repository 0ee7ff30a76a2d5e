//! Per-schema compilation driver.
//!
//! Wraps the `dtogen` pipeline with the CLI's root naming rules and compiles
//! batches of schemas in parallel. Each schema owns its own class set, so the
//! only cross-schema check is that no two schemas render the same file name.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use dtogen::naming::identifier;
use dtogen::{CompileOptions, Compilation, GeneratedFile, SchemaDocument};
use rayon::prelude::*;

use crate::config::Config;
use crate::error::{CliError, CliResult, WriteError};
use crate::scanner::SchemaSource;

/// A compiled schema and where it came from.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    pub path: PathBuf,
    pub compilation: Compilation,
}

/// Compiles schema sources with one configuration.
#[derive(Debug, Clone)]
pub struct SchemaCompiler {
    config: Config,
}

impl SchemaCompiler {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Root class name for a document read from `path`.
    ///
    /// Precedence: `--root-name`, schema title, `naming.root_name`, file
    /// stem. `None` leaves the choice to the compiler.
    pub fn root_name(&self, document: &SchemaDocument, path: &Path) -> Option<String> {
        if document.title().is_some() && !self.config.naming.root_name_forced {
            return None;
        }
        self.config
            .naming
            .root_name
            .clone()
            .or_else(|| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .map(|stem| identifier(stem, dtogen::DEFAULT_ROOT_NAME))
            })
    }

    /// Compile schema text read from `path`.
    pub fn compile_str(&self, path: &Path, content: &str) -> CliResult<CompiledSchema> {
        let document =
            SchemaDocument::from_json_str(content).map_err(|e| CliError::compile(path, e))?;

        let mut options = CompileOptions::new().with_generator(self.config.generator_config());
        if let Some(root) = self.root_name(&document, path) {
            options = options.with_root_name(root);
        }

        let compilation = dtogen::compile(&document, &options).map_err(|e| CliError::compile(path, e))?;
        tracing::info!(
            schema = %path.display(),
            types = compilation.classes.len(),
            files = compilation.files.len(),
            "compiled schema"
        );
        Ok(CompiledSchema {
            path: path.to_path_buf(),
            compilation,
        })
    }

    pub fn compile(&self, source: &SchemaSource) -> CliResult<CompiledSchema> {
        self.compile_str(&source.path, &source.content)
    }

    /// Compile every source in parallel.
    ///
    /// Results keep input order; the first failure in that order is
    /// returned.
    pub fn compile_batch(&self, sources: &[SchemaSource]) -> CliResult<Vec<CompiledSchema>> {
        let results: Vec<CliResult<CompiledSchema>> =
            sources.par_iter().map(|source| self.compile(source)).collect();
        results.into_iter().collect()
    }
}

/// Every generated file of a batch, rejecting file name clashes between
/// schemas.
pub fn collect_files(compiled: &[CompiledSchema]) -> CliResult<Vec<GeneratedFile>> {
    let mut owners: HashMap<&str, &Path> = HashMap::new();
    let mut files = Vec::new();
    for schema in compiled {
        for file in &schema.compilation.files {
            if let Some(first) = owners.insert(&file.file_name, &schema.path) {
                return Err(WriteError::DuplicateOutput {
                    file_name: file.file_name.clone(),
                    first: first.to_path_buf(),
                    second: schema.path.clone(),
                }
                .into());
            }
            files.push(file.clone());
        }
    }
    Ok(files)
}
