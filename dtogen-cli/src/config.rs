//! Configuration management for the CLI.
//!
//! This module handles loading configuration from `dtogen.toml` files
//! and merging with command-line arguments.

use std::path::{Path, PathBuf};

use dtogen::generator::{IndentStyle, LineEnding, DEFAULT_HEADER, DEFAULT_NAMESPACE};
use dtogen::GeneratorConfig;
use serde::Deserialize;

use crate::error::{CliResult, ConfigError};

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "dtogen.toml";

/// Main configuration structure.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output configuration.
    pub output: OutputConfig,

    /// Rendering options passed to the generator.
    pub generator: GeneratorSection,

    /// Naming conventions.
    pub naming: NamingConfig,
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory for generated files.
    pub dir: PathBuf,

    /// What to do when a generated file already exists.
    pub overwrite: OverwritePolicy,

    /// Header comment; an empty string disables it.
    pub header: String,
}

/// Generator options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeneratorSection {
    pub namespace: String,
    pub indent: IndentStyle,
    pub line_ending: LineEnding,

    /// Whether to emit XML doc comments from schema descriptions.
    pub generate_docs: bool,
}

/// Naming convention configuration.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Root class name for schemas without a `title`. Falls back to the
    /// schema file stem when unset.
    pub root_name: Option<String>,

    /// Set by `--root-name`: the name also overrides schema titles.
    #[serde(skip)]
    pub root_name_forced: bool,
}

/// Behaviour when a target file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Refuse to write and leave the directory untouched.
    #[default]
    Fail,
    /// Replace existing files.
    Replace,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./generated"),
            overwrite: OverwritePolicy::default(),
            header: DEFAULT_HEADER.to_string(),
        }
    }
}

impl Default for GeneratorSection {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            indent: IndentStyle::default(),
            line_ending: LineEnding::default(),
            generate_docs: true,
        }
    }
}

impl Config {
    /// Generator settings derived from this configuration.
    pub fn generator_config(&self) -> GeneratorConfig {
        let header = Some(self.output.header.clone()).filter(|h| !h.trim().is_empty());
        GeneratorConfig::new()
            .with_namespace(self.generator.namespace.clone())
            .with_header(header)
            .with_generate_docs(self.generator.generate_docs)
            .with_indent(self.generator.indent)
            .with_line_ending(self.generator.line_ending)
    }

    /// Reject values the generator cannot render.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let namespace = &self.generator.namespace;
        let valid = !namespace.is_empty()
            && namespace.split('.').all(|segment| {
                let mut chars = segment.chars();
                matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
                    && chars.all(|c| c.is_alphanumeric() || c == '_')
            });
        if !valid {
            return Err(ConfigError::invalid_value(
                "generator.namespace",
                format!("'{}' is not a dotted C# identifier", namespace),
            ));
        }

        if let Some(root) = &self.naming.root_name {
            if root.trim().is_empty() {
                return Err(ConfigError::invalid_value(
                    "naming.root_name",
                    "must not be empty",
                ));
            }
        }
        Ok(())
    }
}

/// Configuration manager for loading and merging configs.
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from a file path.
    ///
    /// An explicit path must exist. Without one, `dtogen.toml` in the
    /// working directory is used when present and defaults otherwise.
    pub fn load(path: Option<&Path>) -> CliResult<Config> {
        let config_path = match path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::not_found(path.to_path_buf()).into())
            }
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(CONFIG_FILENAME),
        };

        if !config_path.exists() {
            tracing::debug!("no configuration file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config = Self::parse(&config_path, &content)?;
        tracing::debug!(path = %config_path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse and validate configuration text read from `path`.
    pub fn parse(path: &Path, content: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(content)
            .map_err(|e| ConfigError::invalid_toml(path.to_path_buf(), e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Merge CLI arguments into configuration.
    ///
    /// CLI arguments take precedence over config file values.
    pub fn merge_cli_args(mut config: Config, args: &CliArgs) -> Config {
        if let Some(ref output) = args.output {
            config.output.dir = output.clone();
        }

        if let Some(ref namespace) = args.namespace {
            config.generator.namespace = namespace.clone();
        }

        if let Some(ref root_name) = args.root_name {
            config.naming.root_name = Some(root_name.clone());
            config.naming.root_name_forced = true;
        }

        if args.force {
            config.output.overwrite = OverwritePolicy::Replace;
        }

        config
    }

    /// Generate default configuration file content with comments.
    pub fn default_config_content() -> &'static str {
        r#"# dtogen configuration file

[output]
# Output directory for generated C# files
dir = "./generated"

# What to do when a generated file already exists: "fail" or "replace"
overwrite = "fail"

# Comment written at the top of every file (empty string disables it)
header = "<auto-generated />"

[generator]
# Namespace of every generated type
namespace = "Generated"

# Indentation: "spaces2", "spaces4" or "tabs"
indent = "spaces4"

# Line endings: "lf" or "crlf"
line_ending = "lf"

# Emit XML doc comments from schema descriptions
generate_docs = true

[naming]
# Root class name for schemas without a title (defaults to the file stem)
# root_name = "Root"
"#
    }
}

/// CLI arguments that can override configuration.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Output directory override.
    pub output: Option<PathBuf>,

    /// Namespace override.
    pub namespace: Option<String>,

    /// Root class name override.
    pub root_name: Option<String>,

    /// Replace existing files.
    pub force: bool,
}
