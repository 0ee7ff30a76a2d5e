//! # dtogen
//!
//! CLI tool for generating C# data-transfer classes from JSON Schema files.
//!
//! ## Usage
//!
//! ```bash
//! # Generate classes for every schema in a directory
//! dtogen generate -i ./schemas -o ./Generated
//!
//! # Preview output without writing files
//! dtogen generate -i 'schemas/*.json' --dry-run
//!
//! # Fail (exit 2) when generated files are out of date
//! dtogen check -i ./schemas -o ./Generated
//!
//! # Compare two instances the way the generated comparer would (exit 1 if unequal)
//! dtogen compare --schema order.json a.json b.json
//!
//! # Initialize configuration
//! dtogen init
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;

use dtogen::StructuralComparer;
use dtogen_cli::{
    collect_files,
    config::{CliArgs, Config, ConfigManager},
    error::CliError,
    logging,
    writer::{Drift, OutputWriter, WriteResult},
    SchemaCompiler, SchemaScanner,
};

#[derive(Parser)]
#[command(name = "dtogen")]
#[command(author, version, about = "Generate C# data-transfer classes from JSON Schema", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv); RUST_LOG overrides it
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate C# classes from JSON Schema files
    Generate {
        /// Schema files, directories or glob patterns
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<String>,

        /// Output directory for generated files
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Namespace of the generated types
        #[arg(long)]
        namespace: Option<String>,

        /// Root class name, overriding schema titles
        #[arg(long)]
        root_name: Option<String>,

        /// Replace existing files
        #[arg(long)]
        force: bool,

        /// Preview changes without writing files
        #[arg(long)]
        dry_run: bool,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Check that generated files are up-to-date
    Check {
        /// Schema files, directories or glob patterns
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<String>,

        /// Directory holding the generated files
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Compare two JSON instances with the structural comparer
    Compare {
        /// Schema the instances conform to
        #[arg(long)]
        schema: PathBuf,

        /// First instance
        left: PathBuf,

        /// Second instance
        right: PathBuf,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Initialize a new dtogen configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = "dtogen.toml")]
        output: PathBuf,

        /// Overwrite existing configuration file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            print_error(&e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, CliError> {
    match cli.command {
        Commands::Generate {
            input,
            output,
            namespace,
            root_name,
            force,
            dry_run,
            config,
        } => {
            let args = CliArgs {
                output,
                namespace,
                root_name,
                force,
            };
            cmd_generate(&input, load_config(config.as_deref(), &args)?, dry_run)?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Check {
            input,
            output,
            config,
        } => {
            let args = CliArgs {
                output,
                ..Default::default()
            };
            cmd_check(&input, load_config(config.as_deref(), &args)?)?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Compare {
            schema,
            left,
            right,
            config,
        } => {
            let config = load_config(config.as_deref(), &CliArgs::default())?;
            if cmd_compare(&schema, &left, &right, config)? {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }

        Commands::Init { output, force } => {
            cmd_init(&output, force)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(path: Option<&Path>, args: &CliArgs) -> Result<Config, CliError> {
    let config = ConfigManager::merge_cli_args(ConfigManager::load(path)?, args);
    config.validate()?;
    Ok(config)
}

/// Generate command implementation.
fn cmd_generate(input: &[String], config: Config, dry_run: bool) -> Result<(), CliError> {
    println!("{}", "Resolving schema files...".cyan());
    let sources = SchemaScanner::new(input.iter().cloned()).scan()?;
    println!("  Found {} schema(s)", sources.len().to_string().green());

    println!("{}", "Compiling...".cyan());
    let writer = OutputWriter::new(&config.output.dir, config.output.overwrite).with_dry_run(dry_run);
    let compiler = SchemaCompiler::new(config);
    let compiled = compiler.compile_batch(&sources)?;
    let files = collect_files(&compiled)?;
    println!("  Generated {} file(s)", files.len().to_string().green());

    for result in writer.write_all(&files)? {
        match result {
            WriteResult::Written { path, bytes } => {
                println!("{} Written {} bytes to {}", "✓".green(), bytes, path.display());
            }
            WriteResult::DryRun { content, path } => {
                println!("{} Would write to {}:", "[dry-run]".yellow(), path.display());
                println!("{}", "─".repeat(60).dimmed());
                println!("{}", content);
                println!("{}", "─".repeat(60).dimmed());
            }
        }
    }

    Ok(())
}

/// Check command implementation.
fn cmd_check(input: &[String], config: Config) -> Result<(), CliError> {
    println!("{}", "Checking generated files...".cyan());
    let sources = SchemaScanner::new(input.iter().cloned()).scan()?;
    let writer = OutputWriter::new(&config.output.dir, config.output.overwrite);
    let compiled = SchemaCompiler::new(config).compile_batch(&sources)?;
    let files = collect_files(&compiled)?;

    let drift = writer.diff(&files)?;
    if drift.is_empty() {
        println!("{} {} file(s) up-to-date", "✓".green(), files.len());
        return Ok(());
    }

    for entry in &drift {
        let label = match entry {
            Drift::Missing(_) => "missing",
            Drift::Changed(_) => "changed",
        };
        println!("  {} {}", label.yellow(), entry.path().display());
    }
    println!("  Run 'dtogen generate --force' to update");
    Err(CliError::Validation(format!(
        "{} generated file(s) out of date",
        drift.len()
    )))
}

/// Compare command implementation. Returns whether the instances are equal.
fn cmd_compare(schema: &Path, left: &Path, right: &Path, config: Config) -> Result<bool, CliError> {
    let content = std::fs::read_to_string(schema)?;
    let compiled = SchemaCompiler::new(config).compile_str(schema, &content)?;
    let classes = &compiled.compilation.classes;

    let left_value = read_instance(left)?;
    let right_value = read_instance(right)?;

    let comparer = StructuralComparer::new(classes);
    let equal = comparer.equals_value(&classes.root, &left_value, &right_value);
    println!("  left hash:  {}", comparer.hash_value(&classes.root, &left_value));
    println!("  right hash: {}", comparer.hash_value(&classes.root, &right_value));

    if equal {
        println!("{} Instances are equal", "✓".green());
    } else {
        println!("{} Instances differ", "✗".red());
    }
    Ok(equal)
}

fn read_instance(path: &Path) -> Result<Value, CliError> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| CliError::Instance {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Init command implementation.
fn cmd_init(output: &Path, force: bool) -> Result<(), CliError> {
    if output.exists() && !force {
        println!(
            "{} Configuration file already exists: {}",
            "Error:".red(),
            output.display()
        );
        println!("  Use --force to overwrite");
        return Err(CliError::Validation(
            "Configuration file already exists".to_string(),
        ));
    }

    std::fs::write(output, ConfigManager::default_config_content())?;

    println!(
        "{} Created configuration file: {}",
        "✓".green(),
        output.display()
    );

    Ok(())
}

/// Print an error with formatting.
fn print_error(error: &CliError) {
    eprintln!("{} {}", "Error:".red().bold(), error);
    if let CliError::Compile { source, .. } = error {
        eprintln!("  {} {}", "kind:".dimmed(), source.kind());
    }
}
