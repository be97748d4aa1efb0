//! Command-line interface implementation
//!
//! This module defines the CLI arguments and dispatches to submodules
//! for specific command implementations.

mod init;
mod resolve;
mod scan;
mod theme;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::{load_config, CliOverrides, ConfigError, ConfigFormat, LoadedConfig};

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Windscan - resolve utility-class CSS configuration
#[derive(Parser)]
#[command(name = "windscan")]
#[command(about = "Windscan - scan content for utility classes, merge the theme and apply plugins")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Starter configuration format for `init`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InitFormat {
    /// windscan.toml
    Toml,
    /// windscan.json
    Json,
}

impl From<InitFormat> for ConfigFormat {
    fn from(format: InitFormat) -> Self {
        match format {
            InitFormat::Toml => ConfigFormat::Toml,
            InitFormat::Json => ConfigFormat::Json,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a full resolution pass and print a summary or write a JSON manifest
    Resolve {
        /// Configuration file (default: discovered from the working directory)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Project root for content patterns (default: the config file's directory)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Replace the configured content patterns (repeatable)
        #[arg(long = "content", value_name = "PATTERN")]
        content: Vec<String>,

        /// Resolve content patterns against the config file's directory
        #[arg(long)]
        relative: bool,

        /// Number of extraction threads (default: available parallelism)
        #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
        jobs: Option<u16>,

        /// Write the resolution manifest as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Strict mode: treat warnings as errors
        #[arg(long)]
        strict: bool,
    },

    /// Print the class candidates found by content patterns, one per line
    Scan {
        /// Content patterns (prefix with ! to exclude)
        #[arg(required = true)]
        patterns: Vec<String>,

        /// Root directory for the patterns (default: working directory)
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Print the effective theme as JSON
    Theme {
        /// Configuration file (default: discovered from the working directory)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Only print this category
        #[arg(long)]
        category: Option<String>,
    },

    /// Write a starter configuration file
    Init {
        /// Configuration format
        #[arg(long, value_enum, default_value = "toml")]
        format: InitFormat,

        /// Directory to write into (default: working directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

/// Dispatch a parsed command line.
pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Commands::Resolve { config, root, content, relative, jobs, output, strict } => {
            let overrides = CliOverrides {
                content: if content.is_empty() { None } else { Some(content) },
                relative: relative.then_some(true),
            };
            resolve::run_resolve(
                config.as_deref(),
                root.as_deref(),
                &overrides,
                jobs.map(usize::from),
                output.as_deref(),
                strict,
            )
        }
        Commands::Scan { patterns, root } => scan::run_scan(patterns, root.as_deref()),
        Commands::Theme { config, category } => {
            theme::run_theme(config.as_deref(), category.as_deref())
        }
        Commands::Init { format, dir } => init::run_init(format.into(), dir.as_deref()),
    }
}

/// Load the configuration and pick the project root.
///
/// The root is `root` when given, otherwise the configuration file's
/// directory.
pub(crate) fn load_project(
    config: Option<&Path>,
    root: Option<&Path>,
) -> Result<(LoadedConfig, PathBuf), ExitCode> {
    let loaded = match load_config(config) {
        Ok(loaded) => loaded,
        Err(ConfigError::NotFound) => {
            eprintln!("Error: {}", ConfigError::NotFound);
            eprintln!("Run 'windscan init' to create one, or pass --config");
            return Err(ExitCode::from(EXIT_ERROR));
        }
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return Err(ExitCode::from(EXIT_ERROR));
        }
    };
    tracing::debug!(path = %loaded.path.display(), "using configuration");

    let project_root = match root {
        Some(root) => root.to_path_buf(),
        None => loaded
            .config_dir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_default()),
    };
    Ok((loaded, project_root))
}
