//! Init command implementation

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_SUCCESS};
use crate::config::{starter_config, ConfigFormat, CONFIG_FILE_NAMES};

/// Run the init command
pub fn run_init(format: ConfigFormat, dir: Option<&Path>) -> ExitCode {
    let dir = match dir {
        Some(d) => d.to_path_buf(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };

    let existing = CONFIG_FILE_NAMES.iter().map(|name| dir.join(name)).find(|p| p.exists());
    if let Some(existing) = existing {
        eprintln!("Error: File already exists: {}", existing.display());
        return ExitCode::from(EXIT_ERROR);
    }

    let path = dir.join(format.file_name());
    if let Err(e) = fs::write(&path, starter_config(format)) {
        eprintln!("Error: Failed to write '{}': {}", path.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    println!("Created {}", path.display());
    println!();
    println!("Next steps:");
    println!("  Edit content patterns to match your templates");
    println!("  Run 'windscan resolve' to scan and resolve");
    ExitCode::from(EXIT_SUCCESS)
}
