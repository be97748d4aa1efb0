//! Scan command implementation

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::{EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::config::{ContentEntry, ContentSpec, RawConfig};
use crate::scan::{extract_files, match_files};

/// Run the scan command
pub fn run_scan(patterns: Vec<String>, root: Option<&Path>) -> ExitCode {
    let raw = RawConfig {
        content: Some(ContentSpec::Patterns(
            patterns.into_iter().map(ContentEntry::Pattern).collect(),
        )),
        ..Default::default()
    };
    let config = match raw.normalize() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let root = root
        .map(Path::to_path_buf)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    let matched = match_files(&root, &config.content.patterns);
    let summary = extract_files(&matched.files);

    for warning in &matched.warnings {
        eprintln!("Warning: {}", warning);
    }
    for failure in &summary.failures {
        eprintln!("Warning: {}", failure);
    }
    for class in &summary.classes {
        println!("{}", class);
    }

    ExitCode::from(EXIT_SUCCESS)
}
