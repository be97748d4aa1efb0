//! Resolve command implementation

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use super::{load_project, EXIT_ERROR, EXIT_SUCCESS};
use crate::config::{merge_cli_overrides, CliOverrides};
use crate::resolver::Resolver;

/// Run the resolve command
pub fn run_resolve(
    config: Option<&Path>,
    root: Option<&Path>,
    overrides: &CliOverrides,
    jobs: Option<usize>,
    output: Option<&Path>,
    strict: bool,
) -> ExitCode {
    let (mut loaded, project_root) = match load_project(config, root) {
        Ok(project) => project,
        Err(code) => return code,
    };

    merge_cli_overrides(&mut loaded.raw, overrides);

    let mut resolver = match Resolver::from_loaded(loaded, project_root) {
        Ok(resolver) => resolver,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    if let Some(jobs) = jobs {
        resolver = resolver.with_jobs(jobs);
    }

    let resolution = match resolver.run() {
        Ok(resolution) => resolution,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match output {
        Some(path) => {
            let json = match resolution.to_json() {
                Ok(json) => json,
                Err(e) => {
                    eprintln!("Error: Failed to serialize manifest: {}", e);
                    return ExitCode::from(EXIT_ERROR);
                }
            };
            if let Err(e) = fs::write(path, json) {
                eprintln!("Error: Failed to write '{}': {}", path.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
            println!("Wrote manifest to {}", path.display());
            for line in resolution.warnings.summary_lines() {
                eprintln!("{}", line);
            }
        }
        None => println!("{}", resolution.summary()),
    }

    if strict && resolution.has_warnings() {
        eprintln!("Error: {} warning(s) in strict mode", resolution.warnings.len());
        return ExitCode::from(EXIT_ERROR);
    }

    ExitCode::from(EXIT_SUCCESS)
}
