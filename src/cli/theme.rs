//! Theme command implementation

use std::path::Path;
use std::process::ExitCode;

use super::{load_project, EXIT_ERROR, EXIT_SUCCESS};
use crate::resolver::Resolver;

/// Run the theme command
pub fn run_theme(config: Option<&Path>, category: Option<&str>) -> ExitCode {
    let (loaded, project_root) = match load_project(config, None) {
        Ok(project) => project,
        Err(code) => return code,
    };
    let resolver = match Resolver::from_loaded(loaded, project_root) {
        Ok(resolver) => resolver,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let theme = resolver.effective_theme();

    let json = match category {
        Some(name) => match theme.category(name) {
            Some(tokens) => serde_json::to_string_pretty(tokens),
            None => {
                eprintln!("Error: Unknown theme category '{}'", name);
                eprintln!("Available categories: {}", theme.category_names().join(", "));
                return ExitCode::from(EXIT_ERROR);
            }
        },
        None => serde_json::to_string_pretty(&theme),
    };

    match json {
        Ok(json) => {
            println!("{}", json);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: Failed to serialize theme: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
