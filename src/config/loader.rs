//! Configuration loading and discovery
//!
//! Provides functions to find, load, and merge configuration. Loading is
//! the only part of the configuration layer that touches the file system.

use super::error::ConfigError;
use super::schema::{ContentEntry, ContentFiles, ContentSpec, RawConfig};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// File names searched for, in priority order within a directory.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["windscan.toml", "windscan.json", "windscan.json5"];

/// Starter configuration in TOML.
pub const STARTER_TOML: &str = r#"plugins = ["@tailwindcss/forms"]

[content]
files = ["templates/**/*.html", "src/**/*.rs"]

[theme.extend.fontFamily]
sans = ["Helvetica", "Arial", "sans-serif"]
"#;

/// Starter configuration in JSON.
pub const STARTER_JSON: &str = r#"{
  "content": {
    "files": ["templates/**/*.html", "src/**/*.rs"]
  },
  "theme": {
    "extend": {
      "fontFamily": {
        "sans": ["Helvetica", "Arial", "sans-serif"]
      }
    }
  },
  "plugins": ["@tailwindcss/forms"]
}
"#;

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.json`
    Json,
    /// `.json5`
    Json5,
}

impl ConfigFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some("json5") => Ok(ConfigFormat::Json5),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Conventional file name for this format.
    pub fn file_name(self) -> &'static str {
        match self {
            ConfigFormat::Toml => CONFIG_FILE_NAMES[0],
            ConfigFormat::Json => CONFIG_FILE_NAMES[1],
            ConfigFormat::Json5 => CONFIG_FILE_NAMES[2],
        }
    }
}

/// A configuration read from disk, with its location.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Parsed, not yet validated configuration
    pub raw: RawConfig,
    /// File it was read from
    pub path: PathBuf,
}

impl LoadedConfig {
    /// Directory containing the configuration file.
    pub fn config_dir(&self) -> Option<&Path> {
        self.path.parent()
    }
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Replace the content patterns
    pub content: Option<Vec<String>>,
    /// Override pattern-relative resolution
    pub relative: Option<bool>,
}

/// Find a configuration file by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for `windscan.{toml,json,json5}`
/// 2. Check XDG_CONFIG_HOME/windscan/ (or ~/.config/windscan/)
///
/// # Example
/// ```ignore
/// if let Some(config_path) = find_config() {
///     println!("Found config at: {}", config_path.display());
/// }
/// ```
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find a configuration file in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    find_in_dir(&xdg_config.join("windscan"))
}

/// Find a configuration file by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        if let Some(path) = find_in_dir(&current) {
            return Some(path);
        }

        if !current.pop() {
            return None;
        }
    }
}

fn find_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES.iter().map(|name| dir.join(name)).find(|path| path.is_file())
}

/// Load configuration from a file.
///
/// If a path is provided, loads from that file. Otherwise, uses
/// [`find_config`] to locate one. Unlike a build tool, a resolver has no
/// sensible default content set, so finding nothing is an error.
///
/// # Example
/// ```ignore
/// // Load from discovered config
/// let loaded = load_config(None)?;
///
/// // Load from specific path
/// let loaded = load_config(Some(Path::new("site/windscan.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => find_config().ok_or(ConfigError::NotFound)?,
    };
    load_config_file(&config_path)
}

/// Load configuration from a specific file path.
pub fn load_config_file(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let format = ConfigFormat::from_path(path)?;
    let contents = fs::read_to_string(path)?;
    let raw = parse_config_str(&contents, format)?;
    tracing::debug!(path = %path.display(), ?format, "loaded configuration");
    Ok(LoadedConfig { raw, path: path.to_path_buf() })
}

/// Parse configuration text in the given format.
pub fn parse_config_str(contents: &str, format: ConfigFormat) -> Result<RawConfig, ConfigError> {
    let value: serde_json::Value = match format {
        ConfigFormat::Toml => toml::from_str(contents)?,
        ConfigFormat::Json => serde_json::from_str(contents)?,
        ConfigFormat::Json5 => json5::from_str(contents)?,
    };
    RawConfig::from_value(value)
}

/// Starter configuration text for `format`.
pub fn starter_config(format: ConfigFormat) -> &'static str {
    match format {
        ConfigFormat::Toml => STARTER_TOML,
        ConfigFormat::Json | ConfigFormat::Json5 => STARTER_JSON,
    }
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values. Replacing the
/// patterns keeps any inline raw content.
///
/// # Example
/// ```ignore
/// let mut loaded = load_config(None)?;
/// let overrides = CliOverrides {
///     content: Some(vec!["pages/**/*.html".to_string()]),
///     ..Default::default()
/// };
/// merge_cli_overrides(&mut loaded.raw, &overrides);
/// ```
pub fn merge_cli_overrides(config: &mut RawConfig, overrides: &CliOverrides) {
    if let Some(patterns) = &overrides.content {
        let mut files: Vec<ContentEntry> =
            patterns.iter().cloned().map(ContentEntry::Pattern).collect();
        let mut raw = Vec::new();
        let mut relative = false;

        match config.content.take() {
            Some(ContentSpec::Patterns(entries)) => {
                files.extend(entries.into_iter().filter(|e| matches!(e, ContentEntry::Raw(_))));
            }
            Some(ContentSpec::Detailed(existing)) => {
                files.extend(
                    existing.files.into_iter().filter(|e| matches!(e, ContentEntry::Raw(_))),
                );
                raw = existing.raw;
                relative = existing.relative;
            }
            None => {}
        }

        config.content = Some(ContentSpec::Detailed(ContentFiles { files, relative, raw }));
    }

    if let Some(relative) = overrides.relative {
        config.content = Some(match config.content.take() {
            Some(ContentSpec::Detailed(mut existing)) => {
                existing.relative = relative;
                ContentSpec::Detailed(existing)
            }
            Some(ContentSpec::Patterns(files)) => {
                ContentSpec::Detailed(ContentFiles { files, relative, raw: Vec::new() })
            }
            None => ContentSpec::Detailed(ContentFiles { relative, ..Default::default() }),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use serial_test::serial;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("should create parent dirs");
        }
        File::create(&path)
            .expect("should create config file")
            .write_all(contents.as_bytes())
            .expect("should write config content");
        path
    }

    #[test]
    fn test_find_config_in_current_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = create_test_file(temp.path(), "windscan.toml", STARTER_TOML);

        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = create_test_file(temp.path(), "windscan.json", STARTER_JSON);

        let subdir = temp.path().join("src").join("pages");
        fs::create_dir_all(&subdir).expect("should create subdirectories");

        let found = find_config_from(subdir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_prefers_toml() {
        let temp = TempDir::new().expect("should create temp dir");
        create_test_file(temp.path(), "windscan.json", STARTER_JSON);
        let toml_path = create_test_file(temp.path(), "windscan.toml", STARTER_TOML);

        assert_eq!(find_config_from(temp.path().to_path_buf()), Some(toml_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp = TempDir::new().expect("should create temp dir");
        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, None);
    }

    #[test]
    #[serial]
    fn test_find_xdg_config() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = create_test_file(temp.path(), "windscan/windscan.json5", "{ content: ['a'] }");

        let previous = env::var_os("XDG_CONFIG_HOME");
        env::set_var("XDG_CONFIG_HOME", temp.path());
        let found = find_xdg_config();
        match previous {
            Some(value) => env::set_var("XDG_CONFIG_HOME", value),
            None => env::remove_var("XDG_CONFIG_HOME"),
        }

        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_load_each_format() {
        let temp = TempDir::new().expect("should create temp dir");
        let json5 = r#"{
            // comments and trailing commas are allowed
            content: { files: ['templates/**/*.html', 'src/**/*.rs'] },
            theme: { extend: { fontFamily: { sans: ['Helvetica', 'Arial', 'sans-serif'] } } },
            plugins: ['@tailwindcss/forms'],
        }"#;

        for (name, contents) in [
            ("windscan.toml", STARTER_TOML),
            ("windscan.json", STARTER_JSON),
            ("windscan.json5", json5),
        ] {
            let path = create_test_file(temp.path(), name, contents);
            let loaded = load_config(Some(&path)).expect("should load valid config");
            assert_eq!(loaded.path, path);
            assert_eq!(loaded.config_dir(), Some(temp.path()));

            let config = Configuration::try_from(loaded.raw).expect("should normalize");
            assert_eq!(config.content.patterns.len(), 2, "{}", name);
            assert_eq!(config.plugins[0].name, "@tailwindcss/forms", "{}", name);
        }
    }

    #[test]
    fn test_load_config_missing_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let result = load_config(Some(&temp.path().join("windscan.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_unsupported_extension() {
        let temp = TempDir::new().expect("should create temp dir");
        let path = create_test_file(temp.path(), "windscan.yaml", "content: []");
        let result = load_config(Some(&path));
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let temp = TempDir::new().expect("should create temp dir");
        let path = create_test_file(temp.path(), "windscan.toml", "this is not valid toml {{{");
        assert!(matches!(load_config(Some(&path)), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_invalid_json() {
        let temp = TempDir::new().expect("should create temp dir");
        let path = create_test_file(temp.path(), "windscan.json", "{ content: [");
        assert!(matches!(load_config(Some(&path)), Err(ConfigError::Json(_))));

        let path = create_test_file(temp.path(), "windscan.json5", "{ content: [");
        assert!(matches!(load_config(Some(&path)), Err(ConfigError::Json5(_))));
    }

    #[test]
    fn test_load_config_shape_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let path = create_test_file(temp.path(), "windscan.toml", "theme = \"dark\"\ncontent = [\"a\"]\n");
        assert!(matches!(load_config(Some(&path)), Err(ConfigError::Shape { .. })));
    }

    #[test]
    fn test_merge_cli_overrides_content_keeps_raw() {
        let mut config = parse_config_str(
            r#"{ "content": { "files": ["a/**", { "raw": "<p class='m-1'>" }], "relative": true } }"#,
            ConfigFormat::Json,
        )
        .unwrap();
        let overrides =
            CliOverrides { content: Some(vec!["pages/*.html".to_string()]), ..Default::default() };

        merge_cli_overrides(&mut config, &overrides);
        let Some(ContentSpec::Detailed(content)) = &config.content else {
            panic!("expected detailed content");
        };
        assert_eq!(content.files.len(), 2);
        assert_eq!(content.files[0], ContentEntry::Pattern("pages/*.html".to_string()));
        assert!(content.relative);
    }

    #[test]
    fn test_merge_cli_overrides_content_into_empty() {
        let mut config = RawConfig::default();
        let overrides = CliOverrides { content: Some(vec!["*.html".to_string()]), ..Default::default() };

        merge_cli_overrides(&mut config, &overrides);
        assert!(config.is_valid());
    }

    #[test]
    fn test_merge_cli_overrides_relative() {
        let mut config = parse_config_str(r#"{ "content": ["a/**"] }"#, ConfigFormat::Json).unwrap();
        let overrides = CliOverrides { relative: Some(true), ..Default::default() };

        merge_cli_overrides(&mut config, &overrides);
        let Some(ContentSpec::Detailed(content)) = &config.content else {
            panic!("expected detailed content");
        };
        assert!(content.relative);
        assert_eq!(content.files.len(), 1);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("x/windscan.toml")).unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("windscan.json5")).unwrap(), ConfigFormat::Json5);
        assert!(ConfigFormat::from_path(Path::new("windscan")).is_err());
        assert_eq!(ConfigFormat::Json.file_name(), "windscan.json");
    }
}
