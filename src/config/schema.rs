//! Configuration schema types
//!
//! The as-written shape of a windscan configuration, in any of the accepted
//! file formats. [`RawConfig::validate`] checks it and
//! [`RawConfig::normalize`](super::normalize) turns it into a
//! [`Configuration`](super::Configuration).

use super::error::{ConfigError, ConfigValidationError};
use crate::plugin::Declarations;
use crate::scan::{ContentPattern, RawContent};
use crate::theme::TokenMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

const KNOWN_KEYS: [&str; 3] = ["content", "theme", "plugins"];

/// Root configuration as written by the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// Files to scan for class names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentSpec>,
    /// Theme replacements and extensions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<ThemeConfig>,
    /// Plugins in registration order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Vec<PluginRef>>,
}

/// The `content` key: a bare pattern list or a detailed table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentSpec {
    /// `content = ["src/**/*.rs"]`
    Patterns(Vec<ContentEntry>),
    /// `[content]` with `files`, `relative` and `raw`
    Detailed(ContentFiles),
}

/// Detailed content table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentFiles {
    /// Patterns (or inline entries)
    pub files: Vec<ContentEntry>,
    /// Resolve patterns against the configuration file's directory
    pub relative: bool,
    /// Inline content scanned without touching disk
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub raw: Vec<RawContent>,
}

/// One entry of a content list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentEntry {
    /// Glob pattern, `!`-prefixed for exclusion
    Pattern(String),
    /// Inline `{ raw, extension }` content
    Raw(RawContent),
}

/// The `theme` key.
///
/// Categories set directly replace the base category; categories under
/// `extend` are merged into it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Categories merged into the base theme
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extend: BTreeMap<String, TokenMap>,
    /// Categories that replace the base theme
    #[serde(flatten)]
    pub categories: BTreeMap<String, TokenMap>,
}

/// A plugin reference: a bare name or a detailed declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginRef {
    /// `"@tailwindcss/forms"`
    Name(String),
    /// `{ name, options, utilities, variants, base }`
    Detailed(PluginSpec),
}

impl PluginRef {
    /// The referenced plugin name.
    pub fn name(&self) -> &str {
        match self {
            PluginRef::Name(name) => name,
            PluginRef::Detailed(spec) => &spec.name,
        }
    }

    /// Convert to the normalized declaration.
    pub fn into_spec(self) -> PluginSpec {
        match self {
            PluginRef::Name(name) => PluginSpec::named(name),
            PluginRef::Detailed(spec) => spec,
        }
    }
}

/// A plugin declaration.
///
/// A declaration that carries any `utilities`, `variants` or `base` entries
/// defines an inline plugin; otherwise `name` is looked up in the plugin
/// registry and `options` are passed to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginSpec {
    /// Registry name, or the identity of an inline plugin
    #[serde(default)]
    pub name: String,
    /// Options passed to a registered plugin
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, Value>,
    /// Inline utility classes: class name to declarations
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub utilities: BTreeMap<String, Declarations>,
    /// Inline variants: variant name to selector template
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variants: BTreeMap<String, String>,
    /// Inline base styles: selector to declarations
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub base: BTreeMap<String, Declarations>,
}

impl PluginSpec {
    /// A reference to a registered plugin with no options.
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// Builder-style option.
    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    /// Whether this declaration defines its own registrations.
    pub fn is_inline(&self) -> bool {
        !(self.utilities.is_empty() && self.variants.is_empty() && self.base.is_empty())
    }
}

impl RawConfig {
    /// Decode a configuration from a generic value tree.
    ///
    /// Top-level kinds are checked first so that a misplaced value is
    /// reported by key rather than as an untagged-enum mismatch.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let Value::Object(map) = &value else {
            return Err(shape_error("(root)", "a mapping", &value));
        };

        for key in map.keys().filter(|k| !KNOWN_KEYS.contains(&k.as_str())) {
            tracing::debug!(key = %key, "ignoring unrecognised configuration key");
        }

        match map.get("content") {
            None | Some(Value::Null) | Some(Value::Array(_)) | Some(Value::Object(_)) => {}
            Some(other) => return Err(shape_error("content", "a sequence or a mapping", other)),
        }

        match map.get("theme") {
            None | Some(Value::Null) => {}
            Some(Value::Object(theme)) => check_theme_shape(theme)?,
            Some(other) => return Err(shape_error("theme", "a mapping", other)),
        }

        match map.get("plugins") {
            None | Some(Value::Null) => {}
            Some(Value::Array(plugins)) => {
                for (index, plugin) in plugins.iter().enumerate() {
                    if !matches!(plugin, Value::String(_) | Value::Object(_)) {
                        let key = format!("plugins[{}]", index);
                        return Err(shape_error(&key, "a name or a mapping", plugin));
                    }
                }
            }
            Some(other) => return Err(shape_error("plugins", "a sequence", other)),
        }

        Ok(serde_json::from_value(value)?)
    }

    /// Validate the configuration, collecting every problem.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        match &self.content {
            None => errors.push(ConfigValidationError::new("content", "is required")),
            Some(content) => validate_content(content, &mut errors),
        }

        if let Some(theme) = &self.theme {
            if theme.categories.keys().any(|name| name.trim().is_empty()) {
                errors.push(ConfigValidationError::new(
                    "theme",
                    "category names must not be empty",
                ));
            }
            if theme.extend.keys().any(|name| name.trim().is_empty()) {
                errors.push(ConfigValidationError::new(
                    "theme.extend",
                    "category names must not be empty",
                ));
            }
        }

        for (index, plugin) in self.plugins.iter().flatten().enumerate() {
            if plugin.name().trim().is_empty() {
                errors.push(ConfigValidationError::new(
                    format!("plugins[{}].name", index),
                    "must not be empty",
                ));
            }
        }

        errors
    }

    /// Check if the configuration is valid.
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

impl ContentSpec {
    /// Content entries in declaration order.
    pub fn entries(&self) -> &[ContentEntry] {
        match self {
            ContentSpec::Patterns(entries) => entries,
            ContentSpec::Detailed(files) => &files.files,
        }
    }

    fn field_prefix(&self) -> &'static str {
        match self {
            ContentSpec::Patterns(_) => "content",
            ContentSpec::Detailed(_) => "content.files",
        }
    }
}

fn validate_content(content: &ContentSpec, errors: &mut Vec<ConfigValidationError>) {
    let prefix = content.field_prefix();
    let mut positive = 0usize;
    let mut negated = 0usize;
    let mut raw = match content {
        ContentSpec::Detailed(files) => files.raw.len(),
        ContentSpec::Patterns(_) => 0,
    };

    for (index, entry) in content.entries().iter().enumerate() {
        let field = format!("{}[{}]", prefix, index);
        let text = match entry {
            ContentEntry::Raw(_) => {
                raw += 1;
                continue;
            }
            ContentEntry::Pattern(text) => text,
        };

        let pattern = ContentPattern::parse(text);
        if pattern.glob.is_empty() {
            errors.push(ConfigValidationError::new(field, "must not be empty"));
            continue;
        }
        if let Err(e) = pattern.compile_check() {
            errors.push(ConfigValidationError::new(field, format!("is not a valid glob: {}", e)));
            continue;
        }
        if pattern.negated {
            negated += 1;
        } else {
            positive += 1;
        }
    }

    if positive + negated + raw == 0 && errors.is_empty() {
        errors.push(ConfigValidationError::new(
            "content",
            "must contain at least one pattern or raw entry",
        ));
    } else if positive == 0 && raw == 0 && negated > 0 {
        errors.push(ConfigValidationError::new("content", "has only exclusion patterns"));
    }
}

fn check_theme_shape(theme: &serde_json::Map<String, Value>) -> Result<(), ConfigError> {
    for (category, value) in theme {
        if category == "extend" {
            let Value::Object(extend) = value else {
                return Err(shape_error("theme.extend", "a mapping", value));
            };
            for (name, tokens) in extend {
                if !tokens.is_object() {
                    return Err(shape_error(&format!("theme.extend.{}", name), "a mapping", tokens));
                }
            }
        } else if !value.is_object() {
            return Err(shape_error(&format!("theme.{}", category), "a mapping", value));
        }
    }
    Ok(())
}

fn shape_error(key: &str, expected: &'static str, found: &Value) -> ConfigError {
    ConfigError::Shape { key: key.to_string(), expected, found: kind_of(found) }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
