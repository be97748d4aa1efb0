//! Normalized configuration
//!
//! [`Configuration`] is the validated form every later stage consumes. It is
//! built once, never touches the file system, and is passed explicitly
//! through the pipeline.

use super::error::ConfigError;
use super::schema::{ContentEntry, ContentSpec, PluginSpec, RawConfig, ThemeConfig};
use crate::scan::{ContentPattern, RawContent};
use crate::theme::ThemeOverrides;
use serde::Serialize;

/// Content to scan
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContentConfig {
    /// Patterns in declaration order
    pub patterns: Vec<ContentPattern>,
    /// Inline content
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub raw: Vec<RawContent>,
    /// Resolve patterns against the configuration file's directory
    pub relative: bool,
}

impl ContentConfig {
    /// Positive (non-exclusion) patterns.
    pub fn positive(&self) -> impl Iterator<Item = &ContentPattern> {
        self.patterns.iter().filter(|p| !p.negated)
    }
}

/// Validated, normalized configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Configuration {
    /// Content to scan
    pub content: ContentConfig,
    /// Per-category theme overrides (empty when `theme` is omitted)
    pub theme: ThemeOverrides,
    /// Plugin declarations in registration order (empty when omitted)
    pub plugins: Vec<PluginSpec>,
}

impl Configuration {
    /// Decode, validate and normalize a configuration value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        RawConfig::from_value(value)?.normalize()
    }
}

impl TryFrom<RawConfig> for Configuration {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        raw.normalize()
    }
}

impl RawConfig {
    /// Validate and normalize, filling in defaults for omitted sections.
    ///
    /// Fails with [`ConfigError::Validation`] listing every problem found.
    pub fn normalize(self) -> Result<Configuration, ConfigError> {
        let errors = self.validate();
        if !errors.is_empty() {
            let messages = errors.into_iter().map(|e| e.to_string()).collect();
            return Err(ConfigError::Validation(messages));
        }

        let content = match self.content {
            Some(spec) => normalize_content(spec),
            None => ContentConfig::default(),
        };
        let theme = self.theme.map(normalize_theme).unwrap_or_default();
        let plugins: Vec<PluginSpec> =
            self.plugins.unwrap_or_default().into_iter().map(|p| p.into_spec()).collect();

        tracing::debug!(
            patterns = content.patterns.len(),
            raw = content.raw.len(),
            plugins = plugins.len(),
            "normalized configuration"
        );

        Ok(Configuration { content, theme, plugins })
    }
}

fn normalize_content(spec: ContentSpec) -> ContentConfig {
    let (entries, relative, mut raw) = match spec {
        ContentSpec::Patterns(entries) => (entries, false, Vec::new()),
        ContentSpec::Detailed(files) => (files.files, files.relative, files.raw),
    };

    let mut patterns = Vec::new();
    let mut inline = Vec::new();
    for entry in entries {
        match entry {
            ContentEntry::Pattern(text) => patterns.push(ContentPattern::parse(&text)),
            ContentEntry::Raw(content) => inline.push(content),
        }
    }
    inline.append(&mut raw);

    ContentConfig { patterns, raw: inline, relative }
}

fn normalize_theme(theme: ThemeConfig) -> ThemeOverrides {
    ThemeOverrides::from_layers(theme.categories, theme.extend)
}
