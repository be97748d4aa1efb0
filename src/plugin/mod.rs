//! Plugin pipeline
//!
//! A plugin contributes any subset of three kinds of registration:
//!
//! - **Utilities**: class name to CSS declarations
//! - **Variants**: variant name to selector template (`&` marks the class)
//! - **Base styles**: element selector to CSS declarations
//!
//! Plugins run in declaration order against the effective theme. When two
//! plugins register the same name, the later one wins and the collision is
//! logged at debug level. A plugin that fails to register aborts the pass.
//!
//! # Example
//!
//! ```ignore
//! struct Brand;
//!
//! impl Plugin for Brand {
//!     fn name(&self) -> &str { "brand" }
//!
//!     fn utilities(&self, theme: &TokenTable) -> PluginResult<Vec<Utility>> {
//!         let color = theme.css_value("colors", "blue.600").unwrap_or_default();
//!         Ok(vec![Utility::new("btn-brand", [("background-color", color)])])
//!     }
//! }
//!
//! let mut pipeline = PluginPipeline::new();
//! pipeline.push(Box::new(Brand));
//! let output = pipeline.apply(&theme)?;
//! ```

pub mod builtin;

pub use builtin::{AspectRatioPlugin, FormsPlugin, FormsStrategy, InlinePlugin, TypographyPlugin};

use crate::config::PluginSpec;
use crate::theme::TokenTable;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// CSS property to value, sorted by property.
pub type Declarations = BTreeMap<String, String>;

/// Options passed to a registered plugin.
pub type PluginOptions = BTreeMap<String, serde_json::Value>;

/// Result of a single plugin capability.
pub type PluginResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// A utility class definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utility {
    /// Class name without the leading `.`
    pub name: String,
    /// Declarations applied by the class
    pub declarations: Declarations,
}

impl Utility {
    /// Create a utility, normalizing a leading `.` off the name.
    pub fn new<K, V>(name: &str, declarations: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.strip_prefix('.').unwrap_or(name).to_string(),
            declarations: declarations.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// A variant: a name usable as a class prefix and the selector it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// Variant name (`prose-headings`)
    pub name: String,
    /// Selector template where `&` stands for the utility selector
    pub template: String,
}

impl Variant {
    /// Create a variant.
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self { name: name.into(), template: template.into() }
    }
}

/// Styles applied to a bare element selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseStyle {
    /// Element selector
    pub selector: String,
    /// Declarations applied to it
    pub declarations: Declarations,
}

impl BaseStyle {
    /// Create a base style.
    pub fn new<K, V>(
        selector: impl Into<String>,
        declarations: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            selector: selector.into(),
            declarations: declarations.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Trait for plugins.
///
/// Every capability defaults to registering nothing, so a plugin
/// implements only the ones it provides.
///
/// # Thread Safety
///
/// Plugins must be `Send + Sync` so a built pipeline can be shared.
pub trait Plugin: Send + Sync {
    /// Identity used in logs, errors and registration records.
    fn name(&self) -> &str;

    /// Utility classes contributed by this plugin.
    fn utilities(&self, _theme: &TokenTable) -> PluginResult<Vec<Utility>> {
        Ok(Vec::new())
    }

    /// Variants contributed by this plugin.
    fn variants(&self, _theme: &TokenTable) -> PluginResult<Vec<Variant>> {
        Ok(Vec::new())
    }

    /// Base styles contributed by this plugin.
    fn base_styles(&self, _theme: &TokenTable) -> PluginResult<Vec<BaseStyle>> {
        Ok(Vec::new())
    }
}

/// Registration capability, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// [`Plugin::utilities`]
    Utilities,
    /// [`Plugin::variants`]
    Variants,
    /// [`Plugin::base_styles`]
    BaseStyles,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Utilities => "utilities",
            Capability::Variants => "variants",
            Capability::BaseStyles => "base styles",
        };
        write!(f, "{}", name)
    }
}

/// Fatal plugin error, always naming the plugin and its declaration index.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PluginError {
    /// No registered plugin has this name
    #[error("unknown plugin '{name}' (plugins[{index}])")]
    Unknown {
        /// Name as declared
        name: String,
        /// Position in the plugin list
        index: usize,
    },
    /// The plugin rejected its options
    #[error("invalid options for plugin '{plugin}' (plugins[{index}]): {message}")]
    InvalidOptions {
        /// Plugin name
        plugin: String,
        /// Position in the plugin list
        index: usize,
        /// What was wrong
        message: String,
    },
    /// A capability returned an error
    #[error("plugin '{plugin}' (plugins[{index}]) failed to register {capability}: {source}")]
    Registration {
        /// Plugin name
        plugin: String,
        /// Position in the plugin list
        index: usize,
        /// Capability that failed
        capability: Capability,
        /// Underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// A registered value and the plugin that contributed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registered<T> {
    /// Registered value
    pub value: T,
    /// Name of the contributing plugin
    pub plugin: String,
}

/// Everything the plugin pipeline registered, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PluginOutput {
    /// Utility classes by class name
    pub utilities: BTreeMap<String, Registered<Declarations>>,
    /// Variant selector templates by variant name
    pub variants: BTreeMap<String, Registered<String>>,
    /// Base styles by selector
    pub base: BTreeMap<String, Registered<Declarations>>,
}

impl PluginOutput {
    /// Declarations for a utility class.
    pub fn utility(&self, name: &str) -> Option<&Declarations> {
        self.utilities.get(name).map(|r| &r.value)
    }

    /// Selector template for a variant.
    pub fn variant(&self, name: &str) -> Option<&str> {
        self.variants.get(name).map(|r| r.value.as_str())
    }

    /// Declarations for a base selector.
    pub fn base_style(&self, selector: &str) -> Option<&Declarations> {
        self.base.get(selector).map(|r| &r.value)
    }

    /// Total number of registrations.
    pub fn len(&self) -> usize {
        self.utilities.len() + self.variants.len() + self.base.len()
    }

    /// Whether nothing was registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn register_utilities(&mut self, plugin: &str, utilities: Vec<Utility>) {
        for utility in utilities {
            register(&mut self.utilities, "utility", utility.name, utility.declarations, plugin);
        }
    }

    fn register_variants(&mut self, plugin: &str, variants: Vec<Variant>) {
        for variant in variants {
            register(&mut self.variants, "variant", variant.name, variant.template, plugin);
        }
    }

    fn register_base(&mut self, plugin: &str, styles: Vec<BaseStyle>) {
        for style in styles {
            register(&mut self.base, "base style", style.selector, style.declarations, plugin);
        }
    }
}

fn register<T>(
    map: &mut BTreeMap<String, Registered<T>>,
    kind: &'static str,
    name: String,
    value: T,
    plugin: &str,
) {
    let entry = Registered { value, plugin: plugin.to_string() };
    if let Some(previous) = map.insert(name.clone(), entry) {
        tracing::debug!(
            kind,
            name = %name,
            previous = %previous.plugin,
            winner = plugin,
            "registration overridden by later plugin"
        );
    }
}

/// An ordered list of plugins.
///
/// Plugins run in insertion order.
#[derive(Default)]
pub struct PluginPipeline {
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginPipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plugin to the end of the pipeline.
    pub fn push(&mut self, plugin: Box<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    /// Get the number of plugins in the pipeline.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Check if the pipeline is empty.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Plugin names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Apply every plugin in order against a read-only theme.
    ///
    /// # Errors
    ///
    /// Returns the first registration failure. Execution stops on error.
    pub fn apply(&self, theme: &TokenTable) -> Result<PluginOutput, PluginError> {
        let mut output = PluginOutput::default();

        for (index, plugin) in self.plugins.iter().enumerate() {
            let name = plugin.name();
            tracing::debug!(plugin = name, index, "applying plugin");

            let utilities = plugin
                .utilities(theme)
                .map_err(|e| registration_error(name, index, Capability::Utilities, e))?;
            let variants = plugin
                .variants(theme)
                .map_err(|e| registration_error(name, index, Capability::Variants, e))?;
            let base = plugin
                .base_styles(theme)
                .map_err(|e| registration_error(name, index, Capability::BaseStyles, e))?;

            tracing::debug!(
                plugin = name,
                utilities = utilities.len(),
                variants = variants.len(),
                base = base.len(),
                "plugin registered"
            );
            output.register_utilities(name, utilities);
            output.register_variants(name, variants);
            output.register_base(name, base);
        }

        Ok(output)
    }
}

impl fmt::Debug for PluginPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginPipeline").field("plugins", &self.names()).finish()
    }
}

fn registration_error(
    plugin: &str,
    index: usize,
    capability: Capability,
    source: Box<dyn std::error::Error + Send + Sync>,
) -> PluginError {
    PluginError::Registration { plugin: plugin.to_string(), index, capability, source }
}

/// Builds a plugin from its declared options, or explains why it cannot.
pub type PluginFactory =
    Box<dyn Fn(&PluginOptions) -> Result<Box<dyn Plugin>, String> + Send + Sync>;

/// Name-to-factory table used to resolve plugin declarations.
pub struct PluginRegistry {
    factories: BTreeMap<String, PluginFactory>,
}

impl PluginRegistry {
    /// Create a registry with no plugins.
    pub fn empty() -> Self {
        Self { factories: BTreeMap::new() }
    }

    /// Create a registry holding the built-in plugins under their package
    /// names and short aliases.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for name in [builtin::FORMS, "forms"] {
            registry.register(name, |options| Ok(Box::new(FormsPlugin::from_options(options)?)));
        }
        for name in [builtin::TYPOGRAPHY, "typography"] {
            registry.register(name, |options| {
                Ok(Box::new(TypographyPlugin::from_options(options)?))
            });
        }
        for name in [builtin::ASPECT_RATIO, "aspect-ratio"] {
            registry.register(name, |options| {
                Ok(Box::new(AspectRatioPlugin::from_options(options)?))
            });
        }
        registry
    }

    /// Register (or replace) a factory under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&PluginOptions) -> Result<Box<dyn Plugin>, String> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Whether a plugin is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Resolve declarations into a pipeline, in declaration order.
    ///
    /// Declarations with inline registrations become [`InlinePlugin`]s;
    /// all others are looked up by name.
    pub fn build_pipeline(&self, specs: &[PluginSpec]) -> Result<PluginPipeline, PluginError> {
        let mut pipeline = PluginPipeline::new();

        for (index, spec) in specs.iter().enumerate() {
            if spec.is_inline() {
                pipeline.push(Box::new(InlinePlugin::from_spec(spec)));
                continue;
            }

            let factory = self
                .factories
                .get(&spec.name)
                .ok_or_else(|| PluginError::Unknown { name: spec.name.clone(), index })?;
            let plugin = factory(&spec.options).map_err(|message| PluginError::InvalidOptions {
                plugin: spec.name.clone(),
                index,
                message,
            })?;
            pipeline.push(plugin);
        }

        Ok(pipeline)
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry").field("plugins", &self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::default_theme;
    use std::sync::{Arc, Mutex};

    struct Fixed {
        name: &'static str,
        color: &'static str,
        log: Option<Arc<Mutex<Vec<&'static str>>>>,
    }

    impl Plugin for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn utilities(&self, _theme: &TokenTable) -> PluginResult<Vec<Utility>> {
            if let Some(log) = &self.log {
                log.lock().unwrap().push(self.name);
            }
            Ok(vec![Utility::new(".custom", [("color", self.color)])])
        }
    }

    struct Failing;

    impl Plugin for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn variants(&self, _theme: &TokenTable) -> PluginResult<Vec<Variant>> {
            Err("variant table unavailable".into())
        }
    }

    struct NothingRegistered;

    impl Plugin for NothingRegistered {
        fn name(&self) -> &str {
            "nothing"
        }
    }

    fn fixed(name: &'static str, color: &'static str) -> Box<dyn Plugin> {
        Box::new(Fixed { name, color, log: None })
    }

    #[test]
    fn test_later_plugin_wins() {
        let mut pipeline = PluginPipeline::new();
        pipeline.push(fixed("first", "red"));
        pipeline.push(fixed("second", "blue"));

        let output = pipeline.apply(&TokenTable::new()).unwrap();
        assert_eq!(output.utility("custom").unwrap()["color"], "blue");
        assert_eq!(output.utilities["custom"].plugin, "second");
    }

    #[test]
    fn test_plugins_run_in_insertion_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = PluginPipeline::new();
        for name in ["a", "b", "c"] {
            pipeline.push(Box::new(Fixed { name, color: "red", log: Some(log.clone()) }));
        }

        pipeline.apply(&TokenTable::new()).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
        assert_eq!(pipeline.names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_default_capabilities_register_nothing() {
        let mut pipeline = PluginPipeline::new();
        pipeline.push(Box::new(NothingRegistered));
        let output = pipeline.apply(&TokenTable::new()).unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn test_failure_names_plugin_and_aborts() {
        let mut pipeline = PluginPipeline::new();
        pipeline.push(fixed("ok", "red"));
        pipeline.push(Box::new(Failing));

        let err = pipeline.apply(&TokenTable::new()).unwrap_err();
        match &err {
            PluginError::Registration { plugin, index, capability, .. } => {
                assert_eq!(plugin, "failing");
                assert_eq!(*index, 1);
                assert_eq!(*capability, Capability::Variants);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("failed to register variants"));
    }

    #[test]
    fn test_utility_name_strips_dot() {
        assert_eq!(Utility::new(".btn", [("padding", "1rem")]).name, "btn");
        assert_eq!(Utility::new("btn", [("padding", "1rem")]).name, "btn");
    }

    #[test]
    fn test_registry_builtins_and_aliases() {
        let registry = PluginRegistry::with_builtins();
        for name in ["@tailwindcss/forms", "forms", "@tailwindcss/typography", "aspect-ratio"] {
            assert!(registry.contains(name), "missing {}", name);
        }
    }

    #[test]
    fn test_build_pipeline_unknown_plugin() {
        let registry = PluginRegistry::with_builtins();
        let specs = vec![PluginSpec::named("forms"), PluginSpec::named("@acme/missing")];

        let err = registry.build_pipeline(&specs).unwrap_err();
        assert!(matches!(err, PluginError::Unknown { ref name, index: 1 } if name == "@acme/missing"));
    }

    #[test]
    fn test_build_pipeline_invalid_options() {
        let registry = PluginRegistry::with_builtins();
        let specs = vec![PluginSpec::named("forms").with_option("strategy", "everything".into())];

        let err = registry.build_pipeline(&specs).unwrap_err();
        assert!(matches!(err, PluginError::InvalidOptions { index: 0, .. }));
    }

    #[test]
    fn test_build_pipeline_custom_registration() {
        let mut registry = PluginRegistry::empty();
        registry.register("brand", |_| Ok(fixed("brand", "teal")));

        let pipeline = registry.build_pipeline(&[PluginSpec::named("brand")]).unwrap();
        let output = pipeline.apply(&default_theme()).unwrap();
        assert_eq!(output.utility("custom").unwrap()["color"], "teal");
    }

    #[test]
    fn test_inline_declaration_overrides_builtin() {
        let mut inline = PluginSpec::named("project");
        inline.utilities.insert(
            ".form-input".to_string(),
            [("border-width".to_string(), "2px".to_string())].into_iter().collect(),
        );
        let specs = vec![PluginSpec::named("forms"), inline];

        let pipeline = PluginRegistry::with_builtins().build_pipeline(&specs).unwrap();
        let output = pipeline.apply(&default_theme()).unwrap();
        let registered = &output.utilities["form-input"];
        assert_eq!(registered.plugin, "project");
        assert_eq!(registered.value["border-width"], "2px");
    }
}
