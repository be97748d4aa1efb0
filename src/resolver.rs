//! Resolution pass
//!
//! Wires the stages together in a fixed order:
//!
//! 1. Build the plugin pipeline (unknown plugins fail before any scanning)
//! 2. Match content patterns to files
//! 3. Extract class candidates in parallel, plus inline raw content
//! 4. Resolve the effective theme
//! 5. Apply plugins against the effective theme
//!
//! Recoverable problems from steps 2 and 3 are collected into the
//! resolution's [`Warnings`]; everything else is fatal.

use crate::config::{ConfigError, Configuration, LoadedConfig};
use crate::diagnostics::Warnings;
use crate::plugin::{PluginError, PluginOutput, PluginRegistry};
use crate::scan::{extract_files, extract_files_with_jobs, PathMatcher};
use crate::theme::{default_theme, resolve_theme, TokenTable};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Fatal resolution error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResolveError {
    /// Configuration could not be loaded or validated
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A plugin could not be resolved or failed to register
    #[error(transparent)]
    Plugin(#[from] PluginError),
    /// The extraction thread pool could not be built
    #[error("Failed to build extraction thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Counters for one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionStats {
    /// Files matched by content patterns
    pub files_matched: usize,
    /// Files read successfully
    pub files_scanned: usize,
    /// Directory traversals performed by the matcher
    pub traversals: usize,
    /// Inline raw content entries scanned
    pub raw_entries: usize,
    /// Plugins applied
    pub plugins: usize,
    /// Wall-clock time of the pass
    #[serde(skip)]
    pub duration: Duration,
}

/// Output of a resolution pass, handed to the CSS emitter.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// Normalized configuration the pass ran with
    pub config: Configuration,
    /// Base theme with project overrides applied
    pub effective_theme: TokenTable,
    /// Deduplicated class candidates from all content
    pub used_classes: BTreeSet<String>,
    /// Plugin registrations
    pub registry: PluginOutput,
    /// Recoverable problems, in the order they were found
    pub warnings: Warnings,
    /// Pass counters
    pub stats: ResolutionStats,
}

impl Resolution {
    /// Check if the pass produced warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Serialize as a pretty-printed JSON manifest.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Format a summary of the resolution.
    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "Resolved {} classes from {} of {} matched files in {:?}",
            self.used_classes.len(),
            self.stats.files_scanned,
            self.stats.files_matched,
            self.stats.duration
        )];
        if self.stats.raw_entries > 0 {
            lines.push(format!("  {} inline raw entries scanned", self.stats.raw_entries));
        }
        lines.push(format!("  theme: {} categories", self.effective_theme.len()));
        lines.push(format!(
            "  plugins: {} applied, {} utilities, {} variants, {} base styles",
            self.stats.plugins,
            self.registry.utilities.len(),
            self.registry.variants.len(),
            self.registry.base.len()
        ));
        lines.extend(self.warnings.summary_lines());
        lines.join("\n")
    }
}

/// Runs resolution passes for one configuration.
///
/// # Example
///
/// ```ignore
/// let config = Configuration::from_value(json!({ "content": ["templates/**/*.html"] }))?;
/// let resolution = Resolver::new(config, "/project").with_jobs(4).run()?;
/// println!("{}", resolution.summary());
/// ```
pub struct Resolver {
    config: Configuration,
    project_root: PathBuf,
    config_dir: Option<PathBuf>,
    base_theme: TokenTable,
    registry: PluginRegistry,
    jobs: Option<usize>,
}

impl Resolver {
    /// Create a resolver with the default theme and built-in plugins.
    pub fn new(config: Configuration, project_root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            project_root: project_root.into(),
            config_dir: None,
            base_theme: default_theme(),
            registry: PluginRegistry::with_builtins(),
            jobs: None,
        }
    }

    /// Validate a loaded configuration file and create a resolver for it.
    ///
    /// The file's directory becomes the configuration directory used by
    /// `content.relative`.
    pub fn from_loaded(
        loaded: LoadedConfig,
        project_root: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let config_dir = loaded.config_dir().map(Path::to_path_buf);
        let config = loaded.raw.normalize()?;
        let mut resolver = Self::new(config, project_root);
        resolver.config_dir = config_dir;
        Ok(resolver)
    }

    /// Set the directory containing the configuration file.
    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    /// Replace the base theme.
    pub fn with_base_theme(mut self, theme: TokenTable) -> Self {
        self.base_theme = theme;
        self
    }

    /// Replace the plugin registry.
    pub fn with_registry(mut self, registry: PluginRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Use a dedicated extraction pool of `jobs` threads.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    /// The configuration this resolver runs with.
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Directory content patterns are resolved against.
    pub fn content_root(&self) -> &Path {
        match (&self.config_dir, self.config.content.relative) {
            (Some(dir), true) => dir.as_path(),
            _ => self.project_root.as_path(),
        }
    }

    /// Resolve the effective theme without scanning content.
    pub fn effective_theme(&self) -> TokenTable {
        resolve_theme(&self.base_theme, &self.config.theme)
    }

    /// Run a full resolution pass.
    pub fn run(&self) -> Result<Resolution, ResolveError> {
        let started = Instant::now();
        let pipeline = self.registry.build_pipeline(&self.config.plugins)?;

        let root = self.content_root();
        tracing::debug!(root = %root.display(), "matching content patterns");
        let matched = PathMatcher::new(root)
            .with_patterns(self.config.content.patterns.iter().cloned())
            .run();

        let mut warnings = Warnings::new();
        warnings.extend(matched.warnings);

        let mut extraction = match self.jobs {
            Some(jobs) => extract_files_with_jobs(&matched.files, jobs)?,
            None => extract_files(&matched.files),
        };
        for raw in &self.config.content.raw {
            extraction.add_raw(raw);
        }
        warnings.extend(extraction.failures);

        let effective_theme = self.effective_theme();
        let registry = pipeline.apply(&effective_theme)?;

        let stats = ResolutionStats {
            files_matched: matched.files.len(),
            files_scanned: extraction.files_scanned,
            traversals: matched.traversals,
            raw_entries: self.config.content.raw.len(),
            plugins: pipeline.len(),
            duration: started.elapsed(),
        };

        tracing::info!(
            classes = extraction.classes.len(),
            files = stats.files_scanned,
            warnings = warnings.len(),
            plugins = stats.plugins,
            "resolution complete"
        );

        Ok(Resolution {
            config: self.config.clone(),
            effective_theme,
            used_classes: extraction.classes,
            registry,
            warnings,
            stats,
        })
    }
}

/// Validate `config` and run a resolution pass rooted at `project_root`.
///
/// Configuration problems are reported before the file system is touched.
pub fn resolve(config: serde_json::Value, project_root: &Path) -> Result<Resolution, ResolveError> {
    let config = Configuration::from_value(config)?;
    Resolver::new(config, project_root).run()
}
