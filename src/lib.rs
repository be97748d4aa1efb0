//! Windscan - configuration resolution for utility-class CSS generators
//!
//! This library provides functionality to:
//! - Load and validate a content/theme/plugins configuration
//! - Match content patterns and extract utility-class candidates in parallel
//! - Merge project theme overrides into the default token table
//! - Apply plugins in order, later registrations winning
//!
//! The output is a [`Resolution`] that a CSS emitter consumes.

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod plugin;
pub mod resolver;
pub mod scan;
pub mod theme;

pub use config::{ConfigError, Configuration, RawConfig};
pub use diagnostics::{Warning, Warnings};
pub use plugin::{Plugin, PluginError, PluginPipeline, PluginRegistry};
pub use resolver::{resolve, Resolution, ResolveError, Resolver};
pub use scan::{ExtractionError, ScanError};
pub use theme::{resolve_theme, CategoryOverride, ThemeOverrides, TokenTable, TokenValue};
