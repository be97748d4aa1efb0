//! Configuration module
//!
//! Provides types, validation and loading for `windscan.toml`,
//! `windscan.json` and `windscan.json5` project configuration.

pub mod error;
pub mod loader;
pub mod normalize;
pub mod schema;

pub use error::*;
pub use loader::*;
pub use normalize::*;
pub use schema::*;
