//! Content scanning
//!
//! The two leaf stages of a resolution pass:
//! - **Matching**: expand content patterns into concrete files
//! - **Extraction**: read each file and collect class-name candidates

pub mod extract;
pub mod matcher;
pub mod parallel;

pub use extract::*;
pub use matcher::*;
pub use parallel::*;
