//! Class-name extraction.
//!
//! Pulls every substring that could be a utility class out of raw file
//! bytes. An extra candidate only costs the generator a lookup, while a
//! missed one drops a style that the page needs, so each token is also
//! split into smaller pieces:
//!
//! - `div.flex.items-center` (maud, pug, haml selector chains) yields
//!   `div`, `flex` and `items-center` next to the whole token
//! - `['flex','items-center']` (a class array in JS) yields the quoted
//!   names inside the bracket
//!
//! Class names built at runtime (`"text-" + color`) cannot be recovered by
//! a static scan. Their literal fragments are still extracted, nothing more.

use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// Class characters, or a bracketed arbitrary-value segment such as
/// `[calc(100%-2rem)]`, `[&>*]` or `[&_[data-state=open]]` (one level of
/// nested brackets).
const CANDIDATE_PATTERN: &str =
    r#"(?:[A-Za-z0-9_\-:/.%#@!*]|\[(?:[^\s\[\]"`<]|\[[^\s\[\]"`<]*\])+\])+"#;

/// As [`CANDIDATE_PATTERN`] but split on `.`, `#` and `%` outside brackets.
const SELECTOR_PIECE_PATTERN: &str =
    r#"(?:[A-Za-z0-9_\-:/@!*]|\[(?:[^\s\[\]"`<]|\[[^\s\[\]"`<]*\])+\])+"#;

/// Class characters only, so bracket contents are split into their parts.
const BARE_PIECE_PATTERN: &str = r#"[A-Za-z0-9_\-:/.%#@!*]+"#;

/// Characters that never start or end a class name.
const EDGE_TRIM: &[char] = &[':', '.', '/'];

/// A file that could not be read for extraction.
#[derive(Debug, Error)]
#[error("failed to read '{}': {source}", path.display())]
pub struct ExtractionError {
    /// File that was skipped
    pub path: PathBuf,
    /// Underlying I/O error
    #[source]
    pub source: std::io::Error,
}

struct Patterns {
    candidate: Regex,
    pieces: [Regex; 2],
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let compile = |pattern: &str| Regex::new(pattern).expect("extraction pattern is valid");
        Patterns {
            candidate: compile(CANDIDATE_PATTERN),
            pieces: [compile(SELECTOR_PIECE_PATTERN), compile(BARE_PIECE_PATTERN)],
        }
    })
}

/// Iterate class candidates in `text`, in source order.
///
/// Each token is followed by its distinct pieces. Tokens repeated across
/// the text are yielded again.
pub fn candidates(text: &str) -> impl Iterator<Item = &str> {
    let patterns = patterns();
    patterns.candidate.find_iter(text).flat_map(move |m| expand_token(patterns, m.as_str()))
}

fn expand_token<'t>(patterns: &Patterns, token: &'t str) -> Vec<&'t str> {
    let mut found: Vec<&'t str> = clean_candidate(token).into_iter().collect();
    let pieces = patterns.pieces.iter().flat_map(|re| re.find_iter(token));
    for piece in pieces.filter_map(|m| clean_candidate(m.as_str())) {
        if !found.contains(&piece) {
            found.push(piece);
        }
    }
    found
}

/// Extract the set of class candidates from file bytes.
///
/// Invalid UTF-8 is replaced and then acts as a delimiter.
pub fn extract_classes(bytes: &[u8]) -> BTreeSet<String> {
    let text = String::from_utf8_lossy(bytes);
    candidates(&text).map(str::to_string).collect()
}

/// Read a file and extract its class candidates.
pub fn extract_file(path: &Path) -> Result<BTreeSet<String>, ExtractionError> {
    let bytes =
        fs::read(path).map_err(|source| ExtractionError { path: path.to_path_buf(), source })?;
    Ok(extract_classes(&bytes))
}

fn clean_candidate(raw: &str) -> Option<&str> {
    let trimmed = if raw.ends_with(']') {
        raw.trim_start_matches(EDGE_TRIM)
    } else {
        raw.trim_matches(EDGE_TRIM)
    };
    if trimmed.bytes().any(|b| b.is_ascii_alphanumeric()) {
        Some(trimmed)
    } else {
        None
    }
}
