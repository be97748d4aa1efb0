//! Content pattern matching.
//!
//! Expands glob-style content patterns into the concrete set of files to
//! scan. Patterns are grouped by their literal base directory and each base
//! directory is walked once, no matter how many patterns share it.

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Recoverable error while resolving content patterns.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScanError {
    /// The literal base of a pattern does not exist or cannot be resolved
    #[error("cannot resolve content root '{}' for pattern '{pattern}': {source}", root.display())]
    UnresolvedRoot {
        /// Pattern as written in the configuration
        pattern: String,
        /// Directory (or file) the pattern is rooted at
        root: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// The pattern is not a valid glob
    #[error("invalid content pattern '{pattern}': {source}")]
    InvalidPattern {
        /// Pattern as written in the configuration
        pattern: String,
        /// Underlying error
        #[source]
        source: glob::PatternError,
    },
    /// A directory entry could not be read during traversal
    #[error("error walking '{}': {source}", root.display())]
    Walk {
        /// Base directory being walked
        root: PathBuf,
        /// Underlying error
        #[source]
        source: walkdir::Error,
    },
}

/// A single content glob, optionally negated with a leading `!`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentPattern {
    /// Glob text without the `!` prefix
    pub glob: String,
    /// Exclusion pattern
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub negated: bool,
}

impl ContentPattern {
    /// Parse a pattern as written in configuration.
    ///
    /// A leading `!` marks an exclusion; a leading `./` is dropped.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let (negated, glob) = match trimmed.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let glob = glob.strip_prefix("./").unwrap_or(glob);
        Self { glob: glob.to_string(), negated }
    }

    /// Check that every brace expansion of the pattern compiles.
    pub fn compile_check(&self) -> Result<(), glob::PatternError> {
        for expanded in expand_braces(&self.glob) {
            Pattern::new(&expanded)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for ContentPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.negated {
            write!(f, "!{}", self.glob)
        } else {
            write!(f, "{}", self.glob)
        }
    }
}

/// Result of matching content patterns against the file system.
#[derive(Debug, Default)]
pub struct MatchOutcome {
    /// Matched files: absolute, deduplicated, sorted by path string
    pub files: Vec<PathBuf>,
    /// Patterns or roots that could not be resolved
    pub warnings: Vec<ScanError>,
    /// Number of directory traversals performed
    pub traversals: usize,
}

/// Positive patterns sharing one literal base directory.
#[derive(Debug, Default)]
struct BaseGroup {
    patterns: Vec<(String, Pattern)>,
    max_depth: Option<usize>,
    recursive: bool,
}

/// Expands content patterns relative to a root directory.
///
/// # Example
///
/// ```ignore
/// let outcome = PathMatcher::new("/project")
///     .with_patterns(vec![ContentPattern::parse("templates/**/*.html")])
///     .run();
/// for file in &outcome.files {
///     println!("{}", file.display());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PathMatcher {
    root: PathBuf,
    patterns: Vec<ContentPattern>,
}

impl PathMatcher {
    /// Create a matcher rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), patterns: Vec::new() }
    }

    /// Add patterns in declaration order.
    pub fn with_patterns(mut self, patterns: impl IntoIterator<Item = ContentPattern>) -> Self {
        self.patterns.extend(patterns);
        self
    }

    /// Match all patterns.
    ///
    /// Symbolic links are followed. Unresolvable roots, invalid patterns,
    /// dangling links and link loops are reported in
    /// [`MatchOutcome::warnings`]; the remaining patterns still match.
    pub fn run(&self) -> MatchOutcome {
        let mut outcome = MatchOutcome::default();
        let root = fs::canonicalize(&self.root).unwrap_or_else(|_| self.root.clone());

        let mut groups: BTreeMap<PathBuf, BaseGroup> = BTreeMap::new();
        let mut literal_files: Vec<PathBuf> = Vec::new();
        let mut excludes: Vec<Pattern> = Vec::new();

        for content in &self.patterns {
            for expanded in expand_braces(&content.glob) {
                if content.negated {
                    match exclusion_pattern(&root, &expanded) {
                        Ok(pattern) => excludes.push(pattern),
                        Err(source) => {
                            push_warning(
                                &mut outcome,
                                ScanError::InvalidPattern { pattern: content.to_string(), source },
                            );
                        }
                    }
                    continue;
                }
                self.plan_pattern(
                    &root,
                    content,
                    &expanded,
                    &mut groups,
                    &mut literal_files,
                    &mut outcome,
                );
            }
        }

        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut files: Vec<PathBuf> = Vec::new();
        let mut keep = |path: PathBuf, files: &mut Vec<PathBuf>| {
            if excludes.iter().any(|ex| ex.matches_path_with(&path, MATCH_OPTIONS)) {
                return;
            }
            if seen.insert(path.clone()) {
                files.push(path);
            }
        };

        for path in literal_files {
            keep(path, &mut files);
        }

        for (base, group) in &groups {
            tracing::debug!(
                base = %base.display(),
                patterns = group.patterns.len(),
                "walking content root"
            );
            outcome.traversals += 1;

            let mut walker = WalkDir::new(base).follow_links(true);
            if !group.recursive {
                if let Some(depth) = group.max_depth {
                    walker = walker.max_depth(depth);
                }
            }

            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(source) => {
                        push_warning(&mut outcome, ScanError::Walk { root: base.clone(), source });
                        continue;
                    }
                };
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                let Ok(relative) = path.strip_prefix(base) else {
                    continue;
                };
                let matched =
                    group.patterns.iter().any(|(_, p)| p.matches_path_with(relative, MATCH_OPTIONS));
                if matched {
                    keep(path.to_path_buf(), &mut files);
                }
            }
        }

        files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
        outcome.files = files;
        outcome
    }

    /// Place one expanded positive pattern into its base-directory group.
    fn plan_pattern(
        &self,
        root: &Path,
        content: &ContentPattern,
        expanded: &str,
        groups: &mut BTreeMap<PathBuf, BaseGroup>,
        literal_files: &mut Vec<PathBuf>,
        outcome: &mut MatchOutcome,
    ) {
        let (base, remainder) = split_literal_base(root, expanded);

        let base = match fs::canonicalize(&base) {
            Ok(path) => path,
            Err(source) => {
                push_warning(
                    outcome,
                    ScanError::UnresolvedRoot { pattern: content.to_string(), root: base, source },
                );
                return;
            }
        };

        // A pattern without glob syntax names a file or a whole directory.
        let remainder = match remainder {
            Some(rest) => rest,
            None if base.is_file() => {
                literal_files.push(base);
                return;
            }
            None => "**/*".to_string(),
        };

        let pattern = match Pattern::new(&remainder) {
            Ok(pattern) => pattern,
            Err(source) => {
                push_warning(
                    outcome,
                    ScanError::InvalidPattern { pattern: content.to_string(), source },
                );
                return;
            }
        };

        let group = groups.entry(base).or_default();
        if remainder.contains("**") {
            group.recursive = true;
        } else {
            let depth = remainder.split('/').filter(|c| !c.is_empty()).count();
            group.max_depth = Some(group.max_depth.map_or(depth, |d| d.max(depth)));
        }
        group.patterns.push((content.to_string(), pattern));
    }
}

/// Match `patterns` against the file system under `root`.
pub fn match_files(root: &Path, patterns: &[ContentPattern]) -> MatchOutcome {
    PathMatcher::new(root).with_patterns(patterns.iter().cloned()).run()
}

fn push_warning(outcome: &mut MatchOutcome, warning: ScanError) {
    tracing::warn!("{}", warning);
    outcome.warnings.push(warning);
}

fn exclusion_pattern(root: &Path, glob: &str) -> Result<Pattern, glob::PatternError> {
    if Path::new(glob).is_absolute() {
        return Pattern::new(glob);
    }
    let escaped_root = Pattern::escape(&root.to_string_lossy());
    Pattern::new(&format!("{}/{}", escaped_root.trim_end_matches('/'), glob))
}

/// Split a pattern into its literal leading directory and the glob remainder.
///
/// Returns `None` for the remainder when the pattern has no glob syntax.
pub(crate) fn split_literal_base(root: &Path, pattern: &str) -> (PathBuf, Option<String>) {
    let mut base = if pattern.starts_with('/') { PathBuf::from("/") } else { root.to_path_buf() };
    let components: Vec<&str> = pattern.split('/').filter(|c| !c.is_empty()).collect();

    let literal_len = components.iter().take_while(|c| !has_glob_syntax(c)).count();
    for component in &components[..literal_len] {
        base.push(component);
    }

    if literal_len == components.len() {
        (base, None)
    } else {
        (base, Some(components[literal_len..].join("/")))
    }
}

fn has_glob_syntax(component: &str) -> bool {
    component.contains(['*', '?', '[', ']', '{', '}'])
}

/// Expand `{a,b}` alternations into separate patterns.
pub(crate) fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };

    let mut depth = 0i32;
    let mut close = None;
    for (idx, ch) in pattern[open..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(open + idx);
                    break;
                }
            }
            _ => {}
        }
    }
    let Some(close) = close else {
        return vec![pattern.to_string()];
    };

    let prefix = &pattern[..open];
    let body = &pattern[open + 1..close];
    let suffix = &pattern[close + 1..];

    let mut alternatives = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (idx, ch) in body.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => depth -= 1,
            ',' if depth == 0 => {
                alternatives.push(&body[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    alternatives.push(&body[start..]);

    alternatives
        .iter()
        .flat_map(|alt| expand_braces(&format!("{}{}{}", prefix, alt, suffix)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(&path).unwrap().write_all(b"<div class=\"flex\"></div>").unwrap();
        path
    }

    fn names(outcome: &MatchOutcome, root: &Path) -> Vec<String> {
        let root = fs::canonicalize(root).unwrap();
        outcome
            .files
            .iter()
            .map(|f| f.strip_prefix(&root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_parse_pattern() {
        let p = ContentPattern::parse("./src/**/*.rs");
        assert_eq!(p.glob, "src/**/*.rs");
        assert!(!p.negated);

        let p = ContentPattern::parse("!src/generated/**");
        assert_eq!(p.glob, "src/generated/**");
        assert!(p.negated);
        assert_eq!(p.to_string(), "!src/generated/**");
    }

    #[test]
    fn test_expand_braces() {
        assert_eq!(expand_braces("src/*.rs"), vec!["src/*.rs"]);
        assert_eq!(expand_braces("src/*.{rs,html}"), vec!["src/*.rs", "src/*.html"]);
        assert_eq!(
            expand_braces("{a,b}/*.{x,y}"),
            vec!["a/*.x", "a/*.y", "b/*.x", "b/*.y"]
        );
        assert_eq!(expand_braces("a{b"), vec!["a{b"]);
    }

    #[test]
    fn test_split_literal_base() {
        let root = Path::new("/project");
        let (base, rest) = split_literal_base(root, "templates/**/*.html");
        assert_eq!(base, PathBuf::from("/project/templates"));
        assert_eq!(rest.as_deref(), Some("**/*.html"));

        let (base, rest) = split_literal_base(root, "index.html");
        assert_eq!(base, PathBuf::from("/project/index.html"));
        assert!(rest.is_none());

        let (base, rest) = split_literal_base(root, "**/*.rs");
        assert_eq!(base, PathBuf::from("/project"));
        assert_eq!(rest.as_deref(), Some("**/*.rs"));
    }

    #[test]
    fn test_match_recursive_pattern() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "templates/index.html");
        create_test_file(temp.path(), "templates/partials/nav.html");
        create_test_file(temp.path(), "templates/readme.md");

        let outcome = match_files(temp.path(), &[ContentPattern::parse("templates/**/*.html")]);
        assert!(outcome.warnings.is_empty());
        assert_eq!(names(&outcome, temp.path()), vec!["templates/index.html", "templates/partials/nav.html"]);
    }

    #[test]
    fn test_match_is_sorted_and_deduplicated() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "src/b.rs");
        create_test_file(temp.path(), "src/a.rs");

        let outcome = match_files(
            temp.path(),
            &[ContentPattern::parse("src/**/*.rs"), ContentPattern::parse("src/*.rs")],
        );
        assert_eq!(names(&outcome, temp.path()), vec!["src/a.rs", "src/b.rs"]);
    }

    #[test]
    fn test_shared_base_walked_once() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "src/a.rs");
        create_test_file(temp.path(), "src/b.html");
        create_test_file(temp.path(), "templates/c.html");

        let outcome = match_files(
            temp.path(),
            &[
                ContentPattern::parse("src/**/*.rs"),
                ContentPattern::parse("src/**/*.html"),
                ContentPattern::parse("templates/*.html"),
            ],
        );
        assert_eq!(outcome.files.len(), 3);
        assert_eq!(outcome.traversals, 2);
    }

    #[test]
    fn test_missing_root_is_warning() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "src/main.rs");

        let outcome = match_files(
            temp.path(),
            &[ContentPattern::parse("missing/**/*.html"), ContentPattern::parse("src/**/*.rs")],
        );
        assert_eq!(outcome.warnings.len(), 1);
        assert!(matches!(outcome.warnings[0], ScanError::UnresolvedRoot { .. }));
        assert_eq!(names(&outcome, temp.path()), vec!["src/main.rs"]);
    }

    #[test]
    fn test_exclusion_pattern() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "src/main.rs");
        create_test_file(temp.path(), "src/generated/schema.rs");

        let outcome = match_files(
            temp.path(),
            &[ContentPattern::parse("src/**/*.rs"), ContentPattern::parse("!src/generated/**")],
        );
        assert_eq!(names(&outcome, temp.path()), vec!["src/main.rs"]);
    }

    #[test]
    fn test_literal_file_and_directory() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "index.html");
        create_test_file(temp.path(), "components/button.html");
        create_test_file(temp.path(), "components/nested/card.html");

        let outcome = match_files(
            temp.path(),
            &[ContentPattern::parse("index.html"), ContentPattern::parse("components")],
        );
        assert_eq!(
            names(&outcome, temp.path()),
            vec!["components/button.html", "components/nested/card.html", "index.html"]
        );
    }

    #[test]
    fn test_brace_pattern_matches_both_extensions() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "src/app.rs");
        create_test_file(temp.path(), "src/page.html");
        create_test_file(temp.path(), "src/style.css");

        let outcome = match_files(temp.path(), &[ContentPattern::parse("src/*.{rs,html}")]);
        assert_eq!(names(&outcome, temp.path()), vec!["src/app.rs", "src/page.html"]);
        assert_eq!(outcome.traversals, 1);
    }

    #[test]
    fn test_non_recursive_pattern_skips_nested() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "src/top.rs");
        create_test_file(temp.path(), "src/deep/inner.rs");

        let outcome = match_files(temp.path(), &[ContentPattern::parse("src/*.rs")]);
        assert_eq!(names(&outcome, temp.path()), vec!["src/top.rs"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file_is_matched() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "templates/index.html");
        let target = create_test_file(temp.path(), "shared/card.html");
        symlink(&target, temp.path().join("templates/card.html")).unwrap();

        let outcome = match_files(temp.path(), &[ContentPattern::parse("templates/**/*.html")]);
        assert!(outcome.warnings.is_empty());
        assert_eq!(
            names(&outcome, temp.path()),
            vec!["templates/card.html", "templates/index.html"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_warning() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "templates/index.html");
        let link = temp.path().join("templates/dangling.html");
        symlink(temp.path().join("templates/gone.html"), link).unwrap();

        let outcome = match_files(temp.path(), &[ContentPattern::parse("templates/**/*.html")]);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(matches!(outcome.warnings[0], ScanError::Walk { .. }));
        assert_eq!(names(&outcome, temp.path()), vec!["templates/index.html"]);
    }

    #[test]
    fn test_compile_check_rejects_bad_glob() {
        assert!(ContentPattern::parse("src/[*.rs").compile_check().is_err());
        assert!(ContentPattern::parse("src/**/*.rs").compile_check().is_ok());
    }
}
