//! Parallel class extraction.
//!
//! Files are independent, so each rayon worker folds its share into a
//! private partial result and the partials are unioned at the join point.
//! No lock is held while files are read.

use crate::scan::extract::{extract_classes, extract_file, ExtractionError};
use rayon::prelude::*;
use rayon::{ThreadPoolBuildError, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Default number of parallel jobs (uses available parallelism).
pub fn default_jobs() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Inline content scanned without touching the file system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawContent {
    /// Source text
    pub raw: String,
    /// Nominal file extension, kept for diagnostics
    #[serde(default = "default_raw_extension")]
    pub extension: String,
}

fn default_raw_extension() -> String {
    "html".to_string()
}

/// Union of classes found across a set of files.
#[derive(Debug, Default)]
pub struct ExtractionSummary {
    /// Deduplicated class candidates
    pub classes: BTreeSet<String>,
    /// Number of files read successfully
    pub files_scanned: usize,
    /// Files skipped because they could not be read, sorted by path
    pub failures: Vec<ExtractionError>,
}

impl ExtractionSummary {
    fn merge(mut self, other: ExtractionSummary) -> ExtractionSummary {
        self.classes.extend(other.classes);
        self.files_scanned += other.files_scanned;
        self.failures.extend(other.failures);
        self
    }

    /// Add the classes from inline content.
    pub fn add_raw(&mut self, content: &RawContent) {
        let found = extract_classes(content.raw.as_bytes());
        tracing::debug!(
            extension = %content.extension,
            classes = found.len(),
            "scanned raw content"
        );
        self.classes.extend(found);
    }
}

/// Extract classes from `files` on the global rayon pool.
pub fn extract_files(files: &[PathBuf]) -> ExtractionSummary {
    let mut summary = files
        .par_iter()
        .fold(ExtractionSummary::default, |mut acc, path| {
            match extract_file(path) {
                Ok(classes) => {
                    acc.files_scanned += 1;
                    acc.classes.extend(classes);
                }
                Err(err) => {
                    tracing::warn!("{}", err);
                    acc.failures.push(err);
                }
            }
            acc
        })
        .reduce(ExtractionSummary::default, ExtractionSummary::merge);

    summary.failures.sort_by(|a, b| a.path.cmp(&b.path));
    summary
}

/// Extract classes from `files` on a dedicated pool of `jobs` workers.
pub fn extract_files_with_jobs(
    files: &[PathBuf],
    jobs: usize,
) -> Result<ExtractionSummary, ThreadPoolBuildError> {
    let pool = ThreadPoolBuilder::new().num_threads(jobs.max(1)).build()?;
    Ok(pool.install(|| extract_files(files)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_files(dir: &TempDir, count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| {
                let path = dir.path().join(format!("page{}.html", i));
                fs::write(&path, format!(r#"<div class="shared p-{}">"#, i)).unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn test_extract_files_unions_results() {
        let temp = TempDir::new().unwrap();
        let files = write_files(&temp, 20);

        let summary = extract_files(&files);
        assert_eq!(summary.files_scanned, 20);
        assert!(summary.failures.is_empty());
        assert!(summary.classes.contains("shared"));
        for i in 0..20 {
            assert!(summary.classes.contains(&format!("p-{}", i)));
        }
    }

    #[test]
    fn test_extract_files_with_jobs_matches_global_pool() {
        let temp = TempDir::new().unwrap();
        let files = write_files(&temp, 8);

        let single = extract_files_with_jobs(&files, 1).unwrap();
        let many = extract_files_with_jobs(&files, 4).unwrap();
        assert_eq!(single.classes, many.classes);
        assert_eq!(single.files_scanned, many.files_scanned);
    }

    #[test]
    fn test_unreadable_file_is_reported() {
        let temp = TempDir::new().unwrap();
        let mut files = write_files(&temp, 2);
        files.push(temp.path().join("gone.html"));

        let summary = extract_files(&files);
        assert_eq!(summary.files_scanned, 2);
        assert_eq!(summary.failures.len(), 1);
        assert!(summary.failures[0].path.ends_with("gone.html"));
    }

    #[test]
    fn test_add_raw_content() {
        let mut summary = ExtractionSummary::default();
        summary.add_raw(&RawContent {
            raw: r#"<span class="sr-only">"#.to_string(),
            extension: "html".to_string(),
        });
        assert!(summary.classes.contains("sr-only"));
        assert_eq!(summary.files_scanned, 0);
    }
}
