//! Extraction reporting and progress callbacks.

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

/// Statistics for one archive extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Number of file entries written (symlink entries included).
    pub files_extracted: usize,

    /// Number of directory entries materialized.
    pub directories_created: usize,

    /// Total bytes of entry content written to disk.
    pub bytes_written: u64,

    /// Number of directory entries that named the destination root itself.
    pub entries_skipped: usize,

    /// Wall-clock duration of the extraction.
    pub duration: Duration,
}

impl ExtractionReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries materialized on disk.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.files_extracted + self.directories_created
    }
}

/// Outcome of one archive within a batch.
#[derive(Debug)]
pub struct ArchiveOutcome {
    /// The archive that was processed.
    pub archive: PathBuf,
    /// Where its content went.
    pub destination: PathBuf,
    /// Report on success, error message on failure.
    pub result: std::result::Result<ExtractionReport, String>,
}

impl ArchiveOutcome {
    /// Returns `true` if the archive extracted without error.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Statistics for a batch of archives, in processing order.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One outcome per processed archive.
    pub archives: Vec<ArchiveOutcome>,
    /// Wall-clock duration of the whole batch.
    pub duration: Duration,
}

impl BatchReport {
    /// Creates an empty batch report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of archives that extracted successfully.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.archives.iter().filter(|a| a.is_success()).count()
    }

    /// Number of archives that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.archives.len() - self.succeeded()
    }

    /// Returns `true` if any archive failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Total files extracted over all successful archives.
    #[must_use]
    pub fn files_extracted(&self) -> usize {
        self.successful_reports().map(|r| r.files_extracted).sum()
    }

    /// Total bytes written over all successful archives.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.successful_reports().map(|r| r.bytes_written).sum()
    }

    fn successful_reports(&self) -> impl Iterator<Item = &ExtractionReport> {
        self.archives.iter().filter_map(|a| a.result.as_ref().ok())
    }
}

/// Receives progress updates during extraction.
///
/// Paths passed to the callbacks are the decoded entry names as stored in
/// the archive. They are not normalized, so separators and `..` segments
/// appear exactly as the archive wrote them.
///
/// # Examples
///
/// ```
/// use sjunzip_core::ProgressCallback;
/// use std::path::Path;
///
/// struct SimpleProgress;
///
/// impl ProgressCallback for SimpleProgress {
///     fn on_entry_start(&mut self, path: &Path, total: usize, current: usize) {
///         println!("{current}/{total}: {}", path.display());
///     }
///
///     fn on_bytes_written(&mut self, _bytes: u64) {}
///
///     fn on_entry_complete(&mut self, _path: &Path) {}
///
///     fn on_complete(&mut self) {
///         println!("done");
///     }
/// }
/// ```
pub trait ProgressCallback: Send {
    /// Called before an entry is materialized.
    ///
    /// `current` is 1-indexed.
    fn on_entry_start(&mut self, path: &Path, total: usize, current: usize);

    /// Called after each chunk of file content is written.
    fn on_bytes_written(&mut self, bytes: u64);

    /// Called after an entry is materialized.
    fn on_entry_complete(&mut self, path: &Path);

    /// Called once when the archive has been fully extracted.
    fn on_complete(&mut self);

    /// Called by batch extraction before each archive. `current` is
    /// 1-indexed.
    fn on_archive_start(&mut self, _archive: &Path, _total: usize, _current: usize) {}

    /// Called by batch extraction after each archive, failed or not.
    fn on_archive_complete(&mut self, _outcome: &ArchiveOutcome) {}
}

/// A `ProgressCallback` that ignores every update.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_entry_start(&mut self, _path: &Path, _total: usize, _current: usize) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, _path: &Path) {}

    fn on_complete(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(name: &str, result: Result<ExtractionReport, String>) -> ArchiveOutcome {
        ArchiveOutcome {
            archive: PathBuf::from(format!("{name}.zip")),
            destination: PathBuf::from(name),
            result,
        }
    }

    #[test]
    fn test_new_report() {
        let report = ExtractionReport::new();
        assert_eq!(report.files_extracted, 0);
        assert_eq!(report.entries_skipped, 0);
        assert_eq!(report.total_items(), 0);
    }

    #[test]
    fn test_total_items() {
        let report = ExtractionReport {
            files_extracted: 10,
            directories_created: 5,
            entries_skipped: 1,
            ..ExtractionReport::default()
        };
        assert_eq!(report.total_items(), 15);
    }

    #[test]
    fn test_batch_report_counts() {
        let ok = ExtractionReport {
            files_extracted: 2,
            bytes_written: 10,
            ..ExtractionReport::default()
        };
        let batch = BatchReport {
            archives: vec![
                outcome("a", Ok(ok.clone())),
                outcome("b", Err("not a zip archive".to_string())),
                outcome("c", Ok(ok)),
            ],
            duration: Duration::ZERO,
        };

        assert_eq!(batch.succeeded(), 2);
        assert_eq!(batch.failed(), 1);
        assert!(batch.has_failures());
        assert_eq!(batch.files_extracted(), 4);
        assert_eq!(batch.bytes_written(), 20);
    }

    #[test]
    fn test_empty_batch_has_no_failures() {
        assert!(!BatchReport::new().has_failures());
    }
}
