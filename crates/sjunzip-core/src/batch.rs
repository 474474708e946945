//! Batch extraction of every archive in a directory.
//!
//! Archives are processed one after another, each into a sibling directory
//! named after the archive. Discovery and ordering are separate steps so
//! callers can inspect or filter the candidate list first.

use std::cmp::Ordering;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;
use std::time::SystemTime;

use crate::ExtractConfig;
use crate::Result;
use crate::api::extract_archive_with_progress;
use crate::report::ArchiveOutcome;
use crate::report::BatchReport;
use crate::report::ProgressCallback;

/// Extension of archives picked up from a directory, compared ASCII
/// case-insensitively.
const ARCHIVE_EXTENSION: &str = "zip";

/// Suffix for destinations of archives whose name has no extension.
const EXTRACTED_SUFFIX: &str = ".extracted";

/// A file selected for extraction, with the metadata ordering needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveCandidate {
    /// Path of the archive.
    pub path: PathBuf,
    /// Last modification time, if the platform reports one.
    pub modified: Option<SystemTime>,
    /// File size in bytes.
    pub size: u64,
}

impl ArchiveCandidate {
    /// Reads metadata for `path`, following symlinks.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::Io` if the file cannot be stat'ed.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let metadata = fs::metadata(&path)?;
        Ok(Self {
            modified: metadata.modified().ok(),
            size: metadata.len(),
            path,
        })
    }
}

/// Order in which discovered archives are extracted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Lexicographic by path.
    #[default]
    Name,
    /// Most recently modified first.
    Modified,
}

impl SortOrder {
    /// The comparator for this order.
    #[must_use]
    pub fn comparator(self) -> fn(&ArchiveCandidate, &ArchiveCandidate) -> Ordering {
        match self {
            Self::Name => by_name,
            Self::Modified => by_modified_newest_first,
        }
    }

    /// Sorts `candidates` in place. The sort is stable.
    pub fn sort(self, candidates: &mut [ArchiveCandidate]) {
        candidates.sort_by(self.comparator());
    }
}

/// Compares candidates by path.
#[must_use]
pub fn by_name(a: &ArchiveCandidate, b: &ArchiveCandidate) -> Ordering {
    a.path.cmp(&b.path)
}

/// Compares candidates by modification time, newest first.
///
/// Candidates without a time sort last; ties fall back to [`by_name`].
#[must_use]
pub fn by_modified_newest_first(a: &ArchiveCandidate, b: &ArchiveCandidate) -> Ordering {
    b.modified.cmp(&a.modified).then_with(|| by_name(a, b))
}

/// What the batch does when one archive fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failing archive and return its error.
    #[default]
    Abort,
    /// Record the failure and move on to the next archive.
    Continue,
}

/// Options for [`extract_batch`].
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Per-archive extraction settings.
    pub extract: ExtractConfig,
    /// Behaviour on failure.
    pub failure_policy: FailurePolicy,
    /// Processing order.
    pub sort_order: SortOrder,
    /// Put destinations under this directory instead of next to each
    /// archive.
    pub output_base: Option<PathBuf>,
}

/// Finds the archives to extract.
///
/// - a directory yields every non-directory child with a `zip` extension
///   (any ASCII case), sorted by name
/// - a file yields that file alone when it has a `zip` extension, and
///   nothing otherwise
/// - `None` means the current directory
///
/// # Errors
///
/// Returns `ExtractionError::Io` if the target does not exist or the
/// directory cannot be read.
///
/// # Examples
///
/// ```no_run
/// use sjunzip_core::batch::discover_archives;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// for candidate in discover_archives(Some(Path::new("downloads")))? {
///     println!("{}", candidate.path.display());
/// }
/// # Ok(())
/// # }
/// ```
pub fn discover_archives(target: Option<&Path>) -> Result<Vec<ArchiveCandidate>> {
    let target = match target {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir()?,
    };

    if !fs::metadata(&target)?.is_dir() {
        if !has_archive_extension(&target) {
            log::debug!("Skipping {}: not a .zip file", target.display());
            return Ok(Vec::new());
        }
        return Ok(vec![ArchiveCandidate::from_path(target)?]);
    }

    let mut candidates = Vec::new();
    for entry in fs::read_dir(&target)? {
        let path = entry?.path();
        if !has_archive_extension(&path) {
            continue;
        }
        // Follows symlinks, so a link to a directory is skipped too.
        let candidate = ArchiveCandidate::from_path(path)?;
        if fs::metadata(&candidate.path)?.is_dir() {
            continue;
        }
        candidates.push(candidate);
    }

    SortOrder::Name.sort(&mut candidates);
    log::debug!(
        "Found {} archives in {}",
        candidates.len(),
        target.display()
    );
    Ok(candidates)
}

fn has_archive_extension(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
}

/// Destination directory for `archive`.
///
/// The archive's file name minus its last extension, next to the archive
/// or under `output_base`. A name without an extension gets an
/// `.extracted` suffix so the destination never collides with the archive.
///
/// # Examples
///
/// ```
/// use sjunzip_core::batch::destination_for;
/// use std::path::Path;
///
/// assert_eq!(
///     destination_for(Path::new("dl/写真.zip"), None),
///     Path::new("dl/写真")
/// );
/// assert_eq!(
///     destination_for(Path::new("dl/a.b.zip"), Some(Path::new("out"))),
///     Path::new("out/a.b")
/// );
/// ```
#[must_use]
pub fn destination_for(archive: &Path, output_base: Option<&Path>) -> PathBuf {
    let name = match (archive.file_stem(), archive.extension()) {
        (Some(stem), Some(_)) => stem.to_os_string(),
        (Some(stem), None) => {
            let mut name = stem.to_os_string();
            name.push(EXTRACTED_SUFFIX);
            name
        }
        (None, _) => EXTRACTED_SUFFIX.trim_start_matches('.').into(),
    };

    let base = output_base
        .or_else(|| archive.parent())
        .unwrap_or_else(|| Path::new(""));
    base.join(name)
}

/// Extracts each candidate into its destination, sequentially.
///
/// Candidates are sorted with `options.sort_order` first.
///
/// # Errors
///
/// With [`FailurePolicy::Abort`], returns the first archive's error
/// unchanged. With [`FailurePolicy::Continue`], never fails; failures are
/// recorded in the returned report.
pub fn extract_batch(
    mut candidates: Vec<ArchiveCandidate>,
    options: &BatchOptions,
    progress: &mut dyn ProgressCallback,
) -> Result<BatchReport> {
    let start = Instant::now();
    let mut report = BatchReport::new();

    options.sort_order.sort(&mut candidates);
    let total = candidates.len();

    for (position, candidate) in candidates.into_iter().enumerate() {
        let destination = destination_for(&candidate.path, options.output_base.as_deref());
        progress.on_archive_start(&candidate.path, total, position + 1);

        let result =
            extract_archive_with_progress(&candidate.path, &destination, &options.extract, progress);

        let outcome = match result {
            Ok(extraction) => ArchiveOutcome {
                archive: candidate.path,
                destination,
                result: Ok(extraction),
            },
            Err(e) if options.failure_policy == FailurePolicy::Abort => return Err(e),
            Err(e) => {
                log::warn!("Failed to extract {}: {e}", candidate.path.display());
                ArchiveOutcome {
                    archive: candidate.path,
                    destination,
                    result: Err(e.to_string()),
                }
            }
        };

        progress.on_archive_complete(&outcome);
        report.archives.push(outcome);
    }

    report.duration = start.elapsed();
    log::info!(
        "Batch finished: {} succeeded, {} failed",
        report.succeeded(),
        report.failed()
    );
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ExtractionError;
    use crate::NoopProgress;
    use crate::test_utils::LegacyZipBuilder;
    use std::time::Duration;
    use tempfile::TempDir;

    fn candidate(name: &str, modified_secs: Option<u64>) -> ArchiveCandidate {
        ArchiveCandidate {
            path: PathBuf::from(name),
            modified: modified_secs.map(|s| SystemTime::UNIX_EPOCH + Duration::from_secs(s)),
            size: 0,
        }
    }

    fn names(candidates: &[ArchiveCandidate]) -> Vec<&str> {
        candidates
            .iter()
            .map(|c| c.path.to_str().unwrap())
            .collect()
    }

    #[test]
    fn test_sort_by_name() {
        let mut list = vec![candidate("b.zip", None), candidate("a.zip", None)];
        SortOrder::Name.sort(&mut list);
        assert_eq!(names(&list), ["a.zip", "b.zip"]);
    }

    #[test]
    fn test_sort_newest_first() {
        let mut list = vec![
            candidate("old.zip", Some(100)),
            candidate("unknown.zip", None),
            candidate("new.zip", Some(300)),
            candidate("mid-b.zip", Some(200)),
            candidate("mid-a.zip", Some(200)),
        ];
        SortOrder::Modified.sort(&mut list);
        assert_eq!(
            names(&list),
            ["new.zip", "mid-a.zip", "mid-b.zip", "old.zip", "unknown.zip"]
        );
    }

    #[test]
    fn test_destination_for() {
        assert_eq!(
            destination_for(Path::new("/data/archive.zip"), None),
            Path::new("/data/archive")
        );
        assert_eq!(
            destination_for(Path::new("archive.ZIP"), None),
            Path::new("archive")
        );
        assert_eq!(
            destination_for(Path::new("/data/archive.zip"), Some(Path::new("/out"))),
            Path::new("/out/archive")
        );
        assert_eq!(
            destination_for(Path::new("/data/noext"), None),
            Path::new("/data/noext.extracted")
        );
        assert_eq!(
            destination_for(Path::new("/data/.zip"), None),
            Path::new("/data/.zip.extracted")
        );
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("b.zip"), b"").unwrap();
        fs::write(temp.path().join("A.ZIP"), b"").unwrap();
        fs::write(temp.path().join("notes.txt"), b"").unwrap();
        fs::write(temp.path().join("zip"), b"").unwrap();
        fs::create_dir(temp.path().join("dir.zip")).unwrap();

        let found = discover_archives(Some(temp.path())).unwrap();
        let found: Vec<_> = found
            .iter()
            .map(|c| c.path.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(found, ["A.ZIP", "b.zip"]);
    }

    #[test]
    fn test_discover_single_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Archive.Zip");
        fs::write(&path, b"data").unwrap();

        let found = discover_archives(Some(&path)).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, path);
        assert_eq!(found[0].size, 4);
    }

    #[test]
    fn test_discover_single_file_without_zip_extension() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("archive.bin");
        fs::write(&path, b"data").unwrap();

        assert!(discover_archives(Some(&path)).unwrap().is_empty());
    }

    #[test]
    fn test_discover_missing_target() {
        let result = discover_archives(Some(Path::new("/nonexistent/target")));
        assert!(matches!(result, Err(ExtractionError::Io(_))));
    }

    #[test]
    fn test_batch_abort_stops_at_first_failure() {
        let temp = TempDir::new().unwrap();
        LegacyZipBuilder::new()
            .add_file_raw(b"a.txt", b"a", 0o644)
            .write_to(temp.path().join("1.zip"));
        fs::write(temp.path().join("2.zip"), b"not a zip").unwrap();
        LegacyZipBuilder::new()
            .add_file_raw(b"c.txt", b"c", 0o644)
            .write_to(temp.path().join("3.zip"));

        let candidates = discover_archives(Some(temp.path())).unwrap();
        let result = extract_batch(candidates, &BatchOptions::default(), &mut NoopProgress);

        assert!(matches!(result, Err(ExtractionError::NotAnArchive { .. })));
        assert!(temp.path().join("1/a.txt").is_file());
        assert!(!temp.path().join("2").exists());
        assert!(!temp.path().join("3").exists());
    }

    #[test]
    fn test_batch_continue_records_failures() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("1.zip"), b"not a zip").unwrap();
        LegacyZipBuilder::new()
            .add_file("名前.txt", b"ok", 0o644)
            .write_to(temp.path().join("2.zip"));

        let options = BatchOptions {
            failure_policy: FailurePolicy::Continue,
            ..BatchOptions::default()
        };
        let candidates = discover_archives(Some(temp.path())).unwrap();
        let report = extract_batch(candidates, &options, &mut NoopProgress).unwrap();

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.archives[0].is_success());
        assert_eq!(
            fs::read_to_string(temp.path().join("2/名前.txt")).unwrap(),
            "ok"
        );
    }

    #[test]
    fn test_batch_output_base() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out");
        LegacyZipBuilder::new()
            .add_file_raw(b"x.txt", b"x", 0o644)
            .write_to(temp.path().join("pack.zip"));

        let options = BatchOptions {
            output_base: Some(out.clone()),
            ..BatchOptions::default()
        };
        let candidates = discover_archives(Some(temp.path())).unwrap();
        let report = extract_batch(candidates, &options, &mut NoopProgress).unwrap();

        assert_eq!(report.archives[0].destination, out.join("pack"));
        assert!(out.join("pack/x.txt").is_file());
    }
}
