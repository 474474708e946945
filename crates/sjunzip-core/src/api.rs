//! High-level public API for archive extraction.

use std::path::Path;

use crate::ExtractConfig;
use crate::ExtractionReport;
use crate::NoopProgress;
use crate::ProgressCallback;
use crate::Result;
use crate::extraction::Extractor;
use crate::formats::ZipSource;
use crate::types::DestDir;

/// Extracts a ZIP archive with legacy-encoded entry names into `output_dir`.
///
/// The archive is opened before `output_dir` is created, so input that is
/// not a ZIP archive leaves the filesystem untouched. `output_dir` and its
/// parents are created as needed.
///
/// # Errors
///
/// Returns the first error encountered:
/// - `ExtractionError::NotAnArchive` if the input is not a ZIP container
/// - `ExtractionError::Decoding` if an entry name is invalid in the
///   configured encoding
/// - `ExtractionError::PathTraversal` if an entry name escapes `output_dir`
/// - `ExtractionError::InvalidEntry` if an entry cannot be read
/// - `ExtractionError::Io` for filesystem errors and corrupt content
///
/// An aborted extraction may leave a partially populated `output_dir`.
///
/// # Examples
///
/// ```no_run
/// use sjunzip_core::ExtractConfig;
/// use sjunzip_core::extract_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ExtractConfig::default();
/// let report = extract_archive("sample.zip", "sample", &config)?;
/// println!("Extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
pub fn extract_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    output_dir: Q,
    config: &ExtractConfig,
) -> Result<ExtractionReport> {
    let mut noop = NoopProgress;
    extract_archive_with_progress(archive_path, output_dir, config, &mut noop)
}

/// Extracts an archive, reporting each entry to `progress`.
///
/// # Errors
///
/// Same as [`extract_archive`].
///
/// # Examples
///
/// ```no_run
/// use sjunzip_core::ExtractConfig;
/// use sjunzip_core::NoopProgress;
/// use sjunzip_core::extract_archive_with_progress;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut progress = NoopProgress;
/// let report = extract_archive_with_progress(
///     "sample.zip",
///     "sample",
///     &ExtractConfig::default(),
///     &mut progress,
/// )?;
/// # Ok(())
/// # }
/// ```
pub fn extract_archive_with_progress<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    output_dir: Q,
    config: &ExtractConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    let source = ZipSource::open(archive_path.as_ref())?;
    let dest = DestDir::create(output_dir.as_ref())?;
    Extractor::new(source, dest, config.clone()).run(progress)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ExtractionError;
    use crate::test_utils::LegacyZipBuilder;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        started: Vec<(PathBuf, usize, usize)>,
        completed: Vec<PathBuf>,
        bytes: u64,
        finished: bool,
    }

    impl ProgressCallback for Recorder {
        fn on_entry_start(&mut self, path: &Path, total: usize, current: usize) {
            self.started.push((path.to_path_buf(), total, current));
        }

        fn on_bytes_written(&mut self, bytes: u64) {
            self.bytes += bytes;
        }

        fn on_entry_complete(&mut self, path: &Path) {
            self.completed.push(path.to_path_buf());
        }

        fn on_complete(&mut self) {
            self.finished = true;
        }
    }

    #[test]
    fn test_extract_archive_creates_destination() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("sample.zip");
        LegacyZipBuilder::new()
            .add_file("フォルダ/ファイル.txt", b"hello", 0o644)
            .write_to(&archive);

        let out = temp.path().join("nested/out");
        let report = extract_archive(&archive, &out, &ExtractConfig::default()).unwrap();

        assert_eq!(report.files_extracted, 1);
        assert_eq!(
            fs::read(out.join("フォルダ").join("ファイル.txt")).unwrap(),
            b"hello"
        );
    }

    #[test]
    fn test_not_an_archive_creates_nothing() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("fake.zip");
        fs::write(&archive, "just text").unwrap();

        let out = temp.path().join("fake");
        let result = extract_archive(&archive, &out, &ExtractConfig::default());

        assert!(matches!(result, Err(ExtractionError::NotAnArchive { .. })));
        assert!(!out.exists());
    }

    #[test]
    fn test_progress_events() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("p.zip");
        LegacyZipBuilder::new()
            .add_dir_raw(b"d/", 0o755)
            .add_file_raw(b"d/f.txt", b"12345", 0o644)
            .write_to(&archive);

        let mut recorder = Recorder::default();
        extract_archive_with_progress(
            &archive,
            temp.path().join("p"),
            &ExtractConfig::default(),
            &mut recorder,
        )
        .unwrap();

        assert_eq!(
            recorder.started,
            vec![
                (PathBuf::from("d/"), 2, 1),
                (PathBuf::from("d/f.txt"), 2, 2)
            ]
        );
        assert_eq!(recorder.completed.len(), 2);
        assert_eq!(recorder.bytes, 5);
        assert!(recorder.finished);
    }

    #[test]
    fn test_progress_paths_are_decoded_names() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("names.zip");
        LegacyZipBuilder::new()
            .add_file("資料\\古い\\..\\表.txt", b"x", 0o644)
            .write_to(&archive);

        let out = temp.path().join("names");
        let mut recorder = Recorder::default();
        extract_archive_with_progress(&archive, &out, &ExtractConfig::default(), &mut recorder)
            .unwrap();

        let name = PathBuf::from("資料\\古い\\..\\表.txt");
        assert_eq!(recorder.started, vec![(name.clone(), 1, 1)]);
        assert_eq!(recorder.completed, vec![name]);
        assert!(out.join("資料").join("表.txt").is_file());
    }

    #[test]
    #[cfg(unix)]
    fn test_without_preserved_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("m.zip");
        LegacyZipBuilder::new()
            .add_file_raw(b"tool", b"bin", 0o700)
            .write_to(&archive);

        let out = temp.path().join("m");
        let config = ExtractConfig::default().with_preserve_permissions(false);
        extract_archive(&archive, &out, &config).unwrap();

        // Process default (0o666 through the umask): no execute bit.
        let mode = fs::metadata(out.join("tool")).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0);
    }
}
