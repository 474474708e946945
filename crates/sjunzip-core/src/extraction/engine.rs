//! Per-archive extraction engine.
//!
//! Every entry moves through three stages, each a separate type so a stage
//! cannot be skipped:
//!
//! 1. [`Pending`]: metadata from the central directory, name still raw bytes
//! 2. [`Decoded`]: name decoded with the configured legacy encoding
//! 3. [`Materialized`]: directory created or file content written
//!
//! Any error ends the job; there is no per-entry recovery.

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::BufWriter;
use std::io::Read;
use std::io::Seek;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use crate::ExtractConfig;
use crate::ExtractionError;
use crate::ExtractionReport;
use crate::ProgressCallback;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::copy_with_progress;
use crate::encoding::LegacyEncoding;
use crate::formats::EntryInfo;
use crate::formats::EntryKind;
use crate::formats::ZipSource;
use crate::security::PathResolver;
use crate::security::ResolvedPath;
use crate::security::permissions::apply_mode;
use crate::security::permissions::dir_mode;
use crate::security::permissions::file_mode;
use crate::types::DestDir;

/// Buffer size for the destination file writer (64KB).
const WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// Creation mode when stored permissions are ignored; the umask applies.
const PROCESS_DEFAULT_FILE_MODE: u32 = 0o666;

/// An entry read from the central directory, name not yet decoded.
#[derive(Debug, Clone, Copy)]
pub struct Pending<'a> {
    info: &'a EntryInfo,
}

impl<'a> Pending<'a> {
    /// Wraps entry metadata.
    #[must_use]
    pub fn new(info: &'a EntryInfo) -> Self {
        Self { info }
    }

    /// Decodes the raw name.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::Decoding` with the raw bytes if the name is
    /// not valid in `encoding`.
    pub fn decode(self, encoding: LegacyEncoding) -> Result<Decoded<'a>> {
        let name = encoding.decode(&self.info.raw_name)?;
        Ok(Decoded {
            info: self.info,
            name,
        })
    }
}

/// An entry with a UTF-8 name.
#[derive(Debug, Clone)]
pub struct Decoded<'a> {
    info: &'a EntryInfo,
    name: String,
}

impl Decoded<'_> {
    /// The decoded name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying entry metadata.
    #[must_use]
    pub fn info(&self) -> &EntryInfo {
        self.info
    }
}

/// What an entry became on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Materialized {
    /// Directory entry created (or already present).
    Directory(PathBuf),
    /// File written with this many bytes.
    File {
        /// Absolute path of the written file.
        path: PathBuf,
        /// Bytes of content written.
        bytes: u64,
    },
    /// Directory entry naming the destination root itself.
    Skipped,
}

/// Extracts every entry of one archive into one destination root.
///
/// # Examples
///
/// ```no_run
/// use sjunzip_core::ExtractConfig;
/// use sjunzip_core::NoopProgress;
/// use sjunzip_core::extraction::Extractor;
/// use sjunzip_core::formats::ZipSource;
/// use sjunzip_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let source = ZipSource::open("sample.zip")?;
/// let dest = DestDir::create("sample")?;
/// let report = Extractor::new(source, dest, ExtractConfig::default()).run(&mut NoopProgress)?;
/// println!("{} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Extractor<R> {
    source: ZipSource<R>,
    resolver: PathResolver,
    config: ExtractConfig,
    buffer: Box<CopyBuffer>,
}

impl<R: Read + Seek> Extractor<R> {
    /// Creates an extractor for an already opened archive.
    #[must_use]
    pub fn new(source: ZipSource<R>, dest: DestDir, config: ExtractConfig) -> Self {
        Self {
            source,
            resolver: PathResolver::new(dest),
            config,
            buffer: Box::new(CopyBuffer::new()),
        }
    }

    /// Extracts all entries in central-directory order.
    ///
    /// Consumes the extractor; the archive is closed when this returns, on
    /// success and on error.
    ///
    /// # Errors
    ///
    /// Returns the first error hit by any entry:
    /// - `ExtractionError::Decoding` for names invalid in the legacy encoding
    /// - `ExtractionError::PathTraversal` for names escaping the root
    /// - `ExtractionError::InvalidEntry` for unreadable entries
    /// - `ExtractionError::Io` for filesystem failures and corrupt content
    pub fn run(mut self, progress: &mut dyn ProgressCallback) -> Result<ExtractionReport> {
        let start = Instant::now();
        let mut report = ExtractionReport::new();

        let entries = self.source.entries()?;
        let total = entries.len();
        log::info!(
            "Extracting {} ({total} entries) into {}",
            self.source.path().display(),
            self.resolver.dest().as_path().display()
        );

        for (position, info) in entries.iter().enumerate() {
            let decoded = Pending::new(info).decode(self.config.encoding)?;
            let display = PathBuf::from(decoded.name());
            progress.on_entry_start(&display, total, position + 1);

            match self.materialize(&decoded, progress)? {
                Materialized::Directory(path) => {
                    log::debug!("{} -> {}", decoded.name(), path.display());
                    report.directories_created += 1;
                }
                Materialized::File { path, bytes } => {
                    log::debug!("{} -> {} ({bytes} bytes)", decoded.name(), path.display());
                    report.files_extracted += 1;
                    report.bytes_written += bytes;
                }
                Materialized::Skipped => {
                    log::warn!("Skipping entry #{} naming the destination root", info.index);
                    report.entries_skipped += 1;
                }
            }

            progress.on_entry_complete(&display);
        }

        report.duration = start.elapsed();
        progress.on_complete();
        log::info!(
            "Extracted {} files and {} directories ({} bytes) in {:?}",
            report.files_extracted,
            report.directories_created,
            report.bytes_written,
            report.duration
        );

        Ok(report)
    }

    /// Turns one decoded entry into a directory or a file.
    fn materialize(
        &mut self,
        decoded: &Decoded<'_>,
        progress: &mut dyn ProgressCallback,
    ) -> Result<Materialized> {
        let resolved = self.resolver.resolve(decoded.name())?;
        let info = decoded.info();

        match info.kind {
            EntryKind::Directory => {
                if resolved.is_root() {
                    return Ok(Materialized::Skipped);
                }
                self.resolver.create_dir(&resolved, decoded.name())?;
                if self.config.preserve_permissions {
                    apply_mode(resolved.absolute(), dir_mode(info.unix_mode))?;
                }
                Ok(Materialized::Directory(resolved.absolute().to_path_buf()))
            }
            // Symlink entries are written as plain files holding the target.
            EntryKind::File | EntryKind::Symlink => {
                if resolved.is_root() {
                    return Err(ExtractionError::PathTraversal {
                        name: decoded.name().to_string(),
                    });
                }
                let bytes = self.write_file(info, &resolved, progress)?;
                Ok(Materialized::File {
                    path: resolved.absolute().to_path_buf(),
                    bytes,
                })
            }
        }
    }

    fn write_file(
        &mut self,
        info: &EntryInfo,
        resolved: &ResolvedPath,
        progress: &mut dyn ProgressCallback,
    ) -> Result<u64> {
        let preserve = self.config.preserve_permissions;
        let mode = if preserve {
            file_mode(info.unix_mode)
        } else {
            PROCESS_DEFAULT_FILE_MODE
        };
        let path = resolved.absolute();

        // Open the entry first so an unreadable entry leaves no empty file.
        let mut reader = self.source.open_entry(info)?;
        let file = open_for_write(path, mode)?;
        let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
        let bytes = copy_with_progress(&mut reader, &mut writer, &mut self.buffer, progress)?;
        writer.flush()?;
        drop(writer);
        drop(reader);

        if preserve {
            apply_mode(path, mode)?;
        }

        Ok(bytes)
    }
}

/// Opens `path` write/create/truncate, creating it with `mode`.
///
/// A read-only file left by an earlier run is made owner-writable and
/// reopened once.
fn open_for_write(path: &Path, mode: u32) -> Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    match options.open(path) {
        Ok(file) => Ok(file),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied && path.is_file() => {
            reopen_writable(path, |p| options.open(p))
        }
        Err(e) => Err(open_error(path, &e)),
    }
}

/// Makes an existing file owner-writable and retries `open`.
///
/// The file's previous permissions are put back if the retry fails.
fn reopen_writable(path: &Path, open: impl FnOnce(&Path) -> io::Result<File>) -> Result<File> {
    let original = fs::metadata(path)?.permissions();
    apply_mode(path, 0o600)?;

    open(path).map_err(|e| {
        if let Err(restore) = fs::set_permissions(path, original) {
            log::warn!(
                "Failed to restore permissions of {}: {restore}",
                path.display()
            );
        }
        open_error(path, &e)
    })
}

fn open_error(path: &Path, e: &io::Error) -> ExtractionError {
    ExtractionError::Io(io::Error::new(
        e.kind(),
        format!("failed to create {}: {e}", path.display()),
    ))
}
