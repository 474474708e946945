//! ZIP container reader that keeps entry names as raw bytes.
//!
//! The `zip` crate decodes names it does not recognise as UTF-8 with CP437.
//! Names here are taken from `name_raw()` instead and handed to the
//! configured legacy encoding later, so nothing is decoded twice.

use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::path::Path;
use std::path::PathBuf;

use zip::read::ZipFile;
use zip::result::ZipError;

use crate::ExtractionError;
use crate::Result;
use crate::security::permissions::S_IFDIR;
use crate::security::permissions::S_IFLNK;
use crate::security::permissions::S_IFMT;

/// What an entry materializes as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Unix symlink; its content is the link target.
    Symlink,
}

/// Metadata for one entry, in central-directory order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Position in the central directory.
    pub index: usize,
    /// Name exactly as stored, in the archive's legacy encoding.
    pub raw_name: Vec<u8>,
    /// Entry kind derived from the stored mode and the raw name.
    pub kind: EntryKind,
    /// Stored Unix mode, including file-type bits.
    pub unix_mode: Option<u32>,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Compressed size in bytes.
    pub compressed_size: u64,
}

impl EntryInfo {
    /// Returns `true` for directory entries.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// An open ZIP container.
///
/// Owns its reader; dropping the source closes the file.
pub struct ZipSource<R> {
    archive: zip::ZipArchive<R>,
    path: PathBuf,
}

impl ZipSource<BufReader<File>> {
    /// Opens the ZIP file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::Io` if the file cannot be opened and
    /// `ExtractionError::NotAnArchive` if it has no valid central directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::with_path(BufReader::new(file), path.to_path_buf())
    }
}

impl<R: Read + Seek> ZipSource<R> {
    /// Reads the central directory from any seekable reader.
    pub fn new(reader: R) -> Result<Self> {
        Self::with_path(reader, PathBuf::new())
    }

    fn with_path(reader: R, path: PathBuf) -> Result<Self> {
        let archive = zip::ZipArchive::new(reader).map_err(|e| match e {
            // A file too short to hold a central directory is not a zip.
            ZipError::Io(io) if io.kind() != std::io::ErrorKind::UnexpectedEof => {
                ExtractionError::Io(io)
            }
            other => ExtractionError::NotAnArchive {
                path: path.clone(),
                reason: other.to_string(),
            },
        })?;
        Ok(Self { archive, path })
    }

    /// Path the archive was opened from; empty for in-memory sources.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries in the central directory.
    #[must_use]
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    /// Returns `true` if the archive has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }

    /// Lists every entry without decompressing anything.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::InvalidEntry` if an entry's local header
    /// cannot be read.
    pub fn entries(&mut self) -> Result<Vec<EntryInfo>> {
        (0..self.archive.len())
            .map(|index| {
                let file = self
                    .archive
                    .by_index_raw(index)
                    .map_err(|e| invalid_entry(index, &e))?;

                let raw_name = file.name_raw().to_vec();
                let unix_mode = file.unix_mode();
                Ok(EntryInfo {
                    index,
                    kind: entry_kind(&raw_name, unix_mode),
                    raw_name,
                    unix_mode,
                    size: file.size(),
                    compressed_size: file.compressed_size(),
                })
            })
            .collect()
    }

    /// Opens a decompressing stream over one entry's content.
    ///
    /// The stream verifies the CRC when it reaches the end; a mismatch is an
    /// I/O error from `read`.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::InvalidEntry` for unsupported compression
    /// methods, encrypted entries and unreadable local headers.
    pub fn open_entry(&mut self, entry: &EntryInfo) -> Result<ZipFile<'_, R>> {
        self.archive
            .by_index(entry.index)
            .map_err(|e| invalid_entry(entry.index, &e))
    }
}

impl<R> std::fmt::Debug for ZipSource<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipSource")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Directory if the stored type says so or the raw name ends in `/`.
///
/// Only `/` counts: `\` is 0x5C, a valid Shift_JIS trail byte.
fn entry_kind(raw_name: &[u8], unix_mode: Option<u32>) -> EntryKind {
    let file_type = unix_mode.map(|mode| mode & S_IFMT);
    if file_type == Some(S_IFDIR) || raw_name.last() == Some(&b'/') {
        EntryKind::Directory
    } else if file_type == Some(S_IFLNK) {
        EntryKind::Symlink
    } else {
        EntryKind::File
    }
}

fn invalid_entry(index: usize, error: &ZipError) -> ExtractionError {
    ExtractionError::InvalidEntry {
        index,
        reason: error.to_string(),
    }
}
