//! Archive listing without extraction.

use std::path::Path;
use std::path::PathBuf;

use crate::LegacyEncoding;
use crate::Result;
use crate::formats::EntryKind;
use crate::formats::ZipSource;
use crate::security::permissions::dir_mode;
use crate::security::permissions::file_mode;

/// One entry of an archive with its decoded name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Decoded entry name, as stored (not normalized).
    pub name: String,
    /// Entry kind.
    pub kind: EntryKind,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Compressed size in bytes.
    pub compressed_size: u64,
    /// Permission bits extraction would apply.
    pub mode: u32,
}

/// Decoded listing of an archive.
#[derive(Debug, Clone)]
pub struct ArchiveManifest {
    /// Path the archive was read from.
    pub archive: PathBuf,
    /// Encoding used for the names.
    pub encoding: LegacyEncoding,
    /// Entries in central-directory order.
    pub entries: Vec<ManifestEntry>,
    /// Sum of uncompressed entry sizes.
    pub total_size: u64,
}

impl ArchiveManifest {
    /// Number of entries.
    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.entries.len()
    }

    /// Number of directory entries.
    #[must_use]
    pub fn directories(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.kind == EntryKind::Directory)
            .count()
    }
}

/// Lists archive contents with names decoded in `encoding`.
///
/// No files are written and no entry content is decompressed.
///
/// # Errors
///
/// Returns `ExtractionError::NotAnArchive` for non-zip input,
/// `ExtractionError::Decoding` for the first name that is not valid in
/// `encoding`, and `ExtractionError::Io` if the file cannot be read.
///
/// # Examples
///
/// ```no_run
/// use sjunzip_core::LegacyEncoding;
/// use sjunzip_core::list_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let manifest = list_archive("sample.zip", LegacyEncoding::default())?;
/// for entry in &manifest.entries {
///     println!("{}: {} bytes", entry.name, entry.size);
/// }
/// # Ok(())
/// # }
/// ```
pub fn list_archive<P: AsRef<Path>>(
    archive_path: P,
    encoding: LegacyEncoding,
) -> Result<ArchiveManifest> {
    let archive_path = archive_path.as_ref();
    let mut source = ZipSource::open(archive_path)?;

    let entries = source
        .entries()?
        .into_iter()
        .map(|info| {
            let mode = match info.kind {
                EntryKind::Directory => dir_mode(info.unix_mode),
                EntryKind::File | EntryKind::Symlink => file_mode(info.unix_mode),
            };
            Ok(ManifestEntry {
                name: encoding.decode(&info.raw_name)?,
                kind: info.kind,
                size: info.size,
                compressed_size: info.compressed_size,
                mode,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let total_size = entries.iter().map(|e| e.size).sum();
    Ok(ArchiveManifest {
        archive: archive_path.to_path_buf(),
        encoding,
        entries,
        total_size,
    })
}
