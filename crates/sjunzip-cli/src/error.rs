//! Error conversion utilities for CLI.
//!
//! Converts sjunzip-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use sjunzip_core::ExtractionError;
use std::fmt;
use std::path::Path;

/// Converts `ExtractionError` to user-friendly anyhow error with context
pub fn convert_extraction_error(err: ExtractionError, archive: &Path) -> anyhow::Error {
    match err {
        ExtractionError::PathTraversal { name } => {
            anyhow!(
                "Security violation: Archive '{}' contains an entry escaping the destination: '{}'\n\
                 HINT: This archive may be malicious. Do not extract from untrusted sources.",
                archive.display(),
                name
            )
        }
        err @ ExtractionError::Decoding { .. } => {
            anyhow!(
                "Failed to read '{}': {}\n\
                 HINT: Use --encoding to pick the archive's legacy encoding (e.g. euc-jp, gbk, euc-kr).",
                archive.display(),
                err
            )
        }
        ExtractionError::NotAnArchive { reason, .. } => {
            anyhow!(
                "Not a ZIP archive: '{}' ({})\n\
                 HINT: The file may be corrupted or have a misleading extension.",
                archive.display(),
                reason
            )
        }
        ExtractionError::InvalidEntry { index, reason } => {
            anyhow!(
                "Invalid entry #{} in '{}': {}\n\
                 HINT: The archive may be corrupted or use an unsupported compression method.",
                index,
                archive.display(),
                reason
            )
        }
        ExtractionError::Io(io_err) => {
            anyhow!(
                "I/O error while processing '{}': {}",
                archive.display(),
                io_err
            )
        }
        ExtractionError::UnknownEncoding { label } => {
            anyhow!(
                "Unknown encoding label '{label}'\n\
                 HINT: Use a WHATWG label such as shift_jis, euc-jp, euc-kr or gbk."
            )
        }
    }
}

/// Adds context to a generic error about archive operations
pub fn add_archive_context<T>(
    result: Result<T, ExtractionError>,
    archive: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_extraction_error(e, archive))
}

/// Some archives failed under `--keep-going`.
///
/// The failures were already reported with the batch result, so `main` does
/// not print this error a second time in JSON mode.
#[derive(Debug)]
pub struct BatchFailed {
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for BatchFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} archives failed to extract", self.failed, self.total)
    }
}

impl std::error::Error for BatchFailed {}
