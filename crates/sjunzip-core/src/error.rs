//! Error types for archive extraction operations.

use std::fmt::Write as _;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ExtractionError`.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Errors that can occur during archive extraction.
///
/// Every error aborts the extraction job that produced it. Nothing is retried
/// and no partial-success bookkeeping is kept, so an aborted job may leave a
/// partially populated destination tree behind.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// I/O operation failed (mkdir, open, copy, permission change).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input file is not a readable ZIP container.
    #[error("not a zip archive: {}: {reason}", path.display())]
    NotAnArchive {
        /// Path of the rejected file.
        path: PathBuf,
        /// What the container parser complained about.
        reason: String,
    },

    /// An entry name is not valid in the configured legacy encoding.
    #[error("cannot decode entry name {} as {encoding}", escape_bytes(raw_name))]
    Decoding {
        /// Raw name bytes as stored in the archive.
        raw_name: Vec<u8>,
        /// Name of the encoding that rejected the bytes.
        encoding: &'static str,
    },

    /// A decoded entry name would resolve outside the destination root.
    #[error("path traversal detected: {name}")]
    PathTraversal {
        /// The decoded entry name.
        name: String,
    },

    /// An entry's local header or compression method cannot be read.
    #[error("invalid entry #{index}: {reason}")]
    InvalidEntry {
        /// Position of the entry in the central directory.
        index: usize,
        /// Parser message.
        reason: String,
    },

    /// The requested legacy encoding label is not recognized.
    #[error("unknown encoding label: {label}")]
    UnknownEncoding {
        /// The label as given by the caller.
        label: String,
    },
}

impl ExtractionError {
    /// Returns `true` if this error was raised to keep writes inside the
    /// destination root.
    ///
    /// # Examples
    ///
    /// ```
    /// use sjunzip_core::ExtractionError;
    ///
    /// let err = ExtractionError::PathTraversal {
    ///     name: "../etc/passwd".into(),
    /// };
    /// assert!(err.is_security_violation());
    ///
    /// let err = ExtractionError::UnknownEncoding {
    ///     label: "klingon".into(),
    /// };
    /// assert!(!err.is_security_violation());
    /// ```
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(self, Self::PathTraversal { .. })
    }

    /// Returns the undecodable raw entry name, if this is a decoding error.
    #[must_use]
    pub fn raw_name(&self) -> Option<&[u8]> {
        match self {
            Self::Decoding { raw_name, .. } => Some(raw_name),
            _ => None,
        }
    }
}

/// Renders bytes as printable ASCII with `\xNN` escapes for everything else.
fn escape_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        if b.is_ascii_graphic() || b == b' ' {
            out.push(char::from(b));
        } else {
            let _ = write!(out, "\\x{b:02x}");
        }
    }
    out
}
