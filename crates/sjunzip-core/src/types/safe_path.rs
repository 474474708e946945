//! Validated relative path built from a decoded entry name.

use crate::ExtractionError;
use crate::Result;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// A relative path that cannot leave the directory it is joined onto.
///
/// `SafePath` is built segment by segment from a decoded entry name:
/// - `/` and `\` both separate segments (names are already decoded, so a
///   backslash here is a real backslash, not a Shift_JIS trail byte)
/// - empty and `.` segments are dropped, so leading slashes are harmless
/// - `..` removes the previous segment, and is rejected when there is none
///   left, since it would climb above the root
/// - NUL bytes and anything the host platform reads as a root, drive or
///   prefix are rejected
///
/// There is no `From<PathBuf>` implementation; validation is the only way
/// in.
///
/// # Examples
///
/// ```
/// use sjunzip_core::types::SafePath;
/// use std::path::Path;
///
/// let safe = SafePath::from_entry_name("フォルダ/./ファイル.txt").unwrap();
/// assert_eq!(safe.as_path(), Path::new("フォルダ/ファイル.txt"));
///
/// let safe = SafePath::from_entry_name("docs/../readme.txt").unwrap();
/// assert_eq!(safe.as_path(), Path::new("readme.txt"));
///
/// assert!(SafePath::from_entry_name("../etc/passwd").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafePath(PathBuf);

impl SafePath {
    /// Validates a decoded entry name and builds the relative path.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::PathTraversal` naming the full entry if a
    /// `..` would climb above the destination root or a segment is not a
    /// plain name.
    pub fn from_entry_name(name: &str) -> Result<Self> {
        let mut normalized = PathBuf::new();

        for segment in name.split(['/', '\\']) {
            match segment {
                "" | "." => {}
                ".." => {
                    if !normalized.pop() {
                        return Err(traversal(name));
                    }
                }
                _ if segment.contains('\0') => return Err(traversal(name)),
                _ => {
                    // The host decides what a single segment means: on
                    // Windows "C:" is a prefix, not a directory name.
                    let mut components = Path::new(segment).components();
                    match (components.next(), components.next()) {
                        (Some(Component::Normal(part)), None) => normalized.push(part),
                        _ => return Err(traversal(name)),
                    }
                }
            }
        }

        Ok(Self(normalized))
    }

    /// Returns `true` if the name normalized to the destination root itself.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.as_os_str().is_empty()
    }

    /// Number of segments in the path.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.components().count()
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

fn traversal(name: &str) -> ExtractionError {
    ExtractionError::PathTraversal {
        name: name.to_string(),
    }
}
