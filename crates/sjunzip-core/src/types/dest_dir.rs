//! Validated destination root for archive extraction.

use crate::ExtractionError;
use crate::Result;
use crate::security::permissions::DEFAULT_DIR_MODE;
use std::fs::DirBuilder;
use std::path::Path;
use std::path::PathBuf;

/// The directory every extracted entry must end up under.
///
/// Once constructed, a `DestDir` is an existing, writable directory held as an
/// absolute canonical path, so resolved entry paths can be compared against it
/// with a plain prefix check.
///
/// # Examples
///
/// ```no_run
/// use sjunzip_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::create("/tmp/out")?;
/// println!("Extracting to: {}", dest.as_path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDir(PathBuf);

impl DestDir {
    /// Validates an existing directory.
    ///
    /// # Security Considerations
    ///
    /// There is a time-of-check-time-of-use window between the metadata
    /// checks and canonicalization. It is narrowed by resolving symlinks here
    /// and by refusing to walk through symlinks below the root during
    /// extraction.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::Io` if the path does not exist, is not a
    /// directory, cannot be canonicalized, or is not writable (Unix).
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Err(ExtractionError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("destination directory does not exist: {}", path.display()),
            )));
        }

        if !path.is_dir() {
            return Err(ExtractionError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("path is not a directory: {}", path.display()),
            )));
        }

        let canonical = path.canonicalize().map_err(|e| {
            ExtractionError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to canonicalize path {}: {}", path.display(), e),
            ))
        })?;

        #[cfg(unix)]
        check_writable(&canonical)?;

        Ok(Self(canonical))
    }

    /// Creates the directory (and its parents) if needed, then validates it.
    ///
    /// New directories get [`DEFAULT_DIR_MODE`] filtered through the umask.
    /// An existing directory is accepted as is.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(DEFAULT_DIR_MODE);
        }
        builder.create(&path).map_err(|e| {
            ExtractionError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to create {}: {}", path.display(), e),
            ))
        })?;
        Self::new(path)
    }

    /// Returns the canonical root as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Joins a validated relative path onto the root.
    #[inline]
    #[must_use]
    pub fn join(&self, safe_path: &super::SafePath) -> PathBuf {
        self.0.join(safe_path.as_path())
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

/// Checks effective write access with `access(2)`.
#[cfg(unix)]
fn check_writable(canonical: &Path) -> Result<()> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let path_cstring = CString::new(canonical.as_os_str().as_bytes()).map_err(|_| {
        ExtractionError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "path contains null byte",
        ))
    })?;

    // SAFETY: access() only reads the NUL-terminated string, which outlives
    // the call.
    #[allow(unsafe_code)]
    let result = unsafe { libc::access(path_cstring.as_ptr(), libc::W_OK) };

    if result != 0 {
        return Err(ExtractionError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            format!("directory is not writable: {}", canonical.display()),
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_dest_dir_valid() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::new(temp.path()).expect("dest should be valid");
        assert!(dest.as_path().is_absolute());
    }

    #[test]
    fn test_dest_dir_nonexistent() {
        let result = DestDir::new("/nonexistent/directory/that/does/not/exist");
        assert!(matches!(result, Err(ExtractionError::Io(_))));
    }

    #[test]
    fn test_dest_dir_not_a_directory() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let file_path = temp.path().join("file.txt");
        fs::write(&file_path, "test").expect("failed to write file");

        assert!(matches!(DestDir::new(&file_path), Err(ExtractionError::Io(_))));
        assert!(matches!(
            DestDir::create(&file_path),
            Err(ExtractionError::Io(_))
        ));
    }

    #[test]
    fn test_dest_dir_canonicalization() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let subdir = temp.path().join("subdir");
        fs::create_dir(&subdir).expect("failed to create subdir");

        let dest = DestDir::new(subdir.join(".").join("..")).expect("should create dest dir");
        assert_eq!(dest.as_path(), temp.path().canonicalize().unwrap());
    }

    #[test]
    fn test_dest_dir_create_nested() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let nested = temp.path().join("a").join("b").join("c");

        let dest = DestDir::create(&nested).expect("should create nested root");
        assert!(nested.is_dir());
        assert_eq!(dest.as_path(), nested.canonicalize().unwrap());

        // Existing directory is fine.
        let again = DestDir::create(&nested).expect("should accept existing root");
        assert_eq!(dest, again);
    }

    #[test]
    #[cfg(unix)]
    fn test_dest_dir_permissions_check() {
        use std::os::unix::fs::PermissionsExt;

        // root bypasses permission bits, so the check cannot fail there.
        // SAFETY: geteuid has no preconditions.
        #[allow(unsafe_code)]
        let euid = unsafe { libc::geteuid() };
        if euid == 0 {
            return;
        }

        let temp = TempDir::new().expect("failed to create temp dir");
        let readonly_dir = temp.path().join("readonly");
        fs::create_dir(&readonly_dir).expect("failed to create dir");
        fs::set_permissions(&readonly_dir, fs::Permissions::from_mode(0o555)).unwrap();

        let result = DestDir::new(&readonly_dir);

        fs::set_permissions(&readonly_dir, fs::Permissions::from_mode(0o755)).unwrap();
        assert!(result.is_err());
    }

    #[test]
    #[cfg(unix)]
    fn test_dest_dir_with_symlink() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().expect("failed to create temp dir");
        let real_dir = temp.path().join("real");
        fs::create_dir(&real_dir).expect("failed to create real dir");
        let link = temp.path().join("link");
        symlink(&real_dir, &link).expect("failed to create symlink");

        let dest = DestDir::new(&link).expect("should create from symlink");
        assert_eq!(dest.as_path(), real_dir.canonicalize().unwrap());
    }

    #[test]
    fn test_dest_dir_into_path_buf() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::new(temp.path()).expect("should create");
        let path = dest.clone().into_path_buf();
        assert_eq!(path, dest.as_path());
    }
}
