//! Path resolution from decoded entry names to destination paths.

use std::collections::HashSet;
use std::fs;
use std::fs::DirBuilder;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use crate::ExtractionError;
use crate::Result;
use crate::security::permissions::DEFAULT_DIR_MODE;
use crate::types::DestDir;
use crate::types::SafePath;

/// A destination path whose parent directories exist inside the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    relative: SafePath,
    absolute: PathBuf,
}

impl ResolvedPath {
    /// Path relative to the destination root.
    #[must_use]
    pub fn relative(&self) -> &SafePath {
        &self.relative
    }

    /// Absolute path under the canonical destination root.
    #[must_use]
    pub fn absolute(&self) -> &Path {
        &self.absolute
    }

    /// Returns `true` if the entry name resolved to the root itself.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.relative.is_root()
    }
}

/// Resolves entry names against one destination root.
///
/// Parent directories are created one component at a time with
/// `lstat`-style checks, so a symlink planted inside the destination is
/// never followed. Directories already verified are remembered to avoid
/// repeated syscalls for entries sharing a parent.
#[derive(Debug)]
pub struct PathResolver {
    dest: DestDir,
    known_dirs: HashSet<PathBuf>,
}

impl PathResolver {
    /// Creates a resolver rooted at `dest`.
    #[must_use]
    pub fn new(dest: DestDir) -> Self {
        Self {
            dest,
            known_dirs: HashSet::new(),
        }
    }

    /// The destination root.
    #[must_use]
    pub fn dest(&self) -> &DestDir {
        &self.dest
    }

    /// Validates `decoded_name`, makes sure its parent directories exist and
    /// returns the absolute target path.
    ///
    /// # Errors
    ///
    /// - `ExtractionError::PathTraversal` if the name escapes the root, if a
    ///   path component on disk is a symlink, or if the target itself is a
    ///   symlink
    /// - `ExtractionError::Io` if a parent directory cannot be created or a
    ///   component exists as a non-directory
    pub fn resolve(&mut self, decoded_name: &str) -> Result<ResolvedPath> {
        let relative = SafePath::from_entry_name(decoded_name)?;
        let absolute = self.dest.join(&relative);

        if relative.is_root() {
            return Ok(ResolvedPath { relative, absolute });
        }

        if let Some(parent) = relative.as_path().parent() {
            self.ensure_dirs(parent, decoded_name)?;
        }

        match fs::symlink_metadata(&absolute) {
            Ok(meta) if meta.file_type().is_symlink() => {
                return Err(traversal(decoded_name));
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(ExtractionError::Io(e)),
        }

        Ok(ResolvedPath { relative, absolute })
    }

    /// Creates the directory an entry resolved to, with the same checks as
    /// its parents.
    pub fn create_dir(&mut self, resolved: &ResolvedPath, name: &str) -> Result<()> {
        self.ensure_dirs(resolved.relative().as_path(), name)
    }

    /// Walks `relative` below the root, creating missing directories.
    fn ensure_dirs(&mut self, relative: &Path, name: &str) -> Result<()> {
        let mut current = self.dest.as_path().to_path_buf();

        for component in relative.components() {
            current.push(component);
            if self.known_dirs.contains(&current) {
                continue;
            }

            match fs::symlink_metadata(&current) {
                Ok(meta) if meta.file_type().is_symlink() => return Err(traversal(name)),
                Ok(meta) if meta.is_dir() => {}
                Ok(_) => return Err(not_a_directory(&current)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => create_one_dir(&current)?,
                Err(e) => return Err(ExtractionError::Io(e)),
            }

            self.known_dirs.insert(current.clone());
        }

        Ok(())
    }
}

/// Resolves one decoded name against `dest`, creating parent directories.
///
/// Convenience wrapper around [`PathResolver`] for callers resolving a
/// single name.
///
/// # Examples
///
/// ```no_run
/// use sjunzip_core::security::resolve;
/// use sjunzip_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::create("/tmp/out")?;
///
/// let resolved = resolve(&dest, "フォルダ/ファイル.txt")?;
/// assert!(resolved.absolute().parent().unwrap().is_dir());
///
/// assert!(resolve(&dest, "../etc/passwd").is_err());
/// # Ok(())
/// # }
/// ```
pub fn resolve(dest: &DestDir, decoded_name: &str) -> Result<ResolvedPath> {
    PathResolver::new(dest.clone()).resolve(decoded_name)
}

fn create_one_dir(path: &Path) -> Result<()> {
    let mut builder = DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DEFAULT_DIR_MODE);
    }

    match builder.create(path) {
        Ok(()) => Ok(()),
        // Lost a race with another writer; fine as long as it is a directory.
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(ExtractionError::Io(io::Error::new(
            e.kind(),
            format!("failed to create directory {}: {e}", path.display()),
        ))),
    }
}

fn traversal(name: &str) -> ExtractionError {
    ExtractionError::PathTraversal {
        name: name.to_string(),
    }
}

fn not_a_directory(path: &Path) -> ExtractionError {
    ExtractionError::Io(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("exists and is not a directory: {}", path.display()),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_dest() -> (TempDir, DestDir) {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::new(temp.path()).expect("failed to create dest");
        (temp, dest)
    }

    #[test]
    fn test_resolve_creates_parents() {
        let (_temp, dest) = create_test_dest();
        let resolved = resolve(&dest, "フォルダ/サブ/ファイル.txt").unwrap();

        assert_eq!(
            resolved.absolute(),
            dest.as_path().join("フォルダ").join("サブ").join("ファイル.txt")
        );
        assert!(dest.as_path().join("フォルダ/サブ").is_dir());
        assert!(!resolved.absolute().exists(), "target itself is not created");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let (_temp, dest) = create_test_dest();
        let mut resolver = PathResolver::new(dest.clone());
        let first = resolver.resolve("a/b/c.txt").unwrap();
        let second = resolver.resolve("a/b/c.txt").unwrap();
        assert_eq!(first, second);

        // A fresh resolver sees the directories on disk and accepts them.
        let third = resolve(&dest, "a/b/c.txt").unwrap();
        assert_eq!(first, third);
    }

    #[test]
    fn test_resolve_traversal_writes_nothing() {
        let (temp, dest) = create_test_dest();
        let result = resolve(&dest, "new_dir/../../escape.txt");
        assert!(matches!(result, Err(ExtractionError::PathTraversal { .. })));
        assert!(!dest.as_path().join("new_dir").exists());
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_resolve_inner_parent_segment() {
        let (_temp, dest) = create_test_dest();
        let resolved = resolve(&dest, "a/../b.txt").unwrap();
        assert_eq!(resolved.relative().as_path(), Path::new("b.txt"));
        assert_eq!(resolved.absolute(), dest.as_path().join("b.txt"));
        assert!(!dest.as_path().join("a").exists());
    }

    #[test]
    fn test_resolve_root_name() {
        let (_temp, dest) = create_test_dest();
        let resolved = resolve(&dest, "./").unwrap();
        assert!(resolved.is_root());
        assert_eq!(resolved.absolute(), dest.as_path());
    }

    #[test]
    fn test_resolve_parent_is_file() {
        let (_temp, dest) = create_test_dest();
        fs::write(dest.as_path().join("occupied"), "x").unwrap();
        let result = resolve(&dest, "occupied/file.txt");
        assert!(matches!(result, Err(ExtractionError::Io(_))));
    }

    #[test]
    fn test_create_dir_entry() {
        let (_temp, dest) = create_test_dest();
        let mut resolver = PathResolver::new(dest.clone());
        let resolved = resolver.resolve("empty_dir/").unwrap();
        resolver.create_dir(&resolved, "empty_dir/").unwrap();
        assert!(dest.as_path().join("empty_dir").is_dir());
    }

    #[test]
    #[cfg(unix)]
    fn test_resolve_rejects_symlinked_parent() {
        use std::os::unix::fs::symlink;

        let (_temp, dest) = create_test_dest();
        let outside = TempDir::new().unwrap();
        symlink(outside.path(), dest.as_path().join("link")).unwrap();

        let result = resolve(&dest, "link/sub/evil.txt");
        assert!(matches!(result, Err(ExtractionError::PathTraversal { .. })));
        assert!(!outside.path().join("sub").exists());
    }

    #[test]
    #[cfg(unix)]
    fn test_resolve_rejects_symlinked_target() {
        use std::os::unix::fs::symlink;

        let (_temp, dest) = create_test_dest();
        let outside = TempDir::new().unwrap();
        let victim = outside.path().join("victim.txt");
        fs::write(&victim, "original").unwrap();
        symlink(&victim, dest.as_path().join("file.txt")).unwrap();

        let result = resolve(&dest, "file.txt");
        assert!(matches!(result, Err(ExtractionError::PathTraversal { .. })));
        assert_eq!(fs::read_to_string(&victim).unwrap(), "original");
    }

    #[test]
    #[cfg(unix)]
    fn test_intermediate_dirs_get_default_mode() {
        use std::os::unix::fs::PermissionsExt;

        let (_temp, dest) = create_test_dest();
        resolve(&dest, "x/y.txt").unwrap();
        let mode = fs::metadata(dest.as_path().join("x"))
            .unwrap()
            .permissions()
            .mode();
        // umask can only remove bits from the default.
        assert_eq!(mode & 0o777 & !DEFAULT_DIR_MODE, 0);
        assert_eq!(mode & 0o700, 0o700);
    }
}
