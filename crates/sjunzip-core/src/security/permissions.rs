//! Permission policy for extracted entries.
//!
//! Stored ZIP modes carry file-type bits and occasionally setuid, setgid or
//! sticky bits. Only the nine permission bits ever reach the filesystem.

use std::io;
use std::path::Path;

/// Mode for directories without a usable stored mode, and for intermediate
/// directories created on the way to an entry.
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// Mode for files without a usable stored mode.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

const PERMISSION_BITS: u32 = 0o777;
const OWNER_RWX: u32 = 0o700;

/// Unix file-type mask and the directory type.
pub(crate) const S_IFMT: u32 = 0o170_000;
pub(crate) const S_IFDIR: u32 = 0o040_000;
pub(crate) const S_IFLNK: u32 = 0o120_000;

/// Computes the on-disk mode for a regular file entry.
///
/// # Examples
///
/// ```
/// use sjunzip_core::security::permissions::file_mode;
///
/// assert_eq!(file_mode(Some(0o100_644)), 0o644);
/// assert_eq!(file_mode(Some(0o104_755)), 0o755); // setuid dropped
/// assert_eq!(file_mode(None), 0o644);
/// ```
#[must_use]
pub fn file_mode(stored: Option<u32>) -> u32 {
    match stored.map(|mode| mode & PERMISSION_BITS) {
        Some(0) | None => DEFAULT_FILE_MODE,
        Some(mode) => mode,
    }
}

/// Computes the on-disk mode for a directory entry.
///
/// The owner always keeps `rwx` so the entries that follow can be written
/// into the directory.
///
/// # Examples
///
/// ```
/// use sjunzip_core::security::permissions::dir_mode;
///
/// assert_eq!(dir_mode(Some(0o040_750)), 0o750);
/// assert_eq!(dir_mode(Some(0o040_555)), 0o755);
/// assert_eq!(dir_mode(Some(0)), 0o755);
/// ```
#[must_use]
pub fn dir_mode(stored: Option<u32>) -> u32 {
    match stored.map(|mode| mode & PERMISSION_BITS) {
        Some(0) | None => DEFAULT_DIR_MODE,
        Some(mode) => mode | OWNER_RWX,
    }
}

/// Sets the permission bits of `path` exactly to `mode`, ignoring the umask.
///
/// A no-op on platforms without Unix permissions.
pub fn apply_mode(path: &Path, mode: u32) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
    }

    #[cfg(not(unix))]
    {
        let _ = (path, mode);
        Ok(())
    }
}
