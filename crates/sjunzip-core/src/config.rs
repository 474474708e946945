//! Extraction configuration.

use crate::LegacyEncoding;

/// Configuration for a single extraction job.
///
/// # Examples
///
/// ```
/// use sjunzip_core::ExtractConfig;
/// use sjunzip_core::LegacyEncoding;
///
/// // Shift_JIS names, stored permissions applied
/// let config = ExtractConfig::default();
///
/// // EUC-JP names, process default permissions
/// let custom = ExtractConfig::default()
///     .with_encoding(LegacyEncoding::from_label("euc-jp").unwrap())
///     .with_preserve_permissions(false);
/// assert!(!custom.preserve_permissions);
/// ```
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Encoding of the raw entry names stored in the archive.
    pub encoding: LegacyEncoding,

    /// Apply the mode bits stored in the archive to extracted entries.
    pub preserve_permissions: bool,
}

impl Default for ExtractConfig {
    /// Default values:
    /// - `encoding`: Shift_JIS
    /// - `preserve_permissions`: true
    fn default() -> Self {
        Self {
            encoding: LegacyEncoding::default(),
            preserve_permissions: true,
        }
    }
}

impl ExtractConfig {
    /// Sets the legacy encoding used for entry names.
    #[must_use]
    pub fn with_encoding(mut self, encoding: LegacyEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Enables or disables applying stored permission bits.
    #[must_use]
    pub fn with_preserve_permissions(mut self, preserve: bool) -> Self {
        self.preserve_permissions = preserve;
        self
    }
}
