//! Legacy text decoding for archive entry names.
//!
//! ZIP archives produced by older Japanese tools store entry names as raw
//! Shift_JIS bytes without setting the UTF-8 flag. [`LegacyEncoding`] turns
//! those bytes into UTF-8 text, refusing malformed input instead of inserting
//! replacement characters.

use std::fmt;

use encoding_rs::Encoding;

use crate::ExtractionError;
use crate::Result;

/// A fixed legacy character encoding used to decode entry names.
///
/// The default is Shift_JIS as defined by the WHATWG Encoding Standard, which
/// also covers the Windows-31J (CP932) extensions.
///
/// # Examples
///
/// ```
/// use sjunzip_core::LegacyEncoding;
///
/// let enc = LegacyEncoding::default();
/// assert_eq!(enc.decode(b"\x93\xfa\x96\x7b\x8c\xea.txt").unwrap(), "日本語.txt");
/// assert!(enc.decode(b"\x83").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LegacyEncoding(&'static Encoding);

impl LegacyEncoding {
    /// Shift_JIS, the default.
    #[must_use]
    pub fn shift_jis() -> Self {
        Self(encoding_rs::SHIFT_JIS)
    }

    /// Looks up an encoding by WHATWG label (`"shift_jis"`, `"ms932"`,
    /// `"euc-jp"`, `"euc-kr"`, `"gbk"`, ...).
    ///
    /// Labels are matched case-insensitively with surrounding whitespace
    /// ignored. Labels that map to the `replacement` pseudo-encoding are
    /// rejected because it cannot decode anything.
    pub fn from_label(label: &str) -> Result<Self> {
        match Encoding::for_label(label.as_bytes()) {
            Some(encoding) if encoding != encoding_rs::REPLACEMENT => Ok(Self(encoding)),
            _ => Err(ExtractionError::UnknownEncoding {
                label: label.to_string(),
            }),
        }
    }

    /// Canonical name of the encoding, e.g. `"Shift_JIS"`.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.0.name()
    }

    /// Decodes `raw` into UTF-8 text.
    ///
    /// No byte order mark is sniffed and no replacement characters are
    /// produced.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::Decoding`] carrying a copy of `raw` when the
    /// input contains an invalid or truncated multi-byte sequence.
    pub fn decode(self, raw: &[u8]) -> Result<String> {
        self.0
            .decode_without_bom_handling_and_without_replacement(raw)
            .map(std::borrow::Cow::into_owned)
            .ok_or_else(|| ExtractionError::Decoding {
                raw_name: raw.to_vec(),
                encoding: self.name(),
            })
    }

    /// Encodes UTF-8 text into this encoding, returning `None` when some
    /// character has no representation.
    ///
    /// Used to build archives with legacy names; extraction never encodes.
    #[must_use]
    pub fn encode(self, text: &str) -> Option<Vec<u8>> {
        let (bytes, _, had_errors) = self.0.encode(text);
        (!had_errors).then(|| bytes.into_owned())
    }
}

impl Default for LegacyEncoding {
    fn default() -> Self {
        Self::shift_jis()
    }
}

impl fmt::Debug for LegacyEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LegacyEncoding").field(&self.name()).finish()
    }
}

impl fmt::Display for LegacyEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_katakana_path() {
        let raw = [
            0x83, 0x74, 0x83, 0x48, 0x83, 0x8b, 0x83, 0x5f, b'/', 0x83, 0x74, 0x83, 0x40, 0x83,
            0x43, 0x83, 0x8b, b'.', b't', b'x', b't',
        ];
        let decoded = LegacyEncoding::default().decode(&raw).unwrap();
        assert_eq!(decoded, "フォルダ/ファイル.txt");
    }

    #[test]
    fn test_decode_backslash_trail_byte() {
        // 'ソ' and '表' both end with 0x5c, which must not become a backslash.
        let decoded = LegacyEncoding::default()
            .decode(&[0x83, 0x5c, 0x95, 0x5c])
            .unwrap();
        assert_eq!(decoded, "ソ表");
        assert!(!decoded.contains('\\'));
    }

    #[test]
    fn test_decode_ascii_passthrough() {
        let decoded = LegacyEncoding::default().decode(b"docs/readme.md").unwrap();
        assert_eq!(decoded, "docs/readme.md");
    }

    #[test]
    fn test_decode_halfwidth_katakana() {
        // 0xb1 is halfwidth 'ｱ' in Shift_JIS.
        let decoded = LegacyEncoding::default().decode(&[0xb1]).unwrap();
        assert_eq!(decoded, "ｱ");
    }

    #[test]
    fn test_decode_truncated_lead_byte() {
        let err = LegacyEncoding::default().decode(b"abc\x83").unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Decoding {
                encoding: "Shift_JIS",
                ..
            }
        ));
        assert_eq!(err.raw_name(), Some(&b"abc\x83"[..]));
    }

    #[test]
    fn test_decode_invalid_trail_byte() {
        assert!(LegacyEncoding::default().decode(&[0x83, 0x20]).is_err());
        assert!(LegacyEncoding::default().decode(&[0xff]).is_err());
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(LegacyEncoding::default().decode(b"").unwrap(), "");
    }

    #[test]
    fn test_from_label_aliases() {
        for label in ["shift_jis", "Shift_JIS", "sjis", "ms932", "windows-31j", " ms_kanji "] {
            let enc = LegacyEncoding::from_label(label).unwrap();
            assert_eq!(enc, LegacyEncoding::shift_jis(), "label {label}");
        }
    }

    #[test]
    fn test_from_label_alternate_charset() {
        let enc = LegacyEncoding::from_label("euc-kr").unwrap();
        assert_eq!(enc.name(), "EUC-KR");
        assert_eq!(enc.decode(&[0xbf, 0xee, 0xbf, 0xb5]).unwrap(), "운영");
    }

    #[test]
    fn test_from_label_rejects_unknown_and_replacement() {
        assert!(matches!(
            LegacyEncoding::from_label("klingon"),
            Err(ExtractionError::UnknownEncoding { .. })
        ));
        assert!(LegacyEncoding::from_label("iso-2022-kr").is_err());
    }

    #[test]
    fn test_encode_roundtrip_and_unmappable() {
        let enc = LegacyEncoding::default();
        let bytes = enc.encode("日本語").unwrap();
        assert_eq!(bytes, vec![0x93, 0xfa, 0x96, 0x7b, 0x8c, 0xea]);
        assert!(enc.encode("😀").is_none());
    }

    #[test]
    fn test_display_and_debug() {
        let enc = LegacyEncoding::default();
        assert_eq!(enc.to_string(), "Shift_JIS");
        assert_eq!(format!("{enc:?}"), "LegacyEncoding(\"Shift_JIS\")");
    }
}
