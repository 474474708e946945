//! Byte-exact ZIP builder for tests.
//!
//! Archive writers in the ecosystem store names as UTF-8 and set the
//! language-encoding flag. Archives from legacy Windows tools store raw
//! Shift_JIS bytes with no flag, which is what this builder produces.
//! Entries are stored unless added through one of the `deflated` methods.
//!
//! # Panics
//!
//! Functions in this module panic on I/O errors and on names the chosen
//! encoding cannot represent, since they are meant for tests only.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use std::io::Write;
use std::path::Path;

use flate2::Compression;
use flate2::write::DeflateEncoder;

use crate::encoding::LegacyEncoding;

const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4b50;
const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4b50;
const END_OF_CENTRAL_DIR_SIGNATURE: u32 = 0x0605_4b50;

const VERSION_NEEDED: u16 = 20;
const HOST_UNIX: u16 = 3;
const METHOD_STORED: u16 = 0;
const METHOD_DEFLATED: u16 = 8;
// 1980-01-01, the earliest DOS date.
const DOS_DATE: u16 = 0x0021;
const DOS_DIRECTORY_ATTR: u32 = 0x10;

const S_IFREG: u32 = 0o100_000;
const S_IFDIR: u32 = 0o040_000;
const S_IFMT: u32 = 0o170_000;

struct Entry {
    name: Vec<u8>,
    data: Vec<u8>,
    // Bytes written after the local header when they differ from `data`.
    compressed: Option<Vec<u8>>,
    mode: u32,
    method: u16,
    bad_crc: bool,
}

/// Builds ZIP archives whose entry names are raw legacy-encoded bytes.
///
/// # Examples
///
/// ```
/// use sjunzip_core::test_utils::LegacyZipBuilder;
///
/// let zip_data = LegacyZipBuilder::new()
///     .add_file("フォルダ/ファイル.txt", b"hello", 0o644)
///     .add_dir("empty_dir/", 0o755)
///     .build();
/// assert!(!zip_data.is_empty());
/// ```
pub struct LegacyZipBuilder {
    encoding: LegacyEncoding,
    unix_host: bool,
    entries: Vec<Entry>,
}

impl LegacyZipBuilder {
    /// Creates a builder that encodes `&str` names as Shift_JIS.
    #[must_use]
    pub fn new() -> Self {
        Self {
            encoding: LegacyEncoding::shift_jis(),
            unix_host: true,
            entries: Vec::new(),
        }
    }

    /// Encodes subsequent `&str` names with `encoding`.
    #[must_use]
    pub fn with_encoding(mut self, encoding: LegacyEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Marks the archive as written on a DOS/Windows host.
    ///
    /// File entries then carry no Unix mode; directories carry only the DOS
    /// directory attribute.
    #[must_use]
    pub fn dos(mut self) -> Self {
        self.unix_host = false;
        self
    }

    /// Adds a file whose name is encoded with the builder's encoding.
    #[must_use]
    pub fn add_file(self, name: &str, data: &[u8], mode: u32) -> Self {
        let raw = self.encode(name);
        self.add_file_raw(&raw, data, mode)
    }

    /// Adds a directory whose name is encoded with the builder's encoding.
    ///
    /// The name should end with `/`.
    #[must_use]
    pub fn add_dir(self, name: &str, mode: u32) -> Self {
        let raw = self.encode(name);
        self.add_dir_raw(&raw, mode)
    }

    /// Adds a file with a raw name and permission bits.
    #[must_use]
    pub fn add_file_raw(self, name: &[u8], data: &[u8], mode: u32) -> Self {
        self.add_entry_raw(name, data, S_IFREG | mode)
    }

    /// Adds a directory with a raw name and permission bits.
    #[must_use]
    pub fn add_dir_raw(self, name: &[u8], mode: u32) -> Self {
        self.add_entry_raw(name, b"", S_IFDIR | mode)
    }

    /// Adds an entry with a full Unix mode, file-type bits included.
    #[must_use]
    pub fn add_entry_raw(mut self, name: &[u8], data: &[u8], mode: u32) -> Self {
        self.entries.push(Entry {
            name: name.to_vec(),
            data: data.to_vec(),
            compressed: None,
            mode,
            method: METHOD_STORED,
            bad_crc: false,
        });
        self
    }

    /// Adds a Deflate-compressed file whose name is encoded with the
    /// builder's encoding.
    #[must_use]
    pub fn add_file_deflated(self, name: &str, data: &[u8], mode: u32) -> Self {
        let raw = self.encode(name);
        self.add_file_deflated_raw(&raw, data, mode)
    }

    /// Adds a Deflate-compressed file with a raw name and permission bits.
    #[must_use]
    pub fn add_file_deflated_raw(mut self, name: &[u8], data: &[u8], mode: u32) -> Self {
        self.entries.push(Entry {
            name: name.to_vec(),
            data: data.to_vec(),
            compressed: Some(deflate(data)),
            mode: S_IFREG | mode,
            method: METHOD_DEFLATED,
            bad_crc: false,
        });
        self
    }

    /// Adds a Deflate-compressed file whose stored CRC does not match its
    /// content.
    #[must_use]
    pub fn add_file_deflated_with_bad_crc(mut self, name: &[u8], data: &[u8]) -> Self {
        self.entries.push(Entry {
            name: name.to_vec(),
            data: data.to_vec(),
            compressed: Some(deflate(data)),
            mode: S_IFREG | 0o644,
            method: METHOD_DEFLATED,
            bad_crc: true,
        });
        self
    }

    /// Adds a file that claims compression `method` but holds `data` as is.
    #[must_use]
    pub fn add_file_with_method(mut self, name: &[u8], data: &[u8], method: u16) -> Self {
        self.entries.push(Entry {
            name: name.to_vec(),
            data: data.to_vec(),
            compressed: None,
            mode: S_IFREG | 0o644,
            method,
            bad_crc: false,
        });
        self
    }

    /// Adds a file whose stored CRC does not match its content.
    #[must_use]
    pub fn add_file_with_bad_crc(mut self, name: &[u8], data: &[u8]) -> Self {
        self.entries.push(Entry {
            name: name.to_vec(),
            data: data.to_vec(),
            compressed: None,
            mode: S_IFREG | 0o644,
            method: METHOD_STORED,
            bad_crc: true,
        });
        self
    }

    /// Serializes the archive.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut central = Vec::new();

        for entry in &self.entries {
            let offset = u32::try_from(out.len()).expect("archive too large for test builder");
            let mut crc = crc32fast::hash(&entry.data);
            if entry.bad_crc {
                crc ^= 0xFFFF_FFFF;
            }
            let payload = entry.compressed.as_deref().unwrap_or(&entry.data);
            let size = u32::try_from(entry.data.len()).expect("entry too large");
            let compressed_size = u32::try_from(payload.len()).expect("entry too large");
            let name_len = u16::try_from(entry.name.len()).expect("name too long");

            put_u32(&mut out, LOCAL_HEADER_SIGNATURE);
            put_u16(&mut out, VERSION_NEEDED);
            put_u16(&mut out, 0);
            put_u16(&mut out, entry.method);
            put_u16(&mut out, 0);
            put_u16(&mut out, DOS_DATE);
            put_u32(&mut out, crc);
            put_u32(&mut out, compressed_size);
            put_u32(&mut out, size);
            put_u16(&mut out, name_len);
            put_u16(&mut out, 0);
            out.extend_from_slice(&entry.name);
            out.extend_from_slice(payload);

            let (made_by, external) = self.host_attributes(entry.mode);
            put_u32(&mut central, CENTRAL_HEADER_SIGNATURE);
            put_u16(&mut central, made_by);
            put_u16(&mut central, VERSION_NEEDED);
            put_u16(&mut central, 0);
            put_u16(&mut central, entry.method);
            put_u16(&mut central, 0);
            put_u16(&mut central, DOS_DATE);
            put_u32(&mut central, crc);
            put_u32(&mut central, compressed_size);
            put_u32(&mut central, size);
            put_u16(&mut central, name_len);
            put_u16(&mut central, 0);
            put_u16(&mut central, 0);
            put_u16(&mut central, 0);
            put_u16(&mut central, 0);
            put_u32(&mut central, external);
            put_u32(&mut central, offset);
            central.extend_from_slice(&entry.name);
        }

        let count = u16::try_from(self.entries.len()).expect("too many entries");
        let central_offset = u32::try_from(out.len()).expect("archive too large");
        let central_size = u32::try_from(central.len()).expect("central directory too large");
        out.extend_from_slice(&central);

        put_u32(&mut out, END_OF_CENTRAL_DIR_SIGNATURE);
        put_u16(&mut out, 0);
        put_u16(&mut out, 0);
        put_u16(&mut out, count);
        put_u16(&mut out, count);
        put_u32(&mut out, central_size);
        put_u32(&mut out, central_offset);
        put_u16(&mut out, 0);

        out
    }

    /// Serializes the archive into a file.
    pub fn write_to(self, path: impl AsRef<Path>) {
        std::fs::write(path, self.build()).unwrap();
    }

    fn encode(&self, name: &str) -> Vec<u8> {
        self.encoding
            .encode(name)
            .unwrap_or_else(|| panic!("{name:?} is not representable in {}", self.encoding))
    }

    fn host_attributes(&self, mode: u32) -> (u16, u32) {
        if self.unix_host {
            ((HOST_UNIX << 8) | VERSION_NEEDED, mode << 16)
        } else if mode & S_IFMT == S_IFDIR {
            (VERSION_NEEDED, DOS_DIRECTORY_ATTR)
        } else {
            (VERSION_NEEDED, 0)
        }
    }
}

impl Default for LegacyZipBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}
