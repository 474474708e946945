//! Extraction of ZIP archives whose entry names use a legacy encoding.
//!
//! Archives produced by older Windows tools in Japan store entry names as raw
//! Shift_JIS bytes without the UTF-8 flag. `sjunzip-core` decodes those names
//! with a configurable legacy encoding, maps them onto a destination
//! directory through a mandatory path-traversal guard, and writes the
//! content with the stored permission bits.
//!
//! # Examples
//!
//! ```no_run
//! use sjunzip_core::ExtractConfig;
//! use sjunzip_core::extract_archive;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExtractConfig::default();
//! let report = extract_archive("sample.zip", "sample", &config)?;
//! println!("Extracted {} files", report.files_extracted);
//! # Ok(())
//! # }
//! ```
//!
//! Extracting every archive in a directory:
//!
//! ```no_run
//! use sjunzip_core::NoopProgress;
//! use sjunzip_core::batch::BatchOptions;
//! use sjunzip_core::batch::discover_archives;
//! use sjunzip_core::batch::extract_batch;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let candidates = discover_archives(Some(Path::new("downloads")))?;
//! let report = extract_batch(candidates, &BatchOptions::default(), &mut NoopProgress)?;
//! println!("{} archives extracted", report.succeeded());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod batch;
pub mod config;
pub mod copy;
pub mod encoding;
pub mod error;
pub mod extraction;
pub mod formats;
pub mod inspection;
pub mod report;
pub mod security;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod types;

pub use api::extract_archive;
pub use api::extract_archive_with_progress;
pub use config::ExtractConfig;
pub use encoding::LegacyEncoding;
pub use error::ExtractionError;
pub use error::Result;
pub use inspection::ArchiveManifest;
pub use inspection::ManifestEntry;
pub use inspection::list_archive;
pub use report::BatchReport;
pub use report::ExtractionReport;
pub use report::NoopProgress;
pub use report::ProgressCallback;

pub use types::DestDir;
pub use types::SafePath;
