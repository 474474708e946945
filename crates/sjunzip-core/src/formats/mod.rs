//! Archive container formats.

pub mod zip;

pub use zip::EntryInfo;
pub use zip::EntryKind;
pub use zip::ZipSource;
