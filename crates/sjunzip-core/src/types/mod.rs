//! Type-safe wrappers for the destination side of extraction.
//!
//! Both types validate on construction and cannot be built from raw paths
//! any other way, so code holding a `DestDir` and a `SafePath` can join them
//! without re-checking.

pub mod dest_dir;
pub mod safe_path;

pub use dest_dir::DestDir;
pub use safe_path::SafePath;
