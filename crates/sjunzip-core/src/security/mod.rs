//! Keeping extracted content inside the destination root.
//!
//! The traversal guard in [`path`] is not optional: every entry name goes
//! through it before anything is written.

pub mod path;
pub mod permissions;

pub use path::PathResolver;
pub use path::ResolvedPath;
pub use path::resolve;
