//! # rpideploy Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//!
//! Filesystem helpers shared by the location store and the artifact
//! generator. Import the submodule directly:
//!
//! ```rust
//! use crate::common::fs::io;
//! io::write_string_to_file(path, content)?;
//! ```
//!

/// Basic file I/O (`ensure_dir_exists`, `read_file_to_string`, `write_string_to_file`,
/// `write_files_together`).
pub mod io;
