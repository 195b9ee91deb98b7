//! # rpideploy Filesystem I/O Operations
//!
//! File: cli/src/common/fs/io.rs
//!
//! ## Overview
//!
//! Small wrappers around `std::fs` used by the location store and the
//! artifact generator:
//! - **`ensure_dir_exists`**: creates a directory (and parents) if missing and
//!   rejects paths that exist but are not directories.
//! - **`read_file_to_string`**: `fs::read_to_string` with path context.
//! - **`write_string_to_file`**: replaces a file's content as a whole. The
//!   content goes to a sibling temporary file which is then renamed over the
//!   target, so readers see either the old file or the new one.
//! - **`write_files_together`**: the same for a group of files. Every file is
//!   staged before any is renamed, so a failed write changes nothing.
//!
//! ```rust
//! use crate::common::fs::io;
//!
//! io::write_string_to_file(Path::new(".github/workflows/deploy.yml"), &workflow)?;
//! let record = io::read_file_to_string(Path::new("rpi_config.json"))?;
//! ```
//!
use crate::core::error::{DeployError, Result};
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Ensures that a directory exists at the specified path.
///
/// # Errors
///
/// Returns an `Err` if the path exists but is not a directory, or if creating
/// the directory fails.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {:?}", path))?;
        info!("Created directory: {:?}", path);
    } else if !path.is_dir() {
        anyhow::bail!(DeployError::FileSystem(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    } else {
        debug!("Directory already exists: {:?}", path);
    }
    Ok(())
}

/// Reads the entire content of a file into a string.
pub fn read_file_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file {:?}", path))
}

/// Sibling path used while writing `path`.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".rpideploy-tmp");
    path.with_file_name(name)
}

/// Writes `content` to `path`, replacing any existing file.
///
/// The parent directory is created when missing.
///
/// # Errors
///
/// Returns an `Err` if the parent directory cannot be created, or if writing
/// or renaming the staged file fails.
pub fn write_string_to_file(path: &Path, content: &str) -> Result<()> {
    write_files_together(&[(path, content)])
}

fn stage(path: &Path, content: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir_exists(parent)?;
        }
    }
    let staged = staging_path(path);
    if let Err(e) = fs::write(&staged, content) {
        let _ = fs::remove_file(&staged);
        return Err(e).with_context(|| format!("Failed to write to file {:?}", staged));
    }
    Ok(staged)
}

fn discard(staged: &[PathBuf]) {
    for path in staged {
        let _ = fs::remove_file(path);
    }
}

/// Replaces every `(path, content)` pair as a group.
///
/// All files are written to staging siblings first. Only when every staged
/// write succeeded are they renamed into place, in the order given. On a
/// staging failure no target is touched and the staged files are removed.
///
/// # Errors
///
/// Returns an `Err` if a parent directory cannot be created, or if writing or
/// renaming any staged file fails.
pub fn write_files_together(files: &[(&Path, &str)]) -> Result<()> {
    let mut staged = Vec::with_capacity(files.len());
    for (path, content) in files {
        match stage(path, content) {
            Ok(staged_path) => staged.push(staged_path),
            Err(e) => {
                discard(&staged);
                return Err(e);
            }
        }
    }

    for (index, ((path, content), staged_path)) in files.iter().zip(&staged).enumerate() {
        if let Err(e) = fs::rename(staged_path, path) {
            discard(&staged[index..]);
            return Err(e).with_context(|| format!("Failed to replace file {:?}", path));
        }
        debug!("Wrote {} bytes to {:?}", content.len(), path);
    }
    Ok(())
}
