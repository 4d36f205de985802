//! # packrs Path Normalization
//!
//! File: cli/src/common/fs/paths.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/packrs
//!
//! User-supplied paths are `~`-expanded and made absolute against the process
//! current directory before anything else sees them. The archiving tool later
//! runs from a different working directory, so relative paths would silently
//! point somewhere else.
//!
use crate::core::error::Result;
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Expands a leading `~` and makes the result absolute. Does not touch the
/// filesystem and does not resolve symlinks.
pub fn normalize_path(raw: &Path) -> Result<PathBuf> {
    let expanded = PathBuf::from(shellexpand::tilde(&raw.to_string_lossy()).into_owned());
    std::path::absolute(&expanded)
        .with_context(|| format!("Failed to make '{}' absolute", expanded.display()))
}

/// `path` relative to `base` when it lies inside it (`.` when equal),
/// otherwise `path` unchanged.
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    match path.strip_prefix(base) {
        Ok(rel) if rel.as_os_str().is_empty() => PathBuf::from("."),
        Ok(rel) => rel.to_path_buf(),
        Err(_) => path.to_path_buf(),
    }
}
