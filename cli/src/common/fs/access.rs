//! # packrs Directory Access Checks
//!
//! File: cli/src/common/fs/access.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/packrs
//!
//! ## Overview
//!
//! Precondition checks run before any handler is selected. A directory is
//! usable when it exists, is a directory (symlinks are followed), and the
//! current process may read it.
//!
//! On unix readability is asked of the kernel with `access(2)` (via `nix`), so
//! it honours the real uid the way the archiving tool will experience it.
//! Elsewhere it falls back to attempting to list the directory.
//!
use std::path::Path;
use tracing::debug;

/// Outcome of [`check_directory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirState {
    /// Absent, or present but not a directory.
    Missing,
    Unreadable,
    Ready,
}

/// Classifies `path` as a usable directory or not.
pub fn check_directory(path: &Path) -> DirState {
    if !path.is_dir() {
        debug!("'{}' is not a directory", path.display());
        return DirState::Missing;
    }
    if is_readable(path) {
        DirState::Ready
    } else {
        debug!("'{}' is not readable", path.display());
        DirState::Unreadable
    }
}

#[cfg(unix)]
fn is_readable(path: &Path) -> bool {
    use nix::unistd::{access, AccessFlags};
    access(path, AccessFlags::R_OK).is_ok()
}

#[cfg(not(unix))]
fn is_readable(path: &Path) -> bool {
    std::fs::read_dir(path).is_ok()
}
