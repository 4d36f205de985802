//! # packrs System Utilities Module (`common::system`)
//!
//! File: cli/src/common/system/mod.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/packrs
//!
//! ## Overview
//!
//! This module describes the host a pack run executes on: where executables
//! are looked up, whether the process runs with elevated privileges, which
//! `tar` binaries the handlers should prefer, and which locale is pinned for
//! the tool's diagnostics.
//!
//! ## Architecture
//!
//! Everything host-dependent is captured once in a [`Host`] value and passed
//! down explicitly. Nothing below the command layer reads `PATH` or the
//! process uid on its own, so tests build a `Host` pointing at a scratch
//! directory of fake tools instead of touching the real environment.
//!
//! ```rust
//! use crate::common::system::Host;
//!
//! let host = Host::detect("C")?;
//! if let Some(tar) = host.resolve_tool("gtar") {
//!     println!("GNU tar at {}", tar.display());
//! }
//! ```
//!
use crate::core::error::Result;
use anyhow::Context;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::debug;

/// Snapshot of the environment the archiving tool will run in.
#[derive(Debug, Clone)]
pub struct Host {
    search_path: Option<OsString>,
    cwd: PathBuf,
    elevated: bool,
    locale: String,
    preferred_tar: String,
    fallback_tar: String,
}

impl Host {
    /// Captures `PATH`, the current directory and the process uid.
    pub fn detect(locale: impl Into<String>) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        let host = Self::new(std::env::var_os("PATH"), is_elevated()).with_cwd(cwd);
        let host = host.with_locale(locale);
        debug!("Detected host: {:?}", host);
        Ok(host)
    }

    /// Builds a host with an explicit search path. Defaults to the `C` locale
    /// and the `gtar`/`tar` preference.
    pub fn new(search_path: Option<OsString>, elevated: bool) -> Self {
        Self {
            search_path,
            cwd: PathBuf::from("/"),
            elevated,
            locale: "C".to_string(),
            preferred_tar: "gtar".to_string(),
            fallback_tar: "tar".to_string(),
        }
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Overrides the tar binaries tried by the tar handlers, in order.
    pub fn with_tar_tools(mut self, preferred: impl Into<String>, fallback: impl Into<String>) -> Self {
        self.preferred_tar = preferred.into();
        self.fallback_tar = fallback.into();
        self
    }

    /// Looks `name` up on the search path. Names containing a path separator
    /// are checked as given.
    pub fn resolve_tool(&self, name: &str) -> Option<PathBuf> {
        match which::which_in(name, self.search_path.as_ref(), &self.cwd) {
            Ok(path) => Some(path),
            Err(e) => {
                debug!("'{}' not resolvable: {}", name, e);
                None
            }
        }
    }

    pub fn is_elevated(&self) -> bool {
        self.elevated
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// `(preferred, fallback)` tar binary names.
    pub fn tar_tools(&self) -> (&str, &str) {
        (&self.preferred_tar, &self.fallback_tar)
    }
}

#[cfg(unix)]
fn is_elevated() -> bool {
    nix::unistd::Uid::current().is_root()
}

#[cfg(not(unix))]
fn is_elevated() -> bool {
    false
}
