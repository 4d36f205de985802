//! # packrs Pack Request Model (`common::archive::policy`)
//!
//! File: cli/src/common/archive/policy.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/packrs
//!
//! ## Overview
//!
//! The values a handler is bound to for its whole (single) run:
//!
//! - [`OwnershipPolicy`]: optional owner/group/mode overrides for archive members.
//! - [`ExcludeList`]: paths left out of the archive, trailing separators stripped.
//! - [`ExtraOpts`]: opaque tar options passed through verbatim.
//! - [`Compression`]: the compression a format token asks for.
//! - [`PackRequest`]: all of the above plus source, destination and working directory.
//!
//! All of them are validated on construction and never mutated afterwards.
//!
use crate::common::fs::paths::relative_to;
use crate::core::error::PackError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Octal (`644`, `0755`) or symbolic (`u+rw,go-w`, `a=rX`) tar `--mode` values.
static MODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[0-7]{1,4}|[ugoa]*[-+=][rwxXst]*(?:,[ugoa]*[-+=][rwxXst]*)*)$")
        .expect("mode pattern is valid")
});

/// Requested ownership and permission overrides. `None` means "keep what the
/// source has"; a `Some` value is never blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OwnershipPolicy {
    owner: Option<String>,
    group: Option<String>,
    mode: Option<String>,
}

impl OwnershipPolicy {
    /// Blank values are treated as unset; a non-blank mode must be octal or symbolic.
    pub fn new(
        owner: Option<String>,
        group: Option<String>,
        mode: Option<String>,
    ) -> Result<Self, PackError> {
        let mode = normalize(mode);
        if let Some(m) = &mode {
            if !MODE_RE.is_match(m) {
                return Err(PackError::InvalidPolicy {
                    field: "mode",
                    value: m.clone(),
                    reason: "expected an octal or symbolic mode".to_string(),
                });
            }
        }
        Ok(Self {
            owner: normalize(owner),
            group: normalize(group),
            mode,
        })
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn mode(&self) -> Option<&str> {
        self.mode.as_deref()
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Ordered exclude entries. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExcludeList(Vec<String>);

impl ExcludeList {
    /// Strips trailing separators; entries that were nothing but separators are dropped.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            entries
                .into_iter()
                .map(|e| {
                    e.as_ref()
                        .trim_end_matches(|c: char| c == '/' || c == std::path::MAIN_SEPARATOR)
                        .to_string()
                })
                .filter(|e| !e.is_empty())
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Extra tool options, kept in order and passed as discrete argv tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtraOpts(Vec<String>);

impl ExtraOpts {
    pub fn new<I, S>(opts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(opts.into_iter().map(Into::into).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Compression applied by a tar handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    Gzip,
    Bzip2,
    Xz,
    None,
}

impl Compression {
    /// The single-letter tar flag, if any (`z`, `j`, `J`).
    pub fn flag(self) -> Option<char> {
        match self {
            Self::Gzip => Some('z'),
            Self::Bzip2 => Some('j'),
            Self::Xz => Some('J'),
            Self::None => None,
        }
    }

    /// Maps one format token. Single-letter tokens are case-sensitive like tar's flags.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "z" => return Some(Self::Gzip),
            "j" => return Some(Self::Bzip2),
            "J" => return Some(Self::Xz),
            _ => {}
        }
        match token.to_ascii_lowercase().as_str() {
            "gz" | "gzip" | "tgz" | "tar.gz" => Some(Self::Gzip),
            "bz2" | "bzip2" | "tbz2" | "tar.bz2" => Some(Self::Bzip2),
            "xz" | "txz" | "tar.xz" => Some(Self::Xz),
            "tar" | "none" => Some(Self::None),
            _ => None,
        }
    }

    /// All compressions named by a whitespace- or comma-separated options string.
    pub fn parse_options(options: &str) -> Vec<Self> {
        options
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .filter_map(Self::from_token)
            .collect()
    }
}

/// Everything one pack run needs. Paths are expected to be absolute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Raw format token string, e.g. `"z"` or `"tar.xz"`.
    pub options: String,
    /// Alternate directory the tool runs from.
    pub workdir: Option<PathBuf>,
    pub policy: OwnershipPolicy,
    pub excludes: ExcludeList,
    pub extra_opts: ExtraOpts,
}

impl PackRequest {
    /// Compressions requested through `options`.
    pub fn formats(&self) -> Vec<Compression> {
        Compression::parse_options(&self.options)
    }

    /// The alternate working directory, else the source's parent, else the source itself.
    pub fn working_dir(&self) -> &Path {
        self.workdir
            .as_deref()
            .or_else(|| self.source.parent().filter(|p| !p.as_os_str().is_empty()))
            .unwrap_or(self.source.as_path())
    }

    /// The source as named from [`working_dir`](Self::working_dir).
    pub fn operand(&self) -> PathBuf {
        relative_to(&self.source, self.working_dir())
    }
}
