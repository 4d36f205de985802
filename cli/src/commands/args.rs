//! # packrs Shared Request Arguments
//!
//! File: cli/src/commands/args.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/packrs
//!
//! ## Overview
//!
//! The arguments that describe one pack request, shared by `packrs pack` and
//! `packrs check` so both always agree on what is being compared and written.
//!
//! Converting to a [`PackRequest`] expands `~`, makes paths absolute, validates
//! the ownership policy, and merges the configured default excludes and extra
//! options (config entries first, command-line entries after).
//!
use crate::common::archive::policy::{ExcludeList, ExtraOpts, OwnershipPolicy, PackRequest};
use crate::common::fs::paths::normalize_path;
use crate::core::config::PackDefaults;
use crate::core::error::Result;
use clap::Args;
use std::path::PathBuf;

/// Arguments identifying the source, the archive and how to build it.
#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// Directory to pack.
    pub src: PathBuf,

    /// Archive file to create or compare against.
    pub dest: PathBuf,

    /// Archive format token(s), e.g. `z`, `gz`, `tar.bz2`, `J`, `tar`.
    #[arg(short, long)]
    pub options: String,

    /// Run tar from this directory instead of the source's parent.
    #[arg(short = 'C', long = "chdir", value_name = "DIR")]
    pub change_directory_path: Option<PathBuf>,

    /// Path to leave out of the archive (repeatable). Trailing `/` is ignored.
    #[arg(long = "exclude", value_name = "PATH")]
    pub exclude: Vec<String>,

    /// Extra option passed to tar verbatim (repeatable), e.g. `--extra-opt=--numeric-owner`.
    #[arg(long = "extra-opt", value_name = "OPT", allow_hyphen_values = true)]
    pub extra_opts: Vec<String>,

    /// Owner recorded for archive members.
    #[arg(long)]
    pub owner: Option<String>,

    /// Group recorded for archive members.
    #[arg(long)]
    pub group: Option<String>,

    /// Mode applied to archive members (octal or symbolic).
    #[arg(long)]
    pub mode: Option<String>,
}

impl RequestArgs {
    pub fn into_request(self, defaults: &PackDefaults) -> Result<PackRequest> {
        let workdir = match &self.change_directory_path {
            Some(dir) => Some(normalize_path(dir)?),
            None => None,
        };
        Ok(PackRequest {
            source: normalize_path(&self.src)?,
            destination: normalize_path(&self.dest)?,
            options: self.options,
            workdir,
            policy: OwnershipPolicy::new(self.owner, self.group, self.mode)?,
            excludes: ExcludeList::new(defaults.exclude.iter().chain(self.exclude.iter())),
            extra_opts: ExtraOpts::new(
                defaults
                    .extra_opts
                    .iter()
                    .cloned()
                    .chain(self.extra_opts),
            ),
        })
    }
}
