//! # packrs tar Command Builder (`common::archive::command`)
//!
//! File: cli/src/common/archive/command.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/packrs
//!
//! ## Overview
//!
//! Turns a pack request into the exact argv of a tar invocation. No I/O happens
//! here; the same inputs always give the same invocation.
//!
//! ## Argument order
//!
//! ```text
//! compare/create:  tar -<d|c>[z|j|J] [extra opts...] [--owner=O] [--group=G] [--mode=M]
//!                      [--exclude=E...] -f <archive> <operand>
//! list:            tar -t[z|j|J] -f <archive>
//! enumerate:       tar -cv [--exclude=E...] -f /dev/null <operand>
//! ```
//!
//! Owner, group and mode flags appear only when the policy sets them. Each
//! exclude is a single argv token, so entries containing spaces or globs reach
//! tar unchanged without shell quoting.
//!
//! `Enumerate` is a dry create: GNU tar does not read file contents when the
//! archive is `/dev/null`, but still prints every name it would store. Extra
//! options are left out of it because they may have side effects on the source
//! (`--remove-files`).
//!
use crate::common::archive::policy::{Compression, ExcludeList, ExtraOpts, OwnershipPolicy};
use crate::common::process::CommandInvocation;
use std::ffi::OsString;
use std::path::Path;

/// What the tar run is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveMode {
    /// `-d`: report differences between the archive and the filesystem.
    Compare,
    /// `-c`: write a new archive.
    Create,
    /// `-t`: list the archive's members.
    List,
    /// `-cv` into `/dev/null`: list the names a create run would store.
    Enumerate,
}

/// Archive path used by [`ArchiveMode::Enumerate`].
const DISCARD_ARCHIVE: &str = "/dev/null";

/// Inputs for one tar invocation.
#[derive(Debug, Clone, Copy)]
pub struct TarCommand<'a> {
    pub tool: &'a Path,
    pub mode: ArchiveMode,
    pub compression: Compression,
    pub policy: &'a OwnershipPolicy,
    pub excludes: &'a ExcludeList,
    pub extra_opts: &'a ExtraOpts,
    pub archive: &'a Path,
    pub operand: &'a Path,
    pub cwd: &'a Path,
}

impl TarCommand<'_> {
    pub fn build(&self) -> CommandInvocation {
        let args = match self.mode {
            ArchiveMode::Compare => self.transfer_args('d'),
            ArchiveMode::Create => self.transfer_args('c'),
            ArchiveMode::List => vec![
                self.mode_flag('t'),
                "-f".into(),
                self.archive.as_os_str().to_owned(),
            ],
            ArchiveMode::Enumerate => {
                let mut args = vec![OsString::from("-cv")];
                args.extend(self.exclude_args());
                args.push("-f".into());
                args.push(DISCARD_ARCHIVE.into());
                args.push(self.operand.as_os_str().to_owned());
                args
            }
        };
        CommandInvocation::new(self.tool, args).current_dir(self.cwd)
    }

    fn mode_flag(&self, letter: char) -> OsString {
        let mut flag = format!("-{letter}");
        if let Some(c) = self.compression.flag() {
            flag.push(c);
        }
        flag.into()
    }

    fn exclude_args(&self) -> impl Iterator<Item = OsString> + '_ {
        self.excludes
            .iter()
            .map(|e| OsString::from(format!("--exclude={e}")))
    }

    fn transfer_args(&self, letter: char) -> Vec<OsString> {
        let mut args = vec![self.mode_flag(letter)];

        args.extend(self.extra_opts.iter().map(OsString::from));

        if let Some(owner) = self.policy.owner() {
            args.push(format!("--owner={owner}").into());
        }
        if let Some(group) = self.policy.group() {
            args.push(format!("--group={group}").into());
        }
        if let Some(mode) = self.policy.mode() {
            args.push(format!("--mode={mode}").into());
        }

        args.extend(self.exclude_args());

        args.push("-f".into());
        args.push(self.archive.as_os_str().to_owned());
        args.push(self.operand.as_os_str().to_owned());
        args
    }
}
