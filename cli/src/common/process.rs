//! # packrs Process Execution Utilities (`common::process`)
//!
//! File: cli/src/common/process.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/packrs
//!
//! ## Overview
//!
//! This module wraps `std::process::Command` for the one kind of external
//! process packrs runs: a blocking, fully captured invocation of the archiving
//! tool.
//!
//! - [`CommandInvocation`] is the immutable description of a run: program,
//!   argv, working directory and per-invocation environment overrides.
//! - [`ExecutionResult`] is what a run produced: exit code, stdout, stderr and
//!   the rendered command line.
//!
//! ## Architecture
//!
//! Execution goes through `Command::output`, which waits for the child and
//! closes its pipes on every path, including when the program cannot be
//! started at all. There is no timeout: a tool that hangs blocks the run.
//!
//! Locale pinning is an environment override carried by the invocation itself
//! ([`CommandInvocation::with_locale`]); the packrs process environment is
//! never modified.
//!
//! ```rust
//! use crate::common::process::CommandInvocation;
//!
//! let result = CommandInvocation::new("/usr/bin/tar", vec!["--version".into()])
//!     .with_locale("C")
//!     .execute()?;
//! println!("{} exited with {}", result.cmd, result.rc);
//! ```
//!
use crate::core::error::PackError;
use serde::Serialize;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

/// Variables pinned to one locale so diagnostic wording stays parseable.
pub const LOCALE_VARS: [&str; 4] = ["LANG", "LC_ALL", "LC_MESSAGES", "LC_CTYPE"];

/// Exit code recorded when the child was terminated by a signal.
const SIGNALLED_RC: i32 = -1;

/// A fully specified external command, ready to run once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    program: PathBuf,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    env: Vec<(OsString, OsString)>,
}

impl CommandInvocation {
    pub fn new(program: impl Into<PathBuf>, args: Vec<OsString>) -> Self {
        Self {
            program: program.into(),
            args,
            cwd: None,
            env: Vec::new(),
        }
    }

    /// Runs the command from `dir` instead of the current directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Pins every variable in [`LOCALE_VARS`] to `locale` for this invocation.
    pub fn with_locale(mut self, locale: &str) -> Self {
        for var in LOCALE_VARS {
            self.env.retain(|(key, _)| key != var);
            self.env.push((var.into(), locale.into()));
        }
        self
    }

    #[cfg(test)]
    pub fn program(&self) -> &std::path::Path {
        &self.program
    }

    #[cfg(test)]
    pub fn cwd(&self) -> Option<&std::path::Path> {
        self.cwd.as_deref()
    }

    /// Value of an environment override, if one was set.
    #[cfg(test)]
    pub fn env_override(&self, key: &str) -> Option<&std::ffi::OsStr> {
        self.env
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_os_str())
    }

    /// Arguments as strings, replacing invalid UTF-8.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    /// Shell-quoted command line, for logs and result payloads.
    pub fn display(&self) -> String {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args_lossy())
            .map(|token| match shlex::try_quote(&token) {
                Ok(quoted) => quoted.into_owned(),
                Err(_) => token,
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Runs the command to completion, capturing both output streams.
    ///
    /// A non-zero exit is not an error here; it is recorded in the result.
    /// Failing to start the program is [`PackError::ToolLaunch`].
    pub fn execute(&self) -> Result<ExecutionResult, PackError> {
        let cmd = self.display();
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .envs(self.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null());
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }

        debug!("Running: {} (cwd: {:?})", cmd, self.cwd);
        let output = command.output().map_err(|source| PackError::ToolLaunch {
            cmd: cmd.clone(),
            source,
        })?;

        let rc = output.status.code().unwrap_or(SIGNALLED_RC);
        debug!("'{}' exited with {}", cmd, rc);
        Ok(ExecutionResult {
            cmd,
            rc,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Captured outcome of one [`CommandInvocation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub cmd: String,
    pub rc: i32,
    #[serde(rename = "out")]
    pub stdout: String,
    #[serde(rename = "err")]
    pub stderr: String,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.rc == 0
    }

    /// Stdout lines followed by stderr lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.stdout.lines().chain(self.stderr.lines())
    }
}
