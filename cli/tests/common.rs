//! # packrs CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/packrs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Each test file
//! declares `mod common;` and pulls in what it needs.
//!
//! [`Sandbox`] gives a test its own source tree, `bin` directory, `HOME` and
//! working directory, so runs never see the developer's config or tools.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// # Get packrs Command (`packrs_cmd`)
///
/// Creates an `assert_cmd::Command` pointing at the compiled `packrs` binary.
///
/// ## Panics
/// Panics if the `packrs` binary cannot be found via `Command::cargo_bin`.
pub fn packrs_cmd() -> Command {
    Command::cargo_bin("packrs").expect("Failed to find packrs binary for testing")
}

/// An isolated directory tree for one test.
pub struct Sandbox {
    root: TempDir,
}

impl Sandbox {
    /// Creates `project/` with two files, plus empty `bin/` and `home/`.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("Failed to create sandbox");
        let project = root.path().join("project");
        std::fs::create_dir_all(project.join("logs")).unwrap();
        std::fs::write(project.join("a.txt"), "hello\n").unwrap();
        std::fs::write(project.join("logs").join("run.log"), "noise\n").unwrap();
        std::fs::create_dir_all(root.path().join("bin")).unwrap();
        std::fs::create_dir_all(root.path().join("home")).unwrap();
        Self { root }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn source(&self) -> PathBuf {
        self.path().join("project")
    }

    pub fn bin(&self) -> PathBuf {
        self.path().join("bin")
    }

    pub fn archive(&self, name: &str) -> PathBuf {
        self.path().join(name)
    }

    /// `packrs` with `HOME` and the working directory inside the sandbox and
    /// `PATH` limited to the sandbox `bin/`.
    pub fn cmd(&self) -> Command {
        let mut cmd = self.cmd_with_system_path();
        cmd.env("PATH", self.bin());
        cmd
    }

    /// Like [`Sandbox::cmd`] but keeps the real `PATH`.
    pub fn cmd_with_system_path(&self) -> Command {
        let home = self.path().join("home");
        let mut cmd = packrs_cmd();
        cmd.current_dir(self.path())
            .env("HOME", &home)
            .env("XDG_CONFIG_HOME", home.join(".config"))
            .env_remove("PACKRS_CONFIG")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Installs a fake tar named `name` into `bin/`. It writes `packed` to the
    /// `-f` target on create, prints `diff_output` on compare, and exits with
    /// the given codes. Listing and dry-create runs print nothing and succeed.
    #[cfg(unix)]
    pub fn install_fake_tar(&self, name: &str, diff_output: &str, diff_rc: i32, create_rc: i32) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let script = format!(
            r#"#!/bin/sh
archive=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "-f" ]; then archive="$arg"; fi
  prev="$arg"
done
case "$1" in
  -cv|-t*)
    exit 0
    ;;
  -c*)
    printf 'packed\n' > "$archive"
    exit {create_rc}
    ;;
  -d*)
    printf '%s' '{diff_output}' >&2
    exit {diff_rc}
    ;;
esac
exit 64
"#
        );
        let path = self.bin().join(name);
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }
}

/// Parses stdout of a finished command as JSON.
pub fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}
