//! # packrs Check Command
//!
//! File: cli/src/commands/check.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/packrs
//!
//! ## Overview
//!
//! `packrs check` answers "is this archive up to date?" without writing
//! anything. It validates the same preconditions as `pack`, selects the same
//! handler, runs only the comparison, and prints the classified result as JSON.
//!
//! The exit status is 0 whether or not the archive is up to date; read
//! `archived` from the output. A comparison that could not finish is still
//! printed, with its `rc`.
//!
//! ```bash
//! packrs check ./site /backup/site.tar.gz -o z | jq .archived
//! ```
//!
use crate::commands::args::RequestArgs;
use crate::commands::pack::validate_preconditions;
use crate::common::archive::diagnostics::DifferenceReport;
use crate::common::archive::policy::PackRequest;
use crate::common::archive::{self, HandlerEntry, DEFAULT_HANDLERS};
use crate::common::system::Host;
use crate::core::config::load_config;
use crate::core::error::{PackError, Result};
use anyhow::Context;
use clap::Args;
use std::path::Path;
use tracing::info;

/// Arguments for `packrs check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub request: RequestArgs,
}

/// Compares the destination archive with the source using the selected handler.
pub fn run_check(
    request: &PackRequest,
    host: &Host,
    registry: &[HandlerEntry],
) -> std::result::Result<DifferenceReport, PackError> {
    validate_preconditions(request)?;
    let handler = archive::pick_handler(request, host, registry)?;
    handler.precheck()
}

pub fn handle_check(args: CheckArgs, config_path: Option<&Path>) -> Result<()> {
    info!("Handling check command with args: {:?}", args);

    let config = load_config(config_path)?;
    let host = Host::detect(config.tool.locale.clone())?
        .with_tar_tools(config.tool.preferred.clone(), config.tool.fallback.clone());
    let request = args.request.into_request(&config.defaults)?;

    let report = run_check(&request, &host, DEFAULT_HANDLERS)?;
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize check result")?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[cfg(unix)]
    #[test]
    fn test_check_never_writes_archive() {
        use crate::common::archive::test_support::{recorded_args, FakeTar};

        let work = tempdir().unwrap();
        let bin = work.path().join("bin");
        let source = work.path().join("project");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::create_dir_all(&source).unwrap();
        let tool = FakeTar {
            diff_output: "tar: /backup/p.tgz: Cannot open: No such file or directory\n",
            diff_rc: 2,
            ..Default::default()
        }
        .install(&bin, "tar");
        let destination = work.path().join("p.tgz");
        let request = PackRequest {
            source,
            destination: destination.clone(),
            options: "tgz".into(),
            ..Default::default()
        };
        let host = Host::new(Some(bin.into_os_string()), false);

        let report = run_check(&request, &host, DEFAULT_HANDLERS).unwrap();
        assert!(!report.archived);
        assert_eq!(report.rc, 2);
        assert!(!destination.exists());
        assert!(recorded_args(&tool, "-cz").is_none());
    }

    #[test]
    fn test_check_validates_source() {
        let request = PackRequest {
            source: "/nonexistent".into(),
            destination: "/tmp/p.tgz".into(),
            options: "z".into(),
            ..Default::default()
        };
        let err = run_check(&request, &Host::new(None, false), DEFAULT_HANDLERS).unwrap_err();
        assert!(matches!(err, PackError::SourceMissing { .. }));
    }
}
