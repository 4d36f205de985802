//! # packrs Pack Command
//!
//! File: cli/src/commands/pack.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/packrs
//!
//! ## Overview
//!
//! The `packrs pack` command and the orchestration behind it. A run always
//! walks the same steps:
//!
//! 1. Validate that the source (and the `-C` working directory, if given) is a
//!    readable directory.
//! 2. Select the first registered handler that can produce the requested format.
//! 3. Compare the existing archive with the source (`precheck`).
//! 4. Pack. This happens unconditionally unless skipping was explicitly
//!    requested with `--skip-unchanged` (or `defaults.skip_when_archived`) and
//!    the comparison confirmed the archive up to date: no meaningful
//!    difference, and every path a create would store already archived.
//! 5. Report. A successful pack always reports `changed: true`.
//!
//! Any failure after a handler was selected becomes [`PackError::PackFailed`],
//! which carries the partial [`PackReport`] so the caller can still print what
//! was learned.
//!
//! ## Examples
//!
//! ```bash
//! # Pack ./site into a gzip archive
//! packrs pack ./site /backup/site.tar.gz -o z
//!
//! # Normalize ownership and leave build output out
//! packrs pack ./site /backup/site.tgz -o tgz --owner root --group root --mode 0644 --exclude target/
//!
//! # Only rewrite the archive when the comparison finds a real difference
//! packrs pack ./site /backup/site.tgz -o z --skip-unchanged
//! ```
//!
use crate::commands::args::RequestArgs;
use crate::common::archive::policy::PackRequest;
use crate::common::archive::report::{FailureReport, PackReport};
use crate::common::archive::{self, HandlerEntry, DEFAULT_HANDLERS};
use crate::common::fs::access::{check_directory, DirState};
use crate::common::system::Host;
use crate::core::config::load_config;
use crate::core::error::{PackError, Result};
use anyhow::Context;
use clap::Args;
use std::path::Path;
use tracing::{info, warn};

/// Arguments for `packrs pack`.
#[derive(Args, Debug)]
pub struct PackArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Leave an up-to-date archive untouched instead of re-packing it.
    #[arg(long)]
    pub skip_unchanged: bool,
}

/// Checks the directories a run depends on before any handler is built.
pub fn validate_preconditions(request: &PackRequest) -> std::result::Result<(), PackError> {
    let source = request.source.display().to_string();
    match check_directory(&request.source) {
        DirState::Missing => return Err(PackError::SourceMissing { path: source }),
        DirState::Unreadable => return Err(PackError::SourceUnreadable { path: source }),
        DirState::Ready => {}
    }

    if let Some(workdir) = &request.workdir {
        let path = workdir.display().to_string();
        match check_directory(workdir) {
            DirState::Missing => return Err(PackError::WorkdirMissing { path }),
            DirState::Unreadable => return Err(PackError::WorkdirUnreadable { path }),
            DirState::Ready => {}
        }
    }
    Ok(())
}

fn pack_failed(request: &PackRequest, reason: impl Into<String>, report: PackReport) -> PackError {
    PackError::PackFailed {
        src: request.source.display().to_string(),
        dest: request.destination.display().to_string(),
        reason: reason.into(),
        report: Box::new(report),
    }
}

/// Runs one pack request to completion.
///
/// ## Arguments
///
/// * `request` - What to pack and how.
/// * `host` - Search path, privilege and locale the tool runs under.
/// * `registry` - Handlers to try, highest priority first.
/// * `skip_when_archived` - Skip the pack step when the precheck confirms the
///   archive is up to date.
///
/// ## Returns
///
/// The [`PackReport`] of a completed run. `changed` is `true` whenever the
/// archive was written.
///
/// ## Errors
///
/// Precondition and selection failures are returned as their own
/// [`PackError`] variants. Everything that fails once a handler is chosen is
/// wrapped in [`PackError::PackFailed`] together with the partial report.
pub fn run_pack(
    request: &PackRequest,
    host: &Host,
    registry: &[HandlerEntry],
    skip_when_archived: bool,
) -> std::result::Result<PackReport, PackError> {
    validate_preconditions(request)?;

    let handler = archive::pick_handler(request, host, registry)?;
    let mut report = PackReport::new(handler.name(), &request.source, &request.destination);

    let check = match handler.precheck() {
        Ok(check) => check,
        Err(e) => return Err(pack_failed(request, e.to_string(), report)),
    };
    let skip = skip_when_archived && check.confirms_up_to_date();
    report.check_results = Some(check);

    if skip {
        info!(
            "'{}' is up to date with '{}'; skipping pack",
            request.destination.display(),
            request.source.display()
        );
        return Ok(report);
    }

    let result = match handler.pack() {
        Ok(result) => result,
        Err(e) => return Err(pack_failed(request, e.to_string(), report)),
    };
    let succeeded = result.success();
    let rc = result.rc;
    report.pack_results = Some(result);

    if !succeeded {
        warn!("tar exited with status {} while packing", rc);
        return Err(pack_failed(
            request,
            format!("tar exited with status {}", rc),
            report,
        ));
    }

    report.changed = true;
    Ok(report)
}

/// # Handle Pack Command (`handle_pack`)
///
/// Entry point for `packrs pack`. Loads configuration, detects the host,
/// runs the request and prints the JSON result on stdout. When packing fails
/// after a handler was selected the failure payload is printed before the
/// error is returned, so automation always gets a parsable result.
pub fn handle_pack(args: PackArgs, config_path: Option<&Path>) -> Result<()> {
    info!("Handling pack command with args: {:?}", args);

    let config = load_config(config_path)?;
    let host = Host::detect(config.tool.locale.clone())?
        .with_tar_tools(config.tool.preferred.clone(), config.tool.fallback.clone());
    let skip = args.skip_unchanged || config.defaults.skip_when_archived;
    let request = args.request.into_request(&config.defaults)?;

    match run_pack(&request, &host, DEFAULT_HANDLERS, skip) {
        Ok(report) => {
            let json =
                serde_json::to_string_pretty(&report).context("Failed to serialize pack result")?;
            println!("{}", json);
            Ok(())
        }
        Err(err) => {
            if let PackError::PackFailed { report, .. } = &err {
                let failure = FailureReport::new(err.to_string(), report);
                let json = serde_json::to_string_pretty(&failure)
                    .context("Failed to serialize pack failure")?;
                println!("{}", json);
            }
            Err(err.into())
        }
    }
}
