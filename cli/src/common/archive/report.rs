//! # packrs Pack Result Payloads (`common::archive::report`)
//!
//! File: cli/src/common/archive/report.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/packrs
//!
//! The structured result printed on stdout after a pack run, and its failure
//! variant. Field names are stable; automation parses them.
//!
use crate::common::archive::diagnostics::DifferenceReport;
use crate::common::process::ExecutionResult;
use serde::Serialize;
use std::path::PathBuf;

/// Everything a pack run learned, in the order it learned it.
#[derive(Debug, Clone, Serialize)]
pub struct PackReport {
    /// Name of the handler that was selected.
    pub handler: String,
    pub src: PathBuf,
    pub dest: PathBuf,
    pub check_results: Option<DifferenceReport>,
    pub pack_results: Option<ExecutionResult>,
    pub changed: bool,
}

impl PackReport {
    pub fn new(handler: impl Into<String>, src: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            handler: handler.into(),
            src: src.into(),
            dest: dest.into(),
            check_results: None,
            pack_results: None,
            changed: false,
        }
    }
}

/// A [`PackReport`] plus the failure message, emitted when a run fails after
/// a handler was selected.
#[derive(Debug, Serialize)]
pub struct FailureReport<'a> {
    pub failed: bool,
    pub msg: String,
    #[serde(flatten)]
    pub report: &'a PackReport,
}

impl<'a> FailureReport<'a> {
    pub fn new(msg: impl Into<String>, report: &'a PackReport) -> Self {
        Self {
            failed: true,
            msg: msg.into(),
            report,
        }
    }
}
