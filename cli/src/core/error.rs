//! # packrs Error Types
//!
//! File: cli/src/core/error.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/packrs
//!
//! ## Overview
//!
//! This module defines the error types used throughout packrs. Every failure
//! of a pack run is terminal: nothing is retried and nothing is swallowed, so
//! each variant maps to one of the ways a run can end early.
//!
//! ## Architecture
//!
//! The error system consists of two main components:
//! - `PackError`: A custom error enum using `thiserror` for the domain failures
//! - `Result<T>`: A type alias for `anyhow::Result<T>` for flexible error handling
//!
//! The variants fall into four groups:
//! - Precondition failures (source or working directory missing/unreadable, bad policy)
//! - Selection failures (no registered handler can produce the archive)
//! - Tool failures (the external `tar` could not be started, or exited non-zero while packing)
//! - Configuration errors
//!
//! ## Examples
//!
//! ```rust
//! // Surface a precondition failure
//! if !source.is_dir() {
//!     return Err(PackError::SourceMissing { path: source.display().to_string() })?;
//! }
//!
//! // Recover the structured report from a failed pack
//! if let Some(PackError::PackFailed { report, .. }) = err.downcast_ref::<PackError>() {
//!     println!("{}", serde_json::to_string(report)?);
//! }
//! ```
//!
use crate::common::archive::report::PackReport;
use thiserror::Error;

/// Custom error type for packrs.
#[derive(Error, Debug)]
pub enum PackError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source '{path}' does not exist")]
    SourceMissing { path: String },

    #[error("Source '{path}' not readable")]
    SourceUnreadable { path: String },

    #[error("Change directory path '{path}' does not exist")]
    WorkdirMissing { path: String },

    #[error("Change directory path '{path}' not readable")]
    WorkdirUnreadable { path: String },

    #[error("Invalid {field} '{value}': {reason}")]
    InvalidPolicy {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error(
        "Failed to find handler for \"{path}\". Make sure the required command to create the archive is installed."
    )]
    NoHandler { path: String },

    #[error("Failed to run '{cmd}': {source}")]
    ToolLaunch {
        cmd: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to pack {src} to {dest}: {reason}")]
    PackFailed {
        src: String,
        dest: String,
        reason: String,
        report: Box<PackReport>,
    },
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;
