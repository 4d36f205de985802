//! # packrs Archive Engine (`common::archive`)
//!
//! File: cli/src/common/archive/mod.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/packrs
//!
//! ## Overview
//!
//! This module is the archive-packing engine. It decides which format handler
//! can produce the requested archive, checks whether an existing archive is
//! already up to date, and drives the external `tar` that does the packing.
//!
//! ## Architecture
//!
//! - **`policy`**: The request model (ownership policy, excludes, extra options, compression).
//! - **`command`**: Pure construction of tar argv for compare and create runs.
//! - **`diagnostics`**: Classification of `tar --diff` output into meaningful differences.
//! - **`tar`**: The tar family of handlers (gzip, bzip2, xz, uncompressed).
//! - **`report`**: Result payloads printed after a run.
//!
//! Handlers implement [`ArchiveHandler`]. The registry ([`DEFAULT_HANDLERS`])
//! lists handler factories in priority order and [`pick_handler`] returns the
//! first one whose `can_handle` accepts the request. Supporting a new format
//! means adding a registry entry; the selector does not change.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::archive::{self, DEFAULT_HANDLERS};
//!
//! let handler = archive::pick_handler(&request, &host, DEFAULT_HANDLERS)?;
//! let check = handler.precheck()?;
//! let result = handler.pack()?;
//! ```
//!

pub mod command;
pub mod diagnostics;
pub mod policy;
pub mod report;
pub mod tar;

use crate::common::archive::diagnostics::DifferenceReport;
use crate::common::archive::policy::PackRequest;
use crate::common::process::ExecutionResult;
use crate::common::system::Host;
use crate::core::error::PackError;
use std::path::Path;
use tracing::{debug, info};

/// A format-specific packer bound to one request. Single use: `precheck` may
/// run before `pack`, and `pack` consumes the handler.
pub trait ArchiveHandler: std::fmt::Debug {
    /// Registry name, reported in results.
    fn name(&self) -> &'static str;

    /// The external tool this handler resolved at construction, if any.
    fn tool(&self) -> Option<&Path>;

    /// True iff the tool resolved and the requested format is one this handler produces.
    fn can_handle(&self) -> bool;

    /// Compares the existing archive with the source. Never mutates the filesystem.
    fn precheck(&self) -> Result<DifferenceReport, PackError>;

    /// Writes (or overwrites) the destination archive.
    fn pack(self: Box<Self>) -> Result<ExecutionResult, PackError>;
}

/// Builds a handler for one request on one host.
pub type HandlerFactory = fn(&PackRequest, &Host) -> Box<dyn ArchiveHandler>;

/// One registry slot.
#[derive(Clone, Copy)]
pub struct HandlerEntry {
    pub name: &'static str,
    pub build: HandlerFactory,
}

/// Registered handlers, highest priority first.
pub const DEFAULT_HANDLERS: &[HandlerEntry] = &[
    HandlerEntry {
        name: tar::TGZ_HANDLER,
        build: tar::TarArchive::gzip,
    },
    HandlerEntry {
        name: tar::TBZ_HANDLER,
        build: tar::TarArchive::bzip2,
    },
    HandlerEntry {
        name: tar::TXZ_HANDLER,
        build: tar::TarArchive::xz,
    },
    HandlerEntry {
        name: tar::TAR_HANDLER,
        build: tar::TarArchive::plain,
    },
];

/// Returns the first registered handler that can handle `request` on `host`.
///
/// ## Errors
///
/// [`PackError::NoHandler`] naming the source when every handler declines.
pub fn pick_handler(
    request: &PackRequest,
    host: &Host,
    registry: &[HandlerEntry],
) -> Result<Box<dyn ArchiveHandler>, PackError> {
    for entry in registry {
        let handler = (entry.build)(request, host);
        if handler.can_handle() {
            info!(
                "Selected handler {} for '{}'",
                handler.name(),
                request.source.display()
            );
            return Ok(handler);
        }
        debug!(
            "Handler {} declined '{}' (tool: {:?})",
            entry.name,
            request.source.display(),
            handler.tool()
        );
    }
    Err(PackError::NoHandler {
        path: request.source.display().to_string(),
    })
}
