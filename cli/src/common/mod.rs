//! # packrs Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/packrs
//!
//! ## Overview
//!
//! This module is the root of the shared building blocks used by the packrs
//! commands. It keeps the archive engine and its supporting host checks separate
//! from command-specific logic (`commands::`) and core infrastructure (`core::`).
//!
//! ## Architecture
//!
//! - **`archive`**: The archive engine. Request model, tar command builder, `--diff` classifier, handlers and the handler selector.
//! - **`fs`**: Directory precondition checks and path normalization.
//! - **`process`**: Running external tools with captured output and pinned locale.
//! - **`system`**: The host snapshot (search path, privilege, locale, preferred tools).
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::archive::{pick_handler, DEFAULT_HANDLERS};
//! use crate::common::system::Host;
//!
//! let host = Host::detect("C")?;
//! let handler = pick_handler(&request, &host, DEFAULT_HANDLERS)?;
//! ```
//!

pub mod archive;
pub mod fs;
pub mod process;
pub mod system;
