//! # packrs Command Modules
//!
//! File: cli/src/commands/mod.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/packrs
//!
//! ## Overview
//!
//! This module aggregates the top-level commands of the packrs CLI and makes
//! them available to the entry point (`main.rs`).
//!
//! ## Architecture
//!
//! Each command module defines its argument struct and a `handle_*` function.
//! The orchestration logic lives next to its command (`pack::run_pack`,
//! `check::run_check`) and takes the host and handler registry as parameters,
//! so it can be exercised without touching the real environment.
//!
//! ## Commands
//!
//! - `pack`: Compare, then (re)write the archive
//! - `check`: Compare only, never writes
//! - `handlers`: List registered handlers and their resolved tools
//!

/// Request arguments shared by `pack` and `check`.
pub mod args;
/// Compare-only run printing the classified differences.
pub mod check;
/// Registry listing with the tool each handler resolved.
pub mod handlers;
/// The pack orchestrator and its command.
pub mod pack;
