//! # packrs Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/packrs
//!
//! ## Overview
//!
//! Filesystem helpers used before any tool runs:
//!
//! - **`access`**: Whether a path is an existing, readable directory (`check_directory`).
//! - **`paths`**: `~` expansion, absolute paths, and relative operands (`normalize_path`, `relative_to`).
//!
//! Functions are imported from their submodule, e.g.
//! `crate::common::fs::access::check_directory`.
//!

pub mod access;
pub mod paths;
