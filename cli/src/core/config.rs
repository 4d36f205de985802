//! # packrs Configuration System
//!
//! File: cli/src/core/config.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/packrs
//!
//! ## Overview
//!
//! This module implements the configuration system for packrs: loading,
//! merging and validating the settings that shape every pack run. Settings
//! cover which `tar` binaries to look for, which locale to pin for the tool's
//! diagnostics, and default exclude/extra-option lists.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. An explicit file given with `--config` / `PACKRS_CONFIG` (replaces 2 and 3)
//! 2. Project-specific `.packrs.toml` in the current directory or its ancestors
//! 3. User-specific `~/.config/packrs/config.toml`
//! 4. Default values defined in the code
//!
//! ```toml
//! [tool]
//! preferred = "gtar"
//! fallback = "tar"
//! locale = "C"
//!
//! [defaults]
//! exclude = [".git/"]
//! extra_opts = ["--numeric-owner"]
//! skip_when_archived = false
//! ```
//!
//! The configuration is loaded once per command execution and passed to the
//! command handler.
//!
use crate::core::error::{PackError, Result};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub tool: ToolConfig,
    #[serde(default)]
    pub defaults: PackDefaults,
}

/// Which archiving binaries to resolve and how to run them.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    /// Tried first on the search path. Must accept GNU tar options.
    #[serde(default = "default_preferred_tool")]
    pub preferred: String,
    /// Used when `preferred` does not resolve.
    #[serde(default = "default_fallback_tool")]
    pub fallback: String,
    /// Value pinned into LANG, LC_ALL, LC_MESSAGES and LC_CTYPE for every invocation.
    #[serde(default = "default_locale")]
    pub locale: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            preferred: default_preferred_tool(),
            fallback: default_fallback_tool(),
            locale: default_locale(),
        }
    }
}

/// Defaults merged into every pack request.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PackDefaults {
    /// Exclude entries placed before the ones given on the command line.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Extra tar options placed before the ones given on the command line.
    #[serde(default)]
    pub extra_opts: Vec<String>,
    /// Skip the pack step when the precheck finds the archive up to date.
    #[serde(default)]
    pub skip_when_archived: bool,
}

fn default_preferred_tool() -> String {
    "gtar".to_string()
}
fn default_fallback_tool() -> String {
    "tar".to_string()
}
fn default_locale() -> String {
    "C".to_string()
}

const PROJECT_CONFIG_FILENAME: &str = ".packrs.toml";

/// Loads the effective configuration.
///
/// When `explicit` is set, only that file is read. Otherwise the user and
/// project files are merged, project values winning.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut config = match explicit {
        Some(path) => {
            let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
            info!("Loading configuration from: {}", expanded.display());
            load_config_from_path(&expanded)?
        }
        None => {
            let user_config = load_user_config()?;
            let project_config = load_project_config()?;
            merge_configs(user_config.unwrap_or_default(), project_config)
        }
    };
    expand_config_paths(&mut config);
    validate_config(&config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", config);
    Ok(config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "packrs", "packrs") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.is_file() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config() -> Result<Option<Config>> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    if let Some(project_config_path) = find_project_config_path(&current_dir) {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!("No project configuration file (.packrs.toml) found in current directory or ancestors.");
        Ok(None)
    }
}

/// Walks up from `start` looking for `.packrs.toml`, stopping at a repository root.
fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path = start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let project_cfg = match project {
        Some(p) => p,
        None => return user,
    };
    let mut merged = Config::default();
    merged.tool.preferred = if project_cfg.tool.preferred != default_preferred_tool() {
        project_cfg.tool.preferred
    } else {
        user.tool.preferred
    };
    merged.tool.fallback = if project_cfg.tool.fallback != default_fallback_tool() {
        project_cfg.tool.fallback
    } else {
        user.tool.fallback
    };
    merged.tool.locale = if project_cfg.tool.locale != default_locale() {
        project_cfg.tool.locale
    } else {
        user.tool.locale
    };
    merged.defaults.exclude = if !project_cfg.defaults.exclude.is_empty() {
        project_cfg.defaults.exclude
    } else {
        user.defaults.exclude
    };
    merged.defaults.extra_opts = if !project_cfg.defaults.extra_opts.is_empty() {
        project_cfg.defaults.extra_opts
    } else {
        user.defaults.extra_opts
    };
    merged.defaults.skip_when_archived =
        project_cfg.defaults.skip_when_archived || user.defaults.skip_when_archived;
    merged
}

fn expand_config_paths(config: &mut Config) {
    // Tool names may be absolute paths into a home directory.
    for tool in [&mut config.tool.preferred, &mut config.tool.fallback] {
        if tool.starts_with('~') {
            *tool = shellexpand::tilde(tool.as_str()).into_owned();
            debug!("Expanded tool path: {}", tool);
        }
    }
}

fn validate_config(config: &Config) -> Result<()> {
    debug!("Validating final configuration...");
    if config.tool.preferred.trim().is_empty() || config.tool.fallback.trim().is_empty() {
        return Err(anyhow!(PackError::Config(
            "Tool names in [tool] cannot be empty.".to_string()
        )));
    }
    if config.tool.locale.trim().is_empty() {
        return Err(anyhow!(PackError::Config(
            "Locale in [tool] cannot be empty.".to_string()
        )));
    }
    if config.defaults.exclude.iter().any(|e| e.trim().is_empty()) {
        return Err(anyhow!(PackError::Config(
            "Exclude entries in [defaults] cannot be empty.".to_string()
        )));
    }
    Ok(())
}
