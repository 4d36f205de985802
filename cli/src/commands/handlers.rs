//! # packrs Handlers Command
//!
//! File: cli/src/commands/handlers.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/packrs
//!
//! Lists the registered archive handlers in priority order together with the
//! tool each one resolved on this host. Useful for finding out why a run fails
//! with "Failed to find handler".
//!
use crate::common::archive::policy::PackRequest;
use crate::common::archive::HandlerEntry;
use crate::common::archive::DEFAULT_HANDLERS;
use crate::common::system::Host;
use crate::core::config::load_config;
use crate::core::error::Result;
use std::path::Path;
use tracing::info;

/// One `<name>  <tool path | missing>` line per registry entry.
pub fn describe_handlers(host: &Host, registry: &[HandlerEntry]) -> Vec<String> {
    // Tool resolution does not depend on the request.
    let sample = PackRequest::default();
    registry
        .iter()
        .map(|entry| {
            let handler = (entry.build)(&sample, host);
            let tool = handler
                .tool()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "missing".to_string());
            format!("{:<16}{}", entry.name, tool)
        })
        .collect()
}

pub fn handle_handlers(config_path: Option<&Path>) -> Result<()> {
    info!("Handling handlers command");
    let config = load_config(config_path)?;
    let host = Host::detect(config.tool.locale.clone())?
        .with_tar_tools(config.tool.preferred.clone(), config.tool.fallback.clone());

    for line in describe_handlers(&host, DEFAULT_HANDLERS) {
        println!("{}", line);
    }
    Ok(())
}
