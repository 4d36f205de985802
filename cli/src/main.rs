//! # packrs Main Entry Point
//!
//! File: cli/src/main.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/packrs
//!
//! ## Overview
//!
//! This file serves as the main entry point for the packrs CLI application.
//! It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Routing execution to appropriate command handlers
//!
//! ## Architecture
//!
//! - Each top-level command (`pack`, `check`, `handlers`) is a variant in the `Commands` enum
//! - Commands are mapped to handler functions in their respective modules
//! - All errors are propagated to this level for consistent handling
//!
//! Structured results go to stdout as JSON; logs and the final error line go
//! to stderr, so output can be piped straight into other tools.
//!
//! ## Examples
//!
//! ```bash
//! # Pack a directory into a gzip archive
//! packrs pack ./site /backup/site.tar.gz -o z
//!
//! # See why a handler is not available, with debug logs
//! packrs -vv handlers
//! ```
//!
//! Command processing flow:
//! 1. Parse command-line args via Clap
//! 2. Configure logging based on verbosity level
//! 3. Route to appropriate command handler
//! 4. Format and display any errors that occur
//!
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

mod commands; // Command arguments and handlers
mod common; // Archive engine, processes, filesystem and host checks
mod core; // Core infrastructure (errors, config)

/// Defines the top-level command-line arguments structure using Clap's derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "packrs",
    about = "📦 packrs: Idempotent tar archive packing",
    long_about = "Pack a directory into a tar archive with normalized ownership, comparing\n\
                  against the existing archive first and reporting the result as JSON.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Config file to use instead of the discovered user and project files.
    #[arg(long, env = "PACKRS_CONFIG", global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Enum defining all available top-level commands.
#[derive(Parser, Debug)]
enum Commands {
    /// Compare the archive with the source, then (re)write it.
    #[command(alias = "p")]
    Pack(commands::pack::PackArgs),
    /// Compare the archive with the source without writing anything.
    #[command(alias = "c")]
    Check(commands::check::CheckArgs),
    /// List archive handlers and the tools they resolved.
    Handlers,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let config = cli.config.as_deref();
    let command_result = match cli.command {
        Commands::Pack(args) => commands::pack::handle_pack(args, config),
        Commands::Check(args) => commands::check::handle_check(args, config),
        Commands::Handlers => commands::handlers::handle_handlers(config),
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
