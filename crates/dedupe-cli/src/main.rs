//! # dedupe CLI entry point
//!
//! Parses command-line arguments, loads configuration, and dispatches to
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dedupe_core::DedupeConfig;
use tracing_subscriber::EnvFilter;

use dedupe_cli::collect::{run_collect, CollectArgs};
use dedupe_cli::hash::{run_hash, HashArgs};
use dedupe_cli::resolve::{run_resolve, ResolveArgs};

/// Dedupe Stack CLI.
///
/// Collects files into content-addressed storage, hashes files, and resolves
/// references through collection manifests.
#[derive(Parser, Debug)]
#[command(name = "dedupe", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true, env = "DEDUPE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Save a directory into content-addressed storage and write a manifest.
    Collect(CollectArgs),

    /// Print a file's content digest and unique name.
    Hash(HashArgs),

    /// Rewrite references through a collection manifest.
    Resolve(ResolveArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = load_config(cli.config.as_deref()).and_then(|config| match &cli.command {
        Commands::Collect(args) => run_collect(args, &config),
        Commands::Hash(args) => run_hash(args, &config),
        Commands::Resolve(args) => run_resolve(args, &config),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn load_config(file: Option<&std::path::Path>) -> anyhow::Result<DedupeConfig> {
    let config = DedupeConfig::load(file, |key| std::env::var(key).ok())
        .context("invalid dedupe configuration")?;
    tracing::debug!(
        unique_prefix = %config.unique_namespace_prefix,
        unique_root = %config.unique_root_dir.display(),
        "configuration loaded"
    );
    Ok(config)
}
