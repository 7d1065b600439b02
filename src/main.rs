//! # `ctxload`
//!
//! Loads a component from a directory or zip archive and reports what the
//! resulting context contains, or why the component was rejected.
//!
//! ## Usage
//!
//! ```bash
//! ctxload --config ./ctxload.toml <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ctxload load <source>` | Print the component name and every file path |
//! | `ctxload check <source>` | Print a one-line summary, exit non-zero on failure |
//!
//! Set `RUST_LOG=debug` to see per-entry decisions made by the loaders.

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use component_context::config::{self, Config};
use component_context::load_context;

/// Build and inspect component contexts.
#[derive(Parser)]
#[command(
    name = "ctxload",
    about = "Build a validated context from a component directory or zip archive",
    version
)]
struct Cli {
    /// Path to a TOML configuration file with a `[loader]` table.
    ///
    /// Built-in defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a component and list its files.
    ///
    /// Files matched by the configured ignore patterns are marked with `(ignored)`.
    Load {
        /// Component directory or `.zip` archive.
        source: PathBuf,

        /// Remove ignored files from the context before listing.
        #[arg(long)]
        prune_ignored: bool,
    },

    /// Load a component and print a one-line summary.
    Check {
        /// Component directory or `.zip` archive.
        source: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Load {
            source,
            prune_ignored,
        } => {
            let mut ctx = load_context(&source, &cfg.loader)
                .await
                .with_context(|| format!("Failed to load component: {}", source.display()))?;
            if prune_ignored {
                let pruned = ctx.prune_ignored();
                if !pruned.is_empty() {
                    eprintln!("pruned {} ignored file(s)", pruned.len());
                }
            }
            println!("component: {}", ctx.name());
            println!("files: {}", ctx.files().len());
            for file in ctx.files() {
                if ctx.is_ignore(&file.path) {
                    println!("  {} (ignored)", file.path);
                } else {
                    println!("  {}", file.path);
                }
            }
        }
        Commands::Check { source } => {
            let ctx = load_context(&source, &cfg.loader)
                .await
                .with_context(|| format!("Failed to load component: {}", source.display()))?;
            let ignored = ctx
                .files()
                .iter()
                .filter(|f| ctx.is_ignore(&f.path))
                .count();
            println!(
                "ok: component '{}' with {} file(s), {} ignored",
                ctx.name(),
                ctx.files().len(),
                ignored
            );
        }
    }

    Ok(())
}
