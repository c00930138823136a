//! Command-line interface for rendercell.
//!
//! # Commands
//!
//! - `render` - render a built-in component, directly or through a cache
//! - `cache` - exercise a render cache and report its statistics
//! - `config` - inspect the configuration file
//!
//! # Global Options
//!
//! - `--verbose` / `-v` - debug logging
//! - `--quiet` / `-q` - errors only
//! - `--config` / `-c` - config file path (also `RENDERCELL_CONFIG_PATH`)
//!
//! Rendered output goes to stdout; logs and statistics go to stderr, so output
//! can be piped cleanly.
//!
//! # Examples
//!
//! ```bash
//! rendercell render formal-greeter --set name=Macron
//! rendercell render layout --set heading=Summit --nested-text "<p>agenda</p>"
//! rendercell render formal-greeter --set name=Merkel --memoized --repeat 3
//! rendercell cache demo --capacity 2
//! rendercell config show
//! ```

mod cache;
mod config;
mod render;


use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Main CLI structure for rendercell.
#[derive(Parser, Debug)]
#[command(
    name = "rendercell",
    about = "Render and memoize composable markup components",
    version,
    long_about = "rendercell renders markup components from named inputs, composes them \
                  through nested content, and memoizes plain renders in a bounded LRU cache."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true, env = "RENDERCELL_CONFIG_PATH", value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a built-in component
    Render(render::RenderCommand),

    /// Exercise a render cache
    Cache(cache::CacheCommand),

    /// Inspect configuration
    Config(config::ConfigCommand),
}

impl Cli {
    /// Log filter implied by the global flags, if any.
    ///
    /// `None` means the caller should fall back to `RUST_LOG` or `info`.
    #[must_use]
    pub fn log_filter(&self) -> Option<&'static str> {
        if self.verbose {
            Some("debug")
        } else if self.quiet {
            Some("error")
        } else {
            None
        }
    }

    /// Run the selected command.
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Render(cmd) => cmd.execute(self.config),
            Commands::Cache(cmd) => cmd.execute(self.config),
            Commands::Config(cmd) => cmd.execute(self.config),
        }
    }
}
