//! Configuration inspection commands.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;

use crate::config::CellConfig;

#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: Option<ConfigSubcommands>,
}

#[derive(Subcommand, Debug)]
enum ConfigSubcommands {
    /// Show the effective configuration (default)
    Show,

    /// Print the configuration file path
    Path,
}

impl ConfigCommand {
    pub fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        match self.command {
            Some(ConfigSubcommands::Show) | None => Self::show(config_path),
            Some(ConfigSubcommands::Path) => Self::show_path(config_path),
        }
    }

    fn show(config_path: Option<PathBuf>) -> Result<()> {
        let path = resolve_path(config_path)?;
        let config = CellConfig::load_with_optional(Some(path.clone()))?;

        println!("{}", "Configuration".bold());
        if path.exists() {
            println!("Location: {}\n", path.display());
        } else {
            println!("Location: {} {}\n", path.display(), "(not found, using defaults)".dimmed());
        }
        print!("{}", config.to_toml()?);
        Ok(())
    }

    fn show_path(config_path: Option<PathBuf>) -> Result<()> {
        println!("{}", resolve_path(config_path)?.display());
        Ok(())
    }
}

fn resolve_path(config_path: Option<PathBuf>) -> Result<PathBuf> {
    match config_path {
        Some(path) => Ok(path),
        None => CellConfig::default_path(),
    }
}
