//! User configuration for rendercell.
//!
//! # Location
//!
//! - **Unix/macOS**: `~/.rendercell/config.toml`
//! - **Windows**: `%LOCALAPPDATA%\rendercell\config.toml`
//!
//! The CLI also accepts an explicit path through `--config` or the
//! `RENDERCELL_CONFIG_PATH` environment variable. A missing file is not an
//! error; every setting has a default.
//!
//! # File Format
//!
//! ```toml
//! [cache]
//! capacity = 256          # entries; must be greater than zero
//! lock_policy = "per-key" # or "global"
//!
//! [templating]
//! enabled = true          # false returns template sources verbatim
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cache::{DEFAULT_CAPACITY, LockPolicy};
use crate::core::CellError;

const fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

const fn default_true() -> bool {
    true
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CellConfig {
    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub templating: TemplatingConfig,
}

/// The `[cache]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Maximum number of cached renders.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// How concurrent misses are serialized.
    #[serde(default)]
    pub lock_policy: LockPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            lock_policy: LockPolicy::default(),
        }
    }
}

/// The `[templating]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplatingConfig {
    /// When false, template components return their source unrendered.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for TemplatingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
        }
    }
}

impl CellConfig {
    /// Load from `path` if given, otherwise from [`CellConfig::default_path`].
    ///
    /// A file that does not exist yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, does not parse,
    /// or fails [`CellConfig::validate`].
    pub fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };

        if path.exists() {
            Self::load_from(&path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load and validate the configuration at `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        config.validate().with_context(|| format!("Invalid config in {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Platform default location of the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the home (or, on Windows, local data) directory
    /// cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("rendercell")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".rendercell")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Check semantic constraints TOML parsing cannot express.
    pub fn validate(&self) -> Result<(), CellError> {
        if self.cache.capacity == 0 {
            return Err(CellError::CapacityViolation {
                requested: self.cache.capacity,
            });
        }
        Ok(())
    }

    /// Serialize as pretty TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
