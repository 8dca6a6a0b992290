use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::generator::PasswordOptions;
use crate::crypto::kdf::{DEFAULT_ITERATIONS, MIN_ITERATIONS};
use crate::errors::{Result, VaultError};
use crate::vault::SessionPolicy;

/// Data-directory configuration, loaded from `velano.toml`.
///
/// Every field has a sensible default so Velano works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// PBKDF2 iteration count for new accounts and password changes.
    #[serde(default = "default_iterations")]
    pub default_iterations: u32,

    /// File (relative to the data directory) holding the account record.
    #[serde(default = "default_storage_file")]
    pub storage_file: String,

    /// Default length for `velano generate`.
    #[serde(default = "default_generator_length")]
    pub generator_length: usize,

    /// Include symbols in generated passwords by default.
    #[serde(default = "default_true")]
    pub generator_symbols: bool,

    /// Include digits in generated passwords by default.
    #[serde(default = "default_true")]
    pub generator_numbers: bool,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

fn default_storage_file() -> String {
    "vault.json".to_string()
}

fn default_generator_length() -> usize {
    16
}

fn default_true() -> bool {
    true
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_iterations: default_iterations(),
            storage_file: default_storage_file(),
            generator_length: default_generator_length(),
            generator_symbols: default_true(),
            generator_numbers: default_true(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the data directory.
    pub const FILE_NAME: &'static str = "velano.toml";

    /// Load settings from `<data_dir>/velano.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed or holds an unusable value,
    /// an error is returned.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.default_iterations < MIN_ITERATIONS {
            return Err(VaultError::ConfigError(format!(
                "default_iterations must be at least {MIN_ITERATIONS} (got {})",
                self.default_iterations
            )));
        }
        if self.storage_file.trim().is_empty() {
            return Err(VaultError::ConfigError("storage_file cannot be empty".into()));
        }
        Ok(())
    }

    /// Full path of the store file.
    ///
    /// Example: `data_dir/vault.json`
    pub fn storage_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.storage_file)
    }

    /// The subset of settings the vault core cares about.
    pub fn session_policy(&self) -> SessionPolicy {
        SessionPolicy {
            default_iterations: self.default_iterations,
        }
    }

    /// Generator defaults, before any command-line overrides.
    pub fn password_options(&self) -> PasswordOptions {
        PasswordOptions {
            length: self.generator_length,
            numbers: self.generator_numbers,
            symbols: self.generator_symbols,
            ..PasswordOptions::default()
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
