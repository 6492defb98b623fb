//! Configuration file management for masdev.
//!
//! Provides a TOML-based config file at `~/.config/masdev/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use masdev_core::config::ToolchainConfig;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub toolchain: ToolchainSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ToolchainSection {
    /// Path to the jacamo executable. Blank or missing means `jacamo` on PATH.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jacamo_path: Option<String>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the masdev config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/masdev` or `~/.config/masdev`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.is_empty() {
            return PathBuf::from(xdg).join("masdev");
        }
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("masdev")
}

/// Return the path to the masdev config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Parse config file contents.
pub fn parse_config(contents: &str) -> Result<ConfigFile> {
    toml::from_str(contents).context("failed to parse config file")
}

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    parse_config(&contents)
}

/// Serialize and write the config file, creating parent dirs as needed.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    Ok(path)
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct MasdevConfig {
    pub toolchain: ToolchainConfig,
}

impl MasdevConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// Blank values at any level fall through to the next one. A config
    /// file that exists but cannot be parsed is an error; a missing one is not.
    pub fn resolve(cli_jacamo_path: Option<&str>) -> Result<Self> {
        let file_path = if config_path().exists() {
            load_config()?.toolchain.jacamo_path
        } else {
            None
        };
        let env_path = std::env::var(ToolchainConfig::ENV_VAR).ok();

        let binary_path = [cli_jacamo_path.map(str::to_string), env_path, file_path]
            .into_iter()
            .flatten()
            .find(|p| !p.trim().is_empty())
            .unwrap_or_else(|| ToolchainConfig::DEFAULT_BINARY.to_string());

        tracing::debug!(jacamo_path = %binary_path, "resolved toolchain path");
        Ok(Self {
            toolchain: ToolchainConfig::new(binary_path),
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
