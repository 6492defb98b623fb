//! JaCaMo toolchain adapter.
//!
//! Runs the `jacamo` executable (or whatever path is configured) for
//! one-shot sub-commands and streams `jacamo <app>.jcm` runs through the
//! process bridge.

use std::path::Path;

use async_trait::async_trait;

use super::trait_def::Toolchain;
use crate::bridge::{self, BridgeStream, CommandOutput};
use crate::config::ToolchainConfig;
use crate::error::ToolchainError;

/// Adapter for the [JaCaMo](https://jacamo-lang.github.io/) command-line tool.
#[derive(Debug, Clone)]
pub struct JacamoToolchain {
    /// Path to the `jacamo` binary. Defaults to `"jacamo"` (found via `$PATH`).
    binary_path: String,
}

impl JacamoToolchain {
    /// Create an adapter that looks for `jacamo` on `$PATH`.
    pub fn new() -> Self {
        Self::with_binary(ToolchainConfig::DEFAULT_BINARY)
    }

    /// Create an adapter with a custom binary path.
    pub fn with_binary(path: impl Into<String>) -> Self {
        Self {
            binary_path: path.into(),
        }
    }

    pub fn from_config(config: &ToolchainConfig) -> Self {
        Self::with_binary(config.binary_path.clone())
    }

    pub fn binary_path(&self) -> &str {
        &self.binary_path
    }
}

impl Default for JacamoToolchain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Toolchain for JacamoToolchain {
    fn name(&self) -> &str {
        "jacamo"
    }

    async fn execute(&self, args: &[String], cwd: &Path) -> Result<CommandOutput, ToolchainError> {
        bridge::execute_command(&self.binary_path, args, cwd).await
    }

    fn launch(&self, app_file: &str, cwd: &Path) -> BridgeStream {
        bridge::stream_process(&self.binary_path, &[app_file.to_string()], cwd)
    }
}
