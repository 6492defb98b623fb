use std::env;
use std::path::Path;

use tracing::debug;

use crate::error::ConfigError;
use crate::toolchain::Toolchain;

/// Toolchain configuration.
///
/// Reads from the `MASDEV_JACAMO_PATH` environment variable, falling back
/// to a bare `jacamo` resolved through `$PATH` when unset or blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainConfig {
    /// Path to the `jacamo` executable.
    pub binary_path: String,
}

impl ToolchainConfig {
    /// The executable used when nothing is configured.
    pub const DEFAULT_BINARY: &str = "jacamo";

    /// Environment variable overriding the executable path.
    pub const ENV_VAR: &str = "MASDEV_JACAMO_PATH";

    /// Build a config from the environment.
    pub fn from_env() -> Self {
        let binary_path = env::var(Self::ENV_VAR)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| Self::DEFAULT_BINARY.to_owned());
        Self { binary_path }
    }

    /// Build a config from an explicit path. A blank path means the default.
    pub fn new(binary_path: impl Into<String>) -> Self {
        let binary_path = binary_path.into();
        if binary_path.trim().is_empty() {
            Self::default_binary()
        } else {
            Self { binary_path }
        }
    }

    fn default_binary() -> Self {
        Self {
            binary_path: Self::DEFAULT_BINARY.to_owned(),
        }
    }

    /// True when no explicit executable was configured.
    pub fn is_default(&self) -> bool {
        self.binary_path == Self::DEFAULT_BINARY
    }
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Check the toolchain can be used before any process is spawned.
///
/// An explicitly configured path is trusted as-is. The bare default is
/// probed with `--version`; if that fails the user has to configure a path.
pub async fn validate_toolchain(
    config: &ToolchainConfig,
    toolchain: &dyn Toolchain,
    cwd: &Path,
) -> Result<(), ConfigError> {
    if !config.is_default() {
        return Ok(());
    }
    match toolchain.version(cwd).await {
        Ok(out) => {
            debug!(version = %out.stdout.trim(), "toolchain available");
            Ok(())
        }
        Err(e) => Err(ConfigError::ToolchainUnavailable {
            binary: config.binary_path.clone(),
            reason: e.to_string(),
        }),
    }
}
