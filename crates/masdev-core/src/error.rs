//! Typed errors for the library seams.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from invoking the external toolchain.
#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to wait on '{command}': {source}")]
    Wait {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("'{command}' exited with {}: {}", exit_label(.code), failure_text(.stdout, .stderr))]
    Failed {
        command: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

impl ToolchainError {
    /// True when the tool reported that its companion service is not
    /// running. `mas list` fails this way when nothing has been started.
    ///
    /// Only what the tool printed counts; the command line (which holds the
    /// configured binary path) is never searched.
    pub fn is_not_running(&self) -> bool {
        match self {
            Self::Failed { stdout, stderr, .. } => [stdout, stderr]
                .iter()
                .any(|text| text.to_lowercase().contains("not running")),
            Self::Spawn { .. } | Self::Wait { .. } => false,
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "a signal".to_string(),
    }
}

fn failure_text(stdout: &str, stderr: &str) -> String {
    let stderr = stderr.trim();
    let stdout = stdout.trim();
    match (stderr.is_empty(), stdout.is_empty()) {
        (false, false) => format!("{stderr}\n{stdout}"),
        (false, true) => stderr.to_string(),
        (true, false) => stdout.to_string(),
        (true, true) => "no output".to_string(),
    }
}

/// Errors from locating application descriptors.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("error reading directory '{}': {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no .jcm files found in '{}'", path.display())]
    NoApplications { path: PathBuf },
}

/// Errors from resolving or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "the jacamo executable is not configured and '{binary}' is not available on PATH \
         ({reason}); run `masdev init --jacamo-path <path>` or set MASDEV_JACAMO_PATH"
    )]
    ToolchainUnavailable { binary: String, reason: String },

    #[error("invalid application name {0:?}: {1}")]
    InvalidAppName(String, &'static str),
}
