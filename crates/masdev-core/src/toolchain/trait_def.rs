//! The `Toolchain` trait -- the seam between masdev and the external tool.
//!
//! The trait is object-safe so the orchestrator can hold a
//! `&dyn Toolchain` and tests can substitute a scripted fake.

use std::path::Path;

use async_trait::async_trait;

use crate::bridge::{BridgeStream, CommandOutput};
use crate::error::ToolchainError;

/// Adapter interface for the multi-agent-system runtime toolchain.
///
/// The provided methods build the concrete sub-command shapes on top of
/// [`Toolchain::execute`], so an implementor only decides how a command
/// line is run.
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// Human-readable name for this toolchain (e.g. "jacamo").
    fn name(&self) -> &str;

    /// Run a sub-command to completion in `cwd`.
    async fn execute(&self, args: &[String], cwd: &Path) -> Result<CommandOutput, ToolchainError>;

    /// Start an application descriptor in `cwd` and stream its output.
    fn launch(&self, app_file: &str, cwd: &Path) -> BridgeStream;

    /// `mas list`: report running instances as `<name>@<host>` lines.
    async fn list_instances(&self, cwd: &Path) -> Result<CommandOutput, ToolchainError> {
        self.execute(&["mas".to_string(), "list".to_string()], cwd)
            .await
    }

    /// `mas stop <name> --exit`.
    async fn stop_instance(&self, name: &str, cwd: &Path) -> Result<CommandOutput, ToolchainError> {
        let args = [
            "mas".to_string(),
            "stop".to_string(),
            name.to_string(),
            "--exit".to_string(),
        ];
        self.execute(&args, cwd).await
    }

    /// `app create <name> --console`.
    async fn create_app(&self, name: &str, cwd: &Path) -> Result<CommandOutput, ToolchainError> {
        let args = [
            "app".to_string(),
            "create".to_string(),
            name.to_string(),
            "--console".to_string(),
        ];
        self.execute(&args, cwd).await
    }

    /// `--version`, used to check the tool is reachable at all.
    async fn version(&self, cwd: &Path) -> Result<CommandOutput, ToolchainError> {
        self.execute(&["--version".to_string()], cwd).await
    }
}

// Compile-time assertion: Toolchain must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn Toolchain) {}
};
