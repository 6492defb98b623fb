//! Application management outside the run pass: scaffolding a new
//! application and stopping whatever is running.

use std::path::Path;

use tracing::info;

use crate::bridge::CommandOutput;
use crate::error::{ConfigError, ToolchainError};
use crate::probe::parse_instances;
use crate::sink::Sink;
use crate::toolchain::Toolchain;

/// Check an application name before handing it to the toolchain.
pub fn validate_app_name(name: &str) -> Result<(), ConfigError> {
    if name.trim().is_empty() {
        return Err(ConfigError::InvalidAppName(
            name.to_string(),
            "application name is required",
        ));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidAppName(
            name.to_string(),
            "application name must not contain whitespace",
        ));
    }
    if name.contains(['/', '\\']) {
        return Err(ConfigError::InvalidAppName(
            name.to_string(),
            "application name must not contain path separators",
        ));
    }
    Ok(())
}

/// Scaffold a new application called `name` inside `cwd`.
pub async fn create_app(
    toolchain: &dyn Toolchain,
    name: &str,
    cwd: &Path,
) -> anyhow::Result<CommandOutput> {
    validate_app_name(name)?;
    info!(app = name, cwd = %cwd.display(), "creating application");
    let output = toolchain.create_app(name, cwd).await?;
    Ok(output)
}

/// Write raw tool output to the sink unless it is blank.
fn echo(sink: &mut dyn Sink, text: &str) {
    if !text.trim().is_empty() {
        sink.append_line(text.trim_end());
    }
}

/// Result of [`stop_first_running`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    NothingRunning,
    Stopped { name: String },
}

/// Stop the first instance `mas list` reports.
///
/// The listing and the stop command's output are echoed to the sink
/// verbatim. A listing that fails because the toolchain's service is not
/// running means there is nothing to stop.
pub async fn stop_first_running(
    toolchain: &dyn Toolchain,
    cwd: &Path,
    sink: &mut dyn Sink,
) -> Result<StopOutcome, ToolchainError> {
    sink.append_line("🔍 Listing running MAS...");

    let listing = match toolchain.list_instances(cwd).await {
        Ok(out) => out,
        Err(e) if e.is_not_running() => {
            sink.append_line("❌ No running MAS found.");
            return Ok(StopOutcome::NothingRunning);
        }
        Err(e) => return Err(e),
    };
    echo(sink, &listing.stdout);

    let Some(first) = parse_instances(&listing.stdout).into_iter().next() else {
        sink.append_line("❌ No running MAS found.");
        return Ok(StopOutcome::NothingRunning);
    };

    sink.append_line(&format!("🛑 Stopping MAS: {}", first.name));
    let stopped = toolchain.stop_instance(&first.name, cwd).await?;
    echo(sink, &stopped.stdout);
    echo(sink, &stopped.stderr);

    info!(app = %first.name, "stopped running instance");
    Ok(StopOutcome::Stopped { name: first.name })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names() {
        validate_app_name("hello_world").unwrap();
        validate_app_name("gold-miners2").unwrap();
    }

    #[test]
    fn invalid_names() {
        for name in ["", "   ", "two words", "a/b", "a\\b"] {
            assert!(validate_app_name(name).is_err(), "{name:?} should be rejected");
        }
    }
}
