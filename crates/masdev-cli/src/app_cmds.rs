//! `masdev create`, `masdev stop` and `masdev list` commands.

use std::path::Path;

use anyhow::{Context, Result};
use inquire::Text;

use masdev_core::app::{StopOutcome, create_app, stop_first_running};
use masdev_core::probe::list_running;
use masdev_core::sink::{ConsoleSink, Sink};
use masdev_core::toolchain::Toolchain;

/// Ask for an application name on the terminal.
fn prompt_for_name() -> Result<String> {
    Text::new("Enter the name of the new JaCaMo application:")
        .prompt()
        .context("no application name given")
}

/// Run the create command, prompting for the name when it is missing.
pub async fn run_create(toolchain: &dyn Toolchain, name: Option<String>, cwd: &Path) -> Result<()> {
    let name = match name {
        Some(name) => name,
        None => tokio::task::spawn_blocking(prompt_for_name)
            .await
            .context("name prompt failed")??,
    };

    let mut sink = ConsoleSink::stdout();
    create_in(toolchain, &name, cwd, &mut sink).await?;
    sink.close()?;
    Ok(())
}

async fn create_in(
    toolchain: &dyn Toolchain,
    name: &str,
    cwd: &Path,
    sink: &mut dyn Sink,
) -> Result<()> {
    let output = create_app(toolchain, name, cwd).await?;
    for text in [&output.stdout, &output.stderr] {
        if !text.trim().is_empty() {
            sink.append_line(text.trim_end());
        }
    }
    sink.append_line(&format!(
        "✅ JaCaMo application '{name}' created in {}",
        cwd.display()
    ));
    Ok(())
}

/// Run the stop command.
pub async fn run_stop(toolchain: &dyn Toolchain, cwd: &Path) -> Result<()> {
    let mut sink = ConsoleSink::stdout();
    let outcome = stop_first_running(toolchain, cwd, &mut sink).await;
    sink.close()?;

    match outcome.context("failed to stop MAS")? {
        StopOutcome::NothingRunning => tracing::warn!("no running MAS to stop"),
        StopOutcome::Stopped { name } => tracing::info!(app = %name, "MAS stopped"),
    }
    Ok(())
}

/// Run the list command.
pub async fn run_list(toolchain: &dyn Toolchain, cwd: &Path) -> Result<()> {
    let mut sink = ConsoleSink::stdout();
    list_in(toolchain, cwd, &mut sink).await;
    sink.close()?;
    Ok(())
}

async fn list_in(toolchain: &dyn Toolchain, cwd: &Path, sink: &mut dyn Sink) {
    let running = list_running(toolchain, cwd, sink).await;
    if running.is_empty() {
        sink.append_line("No running MAS found.");
        return;
    }
    for name in &running {
        sink.append_line(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use masdev_core::bridge::CommandOutput;
    use masdev_test_utils::{FakeToolchain, MemorySink};

    #[tokio::test]
    async fn create_echoes_tool_output_and_confirms() {
        let toolchain = FakeToolchain::new().respond("app create miners --console", || {
            Ok(CommandOutput {
                stdout: "Creating application miners\n".into(),
                stderr: String::new(),
            })
        });
        let mut sink = MemorySink::new();

        create_in(&toolchain, "miners", Path::new("/work"), &mut sink)
            .await
            .unwrap();

        assert_eq!(
            sink.lines,
            vec![
                "Creating application miners",
                "✅ JaCaMo application 'miners' created in /work",
            ]
        );
    }

    #[tokio::test]
    async fn create_failure_is_reported() {
        let toolchain =
            FakeToolchain::new().failing("app create miners --console", "directory exists");
        let mut sink = MemorySink::new();

        let err = create_in(&toolchain, "miners", Path::new("/work"), &mut sink)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("directory exists"));
        assert!(sink.lines.is_empty());
    }

    #[tokio::test]
    async fn list_prints_sorted_names() {
        let toolchain = FakeToolchain::new().with_running(&["zeta", "alpha"]);
        let mut sink = MemorySink::new();

        list_in(&toolchain, Path::new("/work"), &mut sink).await;

        assert_eq!(sink.lines, vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn list_with_nothing_running() {
        let toolchain = FakeToolchain::new().failing("mas list", "server is not running");
        let mut sink = MemorySink::new();

        list_in(&toolchain, Path::new("/work"), &mut sink).await;

        assert_eq!(sink.lines, vec!["No running MAS found."]);
    }
}
