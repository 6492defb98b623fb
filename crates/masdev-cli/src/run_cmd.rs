//! `masdev run` command: launch every application in a directory.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use masdev_core::discovery::discover_candidates;
use masdev_core::orchestrator::{
    FixedAnswer, OrchestrationReport, RerunChoice, RerunPrompt, run_orchestrator,
};
use masdev_core::sink::{ConsoleSink, JsonSink, Sink};
use masdev_core::toolchain::Toolchain;

use crate::OutputFormat;
use crate::prompt::InquirePrompt;

/// How to answer when an application is already running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RerunMode {
    Ask,
    Always(RerunChoice),
}

impl RerunMode {
    pub fn from_flags(stop_running: bool, no_input: bool) -> Self {
        match (stop_running, no_input) {
            (true, _) => Self::Always(RerunChoice::StopAndRerun),
            (false, true) => Self::Always(RerunChoice::Cancel),
            (false, false) => Self::Ask,
        }
    }

    fn prompt(self) -> Box<dyn RerunPrompt> {
        match self {
            Self::Ask => Box::new(InquirePrompt),
            Self::Always(choice) => Box::new(FixedAnswer(choice)),
        }
    }
}

pub struct RunOptions {
    pub rerun: RerunMode,
    pub format: OutputFormat,
}

/// Run the run command.
pub async fn run_apps(toolchain: &dyn Toolchain, dir: &Path, options: &RunOptions) -> Result<()> {
    let mut sink: Box<dyn Sink> = match options.format {
        OutputFormat::Text => Box::new(ConsoleSink::stdout()),
        OutputFormat::Json => Box::new(JsonSink::stdout()),
    };
    let mut prompt = options.rerun.prompt();

    // Set up graceful shutdown: first signal stops the pass, second force-exits.
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    let got_first_signal = Arc::new(AtomicBool::new(false));
    let got_first_clone = Arc::clone(&got_first_signal);

    tokio::spawn(async move {
        loop {
            tokio::signal::ctrl_c().await.ok();
            if got_first_clone.swap(true, Ordering::SeqCst) {
                eprintln!("\nForce exit.");
                std::process::exit(130);
            }
            eprintln!("\nStopping after the current application (Ctrl+C again to force)...");
            cancel_clone.cancel();
        }
    });

    let report = run_in(toolchain, dir, prompt.as_mut(), sink.as_mut(), cancel).await?;

    if report.was_interrupted() {
        eprintln!("Run interrupted. Remaining applications were not launched.");
        std::process::exit(130);
    }
    if !report.is_success() {
        let failed: Vec<&str> = report
            .outcomes
            .iter()
            .filter(|o| o.outcome.is_failure())
            .map(|o| o.file_name.as_str())
            .collect();
        eprintln!("Failed applications: {}", failed.join(", "));
        std::process::exit(1);
    }
    Ok(())
}

/// Discover the applications in `dir` and run them through the
/// orchestrator, managing the sink's lifecycle around the pass.
///
/// Discovery failures abort before anything is launched.
pub async fn run_in(
    toolchain: &dyn Toolchain,
    dir: &Path,
    prompt: &mut dyn RerunPrompt,
    sink: &mut dyn Sink,
    cancel: CancellationToken,
) -> Result<OrchestrationReport> {
    let candidates = discover_candidates(dir)?;
    tracing::info!(dir = %dir.display(), count = candidates.len(), "discovered applications");

    sink.open().context("failed to open output")?;
    sink.clear();
    sink.show();

    let report = run_orchestrator(&candidates, dir, toolchain, prompt, sink, cancel).await;

    sink.close().context("failed to flush output")?;
    Ok(report)
}
