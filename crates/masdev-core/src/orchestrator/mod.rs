//! Launch orchestrator: runs every discovered application in order, one at
//! a time.
//!
//! For each candidate the orchestrator decides whether to launch it fresh,
//! stop an already-running instance first, or skip it. A launched process
//! is awaited until its terminal event before the next candidate starts, so
//! there is never more than one process streaming into the sink.

pub mod prompt;

use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::bridge::{Terminal, forward_to_sink};
use crate::discovery::LaunchCandidate;
use crate::probe::{RunningSet, list_running};
use crate::sink::{Sink, separator};
use crate::toolchain::Toolchain;

pub use prompt::{FixedAnswer, RerunChoice, RerunPrompt};

/// What to do with one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchDecision {
    /// Not running; launch it.
    RunFresh,
    /// Running; stop the existing instance, then launch.
    StopThenRun,
    /// Running and the user declined; leave it alone.
    Skip,
}

/// How one candidate's step of the pass ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// The application exited with code 0.
    Completed,
    /// The application exited with a non-zero code.
    ExitedWithCode(i32),
    /// The application ended without an exit code (killed by a signal).
    Terminated,
    /// The application could not be spawned or waited on.
    SpawnFailed(String),
    /// Already running and not relaunched.
    Skipped,
    /// Stopping the running instance failed, so nothing was launched.
    StopFailed(String),
    /// The pass was cancelled before this candidate started.
    Interrupted,
}

impl LaunchOutcome {
    /// True for outcomes that should make the overall run fail.
    ///
    /// A signal-terminated application is not a failure: Ctrl-C reaches the
    /// child as well, and a stopped MAS is the expected result of that.
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Completed | Self::Skipped | Self::Terminated)
    }
}

/// Outcome of one candidate, keyed by its descriptor file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateOutcome {
    pub file_name: String,
    pub outcome: LaunchOutcome,
}

/// Result of an orchestration pass, in candidate order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrchestrationReport {
    pub outcomes: Vec<CandidateOutcome>,
}

impl OrchestrationReport {
    /// True when no candidate failed.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| !o.outcome.is_failure())
    }

    /// True when the pass was cut short by cancellation.
    pub fn was_interrupted(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| o.outcome == LaunchOutcome::Interrupted)
    }

    fn record(&mut self, candidate: &LaunchCandidate, outcome: LaunchOutcome) {
        self.outcomes.push(CandidateOutcome {
            file_name: candidate.file_name.clone(),
            outcome,
        });
    }
}

/// Decide what to do with `candidate` given the running set.
///
/// Only candidates that are already running reach the prompt.
pub async fn decide(
    candidate: &LaunchCandidate,
    running: &RunningSet,
    prompt: &mut dyn RerunPrompt,
) -> LaunchDecision {
    if !running.contains(&candidate.derived_name) {
        return LaunchDecision::RunFresh;
    }
    match prompt.confirm_rerun(&candidate.derived_name).await {
        RerunChoice::StopAndRerun => LaunchDecision::StopThenRun,
        RerunChoice::Cancel => LaunchDecision::Skip,
    }
}

/// Run an orchestration pass over `candidates`, in order, in `cwd`.
///
/// The running set is probed once, before the first candidate. Each
/// launched process is awaited to its terminal event before the next
/// candidate is considered. Cancellation stops the pass from advancing; it
/// never kills a process that is already running.
pub async fn run_orchestrator(
    candidates: &[LaunchCandidate],
    cwd: &Path,
    toolchain: &dyn Toolchain,
    prompt: &mut dyn RerunPrompt,
    sink: &mut dyn Sink,
    cancel: CancellationToken,
) -> OrchestrationReport {
    let mut report = OrchestrationReport::default();

    sink.append_line("🚀 Verifying JaCaMo Application(s) before running...");

    let running = list_running(toolchain, cwd, sink).await;
    if !running.is_empty() {
        let names: Vec<&str> = running.iter().map(String::as_str).collect();
        sink.append_line(&format!("ℹ️ Found running MAS: {}", names.join(", ")));
    }

    sink.append_line(&format!("📂 Running .jcm files in: {}", cwd.display()));
    sink.append_line(&separator());

    for candidate in candidates {
        if cancel.is_cancelled() {
            info!(app = %candidate.file_name, "orchestration cancelled, not launching");
            report.record(candidate, LaunchOutcome::Interrupted);
            continue;
        }

        let name = &candidate.derived_name;
        match decide(candidate, &running, prompt).await {
            LaunchDecision::RunFresh => {}
            LaunchDecision::StopThenRun => {
                sink.append_line(&format!("⏳ Stopping existing MAS: {name}"));
                if let Err(e) = toolchain.stop_instance(name, cwd).await {
                    error!(app = %name, error = %e, "failed to stop running instance");
                    sink.append_line(&format!("❌ Error stopping MAS '{name}': {e}"));
                    sink.append_line(&format!("⏩ Skipping launch of: {name}"));
                    report.record(candidate, LaunchOutcome::StopFailed(e.to_string()));
                    continue;
                }
                sink.append_line(&format!("✅ MAS '{name}' stopped successfully."));
            }
            LaunchDecision::Skip => {
                sink.append_line(&format!(
                    "⏩ Skipping already running application: {name}"
                ));
                report.record(candidate, LaunchOutcome::Skipped);
                continue;
            }
        }

        let outcome = launch(candidate, cwd, toolchain, sink).await;
        report.record(candidate, outcome);
    }

    report
}

/// Launch one candidate and wait for it to end.
async fn launch(
    candidate: &LaunchCandidate,
    cwd: &Path,
    toolchain: &dyn Toolchain,
    sink: &mut dyn Sink,
) -> LaunchOutcome {
    let file = &candidate.file_name;
    sink.append_line(&format!("▶️ Running: {file}"));
    info!(app = %file, cwd = %cwd.display(), "launching application");

    let terminal = forward_to_sink(toolchain.launch(file, cwd), sink).await;

    match terminal {
        Terminal::Errored(message) => {
            error!(app = %file, error = %message, "error running application");
            sink.append_line(&format!("❌ Execution Error: {message}"));
            LaunchOutcome::SpawnFailed(message)
        }
        Terminal::Closed(code) => {
            sink.append_line(&separator());
            match code {
                Some(0) => {
                    sink.append_line(&format!(
                        "✅ Application '{file}' completed successfully."
                    ));
                    info!(app = %file, "application completed successfully");
                    LaunchOutcome::Completed
                }
                Some(code) => {
                    sink.append_line(&format!(
                        "⚠️ Application '{file}' exited with code {code}."
                    ));
                    warn!(app = %file, code, "application exited with non-zero code");
                    LaunchOutcome::ExitedWithCode(code)
                }
                None => {
                    warn!(app = %file, "application ended without an exit code");
                    LaunchOutcome::Terminated
                }
            }
        }
    }
}
