//! Tests for the launch orchestrator: decision policy, stop-then-rerun
//! sequencing, and one-at-a-time launches.

use std::path::Path;

use tokio_util::sync::CancellationToken;

use masdev_core::bridge::Terminal;
use masdev_core::classify::{AgentIcon, Category};
use masdev_core::discovery::LaunchCandidate;
use masdev_core::orchestrator::{LaunchOutcome, RerunChoice, run_orchestrator};
use masdev_test_utils::{Call, FakeToolchain, MemorySink, ScriptedPrompt, ScriptedRun};

fn candidates(names: &[&str]) -> Vec<LaunchCandidate> {
    names
        .iter()
        .map(|n| LaunchCandidate::from_file_name(&format!("{n}.jcm")).unwrap())
        .collect()
}

fn cwd() -> &'static Path {
    Path::new("/tmp")
}

fn outcomes(report: &masdev_core::orchestrator::OrchestrationReport) -> Vec<(String, LaunchOutcome)> {
    report
        .outcomes
        .iter()
        .map(|o| (o.file_name.clone(), o.outcome.clone()))
        .collect()
}

// ===========================================================================
// Stop-and-rerun
// ===========================================================================

#[tokio::test]
async fn stop_and_rerun_stops_before_launching_and_runs_sequentially() {
    let toolchain = FakeToolchain::new().with_running(&["alpha"]);
    let mut prompt = ScriptedPrompt::new([RerunChoice::StopAndRerun]);
    let mut sink = MemorySink::new();

    let report = run_orchestrator(
        &candidates(&["alpha", "beta"]),
        cwd(),
        &toolchain,
        &mut prompt,
        &mut sink,
        CancellationToken::new(),
    )
    .await;

    assert_eq!(
        toolchain.journal(),
        vec![
            Call::Execute("mas list".into()),
            Call::Execute("mas stop alpha --exit".into()),
            Call::LaunchStarted("alpha.jcm".into()),
            Call::LaunchFinished("alpha.jcm".into()),
            Call::LaunchStarted("beta.jcm".into()),
            Call::LaunchFinished("beta.jcm".into()),
        ]
    );
    assert_eq!(toolchain.launched().len(), 2);
    assert_eq!(prompt.asked, vec!["alpha"]);
    assert!(report.is_success());
    assert!(sink.contains("⏳ Stopping existing MAS: alpha"));
    assert!(sink.contains("✅ MAS 'alpha' stopped successfully."));
}

#[tokio::test]
async fn cancel_skips_running_application_only() {
    let toolchain = FakeToolchain::new().with_running(&["alpha"]);
    let mut prompt = ScriptedPrompt::new([RerunChoice::Cancel]);
    let mut sink = MemorySink::new();

    let report = run_orchestrator(
        &candidates(&["alpha", "beta"]),
        cwd(),
        &toolchain,
        &mut prompt,
        &mut sink,
        CancellationToken::new(),
    )
    .await;

    assert_eq!(toolchain.launched(), vec!["beta.jcm"]);
    assert_eq!(toolchain.executed(), vec!["mas list"]);
    assert_eq!(
        outcomes(&report),
        vec![
            ("alpha.jcm".to_string(), LaunchOutcome::Skipped),
            ("beta.jcm".to_string(), LaunchOutcome::Completed),
        ]
    );
    assert!(sink.contains("⏩ Skipping already running application: alpha"));
}

#[tokio::test]
async fn failed_stop_skips_candidate_and_continues() {
    let toolchain = FakeToolchain::new()
        .with_running(&["alpha"])
        .failing("mas stop alpha --exit", "permission denied");
    let mut prompt = ScriptedPrompt::new([RerunChoice::StopAndRerun]);
    let mut sink = MemorySink::new();

    let report = run_orchestrator(
        &candidates(&["alpha", "beta"]),
        cwd(),
        &toolchain,
        &mut prompt,
        &mut sink,
        CancellationToken::new(),
    )
    .await;

    assert_eq!(toolchain.launched(), vec!["beta.jcm"]);
    assert!(matches!(
        &report.outcomes[0].outcome,
        LaunchOutcome::StopFailed(msg) if msg.contains("permission denied")
    ));
    assert_eq!(report.outcomes[1].outcome, LaunchOutcome::Completed);
    assert!(!report.is_success());
    assert!(sink.contains("❌ Error stopping MAS 'alpha'"));
    assert!(sink.contains("⏩ Skipping launch of: alpha"));
}

// ===========================================================================
// Probe behaviour inside a pass
// ===========================================================================

#[tokio::test]
async fn running_set_is_probed_once_per_pass() {
    let toolchain = FakeToolchain::new().with_running(&["alpha", "beta"]);
    let mut prompt = ScriptedPrompt::new([RerunChoice::StopAndRerun, RerunChoice::StopAndRerun]);
    let mut sink = MemorySink::new();

    run_orchestrator(
        &candidates(&["alpha", "beta", "gamma"]),
        cwd(),
        &toolchain,
        &mut prompt,
        &mut sink,
        CancellationToken::new(),
    )
    .await;

    let lists = toolchain
        .executed()
        .into_iter()
        .filter(|c| c == "mas list")
        .count();
    assert_eq!(lists, 1);
    assert_eq!(prompt.asked, vec!["alpha", "beta"]);
    assert_eq!(toolchain.launched(), vec!["alpha.jcm", "beta.jcm", "gamma.jcm"]);
    assert!(sink.contains("ℹ️ Found running MAS: alpha, beta"));
}

#[tokio::test]
async fn probe_service_not_running_means_nothing_is_running() {
    let toolchain =
        FakeToolchain::new().failing("mas list", "JaCaMo REST API is not running");
    let mut prompt = ScriptedPrompt::new([]);
    let mut sink = MemorySink::new();

    let report = run_orchestrator(
        &candidates(&["alpha"]),
        cwd(),
        &toolchain,
        &mut prompt,
        &mut sink,
        CancellationToken::new(),
    )
    .await;

    assert!(prompt.asked.is_empty());
    assert_eq!(toolchain.launched(), vec!["alpha.jcm"]);
    assert!(report.is_success());
    assert!(!sink.contains("Error listing MAS"));
}

#[tokio::test]
async fn probe_other_failure_is_logged_and_pass_continues() {
    let toolchain = FakeToolchain::new().failing("mas list", "connection refused");
    let mut prompt = ScriptedPrompt::new([]);
    let mut sink = MemorySink::new();

    run_orchestrator(
        &candidates(&["alpha"]),
        cwd(),
        &toolchain,
        &mut prompt,
        &mut sink,
        CancellationToken::new(),
    )
    .await;

    assert!(sink.contains("⚠️ Error listing MAS"));
    assert_eq!(toolchain.launched(), vec!["alpha.jcm"]);
}

// ===========================================================================
// Terminal events
// ===========================================================================

#[tokio::test]
async fn terminal_events_map_to_outcomes_and_messages() {
    let toolchain = FakeToolchain::new()
        .with_run("ok.jcm", ScriptedRun::exits(0).with_stdout("[bob] found gold near the cave\n"))
        .with_run("bad.jcm", ScriptedRun::exits(3))
        .with_run(
            "killed.jcm",
            ScriptedRun {
                stdout: String::new(),
                terminal: Terminal::Closed(None),
            },
        )
        .with_run(
            "broken.jcm",
            ScriptedRun {
                stdout: String::new(),
                terminal: Terminal::Errored("failed to spawn 'jacamo broken.jcm'".into()),
            },
        );
    let mut prompt = ScriptedPrompt::new([]);
    let mut sink = MemorySink::new();

    let report = run_orchestrator(
        &candidates(&["ok", "bad", "killed", "broken"]),
        cwd(),
        &toolchain,
        &mut prompt,
        &mut sink,
        CancellationToken::new(),
    )
    .await;

    assert_eq!(
        report
            .outcomes
            .iter()
            .map(|o| o.outcome.clone())
            .collect::<Vec<_>>(),
        vec![
            LaunchOutcome::Completed,
            LaunchOutcome::ExitedWithCode(3),
            LaunchOutcome::Terminated,
            LaunchOutcome::SpawnFailed("failed to spawn 'jacamo broken.jcm'".into()),
        ]
    );

    assert_eq!(sink.emitted.len(), 1);
    assert_eq!(
        sink.emitted[0].category,
        Category::AgentMessage(AgentIcon::Treasure)
    );
    assert!(sink.contains("💰 [bob] found gold near the cave"));
    assert!(sink.contains("✅ Application 'ok.jcm' completed successfully."));
    assert!(sink.contains("⚠️ Application 'bad.jcm' exited with code 3."));
    assert!(!sink.contains("'killed.jcm' exited"));
    assert!(!sink.contains("'killed.jcm' completed"));
    assert!(sink.contains("❌ Execution Error: failed to spawn"));

    // Output of a launch lands between its "Running" line and its result.
    let started = sink.position("▶️ Running: ok.jcm").unwrap();
    let line = sink.position("💰 [bob]").unwrap();
    let done = sink.position("'ok.jcm' completed").unwrap();
    assert!(started < line && line < done);
}

// ===========================================================================
// Cancellation
// ===========================================================================

#[tokio::test]
async fn cancelled_pass_launches_nothing_further() {
    let toolchain = FakeToolchain::new();
    let mut prompt = ScriptedPrompt::new([]);
    let mut sink = MemorySink::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = run_orchestrator(
        &candidates(&["alpha", "beta"]),
        cwd(),
        &toolchain,
        &mut prompt,
        &mut sink,
        cancel,
    )
    .await;

    assert!(toolchain.launched().is_empty());
    assert!(report.was_interrupted());
    assert!(
        report
            .outcomes
            .iter()
            .all(|o| o.outcome == LaunchOutcome::Interrupted)
    );
}
