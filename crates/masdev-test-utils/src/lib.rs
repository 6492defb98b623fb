//! Shared test doubles for masdev integration tests.
//!
//! - [`FakeToolchain`]: scripted responses for `mas list` / `mas stop` /
//!   `app create`, scripted output for launches, and an ordered journal of
//!   every call so tests can assert on sequencing.
//! - [`MemorySink`]: keeps every line it receives.
//! - [`ScriptedPrompt`]: answers rerun prompts from a queue and remembers
//!   which applications it was asked about.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use masdev_core::bridge::{BridgeEvent, BridgeStream, CommandOutput, Terminal};
use masdev_core::classify::{LogLine, classify_stdout};
use masdev_core::error::ToolchainError;
use masdev_core::orchestrator::{RerunChoice, RerunPrompt};
use masdev_core::sink::Sink;
use masdev_core::toolchain::Toolchain;

/// One entry of the [`FakeToolchain`] journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// A one-shot command, with its arguments joined by spaces.
    Execute(String),
    /// A launch started (the launch stream was first polled).
    LaunchStarted(String),
    /// A launch's terminal event was handed to the consumer.
    LaunchFinished(String),
}

/// Scripted run of one application.
#[derive(Debug, Clone)]
pub struct ScriptedRun {
    pub stdout: String,
    pub terminal: Terminal,
}

impl ScriptedRun {
    pub fn exits(code: i32) -> Self {
        Self {
            stdout: String::new(),
            terminal: Terminal::Closed(Some(code)),
        }
    }

    pub fn with_stdout(mut self, stdout: &str) -> Self {
        self.stdout = stdout.to_string();
        self
    }
}

type Responder = Box<dyn Fn() -> Result<CommandOutput, ToolchainError> + Send + Sync>;

/// A [`Toolchain`] that never spawns anything.
///
/// One-shot commands not given a response succeed with empty output.
/// Launches not given a script exit with code 0 and no output.
#[derive(Default)]
pub struct FakeToolchain {
    responses: HashMap<String, Responder>,
    runs: HashMap<String, ScriptedRun>,
    journal: Arc<Mutex<Vec<Call>>>,
}

impl FakeToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `mas list` report `names` as running.
    pub fn with_running(self, names: &[&str]) -> Self {
        let stdout: String = names.iter().map(|n| format!("  {n}@localhost\n")).collect();
        self.respond("mas list", move || {
            Ok(CommandOutput {
                stdout: stdout.clone(),
                stderr: String::new(),
            })
        })
    }

    /// Make the command with the given space-joined arguments fail with
    /// `stderr` as its output.
    pub fn failing(self, args: &str, stderr: &str) -> Self {
        let command = format!("jacamo {args}");
        let stderr = stderr.to_string();
        self.respond(args, move || {
            Err(ToolchainError::Failed {
                command: command.clone(),
                code: Some(1),
                stdout: String::new(),
                stderr: stderr.clone(),
            })
        })
    }

    /// Script the response for the command with the given arguments.
    pub fn respond(
        mut self,
        args: &str,
        responder: impl Fn() -> Result<CommandOutput, ToolchainError> + Send + Sync + 'static,
    ) -> Self {
        self.responses.insert(args.to_string(), Box::new(responder));
        self
    }

    /// Script what launching `app_file` produces.
    pub fn with_run(mut self, app_file: &str, run: ScriptedRun) -> Self {
        self.runs.insert(app_file.to_string(), run);
        self
    }

    /// Everything that happened, in order.
    pub fn journal(&self) -> Vec<Call> {
        self.journal.lock().expect("journal lock poisoned").clone()
    }

    /// The launches that were started, in order.
    pub fn launched(&self) -> Vec<String> {
        self.journal()
            .into_iter()
            .filter_map(|c| match c {
                Call::LaunchStarted(file) => Some(file),
                _ => None,
            })
            .collect()
    }

    /// The one-shot commands that were executed, in order.
    pub fn executed(&self) -> Vec<String> {
        self.journal()
            .into_iter()
            .filter_map(|c| match c {
                Call::Execute(args) => Some(args),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Toolchain for FakeToolchain {
    fn name(&self) -> &str {
        "fake"
    }

    async fn execute(&self, args: &[String], _cwd: &Path) -> Result<CommandOutput, ToolchainError> {
        let key = args.join(" ");
        self.journal
            .lock()
            .expect("journal lock poisoned")
            .push(Call::Execute(key.clone()));
        match self.responses.get(&key) {
            Some(responder) => responder(),
            None => Ok(CommandOutput::default()),
        }
    }

    fn launch(&self, app_file: &str, _cwd: &Path) -> BridgeStream {
        let file = app_file.to_string();
        let run = self
            .runs
            .get(app_file)
            .cloned()
            .unwrap_or_else(|| ScriptedRun::exits(0));
        let journal = Arc::clone(&self.journal);

        Box::pin(async_stream::stream! {
            journal.lock().expect("journal lock poisoned").push(Call::LaunchStarted(file.clone()));
            for line in classify_stdout(&run.stdout) {
                yield BridgeEvent::Line(line);
            }
            journal.lock().expect("journal lock poisoned").push(Call::LaunchFinished(file.clone()));
            yield BridgeEvent::Exited(run.terminal.clone());
        })
    }
}

/// A sink that keeps everything.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub lines: Vec<String>,
    pub emitted: Vec<LogLine>,
    pub opened: bool,
    pub closed: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if any line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }

    /// Index of the first line containing `needle`.
    pub fn position(&self, needle: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.contains(needle))
    }
}

impl Sink for MemorySink {
    fn open(&mut self) -> std::io::Result<()> {
        self.opened = true;
        Ok(())
    }

    fn clear(&mut self) {
        self.lines.clear();
        self.emitted.clear();
    }

    fn append_line(&mut self, message: &str) {
        self.lines.push(message.to_string());
    }

    fn emit(&mut self, line: &LogLine) {
        self.emitted.push(line.clone());
        self.lines.push(line.display_text.clone());
    }

    fn close(&mut self) -> std::io::Result<()> {
        self.closed = true;
        Ok(())
    }
}

/// A prompt that answers from a queue; an empty queue answers `Cancel`.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<RerunChoice>,
    pub asked: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new(answers: impl IntoIterator<Item = RerunChoice>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }
}

#[async_trait]
impl RerunPrompt for ScriptedPrompt {
    async fn confirm_rerun(&mut self, app_name: &str) -> RerunChoice {
        self.asked.push(app_name.to_string());
        self.answers.pop_front().unwrap_or(RerunChoice::Cancel)
    }
}
