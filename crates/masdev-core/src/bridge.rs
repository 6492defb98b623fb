//! Process bridge: the two ways masdev talks to an external process.
//!
//! - [`execute_command`] runs a command to completion and hands back its
//!   captured output. Used for short request/response calls (`mas list`,
//!   `mas stop`, `app create`, `--version`).
//! - [`stream_process`] spawns a long-running command and turns its output
//!   into a stream of [`BridgeEvent`]s. Every stdout line goes through the
//!   stdout classifier, every stderr line through the warning path. The
//!   stream always finishes with exactly one [`BridgeEvent::Exited`].

use std::path::Path;
use std::pin::Pin;
use std::process::Stdio;

use futures::{Stream, StreamExt};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::classify::{LogLine, classify_stderr, classify_stdout};
use crate::error::ToolchainError;
use crate::sink::Sink;

/// Captured output of a one-shot command that exited successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// How a streamed process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminal {
    /// The process could not be spawned or waited on.
    Errored(String),
    /// The process exited. `None` when it was terminated by a signal.
    Closed(Option<i32>),
}

/// One event from a streamed process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    Line(LogLine),
    Exited(Terminal),
}

/// A boxed stream of bridge events.
pub type BridgeStream = Pin<Box<dyn Stream<Item = BridgeEvent> + Send>>;

fn describe(program: &str, args: &[String]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{program} {}", args.join(" "))
    }
}

/// Run `program args...` in `cwd` and wait for it to finish.
///
/// Stdout and stderr are read concurrently with the wait so a chatty
/// child cannot block on a full pipe. A non-zero exit is an error that
/// carries both streams.
pub async fn execute_command(
    program: &str,
    args: &[String],
    cwd: &Path,
) -> Result<CommandOutput, ToolchainError> {
    let command = describe(program, args);
    debug!(command = %command, cwd = %cwd.display(), "executing command");

    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ToolchainError::Spawn {
            command: command.clone(),
            source,
        })?;

    let mut stdout_pipe = child.stdout.take();
    let mut stderr_pipe = child.stderr.take();

    let read_stdout = read_all(stdout_pipe.as_mut(), &command, "stdout");
    let read_stderr = read_all(stderr_pipe.as_mut(), &command, "stderr");

    let (status, stdout, stderr) = tokio::join!(child.wait(), read_stdout, read_stderr);
    let status = status.map_err(|source| ToolchainError::Wait {
        command: command.clone(),
        source,
    })?;

    if status.success() {
        Ok(CommandOutput { stdout, stderr })
    } else {
        Err(ToolchainError::Failed {
            command,
            code: status.code(),
            stdout,
            stderr,
        })
    }
}

/// Read a one-shot pipe to the end. Output that is not valid UTF-8 is
/// decoded lossily; a read error keeps whatever arrived before it.
async fn read_all<R>(pipe: Option<&mut R>, command: &str, stream: &str) -> String
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    if let Some(pipe) = pipe {
        if let Err(e) = pipe.read_to_end(&mut buf).await {
            warn!(command, stream, error = %e, "error reading command output, output may be truncated");
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Strip the line terminator (`\n` or `\r\n`) from a raw line.
fn trim_line_ending(mut line: &[u8]) -> &[u8] {
    if let [rest @ .., b'\n'] = line {
        line = rest;
    }
    if let [rest @ .., b'\r'] = line {
        line = rest;
    }
    line
}

/// Forward every line from `reader` to `tx`, classified by `classify`.
///
/// Lines are split on raw bytes and decoded lossily, so output in a
/// non-UTF-8 encoding never ends the stream early.
async fn pump_lines<R>(
    reader: R,
    classify: fn(&str) -> Vec<LogLine>,
    tx: mpsc::UnboundedSender<LogLine>,
) where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(trim_line_ending(&buf));
                for classified in classify(&line) {
                    if tx.send(classified).is_err() {
                        return;
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "error reading process output");
                break;
            }
        }
    }
}

/// Spawn `program args...` in `cwd` and stream its classified output.
///
/// A spawn failure is reported as [`Terminal::Errored`] rather than an
/// `Err`, so callers only ever wait on one terminal value.
pub fn stream_process(program: &str, args: &[String], cwd: &Path) -> BridgeStream {
    let program = program.to_string();
    let args = args.to_vec();
    let cwd = cwd.to_path_buf();

    let stream = async_stream::stream! {
        let command = describe(&program, &args);
        debug!(command = %command, cwd = %cwd.display(), "spawning streamed process");

        let spawned = Command::new(&program)
            .args(&args)
            .current_dir(&cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                warn!(command = %command, error = %e, "failed to spawn process");
                yield BridgeEvent::Exited(Terminal::Errored(format!(
                    "failed to spawn '{command}': {e}"
                )));
                return;
            }
        };

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(pump_lines(stdout, classify_stdout, tx.clone())));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(pump_lines(stderr, classify_stderr, tx.clone())));
        }
        drop(tx);

        // Both readers hold a sender; the channel closes when both pipes do.
        while let Some(line) = rx.recv().await {
            yield BridgeEvent::Line(line);
        }
        for reader in readers {
            let _ = reader.await;
        }

        match child.wait().await {
            Ok(status) => {
                debug!(command = %command, code = ?status.code(), "process exited");
                yield BridgeEvent::Exited(Terminal::Closed(status.code()));
            }
            Err(e) => {
                yield BridgeEvent::Exited(Terminal::Errored(format!(
                    "failed to wait on '{command}': {e}"
                )));
            }
        }
    };

    Box::pin(stream)
}

/// Forward every line of `stream` to `sink` and return its terminal event.
///
/// A stream that ends without an [`BridgeEvent::Exited`] is treated as an
/// error terminal.
pub async fn forward_to_sink(mut stream: BridgeStream, sink: &mut dyn Sink) -> Terminal {
    while let Some(event) = stream.next().await {
        match event {
            BridgeEvent::Line(line) => sink.emit(&line),
            BridgeEvent::Exited(terminal) => return terminal,
        }
    }
    Terminal::Errored("process output ended without an exit status".to_string())
}
