//! Log sinks: the surfaces classified lines and status messages end up on.
//!
//! A sink is constructed by the caller and handed to whatever produces
//! output (the orchestrator, the probe, the CLI commands). It has an
//! explicit lifecycle: [`Sink::open`] before first use, [`Sink::close`]
//! on shutdown.

use std::io::{self, Write};

use serde::Serialize;

use crate::classify::LogLine;

/// Width of the horizontal rule written between launches.
pub const SEPARATOR_WIDTH: usize = 50;

/// Return the horizontal separator line.
pub fn separator() -> String {
    "─".repeat(SEPARATOR_WIDTH)
}

/// An append-only text surface.
pub trait Sink: Send {
    /// Acquire whatever the sink writes to.
    fn open(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Discard anything previously shown, where the surface supports it.
    fn clear(&mut self) {}

    /// Bring the surface to the foreground, where that means anything.
    fn show(&mut self) {}

    /// Append a status message.
    fn append_line(&mut self, message: &str);

    /// Append a classified line of process output.
    fn emit(&mut self, line: &LogLine) {
        self.append_line(&line.display_text);
    }

    /// Flush and release the surface.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn open(&mut self) -> io::Result<()> {
        (**self).open()
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn show(&mut self) {
        (**self).show()
    }

    fn append_line(&mut self, message: &str) {
        (**self).append_line(message)
    }

    fn emit(&mut self, line: &LogLine) {
        (**self).emit(line)
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

// ---------------------------------------------------------------------------
// ConsoleSink
// ---------------------------------------------------------------------------

/// Writes display text to a writer (stdout by default), one line each.
pub struct ConsoleSink<W: Write + Send = io::Stdout> {
    writer: W,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            writer: io::stdout(),
        }
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> Sink for ConsoleSink<W> {
    fn append_line(&mut self, message: &str) {
        if let Err(e) = writeln!(self.writer, "{message}") {
            tracing::warn!(error = %e, "failed to write to console sink");
        }
    }

    fn close(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

// ---------------------------------------------------------------------------
// JsonSink
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(untagged)]
enum JsonRecord<'a> {
    Line(&'a LogLine),
    Status { status: &'a str },
}

/// Writes one JSON object per line: classified output as the serialized
/// [`LogLine`], status messages as `{"status": "..."}`.
pub struct JsonSink<W: Write + Send = io::Stdout> {
    writer: W,
}

impl JsonSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            writer: io::stdout(),
        }
    }
}

impl<W: Write + Send> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_record(&mut self, record: &JsonRecord<'_>) {
        let result = serde_json::to_writer(&mut self.writer, record)
            .map_err(io::Error::from)
            .and_then(|()| self.writer.write_all(b"\n"));
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to write to json sink");
        }
    }
}

impl<W: Write + Send> Sink for JsonSink<W> {
    fn append_line(&mut self, message: &str) {
        self.write_record(&JsonRecord::Status { status: message });
    }

    fn emit(&mut self, line: &LogLine) {
        self.write_record(&JsonRecord::Line(line));
    }

    fn close(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
