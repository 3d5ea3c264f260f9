//! Scripted doubles for driving the console loops in tests.

use std::collections::VecDeque;

use crate::StopSignal;
use crate::console::{CommandSource, OutputSink};
use crate::error::{Error, Result};
use crate::transport::{LineRead, Transport};

/// One scripted outcome for [`ScriptedTransport::read_line`].
pub(crate) enum ScriptedRead {
    /// A decoded line.
    Line(&'static str),
    /// A read that elapsed the timeout.
    TimedOut,
    /// A line that fails ASCII decoding.
    DecodeErr,
    /// A fatal transport fault.
    IoErr,
    /// Requests a stop on the given signal, then times out; lets tests end
    /// loops that would otherwise run forever.
    RequestStop(StopSignal),
}

/// In-memory transport driven by scripted reads and buffered-byte samples.
///
/// `reads` feeds `read_line` (exhaustion means timeouts forever); `waiting`
/// feeds `bytes_waiting` one sample per call (exhaustion means quiet).
/// Writes and discards are recorded for assertions.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    pub reads: VecDeque<ScriptedRead>,
    pub waiting: VecDeque<usize>,
    pub written: Vec<Vec<u8>>,
    pub discards: usize,
}

impl Transport for ScriptedTransport {
    fn read_line(&mut self) -> Result<LineRead> {
        match self.reads.pop_front() {
            Some(ScriptedRead::Line(line)) => Ok(LineRead::Line(line.to_string())),
            Some(ScriptedRead::TimedOut) | None => Ok(LineRead::TimedOut),
            Some(ScriptedRead::DecodeErr) => Err(Error::Decode(
                "non-ASCII byte 0xFF at offset 0".to_string(),
            )),
            Some(ScriptedRead::IoErr) => Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "device disconnected",
            ))),
            Some(ScriptedRead::RequestStop(stop)) => {
                stop.request();
                Ok(LineRead::TimedOut)
            },
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.written.push(bytes.to_vec());
        Ok(())
    }

    fn bytes_waiting(&mut self) -> Result<usize> {
        Ok(self.waiting.pop_front().unwrap_or(0))
    }

    fn discard_input(&mut self) -> Result<()> {
        self.discards += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// One recorded sink emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    Status(String),
    Response(String),
    Marker,
    Warning(String),
}

/// Output sink recording every emission for assertions.
#[derive(Default)]
pub(crate) struct RecordingSink {
    pub events: Vec<Event>,
}

impl OutputSink for RecordingSink {
    fn status(&mut self, text: &str) {
        self.events.push(Event::Status(text.to_string()));
    }

    fn response(&mut self, line: &str) {
        self.events.push(Event::Response(line.to_string()));
    }

    fn marker(&mut self) {
        self.events.push(Event::Marker);
    }

    fn warning(&mut self, text: &str) {
        self.events.push(Event::Warning(text.to_string()));
    }
}

/// Command source feeding a fixed queue of commands, then end-of-input.
#[derive(Default)]
pub(crate) struct ScriptedSource {
    commands: VecDeque<String>,
}

impl ScriptedSource {
    pub fn commands(commands: &[&str]) -> Self {
        Self {
            commands: commands.iter().map(|c| (*c).to_string()).collect(),
        }
    }
}

impl CommandSource for ScriptedSource {
    fn next_command(&mut self) -> Result<Option<String>> {
        Ok(self.commands.pop_front())
    }
}
