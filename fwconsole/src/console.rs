//! Operator-facing command/response loop and its I/O seams.
//!
//! One turn is one operator command plus the device's full response burst up
//! to the completion sentinel (an empty line). The loop runs turns until the
//! command source is exhausted, a stop is requested, or the transport fails
//! fatally.

use log::{debug, trace};

use crate::StopSignal;
use crate::error::{Error, Result};
use crate::framing;
use crate::transport::{LineRead, Transport};

/// Sink for operator-facing output emitted by the console loops.
///
/// Keeping presentation behind a trait lets tests assert on emitted events
/// and keeps the library free of terminal concerns.
pub trait OutputSink {
    /// A status notice (synchronization progress, connection lifecycle).
    fn status(&mut self, text: &str);

    /// One device response line within a turn.
    fn response(&mut self, line: &str);

    /// A progress marker, one per unmatched line during synchronization.
    fn marker(&mut self);

    /// A recoverable per-line or per-turn problem worth the operator's
    /// attention.
    fn warning(&mut self, text: &str);
}

/// Source of operator commands, one per turn.
pub trait CommandSource {
    /// Block for the next command. This is human-paced and not subject to
    /// any timeout. `None` means end of input and ends the command loop
    /// cleanly. Implementations may display a prompt.
    fn next_command(&mut self) -> Result<Option<String>>;
}

/// Phase of one command/response turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Waiting for operator input.
    AwaitCommand,
    /// Relaying device response lines until the completion sentinel.
    StreamResponse,
}

/// Runs command/response turns against a synchronized device.
pub struct CommandLoop {
    state: TurnState,
    stop: StopSignal,
}

impl CommandLoop {
    /// Create a command loop observing `stop` between blocking calls.
    #[must_use]
    pub fn new(stop: StopSignal) -> Self {
        Self {
            state: TurnState::AwaitCommand,
            stop,
        }
    }

    /// Current turn phase.
    #[must_use]
    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Run turns until the source is exhausted.
    ///
    /// Per-turn problems (an undecodable response line, a stalled device, a
    /// non-ASCII command) are reported through the sink and leave the loop
    /// running; transport failures propagate and are fatal.
    pub fn run(
        &mut self,
        transport: &mut dyn Transport,
        source: &mut dyn CommandSource,
        sink: &mut dyn OutputSink,
    ) -> Result<()> {
        loop {
            self.state = TurnState::AwaitCommand;
            if self.stop.is_requested() {
                return Err(Error::Interrupted);
            }
            let Some(command) = source.next_command()? else {
                debug!("command input closed");
                return Ok(());
            };
            self.run_turn(transport, sink, &command)?;
        }
    }

    /// Send one command and relay its response burst.
    fn run_turn(
        &mut self,
        transport: &mut dyn Transport,
        sink: &mut dyn OutputSink,
        command: &str,
    ) -> Result<()> {
        if !command.is_ascii() {
            sink.warning("command dropped: the wire encoding is ASCII");
            return Ok(());
        }

        let mut frame = Vec::with_capacity(command.len() + 1);
        frame.extend_from_slice(command.as_bytes());
        frame.push(b'\n');
        transport.write_bytes(&frame)?;
        trace!("sent command ({} bytes)", frame.len());

        self.state = TurnState::StreamResponse;
        loop {
            if self.stop.is_requested() {
                return Err(Error::Interrupted);
            }
            match transport.read_line() {
                Ok(LineRead::Line(line)) if framing::is_completion_line(&line) => {
                    return Ok(());
                },
                Ok(LineRead::Line(line)) => sink.response(&line),
                Ok(LineRead::TimedOut) => {
                    // Not a completion: the device went quiet mid-turn.
                    sink.warning(
                        "no response from device (read timed out); the command may be retried",
                    );
                    return Ok(());
                },
                Err(Error::Decode(reason)) => {
                    sink.warning(&format!("undecodable response line: {reason}"));
                },
                Err(err) => return Err(err),
            }
        }
    }
}
