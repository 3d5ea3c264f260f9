//! Boot-noise drain and readiness detection.
//!
//! A device reset dumps an unpredictable amount of boot output on the line
//! before the firmware signals readiness. The synchronizer first waits for
//! that dump to go fully quiet, then scans line by line for the ready
//! sentinel. It runs exactly once per process, before any command is issued.

use std::time::Duration;

use log::debug;

use crate::StopSignal;
use crate::console::OutputSink;
use crate::error::{Error, Result};
use crate::framing;
use crate::transport::{LineRead, Transport};

/// Synchronization progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Discarding boot noise until the line goes quiet.
    Draining,
    /// Scanning lines for the ready sentinel.
    AwaitingReady,
    /// The ready sentinel was seen; commands may be issued.
    Synced,
}

/// Drains boot noise and blocks until the device signals readiness.
pub struct Synchronizer {
    quiescence: Duration,
    state: SyncState,
    stop: StopSignal,
}

impl Synchronizer {
    /// Silent interval required to consider the boot dump finished.
    pub const DEFAULT_QUIESCENCE: Duration = Duration::from_millis(200);

    /// Create a synchronizer with the given quiescence window, observing
    /// `stop` between blocking calls.
    #[must_use]
    pub fn new(quiescence: Duration, stop: StopSignal) -> Self {
        Self {
            quiescence,
            state: SyncState::Draining,
            stop,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Run both phases to completion.
    ///
    /// Returns once the ready sentinel is seen. There is no synchronization
    /// timeout: an unresponsive device blocks this call until the embedding
    /// application requests a stop.
    pub fn run(
        &mut self,
        transport: &mut dyn Transport,
        sink: &mut dyn OutputSink,
    ) -> Result<()> {
        self.drain(transport)?;
        self.state = SyncState::AwaitingReady;
        sink.status("Reboot device to synchronize.");
        self.await_ready(transport, sink)
    }

    /// Discard buffered input until one full quiescence window passes with
    /// no new bytes arriving.
    ///
    /// A single fixed wait is not enough: the boot dump's length is
    /// unbounded, so the wait repeats for as long as bytes keep showing up.
    fn drain(&mut self, transport: &mut dyn Transport) -> Result<()> {
        transport.discard_input()?;
        loop {
            std::thread::sleep(self.quiescence);
            if self.stop.is_requested() {
                return Err(Error::Interrupted);
            }
            let waiting = transport.bytes_waiting()?;
            if waiting == 0 {
                return Ok(());
            }
            debug!("boot noise still arriving ({waiting} bytes), draining again");
            transport.discard_input()?;
        }
    }

    /// Scan lines until one matches the ready sentinel.
    fn await_ready(
        &mut self,
        transport: &mut dyn Transport,
        sink: &mut dyn OutputSink,
    ) -> Result<()> {
        loop {
            if self.stop.is_requested() {
                return Err(Error::Interrupted);
            }
            match transport.read_line() {
                Ok(LineRead::Line(line)) if framing::is_ready_line(&line) => {
                    self.state = SyncState::Synced;
                    sink.status("Synchronization complete -- firmware ready.");
                    return Ok(());
                },
                Ok(LineRead::Line(_)) => sink.marker(),
                // The scan has no deadline; a timed-out read just means the
                // device has not rebooted yet.
                Ok(LineRead::TimedOut) => {},
                Err(Error::Decode(reason)) => {
                    // Boot output is not guaranteed to be clean ASCII.
                    debug!("undecodable boot line: {reason}");
                    sink.marker();
                },
                Err(err) => return Err(err),
            }
        }
    }
}
