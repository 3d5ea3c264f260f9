//! # fwconsole
//!
//! A library for bringing up and conversing with an embedded device over a
//! serial line across a device reset.
//!
//! Two pieces of real logic live here:
//!
//! - [`Synchronizer`]: drains the unpredictable boot dump after a reset,
//!   then blocks until the firmware's ready line appears.
//! - [`CommandLoop`]: one command per turn from the operator, zero or more
//!   response lines from the device, terminated by an empty line.
//!
//! Everything else is the seams that make those testable: a [`Transport`]
//! trait over the serial line, an [`OutputSink`] for operator-facing output,
//! a [`CommandSource`] for operator input, and a [`StopSignal`] for clean
//! shutdown.
//!
//! ## Example
//!
//! ```rust,no_run
//! use fwconsole::{
//!     CommandLoop, CommandSource, OutputSink, Result, SerialTransport, StopSignal,
//!     Synchronizer, TransportConfig,
//! };
//!
//! struct Stdout;
//!
//! impl OutputSink for Stdout {
//!     fn status(&mut self, text: &str) {
//!         println!("{text}");
//!     }
//!     fn response(&mut self, line: &str) {
//!         println!(">> {line}");
//!     }
//!     fn marker(&mut self) {
//!         print!(".");
//!     }
//!     fn warning(&mut self, text: &str) {
//!         eprintln!("warning: {text}");
//!     }
//! }
//!
//! struct Stdin;
//!
//! impl CommandSource for Stdin {
//!     fn next_command(&mut self) -> Result<Option<String>> {
//!         let mut line = String::new();
//!         if std::io::stdin().read_line(&mut line)? == 0 {
//!             return Ok(None);
//!         }
//!         Ok(Some(line.trim_end().to_string()))
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     let stop = StopSignal::new();
//!     let config = TransportConfig::new("/dev/ttyUSB0", 115_200);
//!     let mut transport = SerialTransport::open(&config)?;
//!
//!     Synchronizer::new(Synchronizer::DEFAULT_QUIESCENCE, stop.clone())
//!         .run(&mut transport, &mut Stdout)?;
//!     CommandLoop::new(stop).run(&mut transport, &mut Stdin, &mut Stdout)
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub mod console;
pub mod error;
pub mod framing;
pub mod sync;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

/// Cooperative stop signal observed by the console loops between blocking
/// calls.
///
/// Clones share the underlying flag, so the embedding application can hand
/// one clone to a Ctrl-C handler and another to the loops. Once requested, a
/// stop is permanent for the process run.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    /// Create a signal with no stop requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that any loop observing this signal stop at its next check.
    pub fn request(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether a stop has been requested.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// Re-exports for convenience
pub use {
    console::{CommandLoop, CommandSource, OutputSink, TurnState},
    error::{Error, Result},
    framing::{READY_PREFIX, is_completion_line, is_ready_line},
    sync::{SyncState, Synchronizer},
    transport::{
        DEFAULT_BAUD, LineRead, PortInfo, Transport, TransportConfig,
        native::{SerialTransport, list_ports},
    },
};
