//! Error types for fwconsole.

use std::io;
use thiserror::Error;

/// Result type for fwconsole operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for fwconsole operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error on the transport (device disappeared, link fault). Fatal.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serial port error (open or configuration failure).
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Bytes read from the transport are not valid ASCII text.
    /// Recoverable at the granularity of one line.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A cooperative stop was requested while a loop was running.
    #[error("Interrupted")]
    Interrupted,
}
