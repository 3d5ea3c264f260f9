//! Line decoding and sentinel matching shared by the synchronizer and the
//! command loop.
//!
//! The wire protocol is ASCII text, one line per unit. The device signals
//! readiness after boot with a line starting with [`READY_PREFIX`] and marks
//! the end of a response burst with an empty line.

use crate::error::{Error, Result};

/// Literal prefix of the device-ready line.
pub const READY_PREFIX: &str = "firmware ready";

/// Whether a decoded line is the device-ready signal.
///
/// The match is case-sensitive and requires at least one character after the
/// prefix: the firmware always appends detail (build id, version) to the
/// ready line, so the bare literal is not accepted.
#[must_use]
pub fn is_ready_line(line: &str) -> bool {
    line.len() > READY_PREFIX.len() && line.starts_with(READY_PREFIX)
}

/// Whether a decoded line is the end-of-response sentinel.
///
/// The empty line is reserved as a protocol control value; no legitimate
/// response line may be empty.
#[must_use]
pub fn is_completion_line(line: &str) -> bool {
    line.is_empty()
}

/// Decode one raw line as ASCII, stripping trailing newline and whitespace.
///
/// A byte outside ASCII is a [`Error::Decode`], never a silently corrupted
/// value. The raw slice must not include the `\n` terminator.
pub fn decode_line(raw: &[u8]) -> Result<String> {
    if let Some(pos) = raw.iter().position(|b| !b.is_ascii()) {
        return Err(Error::Decode(format!(
            "non-ASCII byte 0x{:02X} at offset {pos}",
            raw[pos]
        )));
    }
    let text = std::str::from_utf8(raw).map_err(|err| Error::Decode(err.to_string()))?;
    Ok(text.trim_end().to_string())
}
