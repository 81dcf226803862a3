//! Wire format of the calculator protocol.
//!
//! Clients send one token per line. The server answers every token with
//! exactly one [`Reply`]:
//!
//! ```text
//! number or (          <- prompt, followed by the "> " marker
//! > 2
//! + or * or =
//! > =
//! result: 2            <- the connection closes after this line
//! ```

use calcnet_core::{Outcome, Prompt};
use std::{fmt, str::Utf8Error};
use thiserror::Error;

/// Marker written after every prompt, on the same line as the user's input.
pub const PROMPT_MARKER: &str = "> ";

/// Message sent when a token is rejected.
pub const INVALID_VALUE: &str = "invalid value\n";

/// Default limit on an input line, terminator included.
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// A message from the server to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Prompt(Prompt),
    Result(i64),
    InvalidValue,
}

impl Reply {
    /// Whether the server closes the connection after sending this reply.
    pub fn closes_connection(&self) -> bool {
        !matches!(self, Reply::Prompt(_))
    }
}

impl From<&Outcome> for Reply {
    fn from(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Prompt(prompt) => Reply::Prompt(*prompt),
            Outcome::Done(value) => Reply::Result(*value),
            Outcome::Error(_) => Reply::InvalidValue,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Prompt(prompt) => write!(f, "{prompt}\n{PROMPT_MARKER}"),
            Reply::Result(value) => writeln!(f, "result: {value}"),
            Reply::InvalidValue => f.write_str(INVALID_VALUE),
        }
    }
}

/// A line whose bytes are not valid UTF-8.
#[derive(Debug, Error)]
#[error("line is not valid UTF-8")]
pub struct DecodeError(#[from] Utf8Error);

/// Decode a raw input line into a token, stripping surrounding whitespace
/// (including the line terminator).
pub fn decode_line(line: &[u8]) -> Result<&str, DecodeError> {
    Ok(std::str::from_utf8(line)?.trim())
}
