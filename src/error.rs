use std::{error::Error as StdError, fmt, io, result::Result as StdResult};

/// Failures while decoding frames from the browser or command lines from
/// socket clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame payload is not valid JSON or lacks required fields.
    MalformedPayload(String),
    /// Frame carried a `type` tag no event variant answers to.
    UnknownEventType(String),
    /// Length header exceeded the frame ceiling.
    OversizedFrame { len: usize, max: usize },
    /// The input stream ended, possibly in the middle of a frame.
    StreamClosed,
    /// Empty line or unrecognised command word.
    UnknownCommand(String),
    /// Command word was recognised but its argument was not.
    InvalidArgument(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedPayload(msg) => write!(f, "Malformed payload: {msg}"),
            Self::UnknownEventType(tag) => write!(f, "Unknown event type: {tag:?}"),
            Self::OversizedFrame { len, max } => {
                write!(f, "Frame too large: {len} bytes (max {max} bytes)")
            }
            Self::StreamClosed => write!(f, "Input stream closed"),
            Self::UnknownCommand(word) if word.is_empty() => write!(f, "Empty command"),
            Self::UnknownCommand(word) => write!(f, "Unknown command: {word}"),
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
        }
    }
}

impl StdError for ProtocolError {}

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Json(serde_json::Error),
    Protocol(ProtocolError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Json(e) => write!(f, "JSON error: {e}"),
            Self::Protocol(e) => write!(f, "Protocol error: {e}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Protocol(e) => Some(e),
        }
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

pub type Result<T> = StdResult<T, Error>;
