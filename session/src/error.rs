//! Error types for session operations.

use std::fmt;

use wire::{EncodeError, FrameError};

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors reported while driving a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Inbound framing or body error.
    Frame(FrameError),

    /// An outbound PDU could not be encoded.
    Encode(EncodeError),
}

impl SessionError {
    /// Returns the inbound framing error, if this is one.
    #[must_use]
    pub const fn frame(&self) -> Option<&FrameError> {
        match self {
            Self::Frame(err) => Some(err),
            Self::Encode(_) => None,
        }
    }
}

impl From<FrameError> for SessionError {
    fn from(err: FrameError) -> Self {
        Self::Frame(err)
    }
}

impl From<EncodeError> for SessionError {
    fn from(err: EncodeError) -> Self {
        Self::Encode(err)
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frame(err) => write!(f, "frame error: {err}"),
            Self::Encode(err) => write!(f, "encode error: {err}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Frame(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}
