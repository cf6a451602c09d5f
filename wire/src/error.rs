//! Error types for PDU framing operations.

use std::fmt;

use bytestream::ByteError;

use crate::header::MessageType;

/// Result type for PDU decoding operations.
pub type FrameResult<T> = Result<T, FrameError>;

/// Errors raised while framing or interpreting inbound PDUs.
///
/// None of these are fatal to a session: each aborts the PDU it was raised
/// for and the stream carries on with the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FrameError {
    /// Fewer bytes are available than the current field or PDU requires.
    Truncated { needed: usize, available: usize },

    /// Declared wire length disagrees with the bytes delivered for the PDU.
    SizeMismatch { declared: usize, actual: usize },

    /// Unrecognized message type. The declared body size is kept so the
    /// caller can skip the body without losing framing.
    UnknownType { code: u8, body_size: u16 },

    /// Wave data and WaveInfo PDUs arrived out of order.
    OrderingViolation(OrderingViolation),

    /// No usable audio format for the requested operation.
    UnsupportedFormat(UnsupportedFormat),

    /// Limits exceeded.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },
}

/// Specific decode limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    FormatCount,
    CodecDataLength,
}

/// Ways the WaveInfo/Wave pairing can be broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingViolation {
    /// Wave data arrived while no WaveInfo was pending; the data was dropped.
    WaveDataWithoutInfo { len: usize },
    /// A WaveInfo arrived while another was still waiting for its data; the
    /// earlier one was discarded.
    WaveInfoBeforeData { discarded_timestamp: u32 },
}

/// Reasons no audio format can be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedFormat {
    /// The server advertised no formats at all.
    EmptyTable,
    /// The server advertised formats but none passed the client policy.
    NoAcceptableFormat,
    /// Audio arrived before any format negotiation took place.
    NotNegotiated,
    /// Audio referenced a format the client did not negotiate.
    IndexOutOfRange { index: u16, available: usize },
}

/// Errors that can occur while encoding outbound PDUs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The body does not fit the 16-bit size field.
    BodyTooLarge { length: usize },
    /// Wave audio must carry at least the four bytes relocated into WaveInfo.
    WaveTooShort { length: usize },
    /// The message type is not valid in the requested direction.
    UnexpectedType { message_type: MessageType },
}

impl From<ByteError> for FrameError {
    fn from(err: ByteError) -> Self {
        match err {
            ByteError::UnexpectedEof {
                requested,
                available,
            } => Self::Truncated {
                needed: requested,
                available,
            },
        }
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { needed, available } => {
                write!(f, "truncated PDU: need {needed} bytes, have {available}")
            }
            Self::SizeMismatch { declared, actual } => {
                write!(
                    f,
                    "size mismatch: declared {declared} bytes but {actual} delivered"
                )
            }
            Self::UnknownType { code, body_size } => {
                write!(
                    f,
                    "unknown message type 0x{code:02X} ({body_size} byte body skipped)"
                )
            }
            Self::OrderingViolation(violation) => write!(f, "ordering violation: {violation}"),
            Self::UnsupportedFormat(reason) => write!(f, "unsupported format: {reason}"),
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FormatCount => "format count",
            Self::CodecDataLength => "codec data length",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for OrderingViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WaveDataWithoutInfo { len } => {
                write!(f, "{len} bytes of wave data without a preceding WaveInfo")
            }
            Self::WaveInfoBeforeData {
                discarded_timestamp,
            } => {
                write!(
                    f,
                    "WaveInfo received before wave data for timestamp {discarded_timestamp}"
                )
            }
        }
    }
}

impl fmt::Display for UnsupportedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTable => write!(f, "server advertised no formats"),
            Self::NoAcceptableFormat => write!(f, "no advertised format is acceptable"),
            Self::NotNegotiated => write!(f, "no format negotiated yet"),
            Self::IndexOutOfRange { index, available } => {
                write!(f, "format index {index} outside {available} negotiated formats")
            }
        }
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BodyTooLarge { length } => {
                write!(f, "body too large: {length} bytes")
            }
            Self::WaveTooShort { length } => {
                write!(f, "wave audio too short: {length} bytes, need at least 4")
            }
            Self::UnexpectedType { message_type } => {
                write!(f, "unexpected message type {message_type}")
            }
        }
    }
}

impl std::error::Error for FrameError {}

impl std::error::Error for EncodeError {}
