//! Common PDU header types and constants.

use std::fmt;

use bytestream::ByteReader;

use crate::error::{FrameError, FrameResult};
use crate::wave::WAVE_INFO_BODY_SIZE;

/// Header size in bytes: type(1) + pad(1) + body size(2).
pub const HEADER_SIZE: usize = 1 + 1 + 2;

/// RDPSND message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    /// Audio streaming stopped. Ignored by the client.
    Close = 1,
    /// WaveInfo PDU, immediately followed by an untagged wave data PDU.
    Wave = 2,
    /// Client confirmation that a wave block was received.
    WaveConfirm = 5,
    /// Latency probe that must be echoed.
    Training = 6,
    /// Server format advertisement, and the client's response to it.
    Formats = 7,
    /// Client quality mode selection (server version 6 and later).
    QualityMode = 12,
}

impl MessageType {
    /// Every message type, in code order.
    pub const ALL: [Self; 6] = [
        Self::Close,
        Self::Wave,
        Self::WaveConfirm,
        Self::Training,
        Self::Formats,
        Self::QualityMode,
    ];

    /// Parses a message type from its wire code.
    #[must_use]
    pub const fn from_raw(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Close),
            2 => Some(Self::Wave),
            5 => Some(Self::WaveConfirm),
            6 => Some(Self::Training),
            7 => Some(Self::Formats),
            12 => Some(Self::QualityMode),
            _ => None,
        }
    }

    /// Returns the wire code.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self as u8
    }

    /// Returns the protocol name of the message type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Close => "SNDC_CLOSE",
            Self::Wave => "SNDC_WAVE",
            Self::WaveConfirm => "SNDC_WAVECONFIRM",
            Self::Training => "SNDC_TRAINING",
            Self::Formats => "SNDC_FORMATS",
            Self::QualityMode => "SNDC_QUALITYMODE",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The header common to all tagged RDPSND PDUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PduHeader {
    /// Type of the PDU.
    pub message_type: MessageType,
    /// Declared size of the body that follows the header.
    pub body_size: u16,
}

impl PduHeader {
    /// Creates a new header.
    #[must_use]
    pub const fn new(message_type: MessageType, body_size: u16) -> Self {
        Self {
            message_type,
            body_size,
        }
    }

    /// Number of bytes that follow this header on the wire.
    ///
    /// This is the declared body size for every type except a well-formed
    /// SNDC_WAVE, whose declared size also covers the sample data carried by
    /// the following wave data PDU. The WaveInfo body itself is always
    /// [`WAVE_INFO_BODY_SIZE`] bytes.
    #[must_use]
    pub const fn wire_body_len(self) -> usize {
        let declared = self.body_size as usize;
        match self.message_type {
            MessageType::Wave if declared >= WAVE_INFO_BODY_SIZE => WAVE_INFO_BODY_SIZE,
            _ => declared,
        }
    }

    /// Serializes the header.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; HEADER_SIZE] {
        let size = self.body_size.to_le_bytes();
        [self.message_type.raw(), 0, size[0], size[1]]
    }
}

/// Decodes the common header from the front of `buf`.
///
/// Only the first [`HEADER_SIZE`] bytes are inspected; the body is not
/// required to be present.
pub fn decode_header(buf: &[u8]) -> FrameResult<PduHeader> {
    let mut reader = ByteReader::new(buf);
    let code = reader.read_u8()?;
    reader.skip(1)?;
    let body_size = reader.read_u16_le()?;

    let message_type =
        MessageType::from_raw(code).ok_or(FrameError::UnknownType { code, body_size })?;
    Ok(PduHeader {
        message_type,
        body_size,
    })
}
