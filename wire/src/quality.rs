//! SNDC_QUALITYMODE body layout.

use std::fmt;

use bytestream::{ByteReader, ByteWriter};

use crate::error::FrameResult;
use crate::header::{MessageType, PduHeader, HEADER_SIZE};
use crate::pdu::encode_header;

/// First server version that understands quality mode selection.
pub const QUALITY_MODE_MIN_VERSION: u16 = 6;

/// Size of the SNDC_QUALITYMODE body.
pub const QUALITY_MODE_BODY_SIZE: usize = 2;

/// Audio quality requested from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u16)]
pub enum QualityMode {
    /// The server picks quality from its perception of latency.
    #[default]
    Dynamic = 0,
    /// Bandwidth over quality.
    Medium = 1,
    /// Quality over bandwidth.
    High = 2,
}

impl QualityMode {
    #[must_use]
    pub const fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            0 => Some(Self::Dynamic),
            1 => Some(Self::Medium),
            2 => Some(Self::High),
            _ => None,
        }
    }

    #[must_use]
    pub const fn raw(self) -> u16 {
        self as u16
    }

    /// Returns `true` if a server of `version` accepts a mode selection.
    #[must_use]
    pub const fn supported_by(version: u16) -> bool {
        version >= QUALITY_MODE_MIN_VERSION
    }

    /// Encodes the complete SNDC_QUALITYMODE PDU.
    #[must_use]
    pub fn to_pdu(self) -> Vec<u8> {
        let mut out = ByteWriter::with_capacity(HEADER_SIZE + QUALITY_MODE_BODY_SIZE);
        encode_header(
            PduHeader::new(MessageType::QualityMode, QUALITY_MODE_BODY_SIZE as u16),
            &mut out,
        );
        out.write_u16_le(self.raw());
        out.finish()
    }
}

/// Reads an SNDC_QUALITYMODE body; `None` for a mode code this crate does
/// not know.
pub fn decode_quality_mode(body: &[u8]) -> FrameResult<Option<QualityMode>> {
    let mut reader = ByteReader::new(body);
    Ok(QualityMode::from_raw(reader.read_u16_le()?))
}

impl fmt::Display for QualityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Dynamic => "dynamic",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(name)
    }
}
