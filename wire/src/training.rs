//! SNDC_TRAINING body layout.

use bytestream::{ByteReader, ByteWriter};

use crate::error::{EncodeError, FrameResult};
use crate::header::{MessageType, PduHeader, HEADER_SIZE};
use crate::pdu::{encode_header, encode_pdu};

/// Size of the fixed training body: timestamp(2) + pack size(2).
pub const TRAINING_BODY_SIZE: usize = 2 + 2;

/// A latency probe sent by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingProbe {
    pub timestamp: u16,
    pub pack_size: u16,
}

impl TrainingProbe {
    /// Parses the fixed prefix of a training body.
    pub fn parse(body: &[u8]) -> FrameResult<Self> {
        let mut reader = ByteReader::new(body);
        let timestamp = reader.read_u16_le()?;
        let pack_size = reader.read_u16_le()?;
        Ok(Self {
            timestamp,
            pack_size,
        })
    }

    /// Encodes the probe as a complete SNDC_TRAINING PDU.
    #[must_use]
    pub fn to_pdu(self) -> Vec<u8> {
        let mut out = ByteWriter::with_capacity(HEADER_SIZE + TRAINING_BODY_SIZE);
        encode_header(
            PduHeader::new(MessageType::Training, TRAINING_BODY_SIZE as u16),
            &mut out,
        );
        out.write_u16_le(self.timestamp);
        out.write_u16_le(self.pack_size);
        out.finish()
    }
}

/// Frames a training response that echoes `body` verbatim.
pub fn encode_training_response(body: &[u8]) -> Result<Vec<u8>, EncodeError> {
    encode_pdu(MessageType::Training, body)
}
