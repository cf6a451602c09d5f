//! SNDC_WAVE (WaveInfo), wave data and SNDC_WAVECONFIRM layouts.
//!
//! One audio chunk travels as two PDUs. The WaveInfo PDU carries the chunk
//! metadata plus the first four bytes of audio. The wave data PDU that follows
//! has no header of its own: its first four bytes are padding sitting where a
//! header would be, and the rest is the remaining audio. The WaveInfo's
//! declared body size is `12 + (wave data length - 4)`, which is how the
//! receiver knows where the wave data PDU ends.

use bytestream::{ByteReader, ByteWriter};

use crate::error::{EncodeError, FrameError, FrameResult};
use crate::header::{MessageType, PduHeader, HEADER_SIZE};
use crate::pdu::encode_header;

/// Size of the WaveInfo body on the wire.
pub const WAVE_INFO_BODY_SIZE: usize = 12;

/// Audio bytes carried by the WaveInfo PDU.
pub const WAVE_LEADING_BYTES: usize = 4;

/// Padding at the front of the wave data PDU.
pub const WAVE_PAD_SIZE: usize = 4;

/// Size of the SNDC_WAVECONFIRM body.
pub const WAVE_CONFIRM_BODY_SIZE: usize = 4;

/// Decoded WaveInfo PDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveInfo {
    /// Index into the client's negotiated format list.
    pub format_index: u16,
    pub timestamp: u32,
    pub block_no: u8,
    /// First four bytes of audio.
    pub leading_bytes: [u8; WAVE_LEADING_BYTES],
    /// Length of the wave data PDU that must follow, padding included.
    pub wave_len: usize,
}

impl WaveInfo {
    /// Parses a WaveInfo body given the header's declared body size.
    pub fn parse(body: &[u8], body_size: u16) -> FrameResult<Self> {
        let declared = usize::from(body_size);
        if declared < WAVE_INFO_BODY_SIZE {
            return Err(FrameError::SizeMismatch {
                declared,
                actual: WAVE_INFO_BODY_SIZE,
            });
        }

        let mut reader = ByteReader::new(body);
        let format_index = reader.read_u16_le()?;
        let timestamp = reader.read_u32_le()?;
        let block_no = reader.read_u8()?;
        reader.skip(1)?;
        let leading_bytes = reader.read_array::<WAVE_LEADING_BYTES>()?;

        Ok(Self {
            format_index,
            timestamp,
            block_no,
            leading_bytes,
            wave_len: declared - WAVE_INFO_BODY_SIZE + WAVE_PAD_SIZE,
        })
    }

    /// Number of audio bytes the completed chunk will hold.
    #[must_use]
    pub const fn sample_len(&self) -> usize {
        self.wave_len - WAVE_PAD_SIZE + WAVE_LEADING_BYTES
    }

    /// Encodes the WaveInfo PDU (header and 12-byte body).
    pub fn to_pdu(&self) -> Result<Vec<u8>, EncodeError> {
        if self.wave_len < WAVE_PAD_SIZE {
            return Err(EncodeError::WaveTooShort {
                length: self.wave_len,
            });
        }
        let declared = self.wave_len - WAVE_PAD_SIZE + WAVE_INFO_BODY_SIZE;
        let body_size =
            u16::try_from(declared).map_err(|_| EncodeError::BodyTooLarge { length: declared })?;

        let mut out = ByteWriter::with_capacity(HEADER_SIZE + WAVE_INFO_BODY_SIZE);
        encode_header(PduHeader::new(MessageType::Wave, body_size), &mut out);
        out.write_u16_le(self.format_index);
        out.write_u32_le(self.timestamp);
        out.write_u8(self.block_no);
        out.write_u8(0);
        out.write_bytes(&self.leading_bytes);
        Ok(out.finish())
    }
}

/// Encodes one audio chunk the way a server sends it: a WaveInfo PDU
/// followed by the untagged wave data PDU.
pub fn encode_wave(
    format_index: u16,
    timestamp: u32,
    block_no: u8,
    samples: &[u8],
) -> Result<Vec<u8>, EncodeError> {
    if samples.len() < WAVE_LEADING_BYTES {
        return Err(EncodeError::WaveTooShort {
            length: samples.len(),
        });
    }
    let (leading, rest) = samples.split_at(WAVE_LEADING_BYTES);
    let mut leading_bytes = [0u8; WAVE_LEADING_BYTES];
    leading_bytes.copy_from_slice(leading);

    let info = WaveInfo {
        format_index,
        timestamp,
        block_no,
        leading_bytes,
        wave_len: WAVE_PAD_SIZE + rest.len(),
    };
    let mut out = info.to_pdu()?;
    out.extend_from_slice(&[0u8; WAVE_PAD_SIZE]);
    out.extend_from_slice(rest);
    Ok(out)
}

/// Client confirmation of a received wave block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveConfirm {
    /// Low 16 bits of the WaveInfo timestamp; the wire field is 16 bits.
    pub timestamp: u16,
    pub confirmed_block_no: u8,
}

impl WaveConfirm {
    /// Builds the confirmation for a WaveInfo.
    #[must_use]
    pub const fn for_wave(timestamp: u32, block_no: u8) -> Self {
        Self {
            timestamp: (timestamp & 0xFFFF) as u16,
            confirmed_block_no: block_no,
        }
    }

    /// Parses an SNDC_WAVECONFIRM body.
    pub fn parse(body: &[u8]) -> FrameResult<Self> {
        let mut reader = ByteReader::new(body);
        let timestamp = reader.read_u16_le()?;
        let confirmed_block_no = reader.read_u8()?;
        reader.skip(1)?;
        Ok(Self {
            timestamp,
            confirmed_block_no,
        })
    }

    /// Encodes the complete SNDC_WAVECONFIRM PDU.
    #[must_use]
    pub fn to_pdu(self) -> Vec<u8> {
        let mut out = ByteWriter::with_capacity(HEADER_SIZE + WAVE_CONFIRM_BODY_SIZE);
        encode_header(
            PduHeader::new(MessageType::WaveConfirm, WAVE_CONFIRM_BODY_SIZE as u16),
            &mut out,
        );
        out.write_u16_le(self.timestamp);
        out.write_u8(self.confirmed_block_no);
        out.write_u8(0);
        out.finish()
    }
}
