//! SNDC_FORMATS body layout: audio format tables in both directions.

use bytestream::{ByteReader, ByteWriter};

use crate::error::{EncodeError, FrameError, FrameResult, LimitKind};
use crate::header::MessageType;
use crate::limits::Limits;
use crate::pdu::encode_pdu;

/// Client capability flag: the client is alive and can play audio.
pub const TSSNDCAPS_ALIVE: u32 = 1;

/// Size of the table prefix: version(2) + flags(4).
pub const FORMATS_PREFIX_SIZE: usize = 2 + 4;

/// Size of the fixed part of one format entry.
pub const FORMAT_ENTRY_PREFIX_SIZE: usize = 2 + 2 + 4 + 4 + 2 + 2 + 2;

/// Wave format tag of a format entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatTag {
    Pcm,
    Adpcm,
    ALaw,
    MuLaw,
    ImaAdpcm,
    Other(u16),
}

impl FormatTag {
    pub const WAVE_FORMAT_PCM: u16 = 0x0001;
    const WAVE_FORMAT_ADPCM: u16 = 0x0002;
    const WAVE_FORMAT_ALAW: u16 = 0x0006;
    const WAVE_FORMAT_MULAW: u16 = 0x0007;
    const WAVE_FORMAT_DVI_ADPCM: u16 = 0x0011;

    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        match raw {
            Self::WAVE_FORMAT_PCM => Self::Pcm,
            Self::WAVE_FORMAT_ADPCM => Self::Adpcm,
            Self::WAVE_FORMAT_ALAW => Self::ALaw,
            Self::WAVE_FORMAT_MULAW => Self::MuLaw,
            Self::WAVE_FORMAT_DVI_ADPCM => Self::ImaAdpcm,
            other => Self::Other(other),
        }
    }

    #[must_use]
    pub const fn raw(self) -> u16 {
        match self {
            Self::Pcm => Self::WAVE_FORMAT_PCM,
            Self::Adpcm => Self::WAVE_FORMAT_ADPCM,
            Self::ALaw => Self::WAVE_FORMAT_ALAW,
            Self::MuLaw => Self::WAVE_FORMAT_MULAW,
            Self::ImaAdpcm => Self::WAVE_FORMAT_DVI_ADPCM,
            Self::Other(raw) => raw,
        }
    }
}

/// One entry of a format table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AudioFormat {
    pub tag: FormatTag,
    pub channels: u16,
    pub samples_per_second: u32,
    pub bytes_per_second: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    /// Codec-specific tail, kept opaque so it can be echoed back.
    pub codec_data: Vec<u8>,
}

impl AudioFormat {
    /// Creates a PCM format with derived block alignment and byte rate.
    ///
    /// Derived fields saturate at their field width.
    #[must_use]
    pub fn pcm(channels: u16, samples_per_second: u32, bits_per_sample: u16) -> Self {
        let block_align = channels.saturating_mul(bits_per_sample.div_ceil(8));
        Self {
            tag: FormatTag::Pcm,
            channels,
            samples_per_second,
            bytes_per_second: samples_per_second.saturating_mul(u32::from(block_align)),
            block_align,
            bits_per_sample,
            codec_data: Vec::new(),
        }
    }

    #[must_use]
    pub const fn is_pcm(&self) -> bool {
        matches!(self.tag, FormatTag::Pcm)
    }

    /// Encoded size of this entry in bytes.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        FORMAT_ENTRY_PREFIX_SIZE + self.codec_data.len()
    }

    fn read(reader: &mut ByteReader<'_>, limits: &Limits) -> FrameResult<Self> {
        let tag = FormatTag::from_raw(reader.read_u16_le()?);
        let channels = reader.read_u16_le()?;
        let samples_per_second = reader.read_u32_le()?;
        let bytes_per_second = reader.read_u32_le()?;
        let block_align = reader.read_u16_le()?;
        let bits_per_sample = reader.read_u16_le()?;
        let codec_data_len = usize::from(reader.read_u16_le()?);
        if codec_data_len > limits.max_codec_data_len {
            return Err(FrameError::LimitsExceeded {
                kind: LimitKind::CodecDataLength,
                limit: limits.max_codec_data_len,
                actual: codec_data_len,
            });
        }
        let codec_data = reader.read_bytes(codec_data_len)?.to_vec();

        Ok(Self {
            tag,
            channels,
            samples_per_second,
            bytes_per_second,
            block_align,
            bits_per_sample,
            codec_data,
        })
    }

    fn write(&self, out: &mut ByteWriter) -> Result<(), EncodeError> {
        let codec_data_len =
            u16::try_from(self.codec_data.len()).map_err(|_| EncodeError::BodyTooLarge {
                length: self.codec_data.len(),
            })?;
        out.write_u16_le(self.tag.raw());
        out.write_u16_le(self.channels);
        out.write_u32_le(self.samples_per_second);
        out.write_u32_le(self.bytes_per_second);
        out.write_u16_le(self.block_align);
        out.write_u16_le(self.bits_per_sample);
        out.write_u16_le(codec_data_len);
        out.write_bytes(&self.codec_data);
        Ok(())
    }
}

/// A format table as carried by an SNDC_FORMATS PDU.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormatTable {
    pub version: u16,
    pub flags: u32,
    pub formats: Vec<AudioFormat>,
}

impl FormatTable {
    #[must_use]
    pub fn len(&self) -> usize {
        self.formats.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}

/// Parses an SNDC_FORMATS body.
///
/// Entries are not counted on the wire: they run until the body is exhausted,
/// so an incomplete trailing entry is reported as [`FrameError::Truncated`].
pub fn parse_formats(body: &[u8], limits: &Limits) -> FrameResult<FormatTable> {
    let mut reader = ByteReader::new(body);
    let version = reader.read_u16_le()?;
    let flags = reader.read_u32_le()?;

    let mut formats = Vec::new();
    while !reader.is_empty() {
        if formats.len() >= limits.max_formats {
            return Err(FrameError::LimitsExceeded {
                kind: LimitKind::FormatCount,
                limit: limits.max_formats,
                actual: formats.len() + 1,
            });
        }
        formats.push(AudioFormat::read(&mut reader, limits)?);
    }

    Ok(FormatTable {
        version,
        flags,
        formats,
    })
}

/// Selects the format the client will use.
///
/// Returns the index of the first PCM entry, else index 0. An empty table
/// yields `None`.
#[must_use]
pub fn select_format(table: &FormatTable) -> Option<usize> {
    if table.is_empty() {
        return None;
    }
    Some(
        table
            .formats
            .iter()
            .position(AudioFormat::is_pcm)
            .unwrap_or(0),
    )
}

/// Encodes a complete SNDC_FORMATS PDU.
///
/// Both directions share this layout: the server advertises its table with
/// it and the client answers with the subset it accepts.
pub fn encode_formats(
    version: u16,
    flags: u32,
    formats: &[AudioFormat],
) -> Result<Vec<u8>, EncodeError> {
    let body_len = FORMATS_PREFIX_SIZE
        + formats
            .iter()
            .map(AudioFormat::encoded_len)
            .sum::<usize>();
    let mut body = ByteWriter::with_capacity(body_len);
    body.write_u16_le(version);
    body.write_u32_le(flags);
    for format in formats {
        format.write(&mut body)?;
    }
    encode_pdu(MessageType::Formats, &body.finish())
}
