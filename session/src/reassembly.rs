//! Two-PDU wave reassembly.
//!
//! A WaveInfo PDU announces a chunk and carries its first four audio bytes.
//! The wave data PDU that follows starts with four bytes of padding; the
//! reassembled chunk is the WaveInfo's leading bytes followed by everything
//! after that padding.

use bytestream::ByteReader;
use wire::{FrameError, FrameResult, OrderingViolation, WaveInfo, WAVE_PAD_SIZE};

/// A reassembled audio chunk, ready for playback.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AudioChunk {
    /// Index into the negotiated client format list.
    pub format_index: u16,
    pub timestamp: u32,
    pub block_no: u8,
    pub samples: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum ReassemblyState {
    #[default]
    Idle,
    AwaitingWaveBody(WaveInfo),
}

/// State machine pairing each WaveInfo with its wave data.
///
/// At most one WaveInfo is pending at a time.
#[derive(Debug, Clone, Default)]
pub struct WaveReassembler {
    state: ReassemblyState,
}

impl WaveReassembler {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: ReassemblyState::Idle,
        }
    }

    /// The pending WaveInfo, if any.
    #[must_use]
    pub const fn pending(&self) -> Option<&WaveInfo> {
        match &self.state {
            ReassemblyState::Idle => None,
            ReassemblyState::AwaitingWaveBody(info) => Some(info),
        }
    }

    #[must_use]
    pub const fn is_awaiting_wave_data(&self) -> bool {
        matches!(self.state, ReassemblyState::AwaitingWaveBody(_))
    }

    /// Handles an SNDC_WAVE body.
    ///
    /// A WaveInfo arriving while another is pending replaces it: the new one
    /// is installed and the discard is reported as an ordering violation. A
    /// body that fails to parse leaves the reassembler idle.
    pub fn on_wave_info(&mut self, body: &[u8], body_size: u16) -> FrameResult<WaveInfo> {
        let previous = std::mem::take(&mut self.state);
        let info = WaveInfo::parse(body, body_size)?;
        self.state = ReassemblyState::AwaitingWaveBody(info);

        match previous {
            ReassemblyState::Idle => Ok(info),
            ReassemblyState::AwaitingWaveBody(discarded) => Err(FrameError::OrderingViolation(
                OrderingViolation::WaveInfoBeforeData {
                    discarded_timestamp: discarded.timestamp,
                },
            )),
        }
    }

    /// Handles the untagged wave data PDU that completes a pending WaveInfo.
    ///
    /// The pending WaveInfo is consumed whether or not the data is valid.
    pub fn on_wave_data(&mut self, data: &[u8]) -> FrameResult<AudioChunk> {
        let ReassemblyState::AwaitingWaveBody(info) = std::mem::take(&mut self.state) else {
            return Err(FrameError::OrderingViolation(
                OrderingViolation::WaveDataWithoutInfo { len: data.len() },
            ));
        };

        let mut reader = ByteReader::new(data);
        reader.skip(WAVE_PAD_SIZE)?;
        if data.len() != info.wave_len {
            return Err(FrameError::SizeMismatch {
                declared: info.wave_len,
                actual: data.len(),
            });
        }

        let rest = reader.rest();
        let mut samples = Vec::with_capacity(info.leading_bytes.len() + rest.len());
        samples.extend_from_slice(&info.leading_bytes);
        samples.extend_from_slice(rest);

        Ok(AudioChunk {
            format_index: info.format_index,
            timestamp: info.timestamp,
            block_no: info.block_no,
            samples,
        })
    }
}
