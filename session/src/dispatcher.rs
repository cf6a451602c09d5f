//! Inbound byte stream dispatch.
//!
//! The dispatcher buffers raw transport bytes, frames complete PDUs, routes
//! each to its handler and reports one [`DispatchOutcome`] per PDU. The wave
//! data PDU has no header: while a WaveInfo is pending, the next `wave_len`
//! bytes are taken as its data regardless of what they look like.

use log::{debug, trace, warn};
use wire::{
    decode_header, parse_formats, FrameError, MessageType, PduHeader, QualityMode, TrainingProbe,
    UnsupportedFormat, WaveConfirm, HEADER_SIZE,
};

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::negotiate::{negotiate, NegotiatedFormats};
use crate::quality::{QualityNegotiator, SessionQuality};
use crate::reassembly::WaveReassembler;
use crate::sink::{AudioSink, Transport};
use crate::training::TrainingResponder;

/// What one framed PDU did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A format table was negotiated and answered.
    ///
    /// `unsupported` is set when no usable format was found; audio stays
    /// disabled until a later table.
    Formats {
        version: u16,
        server_formats: usize,
        client_formats: usize,
        /// Index of the selected format in the server table.
        selected: Option<usize>,
        /// Quality mode announced in response to this table.
        quality: Option<QualityMode>,
        unsupported: Option<UnsupportedFormat>,
    },

    /// A training probe was echoed.
    Training(TrainingProbe),

    /// A WaveInfo is now pending.
    WaveInfo {
        format_index: u16,
        timestamp: u32,
        block_no: u8,
        wave_len: usize,
    },

    /// A chunk was reassembled and handed to the sink.
    Audio {
        format_index: u16,
        timestamp: u32,
        block_no: u8,
        samples: usize,
    },

    /// SNDC_CLOSE was received.
    Closed,

    /// A client-to-server message type arrived inbound and was skipped.
    Ignored { message_type: MessageType },

    /// The PDU was rejected; the session carries on.
    Error(SessionError),
}

impl DispatchOutcome {
    /// Returns `true` for [`DispatchOutcome::Error`].
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

fn reported(err: SessionError) -> DispatchOutcome {
    warn!("rdpsnd: {err}");
    DispatchOutcome::Error(err)
}

/// Per-session protocol driver.
///
/// Owns every piece of mutable session state. Dropping it discards any
/// partially received PDU.
#[derive(Debug)]
pub struct Dispatcher<T: Transport, S: AudioSink> {
    config: SessionConfig,
    transport: T,
    sink: S,
    buffer: Vec<u8>,
    negotiated: Option<NegotiatedFormats>,
    training: TrainingResponder,
    reassembler: WaveReassembler,
    quality: QualityNegotiator,
}

impl<T: Transport, S: AudioSink> Dispatcher<T, S> {
    #[must_use]
    pub fn new(config: SessionConfig, transport: T, sink: S) -> Self {
        let quality = QualityNegotiator::new(config.quality_mode);
        Self {
            config,
            transport,
            sink,
            buffer: Vec::new(),
            negotiated: None,
            training: TrainingResponder::new(),
            reassembler: WaveReassembler::new(),
            quality,
        }
    }

    /// Feeds raw inbound bytes and processes every PDU they complete.
    ///
    /// PDUs are handled in arrival order. A trailing partial PDU stays
    /// buffered until a later call completes it.
    pub fn on_inbound_bytes(&mut self, bytes: &[u8]) -> Vec<DispatchOutcome> {
        self.buffer.extend_from_slice(bytes);
        let mut buffer = std::mem::take(&mut self.buffer);

        let mut outcomes = Vec::new();
        let mut offset = 0;
        while let Some((consumed, outcome)) = self.step(&buffer[offset..]) {
            offset += consumed;
            outcomes.push(outcome);
        }

        buffer.drain(..offset);
        self.buffer = buffer;
        outcomes
    }

    /// Frames and handles the PDU at the front of `buf`, if it is complete.
    fn step(&mut self, buf: &[u8]) -> Option<(usize, DispatchOutcome)> {
        if let Some(wave_len) = self.reassembler.pending().map(|info| info.wave_len) {
            if buf.len() < wave_len {
                return None;
            }
            return Some((wave_len, self.on_wave_data(&buf[..wave_len])));
        }

        match decode_header(buf) {
            Ok(header) => {
                let end = HEADER_SIZE + header.wire_body_len();
                if buf.len() < end {
                    return None;
                }
                Some((end, self.route(header, &buf[HEADER_SIZE..end])))
            }
            Err(err @ FrameError::UnknownType { body_size, .. }) => {
                let end = HEADER_SIZE + usize::from(body_size);
                if buf.len() < end {
                    return None;
                }
                Some((end, reported(err.into())))
            }
            Err(FrameError::Truncated { .. }) => None,
            // Any other header error skips the header alone
            Err(err) => Some((HEADER_SIZE, reported(err.into()))),
        }
    }

    fn route(&mut self, header: PduHeader, body: &[u8]) -> DispatchOutcome {
        debug!(
            "rdpsnd: {} ({} byte body)",
            header.message_type, header.body_size
        );
        match header.message_type {
            MessageType::Formats => self.on_formats(body),
            MessageType::Training => self.on_training(body),
            MessageType::Wave => self.on_wave_info(header, body),
            MessageType::Close => DispatchOutcome::Closed,
            message_type @ (MessageType::WaveConfirm | MessageType::QualityMode) => {
                DispatchOutcome::Ignored { message_type }
            }
        }
    }

    fn on_formats(&mut self, body: &[u8]) -> DispatchOutcome {
        let table = match parse_formats(body, &self.config.limits) {
            Ok(table) => table,
            Err(err) => return reported(err.into()),
        };
        let negotiated = negotiate(table, &self.config.formats);
        match negotiated.encode_response() {
            Ok(response) => self.transport.send(response),
            Err(err) => return reported(err.into()),
        }

        let quality = self
            .quality
            .on_formats_received(negotiated.version())
            .map(|pdu| {
                self.transport.send(pdu);
                self.config.quality_mode
            });

        let unsupported = negotiated.unsupported();
        if let Some(reason) = unsupported {
            warn!("rdpsnd: {reason}, audio disabled until the next format table");
        }
        let outcome = DispatchOutcome::Formats {
            version: negotiated.version(),
            server_formats: negotiated.server_table().len(),
            client_formats: negotiated.client_formats().len(),
            selected: negotiated.selected(),
            quality,
            unsupported,
        };
        self.negotiated = Some(negotiated);
        outcome
    }

    fn on_training(&mut self, body: &[u8]) -> DispatchOutcome {
        match self.training.respond(body) {
            Ok((probe, response)) => {
                self.transport.send(response);
                DispatchOutcome::Training(probe)
            }
            Err(err) => reported(err),
        }
    }

    fn on_wave_info(&mut self, header: PduHeader, body: &[u8]) -> DispatchOutcome {
        match self.reassembler.on_wave_info(body, header.body_size) {
            Ok(info) => DispatchOutcome::WaveInfo {
                format_index: info.format_index,
                timestamp: info.timestamp,
                block_no: info.block_no,
                wave_len: info.wave_len,
            },
            Err(err) => reported(err.into()),
        }
    }

    fn on_wave_data(&mut self, data: &[u8]) -> DispatchOutcome {
        let chunk = match self.reassembler.on_wave_data(data) {
            Ok(chunk) => chunk,
            Err(err) => return reported(err.into()),
        };

        if self.config.confirm_waves {
            self.transport
                .send(WaveConfirm::for_wave(chunk.timestamp, chunk.block_no).to_pdu());
        }

        let format = match &self.negotiated {
            Some(negotiated) => negotiated.format(chunk.format_index),
            None => Err(UnsupportedFormat::NotNegotiated),
        };
        match format {
            Ok(format) => {
                trace!(
                    "rdpsnd: block {} at {} ({} bytes, format {})",
                    chunk.block_no,
                    chunk.timestamp,
                    chunk.samples.len(),
                    chunk.format_index
                );
                let outcome = DispatchOutcome::Audio {
                    format_index: chunk.format_index,
                    timestamp: chunk.timestamp,
                    block_no: chunk.block_no,
                    samples: chunk.samples.len(),
                };
                self.sink.play(format, chunk);
                outcome
            }
            Err(reason) => reported(FrameError::UnsupportedFormat(reason).into()),
        }
    }

    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The most recent format negotiation.
    pub const fn negotiated(&self) -> Option<&NegotiatedFormats> {
        self.negotiated.as_ref()
    }

    pub const fn quality(&self) -> Option<SessionQuality> {
        self.quality.quality()
    }

    pub const fn is_awaiting_wave_data(&self) -> bool {
        self.reassembler.is_awaiting_wave_data()
    }

    /// Bytes held back waiting for the rest of a PDU.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the dispatcher, returning its collaborators.
    pub fn into_parts(self) -> (T, S) {
        (self.transport, self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reassembly::AudioChunk;
    use wire::{encode_formats, encode_wave, AudioFormat};

    type TestDispatcher = Dispatcher<Vec<Vec<u8>>, Vec<AudioChunk>>;

    fn dispatcher() -> TestDispatcher {
        Dispatcher::new(SessionConfig::for_testing(), Vec::new(), Vec::new())
    }

    fn formats_pdu(version: u16) -> Vec<u8> {
        encode_formats(version, 0, &[AudioFormat::pcm(2, 44_100, 16)]).unwrap()
    }

    #[test]
    fn formats_sends_response_then_quality() {
        let mut dispatcher = dispatcher();
        let outcomes = dispatcher.on_inbound_bytes(&formats_pdu(6));
        assert_eq!(
            outcomes,
            vec![DispatchOutcome::Formats {
                version: 6,
                server_formats: 1,
                client_formats: 1,
                selected: Some(0),
                quality: Some(QualityMode::Dynamic),
                unsupported: None,
            }]
        );
        let sent = dispatcher.transport();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0][0], MessageType::Formats.raw());
        assert_eq!(sent[1][0], MessageType::QualityMode.raw());
    }

    #[test]
    fn wave_pair_plays_and_confirms() {
        let mut dispatcher = dispatcher();
        dispatcher.on_inbound_bytes(&formats_pdu(5));
        let wave = encode_wave(0, 77, 4, &[1, 2, 3, 4, 5]).unwrap();
        let outcomes = dispatcher.on_inbound_bytes(&wave);
        assert_eq!(outcomes.len(), 2);
        assert!(matches!(outcomes[0], DispatchOutcome::WaveInfo { wave_len: 5, .. }));
        assert!(matches!(
            outcomes[1],
            DispatchOutcome::Audio {
                timestamp: 77,
                block_no: 4,
                samples: 5,
                ..
            }
        ));

        let (sent, played) = dispatcher.into_parts();
        assert_eq!(sent.last().unwrap(), &vec![5, 0, 4, 0, 77, 0, 4, 0]);
        assert_eq!(played[0].samples, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn wave_before_formats_not_negotiated() {
        let mut dispatcher = dispatcher();
        let outcomes = dispatcher.on_inbound_bytes(&encode_wave(0, 1, 1, &[0; 8]).unwrap());
        assert_eq!(
            outcomes[1],
            DispatchOutcome::Error(SessionError::Frame(FrameError::UnsupportedFormat(
                UnsupportedFormat::NotNegotiated
            )))
        );
        assert!(dispatcher.sink().is_empty());
        // Confirmation is still sent for the completed block
        assert_eq!(dispatcher.transport().len(), 1);
    }

    #[test]
    fn short_header_waits_for_more_bytes() {
        let mut dispatcher = dispatcher();
        for byte in &formats_pdu(5)[..HEADER_SIZE - 1] {
            assert!(dispatcher.on_inbound_bytes(&[*byte]).is_empty());
        }
        assert_eq!(dispatcher.buffered_len(), HEADER_SIZE - 1);
    }

    #[test]
    fn empty_table_reports_quality_and_reason() {
        let mut dispatcher = dispatcher();
        let outcomes = dispatcher.on_inbound_bytes(&encode_formats(6, 0, &[]).unwrap());
        assert_eq!(
            outcomes,
            vec![DispatchOutcome::Formats {
                version: 6,
                server_formats: 0,
                client_formats: 0,
                selected: None,
                quality: Some(QualityMode::Dynamic),
                unsupported: Some(UnsupportedFormat::EmptyTable),
            }]
        );
        assert_eq!(dispatcher.transport().len(), 2);

        // The mode was announced once; a later table does not repeat it
        let outcomes = dispatcher.on_inbound_bytes(&formats_pdu(6));
        assert!(matches!(
            outcomes[0],
            DispatchOutcome::Formats {
                quality: None,
                unsupported: None,
                ..
            }
        ));
        assert_eq!(dispatcher.transport().len(), 3);
    }

    #[test]
    fn partial_pdu_stays_buffered() {
        let mut dispatcher = dispatcher();
        let pdu = formats_pdu(5);
        assert!(dispatcher.on_inbound_bytes(&pdu[..3]).is_empty());
        assert_eq!(dispatcher.buffered_len(), 3);
        assert_eq!(dispatcher.on_inbound_bytes(&pdu[3..]).len(), 1);
        assert_eq!(dispatcher.buffered_len(), 0);
    }

    #[test]
    fn unknown_type_skipped_by_declared_size() {
        let mut dispatcher = dispatcher();
        let mut bytes = vec![0x63, 0, 2, 0, 0xAA, 0xBB];
        bytes.extend_from_slice(&[1, 0, 0, 0]);
        let outcomes = dispatcher.on_inbound_bytes(&bytes);
        assert_eq!(
            outcomes,
            vec![
                DispatchOutcome::Error(SessionError::Frame(FrameError::UnknownType {
                    code: 0x63,
                    body_size: 2
                })),
                DispatchOutcome::Closed,
            ]
        );
    }

    #[test]
    fn inbound_client_types_ignored() {
        let mut dispatcher = dispatcher();
        let outcomes = dispatcher.on_inbound_bytes(&WaveConfirm::for_wave(1, 1).to_pdu());
        assert_eq!(
            outcomes,
            vec![DispatchOutcome::Ignored {
                message_type: MessageType::WaveConfirm
            }]
        );
    }

    #[test]
    fn confirmations_can_be_disabled() {
        let config = SessionConfig {
            confirm_waves: false,
            ..SessionConfig::for_testing()
        };
        let mut dispatcher: TestDispatcher = Dispatcher::new(config, Vec::new(), Vec::new());
        dispatcher.on_inbound_bytes(&formats_pdu(2));
        dispatcher.on_inbound_bytes(&encode_wave(0, 1, 1, &[0; 8]).unwrap());
        assert_eq!(dispatcher.transport().len(), 1);
        assert_eq!(dispatcher.sink().len(), 1);
    }

    #[test]
    fn wave_info_with_short_declared_size() {
        let mut dispatcher = dispatcher();
        let bytes = [2, 0, 2, 0, 0xFF, 0xFF, 1, 0, 0, 0];
        let outcomes = dispatcher.on_inbound_bytes(&bytes);
        assert_eq!(
            outcomes,
            vec![
                DispatchOutcome::Error(SessionError::Frame(FrameError::SizeMismatch {
                    declared: 2,
                    actual: 12
                })),
                DispatchOutcome::Closed,
            ]
        );
        assert!(!dispatcher.is_awaiting_wave_data());
    }
}
