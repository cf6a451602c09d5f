//! Replays a captured inbound stream through a session.

use std::fmt::Write as _;

use serde::Serialize;
use session::{AudioSink, DispatchOutcome, Dispatcher, SessionConfig};
use wire::{decode_header, MessageType};

/// Everything a replayed session did.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub input_bytes: usize,
    pub chunk_size: usize,
    pub outcomes: Vec<OutcomeRecord>,
    pub sent: Vec<SentRecord>,
    pub audio_chunks: usize,
    pub audio_bytes: usize,
    pub errors: usize,
    /// Format tables that left audio disabled.
    pub unsupported_tables: usize,
    /// Bytes still buffered when the capture ended.
    pub buffered_bytes: usize,
    pub awaiting_wave_data: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutcomeRecord {
    pub kind: &'static str,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SentRecord {
    pub message: String,
    pub len: usize,
}

impl From<&DispatchOutcome> for OutcomeRecord {
    fn from(outcome: &DispatchOutcome) -> Self {
        let (kind, detail) = match outcome {
            DispatchOutcome::Formats {
                version,
                server_formats,
                client_formats,
                selected,
                quality,
                unsupported,
            } => {
                let mut detail = format!(
                    "version {version}, {client_formats}/{server_formats} formats accepted"
                );
                if let Some(selected) = selected {
                    let _ = write!(detail, ", selected {selected}");
                }
                if let Some(mode) = quality {
                    let _ = write!(detail, ", quality {mode}");
                }
                if let Some(reason) = unsupported {
                    let _ = write!(detail, ", {reason}");
                }
                ("formats", detail)
            }
            DispatchOutcome::Training(probe) => (
                "training",
                format!("timestamp {}, pack size {}", probe.timestamp, probe.pack_size),
            ),
            DispatchOutcome::WaveInfo {
                format_index,
                timestamp,
                block_no,
                wave_len,
            } => (
                "wave_info",
                format!(
                    "block {block_no} at {timestamp}, format {format_index}, {wave_len} byte wave"
                ),
            ),
            DispatchOutcome::Audio {
                format_index,
                timestamp,
                block_no,
                samples,
            } => (
                "audio",
                format!(
                    "block {block_no} at {timestamp}, format {format_index}, {samples} bytes"
                ),
            ),
            DispatchOutcome::Closed => ("closed", String::new()),
            DispatchOutcome::Ignored { message_type } => ("ignored", message_type.to_string()),
            DispatchOutcome::Error(err) => ("error", err.to_string()),
        };
        Self { kind, detail }
    }
}

fn sent_record(pdu: &[u8]) -> SentRecord {
    let message = match decode_header(pdu) {
        Ok(header) => header.message_type.name().to_string(),
        Err(_) => "unknown".to_string(),
    };
    SentRecord {
        message,
        len: pdu.len(),
    }
}

/// Feeds `bytes` to a fresh session in `chunk_size` pieces.
///
/// A `chunk_size` of zero feeds the whole capture at once. Returns the report
/// and the sink so callers can finish it.
pub fn replay<S: AudioSink>(
    bytes: &[u8],
    config: SessionConfig,
    chunk_size: usize,
    sink: S,
) -> (ReplayReport, S) {
    let chunk_size = if chunk_size == 0 {
        bytes.len().max(1)
    } else {
        chunk_size
    };

    let mut dispatcher = Dispatcher::new(config, Vec::<Vec<u8>>::new(), sink);
    let mut outcomes = Vec::new();
    for chunk in bytes.chunks(chunk_size) {
        outcomes.extend(dispatcher.on_inbound_bytes(chunk));
    }

    let buffered_bytes = dispatcher.buffered_len();
    let awaiting_wave_data = dispatcher.is_awaiting_wave_data();
    let (sent, sink) = dispatcher.into_parts();

    let mut audio_chunks = 0;
    let mut audio_bytes = 0;
    let mut errors = 0;
    let mut unsupported_tables = 0;
    for outcome in &outcomes {
        match outcome {
            DispatchOutcome::Audio { samples, .. } => {
                audio_chunks += 1;
                audio_bytes += samples;
            }
            DispatchOutcome::Formats {
                unsupported: Some(_),
                ..
            } => unsupported_tables += 1,
            DispatchOutcome::Error(_) => errors += 1,
            _ => {}
        }
    }

    let report = ReplayReport {
        input_bytes: bytes.len(),
        chunk_size,
        outcomes: outcomes.iter().map(OutcomeRecord::from).collect(),
        sent: sent.iter().map(|pdu| sent_record(pdu)).collect(),
        audio_chunks,
        audio_bytes,
        errors,
        unsupported_tables,
        buffered_bytes,
        awaiting_wave_data,
    };
    (report, sink)
}

/// Renders a replay report for terminals.
pub fn format_replay_pretty(report: &ReplayReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} bytes in {} byte chunks: {} outcomes, {} errors",
        report.input_bytes,
        report.chunk_size,
        report.outcomes.len(),
        report.errors
    );
    for outcome in &report.outcomes {
        let _ = writeln!(out, "  {:<10} {}", outcome.kind, outcome.detail);
    }
    let _ = writeln!(out, "sent:");
    for sent in &report.sent {
        let _ = writeln!(out, "  {:<18} {:>6} bytes", sent.message, sent.len);
    }
    let _ = writeln!(
        out,
        "audio: {} chunks, {} bytes",
        report.audio_chunks, report.audio_bytes
    );
    if report.buffered_bytes > 0 || report.awaiting_wave_data {
        let _ = writeln!(
            out,
            "incomplete: {} bytes buffered{}",
            report.buffered_bytes,
            if report.awaiting_wave_data {
                ", wave data pending"
            } else {
                ""
            }
        );
    }
    out
}

/// Counts outbound PDUs of one type in a report.
pub fn count_sent(report: &ReplayReport, message_type: MessageType) -> usize {
    report
        .sent
        .iter()
        .filter(|sent| sent.message == message_type.name())
        .count()
}
