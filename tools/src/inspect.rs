//! Stateless walk over a captured inbound stream.

use std::fmt::Write as _;

use serde::Serialize;
use wire::{
    decode_header, decode_quality_mode, parse_formats, select_format, AudioFormat, FrameError,
    FrameResult, Limits, MessageType, PduHeader, TrainingProbe, WaveConfirm, WaveInfo, HEADER_SIZE,
};

/// Structure of one captured stream.
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub total_bytes: usize,
    pub pdus: Vec<PduSummary>,
    /// Bytes after the last complete PDU.
    pub trailing_bytes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PduSummary {
    pub offset: usize,
    /// Bytes the PDU occupies on the wire, header included.
    pub len: usize,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<PduDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PduDetail {
    Formats {
        version: u16,
        flags: u32,
        selected: Option<usize>,
        formats: Vec<FormatSummary>,
    },
    Training {
        timestamp: u16,
        pack_size: u16,
        body_len: usize,
    },
    WaveInfo {
        format_index: u16,
        timestamp: u32,
        block_no: u8,
        wave_len: usize,
        sample_len: usize,
    },
    WaveData {
        samples: usize,
    },
    WaveConfirm {
        timestamp: u16,
        block_no: u8,
    },
    QualityMode {
        mode: Option<String>,
    },
    Close,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormatSummary {
    pub tag: u16,
    pub channels: u16,
    pub samples_per_second: u32,
    pub bits_per_sample: u16,
    pub block_align: u16,
    pub codec_data_len: usize,
}

impl From<&AudioFormat> for FormatSummary {
    fn from(format: &AudioFormat) -> Self {
        Self {
            tag: format.tag.raw(),
            channels: format.channels,
            samples_per_second: format.samples_per_second,
            bits_per_sample: format.bits_per_sample,
            block_align: format.block_align,
            codec_data_len: format.codec_data.len(),
        }
    }
}

/// Walks `bytes` PDU by PDU without driving a session.
///
/// Wave data is framed by the preceding WaveInfo the same way a session
/// frames it. Body errors are recorded per PDU and the walk continues.
pub fn inspect_stream(bytes: &[u8], limits: &Limits) -> InspectReport {
    let mut pdus = Vec::new();
    let mut offset = 0;
    // (wave_len, sample_len) of the pending WaveInfo
    let mut pending_wave: Option<(usize, usize)> = None;

    loop {
        let rest = &bytes[offset..];
        if let Some((wave_len, sample_len)) = pending_wave {
            if rest.len() < wave_len {
                break;
            }
            pdus.push(PduSummary {
                offset,
                len: wave_len,
                message: "wave data".to_string(),
                detail: Some(PduDetail::WaveData { samples: sample_len }),
                error: None,
            });
            pending_wave = None;
            offset += wave_len;
            continue;
        }

        if rest.len() < HEADER_SIZE {
            break;
        }
        let (len, summary) = match decode_header(rest) {
            Ok(header) => {
                let len = HEADER_SIZE + header.wire_body_len();
                if rest.len() < len {
                    break;
                }
                let body = &rest[HEADER_SIZE..len];
                let (detail, error) = match describe(header, body, limits) {
                    Ok(detail) => (Some(detail), None),
                    Err(err) => (None, Some(err.to_string())),
                };
                if let Some(PduDetail::WaveInfo {
                    wave_len,
                    sample_len,
                    ..
                }) = detail
                {
                    pending_wave = Some((wave_len, sample_len));
                }
                let summary = PduSummary {
                    offset,
                    len,
                    message: header.message_type.name().to_string(),
                    detail,
                    error,
                };
                (len, summary)
            }
            Err(err @ FrameError::UnknownType { code, body_size }) => {
                let len = HEADER_SIZE + usize::from(body_size);
                if rest.len() < len {
                    break;
                }
                let summary = PduSummary {
                    offset,
                    len,
                    message: format!("unknown 0x{code:02X}"),
                    detail: None,
                    error: Some(err.to_string()),
                };
                (len, summary)
            }
            Err(_) => break,
        };
        pdus.push(summary);
        offset += len;
    }

    InspectReport {
        total_bytes: bytes.len(),
        pdus,
        trailing_bytes: bytes.len() - offset,
    }
}

fn describe(header: PduHeader, body: &[u8], limits: &Limits) -> FrameResult<PduDetail> {
    let detail = match header.message_type {
        MessageType::Formats => {
            let table = parse_formats(body, limits)?;
            PduDetail::Formats {
                version: table.version,
                flags: table.flags,
                selected: select_format(&table),
                formats: table.formats.iter().map(FormatSummary::from).collect(),
            }
        }
        MessageType::Training => {
            let probe = TrainingProbe::parse(body)?;
            PduDetail::Training {
                timestamp: probe.timestamp,
                pack_size: probe.pack_size,
                body_len: body.len(),
            }
        }
        MessageType::Wave => {
            let info = WaveInfo::parse(body, header.body_size)?;
            PduDetail::WaveInfo {
                format_index: info.format_index,
                timestamp: info.timestamp,
                block_no: info.block_no,
                wave_len: info.wave_len,
                sample_len: info.sample_len(),
            }
        }
        MessageType::WaveConfirm => {
            let confirm = WaveConfirm::parse(body)?;
            PduDetail::WaveConfirm {
                timestamp: confirm.timestamp,
                block_no: confirm.confirmed_block_no,
            }
        }
        MessageType::QualityMode => PduDetail::QualityMode {
            mode: decode_quality_mode(body)?.map(|mode| mode.to_string()),
        },
        MessageType::Close => PduDetail::Close,
    };
    Ok(detail)
}

/// Renders an inspect report for terminals.
pub fn format_inspect_pretty(report: &InspectReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} bytes, {} PDUs, {} trailing",
        report.total_bytes,
        report.pdus.len(),
        report.trailing_bytes
    );
    for pdu in &report.pdus {
        let _ = write!(out, "  @{:<6} {:<18} {:>6} bytes", pdu.offset, pdu.message, pdu.len);
        if let Some(detail) = &pdu.detail {
            let _ = write!(out, "  {}", describe_pretty(detail));
        }
        if let Some(error) = &pdu.error {
            let _ = write!(out, "  error: {error}");
        }
        out.push('\n');
    }
    out
}

fn describe_pretty(detail: &PduDetail) -> String {
    match detail {
        PduDetail::Formats {
            version,
            selected,
            formats,
            ..
        } => {
            let selected = selected.map_or_else(|| "none".to_string(), |index| index.to_string());
            format!(
                "version {version}, {} formats, selected {selected}",
                formats.len()
            )
        }
        PduDetail::Training {
            timestamp,
            pack_size,
            ..
        } => format!("timestamp {timestamp}, pack size {pack_size}"),
        PduDetail::WaveInfo {
            format_index,
            timestamp,
            block_no,
            wave_len,
            ..
        } => format!(
            "block {block_no} at {timestamp}, format {format_index}, {wave_len} byte wave"
        ),
        PduDetail::WaveData { samples } => format!("{samples} audio bytes"),
        PduDetail::WaveConfirm {
            timestamp,
            block_no,
        } => format!("block {block_no} at {timestamp}"),
        PduDetail::QualityMode { mode } => {
            format!("mode {}", mode.as_deref().unwrap_or("unknown"))
        }
        PduDetail::Close => String::new(),
    }
}
