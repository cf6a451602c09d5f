//! PDU framing and body layouts for the rdpsnd audio channel.
//!
//! This crate handles the binary wire format of the server-to-client audio
//! sub-protocol: the common PDU header, the body layout of every message type,
//! and limit enforcement. It holds no session state; pairing WaveInfo with its
//! wave data and deciding what to answer belong to the `session` crate.
//!
//! # Design Principles
//!
//! - **Little-endian, fixed layouts** - Every field width is defined by the protocol.
//! - **Bounded decoding** - Format tables are validated against limits while parsed.
//! - **No session knowledge** - This crate frames PDUs, it does not sequence them.
//!
//! # Framing
//!
//! Every tagged PDU starts with a 4-byte header: `type:u8, pad:u8, body_size:u16`.
//! The wave data PDU is the exception: it has no header and is only
//! recognizable because it directly follows an SNDC_WAVE PDU (see [`WaveInfo`]).

mod error;
mod formats;
mod header;
mod limits;
mod pdu;
mod quality;
mod training;
mod wave;

pub use error::{
    EncodeError, FrameError, FrameResult, LimitKind, OrderingViolation, UnsupportedFormat,
};
pub use formats::{
    encode_formats, parse_formats, select_format, AudioFormat, FormatTable, FormatTag,
    FORMATS_PREFIX_SIZE, FORMAT_ENTRY_PREFIX_SIZE, TSSNDCAPS_ALIVE,
};
pub use header::{decode_header, MessageType, PduHeader, HEADER_SIZE};
pub use limits::Limits;
pub use pdu::{decode_pdu, encode_header, encode_pdu, Pdu};
pub use quality::{
    decode_quality_mode, QualityMode, QUALITY_MODE_BODY_SIZE, QUALITY_MODE_MIN_VERSION,
};
pub use training::{encode_training_response, TrainingProbe, TRAINING_BODY_SIZE};
pub use wave::{
    encode_wave, WaveConfirm, WaveInfo, WAVE_CONFIRM_BODY_SIZE, WAVE_INFO_BODY_SIZE,
    WAVE_LEADING_BYTES, WAVE_PAD_SIZE,
};
