//! Capture inspection and replay tools for the rdpsnd audio channel.
//!
//! This crate provides utilities for understanding captured inbound streams:
//!
//! - Walk a capture PDU by PDU and describe each body
//! - Replay a capture through a session and report what it sent and played
//! - Render replayed PCM audio into a WAV file
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to understand what the server sent.

mod inspect;
mod replay;
mod wav;

pub use inspect::{
    format_inspect_pretty, inspect_stream, FormatSummary, InspectReport, PduDetail, PduSummary,
};
pub use replay::{
    count_sent, format_replay_pretty, replay, OutcomeRecord, ReplayReport, SentRecord,
};
pub use wav::{WavSink, WavSummary};
