//! Session layer of the rdpsnd audio channel.
//!
//! This crate turns the raw inbound byte stream of one audio channel into
//! session events. It ties the `wire` layouts together with the state the
//! protocol needs across PDUs.
//!
//! # Features
//!
//! - Stream framing with partial-PDU buffering
//! - Format negotiation and the client formats response
//! - Training probe echo
//! - Two-PDU wave reassembly with wave confirmations
//! - One-shot quality mode announcement
//!
//! # Design Principles
//!
//! - **One outcome per PDU** - Every framed PDU yields exactly one [`DispatchOutcome`].
//! - **No fatal errors** - A rejected PDU is reported and the session carries on.
//! - **Plain collaborators** - Outbound PDUs and audio go through [`Transport`] and [`AudioSink`].

mod config;
mod dispatcher;
mod error;
mod negotiate;
mod quality;
mod reassembly;
mod sink;
mod training;

pub use config::{FormatPolicy, SessionConfig};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::{SessionError, SessionResult};
pub use negotiate::{negotiate, NegotiatedFormats};
pub use quality::{QualityNegotiator, SessionQuality};
pub use reassembly::{AudioChunk, WaveReassembler};
pub use sink::{AudioSink, Transport};
pub use training::TrainingResponder;
pub use wire::Limits as WireLimits;
