//! Training probe responder.

use wire::{encode_training_response, TrainingProbe};

use crate::error::SessionResult;

/// Answers server latency probes.
///
/// Stateless: the response echoes the probe body byte for byte, including any
/// trailing filler the server appended after the fixed fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrainingResponder;

impl TrainingResponder {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Builds the response PDU for a training body.
    pub fn handle(&self, body: &[u8]) -> SessionResult<Vec<u8>> {
        self.respond(body).map(|(_, response)| response)
    }

    /// Like [`handle`](Self::handle), also returning the decoded probe.
    pub fn respond(&self, body: &[u8]) -> SessionResult<(TrainingProbe, Vec<u8>)> {
        let probe = TrainingProbe::parse(body)?;
        let response = encode_training_response(body)?;
        Ok((probe, response))
    }
}
