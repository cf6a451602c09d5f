//! Collaborators the dispatcher drives.

use wire::AudioFormat;

use crate::reassembly::AudioChunk;

/// Carries client PDUs back to the server.
pub trait Transport {
    /// Sends one complete PDU.
    fn send(&mut self, pdu: Vec<u8>);
}

/// Collects sent PDUs in order.
impl Transport for Vec<Vec<u8>> {
    fn send(&mut self, pdu: Vec<u8>) {
        self.push(pdu);
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, pdu: Vec<u8>) {
        (**self).send(pdu);
    }
}

/// Consumes reassembled audio.
///
/// Chunks are handed over by value and never retained by the session.
pub trait AudioSink {
    /// Plays `chunk`, whose samples are encoded as `format`.
    fn play(&mut self, format: &AudioFormat, chunk: AudioChunk);
}

/// Collects chunks in playback order, ignoring their format.
impl AudioSink for Vec<AudioChunk> {
    fn play(&mut self, _format: &AudioFormat, chunk: AudioChunk) {
        self.push(chunk);
    }
}

impl<S: AudioSink + ?Sized> AudioSink for &mut S {
    fn play(&mut self, format: &AudioFormat, chunk: AudioChunk) {
        (**self).play(format, chunk);
    }
}
