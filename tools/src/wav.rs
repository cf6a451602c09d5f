//! WAV file rendering sink.

use std::io::{Seek, Write};

use hound::{SampleFormat, WavSpec, WavWriter};
use serde::Serialize;
use session::{AudioChunk, AudioSink};
use wire::AudioFormat;

/// Header for a PCM format that can be written as WAV, if it is one.
fn wav_spec(format: &AudioFormat) -> Option<WavSpec> {
    let sample_bytes: u32 = match format.bits_per_sample {
        8 => 1,
        16 => 2,
        24 => 3,
        32 => 4,
        _ => return None,
    };
    if format.channels == 0 || format.samples_per_second == 0 {
        return None;
    }
    // The byte rate is stored as u32
    format
        .samples_per_second
        .checked_mul(sample_bytes * u32::from(format.channels))?;
    Some(WavSpec {
        channels: format.channels,
        sample_rate: format.samples_per_second,
        bits_per_sample: format.bits_per_sample,
        sample_format: SampleFormat::Int,
    })
}

/// What a [`WavSink`] wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WavSummary {
    pub channels: Option<u16>,
    pub sample_rate: Option<u32>,
    pub bits_per_sample: Option<u16>,
    pub samples_written: u64,
    /// Chunks that were not writable PCM or did not match the first chunk's format.
    pub skipped_chunks: usize,
}

/// Writes PCM chunks into a WAV container.
///
/// The WAV header is fixed by the first PCM chunk; later chunks in another
/// format are skipped. Write errors are held until [`finish`](Self::finish)
/// because [`AudioSink::play`] cannot fail.
pub struct WavSink<W: Write + Seek> {
    target: Option<W>,
    writer: Option<WavWriter<W>>,
    spec: Option<WavSpec>,
    samples_written: u64,
    skipped_chunks: usize,
    error: Option<hound::Error>,
}

impl<W: Write + Seek> WavSink<W> {
    pub const fn new(target: W) -> Self {
        Self {
            target: Some(target),
            writer: None,
            spec: None,
            samples_written: 0,
            skipped_chunks: 0,
            error: None,
        }
    }

    /// Finalizes the WAV header and reports what was written.
    pub fn finish(mut self) -> Result<WavSummary, hound::Error> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        if let Some(writer) = self.writer.take() {
            writer.finalize()?;
        }
        Ok(WavSummary {
            channels: self.spec.map(|spec| spec.channels),
            sample_rate: self.spec.map(|spec| spec.sample_rate),
            bits_per_sample: self.spec.map(|spec| spec.bits_per_sample),
            samples_written: self.samples_written,
            skipped_chunks: self.skipped_chunks,
        })
    }

    fn writer_for(&mut self, spec: WavSpec) -> Result<Option<&mut WavWriter<W>>, hound::Error> {
        match self.spec {
            Some(current) if current != spec => return Ok(None),
            Some(_) => {}
            None => {
                let Some(target) = self.target.take() else {
                    return Ok(None);
                };
                self.writer = Some(WavWriter::new(target, spec)?);
                self.spec = Some(spec);
            }
        }
        Ok(self.writer.as_mut())
    }

    fn write_chunk(
        &mut self,
        format: &AudioFormat,
        chunk: &AudioChunk,
    ) -> Result<(), hound::Error> {
        let Some(spec) = wav_spec(format) else {
            log::debug!(
                "wav: skipping block {} in unwritable format {}ch {}Hz {}bit",
                chunk.block_no,
                format.channels,
                format.samples_per_second,
                format.bits_per_sample
            );
            self.skipped_chunks += 1;
            return Ok(());
        };
        let Some(writer) = self.writer_for(spec)? else {
            self.skipped_chunks += 1;
            return Ok(());
        };

        // Only whole frames; a partial frame would leave the file unfinalizable
        let frame = usize::from(spec.bits_per_sample / 8) * usize::from(spec.channels);
        let samples = &chunk.samples[..chunk.samples.len() - chunk.samples.len() % frame];
        let written = match spec.bits_per_sample {
            8 => {
                // 8-bit WAV is unsigned around 128
                for &byte in samples {
                    writer.write_sample(i8::from_le_bytes([byte ^ 0x80]))?;
                }
                samples.len()
            }
            16 => {
                let frames = samples.chunks_exact(2);
                let count = frames.len();
                for pair in frames {
                    writer.write_sample(i16::from_le_bytes([pair[0], pair[1]]))?;
                }
                count
            }
            24 => {
                let frames = samples.chunks_exact(3);
                let count = frames.len();
                for triple in frames {
                    // Sign-extend through the top byte
                    let sample = i32::from_le_bytes([0, triple[0], triple[1], triple[2]]) >> 8;
                    writer.write_sample(sample)?;
                }
                count
            }
            _ => {
                let frames = samples.chunks_exact(4);
                let count = frames.len();
                for quad in frames {
                    let sample = i32::from_le_bytes([quad[0], quad[1], quad[2], quad[3]]);
                    writer.write_sample(sample)?;
                }
                count
            }
        };
        self.samples_written += written as u64;
        Ok(())
    }
}

impl<W: Write + Seek> AudioSink for WavSink<W> {
    fn play(&mut self, format: &AudioFormat, chunk: AudioChunk) {
        if self.error.is_some() {
            return;
        }
        if !format.is_pcm() {
            log::debug!("wav: skipping non-PCM block {}", chunk.block_no);
            self.skipped_chunks += 1;
            return;
        }
        if let Err(err) = self.write_chunk(format, &chunk) {
            log::warn!("wav: write failed: {err}");
            self.error = Some(err);
        }
    }
}
