//! Framer station: capture chunks in, encoded packets out.

use crate::audio::accumulator::{FlushPolicy, FrameAccumulator};
use crate::audio::pcm;
use crate::pipeline::error::StationError;
use crate::pipeline::station::Station;
use crate::pipeline::types::{AudioPacket, SampleChunk};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Station that frames raw capture chunks into service-sized PCM packets.
///
/// This station:
/// - Feeds each chunk to the FrameAccumulator
/// - Encodes released sample runs to 16-bit PCM
/// - Assigns monotonically increasing sequence numbers
/// - On shutdown, flushes or discards the residue depending on whether the
///   operator stopped the session explicitly
pub struct FramerStation {
    accumulator: FrameAccumulator,
    sequence: u64,
    sample_rate: u32,
    /// Output channel for flushing residual audio on shutdown.
    flush_tx: Option<crossbeam_channel::Sender<AudioPacket>>,
    /// Set by the pipeline handle on explicit stop: residue is discarded,
    /// never flushed.
    explicit_stop: Arc<AtomicBool>,
}

impl FramerStation {
    /// Creates a framer for the given sample rate.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            accumulator: FrameAccumulator::new(sample_rate),
            sequence: 0,
            sample_rate,
            flush_tx: None,
            explicit_stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Sets the end-of-source flush policy.
    pub fn with_flush_policy(mut self, policy: FlushPolicy) -> Self {
        self.accumulator = self.accumulator.with_flush_policy(policy);
        self
    }

    /// Set the output channel used to flush residual audio on shutdown.
    pub fn with_flush_tx(mut self, tx: crossbeam_channel::Sender<AudioPacket>) -> Self {
        self.flush_tx = Some(tx);
        self
    }

    /// Shares the explicit-stop flag with the pipeline handle.
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.explicit_stop = flag;
        self
    }

    /// Creates an AudioPacket from released samples and increments sequence.
    fn create_packet(&mut self, samples: Vec<f32>) -> AudioPacket {
        let encoded = pcm::encode(&samples);
        let duration_ms = self.calculate_duration_ms(encoded.len());
        let seq = self.sequence;
        self.sequence += 1;
        AudioPacket::new(encoded, duration_ms, seq)
    }

    /// Calculates duration in milliseconds from sample count.
    fn calculate_duration_ms(&self, sample_count: usize) -> u32 {
        (sample_count as u64 * 1000 / self.sample_rate as u64) as u32
    }
}

impl Station for FramerStation {
    type Input = SampleChunk;
    type Output = AudioPacket;

    fn name(&self) -> &'static str {
        "framer"
    }

    fn process(&mut self, chunk: SampleChunk) -> Result<Option<AudioPacket>, StationError> {
        Ok(self
            .accumulator
            .push(chunk.samples)
            .map(|samples| self.create_packet(samples)))
    }

    fn shutdown(&mut self) {
        if self.explicit_stop.load(Ordering::SeqCst) {
            // Operator stop: buffered-but-unreleased audio is discarded
            self.accumulator.discard();
            return;
        }
        while let Some(samples) = self.accumulator.flush() {
            let packet = self.create_packet(samples);
            let Some(tx) = self.flush_tx.as_ref() else {
                break;
            };
            if tx.send(packet).is_err() {
                eprintln!("slatewire: framer shutdown — packet receiver already dropped");
                break;
            }
        }
    }
}
