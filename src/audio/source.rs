//! Sample source abstraction.
//!
//! One interface over every way audio enters the pipeline: a live
//! microphone (cpal), a WAV file on stdin, or a mock in tests. Sources hand
//! out normalized f32 chunks of whatever size the backend produces.

use crate::error::{Result, SlatewireError};

/// Trait for sample-producing devices.
///
/// This trait allows swapping implementations (real capture vs mock).
pub trait SampleSource: Send {
    /// Start producing samples.
    fn start(&mut self) -> Result<()>;

    /// Stop producing samples and release the device.
    fn stop(&mut self) -> Result<()>;

    /// Read whatever samples have accumulated since the last poll.
    ///
    /// An empty read from a live source is normal (device still warming
    /// up); an empty read from a finite source means it is exhausted.
    fn read_chunk(&mut self) -> Result<Vec<f32>>;

    /// Sample rate of the produced audio in Hz.
    fn sample_rate(&self) -> u32;

    /// True when the source ends on its own (file/pipe), false for live
    /// capture.
    fn is_finite(&self) -> bool {
        false
    }
}

/// One phase of mock output: `count` reads each returning `samples`.
#[derive(Debug, Clone)]
pub struct ChunkPhase {
    /// Samples returned by each read in this phase.
    pub samples: Vec<f32>,
    /// Number of reads before moving to the next phase.
    pub count: u32,
}

/// Mock sample source for testing.
#[derive(Debug, Clone)]
pub struct MockSampleSource {
    is_started: bool,
    phases: Vec<ChunkPhase>,
    phase_index: usize,
    reads_in_phase: u32,
    sample_rate: u32,
    live: bool,
    should_fail_read: bool,
    error_message: String,
}

impl MockSampleSource {
    /// Create a mock that returns 128-sample chunks of silence forever.
    pub fn new() -> Self {
        Self {
            is_started: false,
            phases: vec![ChunkPhase {
                samples: vec![0.0; 128],
                count: u32::MAX,
            }],
            phase_index: 0,
            reads_in_phase: 0,
            sample_rate: 16_000,
            live: false,
            should_fail_read: false,
            error_message: "mock capture error".to_string(),
        }
    }

    /// Replace the output with an explicit phase sequence; reads return
    /// empty once the sequence is exhausted.
    pub fn with_frame_sequence(mut self, phases: Vec<ChunkPhase>) -> Self {
        self.phases = phases;
        self.phase_index = 0;
        self.reads_in_phase = 0;
        self
    }

    /// Set the reported sample rate.
    pub fn with_sample_rate(mut self, rate: u32) -> Self {
        self.sample_rate = rate;
        self
    }

    /// Report as a live (non-finite) source.
    pub fn as_live_source(mut self) -> Self {
        self.live = true;
        self
    }

    /// Configure the mock to fail on read.
    pub fn with_read_failure(mut self) -> Self {
        self.should_fail_read = true;
        self
    }

    /// Check if the source is started.
    pub fn is_started(&self) -> bool {
        self.is_started
    }
}

impl Default for MockSampleSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleSource for MockSampleSource {
    fn start(&mut self) -> Result<()> {
        self.is_started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.is_started = false;
        Ok(())
    }

    fn read_chunk(&mut self) -> Result<Vec<f32>> {
        if self.should_fail_read {
            return Err(SlatewireError::AudioCapture {
                message: self.error_message.clone(),
            });
        }

        while let Some(phase) = self.phases.get(self.phase_index) {
            if self.reads_in_phase < phase.count {
                self.reads_in_phase += 1;
                return Ok(phase.samples.clone());
            }
            self.phase_index += 1;
            self.reads_in_phase = 0;
        }

        Ok(Vec::new())
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn is_finite(&self) -> bool {
        !self.live
    }
}
