//! Data types flowing through the captioning pipeline.

use std::time::Instant;

/// A chunk of raw capture samples, normalized floats in [-1, 1].
///
/// Produced by the sample source at whatever size the capture backend hands
/// out (often ~128 samples per callback). Arbitrary length, including zero.
#[derive(Debug, Clone)]
pub struct SampleChunk {
    /// Normalized floating-point samples.
    pub samples: Vec<f32>,
    /// Timestamp when this chunk was captured.
    pub timestamp: Instant,
    /// Sequence number for ordering and gap detection.
    pub sequence: u64,
}

impl SampleChunk {
    /// Creates a new sample chunk.
    pub fn new(samples: Vec<f32>, timestamp: Instant, sequence: u64) -> Self {
        Self {
            samples,
            timestamp,
            sequence,
        }
    }
}

/// One unit of encoded audio ready for the transport layer.
///
/// Samples are 16-bit signed PCM, mono. Length is within the service's
/// [min, max] duration bounds except for a possible final flush when a
/// finite source runs dry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPacket {
    /// PCM samples (16-bit signed integers).
    pub samples: Vec<i16>,
    /// Duration of the packet in milliseconds.
    pub duration_ms: u32,
    /// Sequence number for ordering.
    pub sequence: u64,
}

impl AudioPacket {
    /// Creates a new audio packet.
    pub fn new(samples: Vec<i16>, duration_ms: u32, sequence: u64) -> Self {
        Self {
            samples,
            duration_ms,
            sequence,
        }
    }

    /// Wire form: 16-bit little-endian signed PCM.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples
            .iter()
            .flat_map(|&sample| sample.to_le_bytes())
            .collect()
    }
}

/// A transcript event delivered by the transcription channel.
#[derive(Debug, Clone)]
pub struct TranscriptEvent {
    /// Transcript text; may be empty or arbitrary content.
    pub text: String,
    /// True for end-of-turn transcripts, false for interim updates.
    pub is_final: bool,
    /// Timestamp when the event was received.
    pub timestamp: Instant,
}

impl TranscriptEvent {
    /// Creates a final transcript event.
    pub fn final_text(text: &str, timestamp: Instant) -> Self {
        Self {
            text: text.to_string(),
            is_final: true,
            timestamp,
        }
    }

    /// Creates an interim transcript event.
    pub fn interim(text: &str, timestamp: Instant) -> Self {
        Self {
            text: text.to_string(),
            is_final: false,
            timestamp,
        }
    }
}

/// An annotation emitted toward the UI.
///
/// Write-once and ordered; the sink consumes them in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// Slate header for a confirmed take, e.g. "SCENE 12A / TAKE 3".
    Slate(String),
    /// A take has started.
    Action,
    /// The active take has ended.
    Cut,
    /// A plain transcript line.
    Line(String),
}

impl Annotation {
    /// Render the annotation the way the UI displays it.
    pub fn render(&self) -> String {
        match self {
            Annotation::Slate(header) => header.clone(),
            Annotation::Action => "ACTION".to_string(),
            Annotation::Cut => "CUT".to_string(),
            Annotation::Line(text) => text.clone(),
        }
    }
}
