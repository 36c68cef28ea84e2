//! Audio capture, encoding, and framing.

pub mod accumulator;
#[cfg(feature = "cpal-audio")]
pub mod capture;
pub mod pcm;
pub mod source;
pub mod wav;

pub use accumulator::{FlushPolicy, FrameAccumulator};
pub use source::{ChunkPhase, MockSampleSource, SampleSource};
pub use wav::WavSampleSource;
