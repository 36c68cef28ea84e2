//! slatewire - Live set captioning with slate annotations
//!
//! Streams microphone audio to a remote transcription service and turns the
//! returning transcript into a scene/take log: spoken slates, ACTION, CUT.

// Error handling discipline: core code propagates, never panics
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

#[cfg(all(feature = "cpal-audio", feature = "cli"))]
pub mod app;
pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod clock;
pub mod config;
pub mod defaults;
pub mod error;
pub mod pipeline;
pub mod session;
pub mod slate;
pub mod transport;

// Core traits (source → pipeline → sink)
pub use audio::source::{MockSampleSource, SampleSource};
pub use pipeline::sink::{AnnotationSink, CollectorSink, StdoutSink};
pub use transport::channel::TranscriptionChannel;

// Pipeline
pub use pipeline::orchestrator::{Pipeline, PipelineConfig, PipelineHandle};

// Slate core
pub use slate::{PendingSlate, TakeState, TranscriptRouter};

// Error handling
pub use error::{Result, SlatewireError};

// Config
pub use config::Config;

// Station framework (for advanced users)
pub use pipeline::error::{ErrorReporter, StationError};
pub use pipeline::station::Station;
