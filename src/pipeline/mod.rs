//! Captioning pipeline.
//!
//! Implements a multi-station pipeline where each station runs in its own
//! thread, connected by bounded crossbeam channels for backpressure.

pub mod error;
pub mod framer;
pub mod orchestrator;
pub mod router_station;
pub mod sink;
pub mod station;
pub mod types;

pub use error::{ErrorReporter, LogReporter, StationError};
pub use framer::FramerStation;
pub use orchestrator::{Pipeline, PipelineConfig, PipelineHandle};
pub use router_station::RouterStation;
pub use sink::{AnnotationSink, CollectorSink, StdoutSink};
pub use station::{Station, StationRunner};
pub use types::{Annotation, AudioPacket, SampleChunk, TranscriptEvent};
