//! Annotation output handling.
//!
//! Pairs with SampleSource on the input side: annotations leave the pipeline
//! through a pluggable sink. A slow sink only backs up its own bounded
//! channel; it never stalls the audio path.

use crate::pipeline::error::StationError;
use crate::pipeline::station::Station;
use crate::pipeline::types::Annotation;

/// Pluggable annotation output handler.
pub trait AnnotationSink: Send + 'static {
    /// Handle one annotation. Called in emission order.
    fn handle(&mut self, annotation: &Annotation) -> crate::error::Result<()>;

    /// Called on pipeline shutdown. Return the accumulated log if applicable.
    fn finish(&mut self) -> Option<String> {
        None
    }

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "sink"
    }
}

/// Station wrapper for any AnnotationSink implementation.
pub(crate) struct SinkStation {
    sink: Box<dyn AnnotationSink>,
    result_tx: Option<crossbeam_channel::Sender<Option<String>>>,
}

impl SinkStation {
    pub(crate) fn new(
        sink: Box<dyn AnnotationSink>,
        result_tx: crossbeam_channel::Sender<Option<String>>,
    ) -> Self {
        Self {
            sink,
            result_tx: Some(result_tx),
        }
    }
}

impl Station for SinkStation {
    type Input = Vec<Annotation>;
    type Output = ();

    fn name(&self) -> &'static str {
        self.sink.name()
    }

    fn process(&mut self, annotations: Vec<Annotation>) -> Result<Option<()>, StationError> {
        for annotation in &annotations {
            self.sink
                .handle(annotation)
                .map_err(|e| StationError::Recoverable(e.to_string()))?;
        }
        Ok(Some(()))
    }

    fn shutdown(&mut self) {
        let result = self.sink.finish();
        if let Some(tx) = self.result_tx.take()
            && tx.send(result).is_err()
        {
            eprintln!("slatewire: sink shutdown — result receiver already dropped");
        }
    }
}

/// Sink that collects rendered annotations in memory.
///
/// Used for pipe mode (print the take log at the end) and in tests.
#[derive(Debug, Default)]
pub struct CollectorSink {
    lines: Vec<String>,
}

impl CollectorSink {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnnotationSink for CollectorSink {
    fn handle(&mut self, annotation: &Annotation) -> crate::error::Result<()> {
        self.lines.push(annotation.render());
        Ok(())
    }

    fn finish(&mut self) -> Option<String> {
        if self.lines.is_empty() {
            None
        } else {
            Some(self.lines.join("\n"))
        }
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}

/// Sink that prints annotations to stdout as they arrive.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl StdoutSink {
    /// Creates a stdout sink.
    pub fn new() -> Self {
        Self
    }
}

impl AnnotationSink for StdoutSink {
    fn handle(&mut self, annotation: &Annotation) -> crate::error::Result<()> {
        match annotation {
            // Markers stand out from caption lines
            Annotation::Slate(_) | Annotation::Action | Annotation::Cut => {
                println!("--- {} ---", annotation.render());
            }
            Annotation::Line(text) => println!("{}", text),
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdout"
    }
}
