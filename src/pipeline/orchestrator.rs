//! Captioning pipeline that runs from session start until stop.
//!
//! Two one-way flows share a lifecycle: capture chunks move through the
//! framer to the transcription channel, and transcript events move through
//! the router to the annotation sink. Every station owns its state on its
//! own thread; bounded channels connect them.

use crate::audio::accumulator::FlushPolicy;
use crate::audio::source::SampleSource;
use crate::clock::{Clock, SystemClock};
use crate::defaults;
use crate::error::Result;
use crate::pipeline::error::{ErrorReporter, LogReporter, StationError};
use crate::pipeline::framer::FramerStation;
use crate::pipeline::router_station::RouterStation;
use crate::pipeline::sink::{AnnotationSink, SinkStation};
use crate::pipeline::station::StationRunner;
use crate::pipeline::types::SampleChunk;
use crate::slate::TranscriptRouter;
use crate::transport::channel::TranscriptionChannel;
use crossbeam_channel::bounded;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Configuration for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// End-of-source residue policy (explicit stop always discards).
    pub flush_policy: FlushPolicy,
    /// Slate↔action correlation window.
    pub correlation_window: Duration,
    /// Channel buffer sizes
    pub chunk_buffer: usize,
    pub packet_buffer: usize,
    pub annotation_buffer: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            flush_policy: FlushPolicy::default(),
            correlation_window: defaults::CORRELATION_WINDOW,
            chunk_buffer: 1024,
            packet_buffer: 32,
            annotation_buffer: 32,
        }
    }
}

/// Handle to a running pipeline.
pub struct PipelineHandle {
    /// Flag to signal shutdown
    running: Arc<AtomicBool>,
    /// Tells the framer its shutdown is an operator stop (discard residue)
    explicit_stop: Arc<AtomicBool>,
    /// Join handles for spawned threads
    threads: Vec<JoinHandle<()>>,
    /// Receiver for the sink's finish() result
    result_rx: Option<crossbeam_channel::Receiver<Option<String>>>,
}

impl PipelineHandle {
    /// Stops the pipeline and returns the sink's accumulated take log.
    ///
    /// Buffered-but-unreleased audio is discarded, the capture device is
    /// released, and the transcription channel is closed. Waits up to 5s
    /// for the sink result, then 1s for threads; stragglers are detached
    /// and die with the process.
    pub fn stop(mut self) -> Option<String> {
        self.explicit_stop.store(true, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);

        // The result may arrive before all threads finish; allow in-flight
        // transcripts time to drain through the router
        let result = self
            .result_rx
            .take()
            .and_then(|rx| rx.recv_timeout(Duration::from_secs(5)).ok().flatten());

        self.join_threads();
        result
    }

    /// Waits for a finite source to drain and the sink to finish, honoring
    /// the flush policy, then tears down. Used by pipe mode.
    ///
    /// The sink result arrives once the transcription channel has delivered
    /// its remaining transcripts and closed; a relay that never closes is
    /// abandoned after 60s.
    pub fn finish(mut self) -> Option<String> {
        let result = self
            .result_rx
            .take()
            .and_then(|rx| rx.recv_timeout(Duration::from_secs(60)).ok().flatten());

        self.running.store(false, Ordering::SeqCst);
        self.join_threads();
        result
    }

    /// Join pipeline threads, surfacing panics. Waits up to 1s; stragglers
    /// are detached and die with the process.
    fn join_threads(&mut self) {
        let deadline = Instant::now() + Duration::from_secs(1);
        let poll_interval = Duration::from_millis(50);

        loop {
            let mut remaining = Vec::new();
            for handle in self.threads.drain(..) {
                if handle.is_finished() {
                    if let Err(panic_info) = handle.join() {
                        let msg = panic_info
                            .downcast_ref::<&str>()
                            .copied()
                            .or_else(|| panic_info.downcast_ref::<String>().map(|s| s.as_str()))
                            .unwrap_or("unknown panic");
                        eprintln!("slatewire: pipeline thread panicked: {msg}");
                    }
                } else {
                    remaining.push(handle);
                }
            }
            self.threads = remaining;

            if self.threads.is_empty() {
                break;
            }

            if Instant::now() >= deadline {
                eprintln!(
                    "slatewire: shutdown timeout — {} thread(s) still running, detaching",
                    self.threads.len()
                );
                // Dropping JoinHandles detaches threads; they die with the process.
                break;
            }

            thread::sleep(poll_interval);
        }
    }

    /// Returns true if the pipeline is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Captioning pipeline: SampleSource → Framer → channel → Router → Sink.
pub struct Pipeline {
    config: PipelineConfig,
    error_reporter: Arc<dyn ErrorReporter>,
    clock: Arc<dyn Clock>,
}

impl Pipeline {
    /// Creates a new pipeline with default error reporter.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            error_reporter: Arc::new(LogReporter),
            clock: Arc::new(SystemClock),
        }
    }

    /// Sets a custom error reporter.
    pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.error_reporter = reporter;
        self
    }

    /// Sets a custom clock (for deterministic testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Starts the pipeline.
    ///
    /// # Arguments
    /// * `source` - Sample-producing capture source
    /// * `channel` - Duplex channel to the transcription service
    /// * `sink` - Annotation output handler
    ///
    /// # Returns
    /// Handle to control and stop the pipeline
    pub fn start(
        self,
        mut source: Box<dyn SampleSource>,
        mut channel: Box<dyn TranscriptionChannel>,
        sink: Box<dyn AnnotationSink>,
    ) -> Result<PipelineHandle> {
        let running = Arc::new(AtomicBool::new(true));
        let explicit_stop = Arc::new(AtomicBool::new(false));
        let sequence = Arc::new(AtomicU64::new(0));
        let sample_rate = source.sample_rate();

        // Create channels between stations
        let (chunk_tx, chunk_rx) = bounded(self.config.chunk_buffer);
        let (packet_tx, packet_rx) = bounded(self.config.packet_buffer);
        let (annotation_tx, annotation_rx) = bounded(self.config.annotation_buffer);
        let (result_tx, result_rx) = bounded(1);

        let events_rx = channel.take_events().ok_or_else(|| {
            crate::error::SlatewireError::Other(
                "transcription channel events already taken".to_string(),
            )
        })?;

        // Create stations
        let framer_station = FramerStation::new(sample_rate)
            .with_flush_policy(self.config.flush_policy)
            .with_flush_tx(packet_tx.clone())
            .with_stop_flag(explicit_stop.clone());

        let router = TranscriptRouter::new(self.clock.clone())
            .with_window(self.config.correlation_window);
        let router_station = RouterStation::new(router);

        let sink_station = SinkStation::new(sink, result_tx);

        // Spawn station runners
        let framer_runner = StationRunner::spawn(
            framer_station,
            chunk_rx,
            packet_tx,
            self.error_reporter.clone(),
        );

        let router_runner = StationRunner::spawn(
            router_station,
            events_rx,
            annotation_tx,
            self.error_reporter.clone(),
        );

        // For the terminal station, create a dummy output channel
        let (sink_out_tx, sink_out_rx) = bounded::<()>(self.config.annotation_buffer);

        let sink_runner = StationRunner::spawn(
            sink_station,
            annotation_rx,
            sink_out_tx,
            self.error_reporter.clone(),
        );

        // Drain the sink output in a separate thread
        let drain_running = running.clone();
        let drain_handle = thread::spawn(move || {
            while drain_running.load(Ordering::SeqCst) {
                if sink_out_rx
                    .recv_timeout(Duration::from_millis(100))
                    .is_err()
                    && !drain_running.load(Ordering::SeqCst)
                {
                    break;
                }
            }
        });

        // Sender thread: owns the channel, forwards packets fire-and-forget
        let sender_reporter = self.error_reporter.clone();
        let sender_handle = thread::spawn(move || {
            while let Ok(packet) = packet_rx.recv() {
                if let Err(e) = channel.send_packet(&packet) {
                    // The packet is dropped; the session continues
                    sender_reporter.report(
                        "sender",
                        &StationError::Recoverable(format!(
                            "packet {} dropped: {}",
                            packet.sequence, e
                        )),
                    );
                }
            }
            // All packet producers are gone: signal end of audio
            channel.close();
        });

        // Start audio capture
        source.start()?;

        // Capture source type before moving into thread
        let source_is_finite = source.is_finite();

        // Spawn capture polling thread
        let capture_running = running.clone();
        let capture_sequence = sequence.clone();
        let capture_handle = thread::spawn(move || {
            // Poll the source at ~60Hz (every 16ms)
            let poll_interval = Duration::from_millis(16);

            let mut consecutive_errors: u32 = 0;
            const MAX_CONSECUTIVE_ERRORS: u32 = 10;

            while capture_running.load(Ordering::SeqCst) {
                let samples = match source.read_chunk() {
                    Ok(s) => {
                        consecutive_errors = 0;
                        s
                    }
                    Err(e) => {
                        consecutive_errors += 1;
                        if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                            eprintln!(
                                "slatewire: capture failed {consecutive_errors} times in a row: {e}"
                            );
                            eprintln!("slatewire: check your microphone connection and try again");
                            break;
                        }
                        thread::sleep(poll_interval);
                        continue;
                    }
                };

                if samples.is_empty() {
                    if source_is_finite {
                        // File/pipe source exhausted — exit polling loop.
                        break;
                    }
                    // Live source: empty read is normal at startup while the
                    // audio device initializes. Keep polling.
                    thread::sleep(poll_interval);
                    continue;
                }

                let chunk = SampleChunk::new(
                    samples,
                    Instant::now(),
                    capture_sequence.fetch_add(1, Ordering::Relaxed),
                );

                // Try to send - if the channel is full, drop the chunk
                if chunk_tx.try_send(chunk).is_err() && !capture_running.load(Ordering::SeqCst) {
                    break;
                }

                thread::sleep(poll_interval);
            }

            // Stop audio capture
            if let Err(e) = source.stop() {
                eprintln!("slatewire: failed to stop capture: {e}");
            }
        });

        // Collect all thread handles
        let mut threads = vec![capture_handle, sender_handle, drain_handle];

        // Wrap runner join handles
        threads.push(thread::spawn(move || {
            if let Err(msg) = framer_runner.join() {
                eprintln!("slatewire: {msg}");
            }
        }));
        threads.push(thread::spawn(move || {
            if let Err(msg) = router_runner.join() {
                eprintln!("slatewire: {msg}");
            }
        }));
        threads.push(thread::spawn(move || {
            if let Err(msg) = sink_runner.join() {
                eprintln!("slatewire: {msg}");
            }
        }));

        Ok(PipelineHandle {
            running,
            explicit_stop,
            threads,
            result_rx: Some(result_rx),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::source::{ChunkPhase, MockSampleSource};
    use crate::clock::MockClock;
    use crate::pipeline::sink::CollectorSink;
    use crate::transport::channel::MockTranscriptionChannel;

    #[test]
    fn test_config_default() {
        let config = PipelineConfig::default();
        assert_eq!(config.chunk_buffer, 1024);
        assert_eq!(config.packet_buffer, 32);
        assert_eq!(config.annotation_buffer, 32);
        assert_eq!(config.flush_policy, FlushPolicy::Discard);
        assert_eq!(config.correlation_window, Duration::from_secs(10));
    }

    #[test]
    fn test_handle_is_running() {
        let running = Arc::new(AtomicBool::new(true));
        let handle = PipelineHandle {
            running: running.clone(),
            explicit_stop: Arc::new(AtomicBool::new(false)),
            threads: vec![],
            result_rx: None,
        };

        assert!(handle.is_running());

        running.store(false, Ordering::SeqCst);
        assert!(!handle.is_running());
    }

    #[test]
    fn test_handle_stop_returns_result_from_channel() {
        let (result_tx, result_rx) = bounded(1);
        result_tx.send(Some("ACTION\nCUT".to_string())).unwrap();
        drop(result_tx);

        let handle = PipelineHandle {
            running: Arc::new(AtomicBool::new(true)),
            explicit_stop: Arc::new(AtomicBool::new(false)),
            threads: vec![],
            result_rx: Some(result_rx),
        };

        assert_eq!(handle.stop(), Some("ACTION\nCUT".to_string()));
    }

    #[test]
    fn test_handle_stop_returns_none_when_channel_disconnected() {
        let (result_tx, result_rx) = bounded::<Option<String>>(1);
        drop(result_tx);

        let handle = PipelineHandle {
            running: Arc::new(AtomicBool::new(true)),
            explicit_stop: Arc::new(AtomicBool::new(false)),
            threads: vec![],
            result_rx: Some(result_rx),
        };

        assert!(handle.stop().is_none());
    }

    #[test]
    fn test_pipeline_thread_panic_is_reported() {
        // A panicking thread must not hang stop()
        let panicking_handle = thread::spawn(|| {
            panic!("intentional test panic");
        });

        let handle = PipelineHandle {
            running: Arc::new(AtomicBool::new(true)),
            explicit_stop: Arc::new(AtomicBool::new(false)),
            threads: vec![panicking_handle],
            result_rx: None,
        };

        assert!(handle.stop().is_none());
    }

    #[test]
    fn test_pipeline_stop_timeout_on_stuck_thread() {
        let running = Arc::new(AtomicBool::new(true));

        let stuck_running = running.clone();
        let stuck_handle = thread::spawn(move || {
            while stuck_running.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(10));
            }
            // Simulate being stuck even after running=false
            thread::park();
        });

        let handle = PipelineHandle {
            running: running.clone(),
            explicit_stop: Arc::new(AtomicBool::new(false)),
            threads: vec![stuck_handle],
            result_rx: None,
        };

        let start = Instant::now();
        let result = handle.stop();
        let elapsed = start.elapsed();

        assert!(
            elapsed < Duration::from_secs(5),
            "stop() took {:?} — should complete within 5s even with stuck threads",
            elapsed
        );
        assert!(result.is_none());
        assert!(!running.load(Ordering::SeqCst));
    }

    #[test]
    fn test_pipeline_frames_and_sends_packets() {
        // 16kHz source: 800-sample minimum per packet. Ten reads of 160
        // samples hit the threshold at the 5th and 10th reads, so exactly
        // two 50ms packets come out.
        let source = MockSampleSource::new()
            .with_sample_rate(16_000)
            .with_frame_sequence(vec![ChunkPhase {
                samples: vec![0.25; 160],
                count: 10,
            }]);

        let channel = MockTranscriptionChannel::new();
        let sent = channel.sent_packets();
        let closed = channel.closed_flag();
        let injector = channel.event_injector();

        let pipeline = Pipeline::new(PipelineConfig::default());
        let handle = pipeline
            .start(
                Box::new(source),
                Box::new(channel),
                Box::new(CollectorSink::new()),
            )
            .unwrap();

        // 10 reads at 16ms each ≈ 160ms; wait for the source to drain
        thread::sleep(Duration::from_millis(400));
        drop(injector);
        let _ = handle.finish();

        let packets = sent.lock().unwrap();
        assert_eq!(packets.len(), 2);
        for packet in packets.iter() {
            assert_eq!(packet.samples.len(), 800);
            assert_eq!(packet.duration_ms, 50);
            // 0.25 × 32767 = 8191
            assert_eq!(packet.samples[0], 8191);
        }
        assert!(*closed.lock().unwrap(), "channel must be closed on teardown");
    }

    #[test]
    fn test_pipeline_routes_transcripts_to_annotations() {
        let source = MockSampleSource::new().as_live_source();

        let channel = MockTranscriptionChannel::new();
        let injector = channel.event_injector();

        let clock = Arc::new(MockClock::new());
        let pipeline = Pipeline::new(PipelineConfig::default()).with_clock(clock);
        let handle = pipeline
            .start(
                Box::new(source),
                Box::new(channel),
                Box::new(CollectorSink::new()),
            )
            .unwrap();

        for text in ["scene 5 take 2", "rolling", "cut"] {
            injector
                .send(crate::pipeline::types::TranscriptEvent::final_text(
                    text,
                    Instant::now(),
                ))
                .unwrap();
        }
        drop(injector);

        // Give the router/sink threads time to drain
        thread::sleep(Duration::from_millis(300));
        let result = handle.stop().expect("collector should have annotations");

        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(
            lines,
            vec![
                "scene 5 take 2",
                "SCENE 5 / TAKE 2",
                "ACTION",
                "rolling",
                "CUT",
                "cut",
            ]
        );
    }

    #[test]
    fn test_pipeline_send_failure_drops_packet_and_continues() {
        let source = MockSampleSource::new()
            .with_sample_rate(16_000)
            .with_frame_sequence(vec![ChunkPhase {
                samples: vec![0.25; 800],
                count: 2,
            }]);

        let channel = MockTranscriptionChannel::new().with_send_failure();
        let injector = channel.event_injector();

        let pipeline = Pipeline::new(PipelineConfig::default());
        let handle = pipeline
            .start(
                Box::new(source),
                Box::new(channel),
                Box::new(CollectorSink::new()),
            )
            .unwrap();

        thread::sleep(Duration::from_millis(200));

        // Transcripts still flow after failed sends
        injector
            .send(crate::pipeline::types::TranscriptEvent::final_text(
                "still alive",
                Instant::now(),
            ))
            .unwrap();
        drop(injector);
        thread::sleep(Duration::from_millis(200));

        let result = handle.stop();
        assert_eq!(result, Some("still alive".to_string()));
    }

    #[test]
    fn test_pipeline_capture_read_errors_exit_after_threshold() {
        let source = MockSampleSource::new().with_read_failure();
        let channel = MockTranscriptionChannel::new();
        let injector = channel.event_injector();

        let pipeline = Pipeline::new(PipelineConfig::default());
        let handle = pipeline
            .start(
                Box::new(source),
                Box::new(channel),
                Box::new(CollectorSink::new()),
            )
            .unwrap();

        // 10 errors × 16ms poll ≈ 160ms; give extra margin
        thread::sleep(Duration::from_millis(400));
        drop(injector);

        let result = handle.stop();
        assert!(result.is_none(), "persistent read errors produce no output");
    }

    #[test]
    fn test_pipeline_explicit_stop_discards_residue() {
        // FlushShort policy, but explicit stop() must still discard the
        // 400-sample residue instead of flushing it
        let source = MockSampleSource::new()
            .with_sample_rate(16_000)
            .with_frame_sequence(vec![ChunkPhase {
                samples: vec![0.25; 400],
                count: 1,
            }])
            .as_live_source();

        let channel = MockTranscriptionChannel::new();
        let sent = channel.sent_packets();
        let injector = channel.event_injector();

        let config = PipelineConfig {
            flush_policy: FlushPolicy::FlushShort,
            ..Default::default()
        };
        let handle = Pipeline::new(config)
            .start(
                Box::new(source),
                Box::new(channel),
                Box::new(CollectorSink::new()),
            )
            .unwrap();

        thread::sleep(Duration::from_millis(150));
        drop(injector);
        let _ = handle.stop();

        assert!(
            sent.lock().unwrap().is_empty(),
            "explicit stop must not flush residue below the minimum"
        );
    }

    #[test]
    fn test_pipeline_finite_source_flushes_residue_per_policy() {
        let source = MockSampleSource::new()
            .with_sample_rate(16_000)
            .with_frame_sequence(vec![ChunkPhase {
                samples: vec![0.25; 400],
                count: 1,
            }]);

        let channel = MockTranscriptionChannel::new();
        let sent = channel.sent_packets();
        let injector = channel.event_injector();

        let config = PipelineConfig {
            flush_policy: FlushPolicy::FlushShort,
            ..Default::default()
        };
        let handle = Pipeline::new(config)
            .start(
                Box::new(source),
                Box::new(channel),
                Box::new(CollectorSink::new()),
            )
            .unwrap();

        thread::sleep(Duration::from_millis(300));
        drop(injector);
        let _ = handle.finish();

        let packets = sent.lock().unwrap();
        assert_eq!(packets.len(), 1, "finite source should flush short residue");
        assert_eq!(packets[0].samples.len(), 400);
    }
}
