//! End-to-end pipeline tests through the public API: mock capture source in,
//! packets out to a mock channel, transcript events in, annotations out.

use slatewire::audio::source::{ChunkPhase, MockSampleSource};
use slatewire::clock::MockClock;
use slatewire::pipeline::types::TranscriptEvent;
use slatewire::{CollectorSink, Pipeline, PipelineConfig};
use slatewire::transport::channel::MockTranscriptionChannel;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Capture at 16kHz: packets must hold between 800 (50ms) and 3200 (200ms)
/// samples.
#[test]
fn packets_respect_service_bounds_and_conserve_samples() {
    // 30 reads × 128 samples = 3840 samples total
    let source = MockSampleSource::new()
        .with_sample_rate(16_000)
        .with_frame_sequence(vec![ChunkPhase {
            samples: vec![0.1; 128],
            count: 30,
        }]);

    let channel = MockTranscriptionChannel::new();
    let sent = channel.sent_packets();
    let injector = channel.event_injector();

    let handle = Pipeline::new(PipelineConfig::default())
        .start(
            Box::new(source),
            Box::new(channel),
            Box::new(CollectorSink::new()),
        )
        .expect("pipeline should start");

    // 30 reads at ~16ms each; wait for the source to drain
    thread::sleep(Duration::from_millis(900));
    drop(injector);
    let _ = handle.finish();

    let packets = sent.lock().expect("sent packets");
    assert!(!packets.is_empty(), "expected framed packets");

    let mut total = 0usize;
    for packet in packets.iter() {
        assert!(
            (800..=3200).contains(&packet.samples.len()),
            "packet of {} samples violates [800, 3200]",
            packet.samples.len()
        );
        total += packet.samples.len();
    }

    // Default policy discards the sub-minimum residue; everything released
    // must be a whole multiple of the pushed chunks with nothing duplicated
    assert!(total <= 3840);
    assert_eq!(total % 128, 0, "packets must split cleanly on chunk sums");

    // Sequence numbers are contiguous from zero
    for (i, packet) in packets.iter().enumerate() {
        assert_eq!(packet.sequence, i as u64);
    }
}

#[test]
fn spoken_slate_becomes_take_log() {
    let source = MockSampleSource::new().as_live_source();
    let channel = MockTranscriptionChannel::new();
    let injector = channel.event_injector();

    let clock = Arc::new(MockClock::new());
    let handle = Pipeline::new(PipelineConfig::default())
        .with_clock(clock)
        .start(
            Box::new(source),
            Box::new(channel),
            Box::new(CollectorSink::new()),
        )
        .expect("pipeline should start");

    let script = [
        ("scene twelve alpha take 3", true),
        ("rolling", true),
        ("we're in the scene now", true),
        ("interim noise", false),
        ("cut", true),
    ];
    for (text, is_final) in script {
        let event = if is_final {
            TranscriptEvent::final_text(text, Instant::now())
        } else {
            TranscriptEvent::interim(text, Instant::now())
        };
        injector.send(event).expect("inject transcript");
    }
    drop(injector);

    thread::sleep(Duration::from_millis(400));
    let log = handle.stop().expect("annotations collected");

    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(
        lines,
        vec![
            "scene twelve alpha take 3",
            "SCENE 12A / TAKE 3",
            "ACTION",
            "rolling",
            "we're in the scene now",
            "CUT",
            "cut",
        ]
    );
}

#[test]
fn stale_slate_is_not_attached_to_a_late_action() {
    let source = MockSampleSource::new().as_live_source();
    let channel = MockTranscriptionChannel::new();
    let injector = channel.event_injector();

    let clock = Arc::new(MockClock::new());
    let handle = Pipeline::new(PipelineConfig::default())
        .with_clock(clock.clone())
        .start(
            Box::new(source),
            Box::new(channel),
            Box::new(CollectorSink::new()),
        )
        .expect("pipeline should start");

    injector
        .send(TranscriptEvent::final_text(
            "scene 4 take 1",
            Instant::now(),
        ))
        .expect("inject transcript");

    // Give the router time to capture the slate, then let it go stale
    thread::sleep(Duration::from_millis(200));
    clock.advance(Duration::from_secs(11));

    injector
        .send(TranscriptEvent::final_text("action", Instant::now()))
        .expect("inject transcript");
    drop(injector);

    thread::sleep(Duration::from_millis(300));
    let log = handle.stop().expect("annotations collected");

    assert!(
        !log.contains("SCENE"),
        "stale slate must not produce a header, got:\n{}",
        log
    );
    assert!(log.contains("ACTION"));
}
