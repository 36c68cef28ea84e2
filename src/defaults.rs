//! Default configuration constants for slatewire.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

use std::time::Duration;

/// Fallback audio sample rate in Hz.
///
/// Used when the capture device does not report a rate. Most desktop capture
/// paths run at 48kHz; the actual per-session rate always comes from the
/// device and every packet-size calculation derives from it.
pub const SAMPLE_RATE: u32 = 48_000;

/// Minimum packet duration in milliseconds.
///
/// The downstream transcription service rejects audio messages shorter than
/// 50ms, so the frame accumulator never releases a packet below this bound
/// (except an optional final flush at end of a finite source).
pub const MIN_PACKET_MS: u32 = 50;

/// Maximum packet duration in milliseconds.
///
/// Caps how much audio a single packet may carry. Bounds end-to-end latency:
/// a long backlog is drained as several 200ms packets rather than one large one.
pub const MAX_PACKET_MS: u32 = 200;

/// Correlation window between a spoken slate and the ACTION call confirming it.
///
/// A slate captured longer ago than this is considered stale and produces no
/// slate header when a take starts. Spoken slates normally precede "action"
/// by a few seconds.
pub const CORRELATION_WINDOW: Duration = Duration::from_secs(10);

/// Default token endpoint of the session-setup service.
pub const TOKEN_URL: &str = "http://localhost:3000/token";

/// Default address of the streaming transcription relay.
pub const RELAY_ADDR: &str = "localhost:43007";

/// Compute the minimum packet size in samples for a sample rate.
pub fn min_samples(sample_rate: u32) -> usize {
    (sample_rate as f64 * (MIN_PACKET_MS as f64 / 1000.0)).round() as usize
}

/// Compute the maximum packet size in samples for a sample rate.
pub fn max_samples(sample_rate: u32) -> usize {
    (sample_rate as f64 * (MAX_PACKET_MS as f64 / 1000.0)).round() as usize
}
