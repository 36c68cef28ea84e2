//! Frame accumulator: variable-sized capture chunks in, bounded packets out.
//!
//! The transcription service rejects audio messages shorter than the minimum
//! duration, while oversized messages add latency. The accumulator queues
//! incoming chunks and releases contiguous runs sized within
//! [min_samples, max_samples], splitting a chunk when the boundary lands
//! inside it.

use crate::defaults;
use std::collections::VecDeque;

/// What to do with residual samples (below the minimum packet size) when a
/// finite source runs dry.
///
/// An explicit operator stop always discards the residue regardless of
/// policy; only natural end-of-source consults it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushPolicy {
    /// Drop the residue. The tail of a capture is below the service minimum
    /// and would be rejected anyway.
    #[default]
    Discard,
    /// Emit the residue as one short final packet.
    FlushShort,
}

/// Accumulates capture chunks and releases packets within duration bounds.
pub struct FrameAccumulator {
    /// Not-yet-released chunks, oldest first.
    queue: VecDeque<Vec<f32>>,
    /// Total samples currently queued.
    buffered: usize,
    min_samples: usize,
    max_samples: usize,
    policy: FlushPolicy,
}

impl FrameAccumulator {
    /// Creates an accumulator sized for the given sample rate.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            queue: VecDeque::new(),
            buffered: 0,
            min_samples: defaults::min_samples(sample_rate),
            max_samples: defaults::max_samples(sample_rate),
            policy: FlushPolicy::default(),
        }
    }

    /// Sets the end-of-source flush policy.
    pub fn with_flush_policy(mut self, policy: FlushPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Minimum packet size in samples.
    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// Maximum packet size in samples.
    pub fn max_samples(&self) -> usize {
        self.max_samples
    }

    /// Samples currently buffered below the release threshold.
    pub fn buffered(&self) -> usize {
        self.buffered
    }

    /// Absorb one capture chunk and release a packet if enough has queued.
    ///
    /// A zero-length chunk is a no-op. The released run is always contiguous
    /// and in original sample order; when the boundary falls inside the
    /// oldest chunk, that chunk is split and its remainder stays queued.
    pub fn push(&mut self, samples: Vec<f32>) -> Option<Vec<f32>> {
        if !samples.is_empty() {
            self.buffered += samples.len();
            self.queue.push_back(samples);
        }

        if self.buffered >= self.min_samples {
            Some(self.drain(self.buffered.min(self.max_samples)))
        } else {
            None
        }
    }

    /// End-of-source flush. Returns the residue per the configured policy.
    ///
    /// The residue may exceed `min_samples` when the source ends between
    /// polls; anything at or above the minimum is released unconditionally,
    /// and only a genuinely short tail is subject to the policy.
    pub fn flush(&mut self) -> Option<Vec<f32>> {
        if self.buffered == 0 {
            return None;
        }
        if self.buffered >= self.min_samples || self.policy == FlushPolicy::FlushShort {
            Some(self.drain(self.buffered.min(self.max_samples)))
        } else {
            self.discard();
            None
        }
    }

    /// Drop all buffered samples. Used on explicit stop.
    pub fn discard(&mut self) {
        self.queue.clear();
        self.buffered = 0;
    }

    /// Remove exactly `count` samples from the front of the queue.
    fn drain(&mut self, count: usize) -> Vec<f32> {
        let mut packet = Vec::with_capacity(count);

        while packet.len() < count {
            let needed = count - packet.len();
            // Loop invariant: buffered == sum of queued lengths ≥ needed,
            // so the queue cannot be empty here.
            let Some(head) = self.queue.front_mut() else {
                break;
            };

            if head.len() <= needed {
                packet.extend_from_slice(head);
                self.queue.pop_front();
            } else {
                packet.extend_from_slice(&head[..needed]);
                head.drain(..needed);
            }
        }

        self.buffered -= packet.len();
        packet
    }
}
