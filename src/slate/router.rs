//! Transcript router: transcript events in, annotations out.
//!
//! The single owner of per-session slate state. Each final transcript is fed
//! to the slate extractor first (so a slate spoken in the same breath as
//! "action" is already pending when the lifecycle runs), then to the take
//! lifecycle, and finally echoed as a plain caption line.

use crate::clock::Clock;
use crate::pipeline::types::{Annotation, TranscriptEvent};
use crate::slate::extractor::{PendingSlate, SlateExtractor};
use crate::slate::lifecycle::{TakeLifecycle, TakeState};
use std::sync::Arc;
use std::time::Duration;

/// Routes transcript events through slate extraction and the take lifecycle.
pub struct TranscriptRouter {
    extractor: SlateExtractor,
    lifecycle: TakeLifecycle,
    slate: PendingSlate,
}

impl TranscriptRouter {
    /// Creates a router with the default correlation window.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            extractor: SlateExtractor::new(clock.clone()),
            lifecycle: TakeLifecycle::new(clock),
            slate: PendingSlate::default(),
        }
    }

    /// Overrides the slate↔action correlation window.
    pub fn with_window(mut self, window: Duration) -> Self {
        self.lifecycle = self.lifecycle.with_window(window);
        self
    }

    /// Current take state (for status displays).
    pub fn take_state(&self) -> TakeState {
        self.lifecycle.state()
    }

    /// Currently pending slate (for status displays).
    pub fn pending_slate(&self) -> &PendingSlate {
        &self.slate
    }

    /// Process one transcript event, in arrival order.
    ///
    /// Interim events are ignored: their text reappears in the final
    /// transcript, and running keyword handling twice would restamp slates
    /// and double-fire lifecycle calls. Arbitrary or empty text degrades to
    /// no annotations, never to an error.
    pub fn route(&mut self, event: &TranscriptEvent) -> Vec<Annotation> {
        if !event.is_final {
            return Vec::new();
        }

        self.extractor.update(&event.text, &mut self.slate);
        let mut annotations = self.lifecycle.process(&event.text, &mut self.slate);

        let line = event.text.trim();
        if !line.is_empty() {
            annotations.push(Annotation::Line(line.to_string()));
        }

        annotations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use std::time::Instant;

    fn final_event(text: &str) -> TranscriptEvent {
        TranscriptEvent::final_text(text, Instant::now())
    }

    fn markers(annotations: &[Annotation]) -> Vec<Annotation> {
        annotations
            .iter()
            .filter(|a| !matches!(a, Annotation::Line(_)))
            .cloned()
            .collect()
    }

    #[test]
    fn full_take_sequence() {
        let clock = Arc::new(MockClock::new());
        let mut router = TranscriptRouter::new(clock);

        let mut all = Vec::new();
        for text in ["scene 5 take 2", "rolling", "cut"] {
            all.extend(router.route(&final_event(text)));
        }

        assert_eq!(
            markers(&all),
            vec![
                Annotation::Slate("SCENE 5 / TAKE 2".to_string()),
                Annotation::Action,
                Annotation::Cut,
            ]
        );
        assert!(router.pending_slate().is_empty());

        // A second cut with no prior action yields only its caption line
        let after = router.route(&final_event("cut"));
        assert!(markers(&after).is_empty());
    }

    #[test]
    fn slate_and_action_in_one_breath() {
        let clock = Arc::new(MockClock::new());
        let mut router = TranscriptRouter::new(clock);

        // Extraction runs before the lifecycle, so the slate spoken in the
        // same utterance as the start call makes it into the header
        let annotations = router.route(&final_event("scene twelve alpha take 3 action"));
        assert_eq!(
            markers(&annotations),
            vec![
                Annotation::Slate("SCENE 12A / TAKE 3".to_string()),
                Annotation::Action,
            ]
        );
    }

    #[test]
    fn final_text_becomes_caption_line() {
        let clock = Arc::new(MockClock::new());
        let mut router = TranscriptRouter::new(clock);

        let annotations = router.route(&final_event("we're ready on set"));
        assert_eq!(
            annotations,
            vec![Annotation::Line("we're ready on set".to_string())]
        );
    }

    #[test]
    fn interim_events_are_ignored() {
        let clock = Arc::new(MockClock::new());
        let mut router = TranscriptRouter::new(clock);

        let annotations = router.route(&TranscriptEvent::interim("action", Instant::now()));
        assert!(annotations.is_empty());
        assert_eq!(router.take_state(), TakeState::Idle);
    }

    #[test]
    fn empty_text_produces_nothing() {
        let clock = Arc::new(MockClock::new());
        let mut router = TranscriptRouter::new(clock);

        assert!(router.route(&final_event("")).is_empty());
        assert!(router.route(&final_event("   ")).is_empty());
    }

    #[test]
    fn stale_slate_expires_via_window() {
        let clock = Arc::new(MockClock::new());
        let mut router = TranscriptRouter::new(clock.clone()).with_window(Duration::from_secs(10));

        router.route(&final_event("scene 3 take 9"));
        clock.advance(Duration::from_secs(11));

        let annotations = router.route(&final_event("action"));
        assert_eq!(markers(&annotations), vec![Annotation::Action]);
    }
}
