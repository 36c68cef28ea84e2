//! Router station: transcript events in, annotation batches out.

use crate::pipeline::error::StationError;
use crate::pipeline::station::Station;
use crate::pipeline::types::{Annotation, TranscriptEvent};
use crate::slate::TranscriptRouter;

/// Station wrapper around [`TranscriptRouter`].
///
/// Runs on its own thread, so the pending slate and take state it owns are
/// only ever mutated by one event at a time, in arrival order.
pub struct RouterStation {
    router: TranscriptRouter,
}

impl RouterStation {
    /// Wraps a router for pipeline use.
    pub fn new(router: TranscriptRouter) -> Self {
        Self { router }
    }
}

impl Station for RouterStation {
    type Input = TranscriptEvent;
    type Output = Vec<Annotation>;

    fn name(&self) -> &'static str {
        "router"
    }

    fn process(&mut self, event: TranscriptEvent) -> Result<Option<Vec<Annotation>>, StationError> {
        let annotations = self.router.route(&event);
        if annotations.is_empty() {
            Ok(None)
        } else {
            Ok(Some(annotations))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use std::sync::Arc;
    use std::time::Instant;

    fn make_station() -> RouterStation {
        RouterStation::new(TranscriptRouter::new(Arc::new(MockClock::new())))
    }

    #[test]
    fn test_router_station_name() {
        assert_eq!(make_station().name(), "router");
    }

    #[test]
    fn final_event_produces_annotations() {
        let mut station = make_station();
        let event = TranscriptEvent::final_text("scene 5 take 2 action", Instant::now());
        let annotations = station.process(event).unwrap().expect("should annotate");
        assert_eq!(annotations[0], Annotation::Slate("SCENE 5 / TAKE 2".to_string()));
        assert_eq!(annotations[1], Annotation::Action);
    }

    #[test]
    fn interim_event_is_filtered() {
        let mut station = make_station();
        let event = TranscriptEvent::interim("action", Instant::now());
        assert!(station.process(event).unwrap().is_none());
    }

    #[test]
    fn empty_final_is_filtered() {
        let mut station = make_station();
        let event = TranscriptEvent::final_text("", Instant::now());
        assert!(station.process(event).unwrap().is_none());
    }
}
