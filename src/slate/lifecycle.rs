//! ACTION/CUT take lifecycle state machine.
//!
//! Listens for the structural calls that bound a take. A start call
//! ("action", "rolling", "turnover") opens the take and, when a fresh slate
//! is pending, emits its header first. "cut" closes the take and consumes
//! the slate.

use crate::clock::Clock;
use crate::defaults;
use crate::pipeline::types::Annotation;
use crate::slate::extractor::PendingSlate;
use std::sync::Arc;
use std::time::Duration;

/// Keywords that start a take.
const START_KEYWORDS: &[&str] = &["action", "rolling", "turnover"];

/// Keyword that ends a take.
const STOP_KEYWORD: &str = "cut";

/// Whether a take is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TakeState {
    /// No take in progress.
    #[default]
    Idle,
    /// Between ACTION and CUT.
    Active,
}

/// A structural keyword occurrence, ordered by position in the utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TakeEvent {
    Start,
    Stop,
}

/// Take lifecycle state machine. One instance per session.
pub struct TakeLifecycle {
    state: TakeState,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl TakeLifecycle {
    /// Creates a lifecycle tracker with the default correlation window.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: TakeState::Idle,
            window: defaults::CORRELATION_WINDOW,
            clock,
        }
    }

    /// Overrides the slate↔action correlation window.
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Current take state.
    pub fn state(&self) -> TakeState {
        self.state
    }

    /// Scan `text` for start/stop calls and apply them in utterance order.
    ///
    /// Returns the annotations to emit, in order. When both a start and a
    /// stop keyword appear ("...cut... rolling...") they are processed by
    /// character position, not group priority, so a new take can begin in
    /// the same breath that ends the old one. Equal positions break toward
    /// start-before-stop, deterministically.
    pub fn process(&mut self, text: &str, slate: &mut PendingSlate) -> Vec<Annotation> {
        let mut events: Vec<(usize, TakeEvent)> = Vec::new();
        if let Some(pos) = first_keyword_position(text, START_KEYWORDS) {
            events.push((pos, TakeEvent::Start));
        }
        if let Some(pos) = first_keyword_position(text, &[STOP_KEYWORD]) {
            events.push((pos, TakeEvent::Stop));
        }
        // Start sorts before Stop at the same position
        events.sort_by_key(|&(pos, event)| (pos, event == TakeEvent::Stop));

        let mut annotations = Vec::new();
        for (_, event) in events {
            match (self.state, event) {
                (TakeState::Idle, TakeEvent::Start) => {
                    self.state = TakeState::Active;
                    if let Some(header) = self.slate_header(slate) {
                        annotations.push(Annotation::Slate(header));
                    }
                    annotations.push(Annotation::Action);
                }
                (TakeState::Active, TakeEvent::Stop) => {
                    self.state = TakeState::Idle;
                    annotations.push(Annotation::Cut);
                    // A confirmed take consumes its slate
                    slate.clear();
                }
                // Duplicate ACTION while rolling, stray CUT while idle
                (TakeState::Active, TakeEvent::Start) | (TakeState::Idle, TakeEvent::Stop) => {}
            }
        }
        annotations
    }

    /// Slate header for a starting take, if the pending slate is fresh.
    fn slate_header(&self, slate: &PendingSlate) -> Option<String> {
        let captured_at = slate.captured_at?;
        if self.clock.now().duration_since(captured_at) > self.window {
            return None;
        }

        let parts: Vec<String> = [
            slate.scene.as_ref().map(|s| format!("SCENE {}", s)),
            slate.take.as_ref().map(|t| format!("TAKE {}", t)),
        ]
        .into_iter()
        .flatten()
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" / "))
        }
    }
}

/// Byte position of the first token matching any of `keywords`, scanning
/// word/digit/hyphen token boundaries.
fn first_keyword_position(text: &str, keywords: &[&str]) -> Option<usize> {
    let lowered = text.to_lowercase();
    let mut token_start: Option<usize> = None;

    for (i, c) in lowered.char_indices().chain([(lowered.len(), ' ')]) {
        let is_word = c.is_alphanumeric() || c == '-';
        match (token_start, is_word) {
            (None, true) => token_start = Some(i),
            (Some(start), false) => {
                if keywords.contains(&&lowered[start..i]) {
                    return Some(start);
                }
                token_start = None;
            }
            _ => {}
        }
    }
    None
}
