//! Slate parsing: spoken scene/take calls and the ACTION/CUT lifecycle.

pub mod extractor;
pub mod lifecycle;
pub mod numbers;
pub mod phonetic;
pub mod router;

pub use extractor::{PendingSlate, SlateExtractor};
pub use lifecycle::{TakeLifecycle, TakeState};
pub use numbers::ParsedNumber;
pub use router::TranscriptRouter;
