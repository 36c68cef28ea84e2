//! Slate extraction from transcript text.
//!
//! Pulls scene and take identifiers out of free-form speech ("scene twelve
//! alpha, take 3") and records them on the session's pending slate, where
//! they wait for the ACTION call that confirms the take.

use crate::clock::Clock;
use crate::slate::{numbers, phonetic};
use std::sync::Arc;
use std::time::Instant;

/// Keywords that terminate a scene/take block.
///
/// A capture block must not swallow the next structural keyword: in
/// "scene twelve alpha take 3" the scene block ends before "take".
const TERMINATORS: &[&str] = &["take", "action", "rolling", "turnover", "cut"];

/// A slate call not yet confirmed by an ACTION call.
///
/// Single instance per session. Cleared when a CUT consumes the take it
/// belongs to, and ignored once stale beyond the correlation window.
#[derive(Debug, Clone, Default)]
pub struct PendingSlate {
    /// Scene identifier, e.g. "12A".
    pub scene: Option<String>,
    /// Take identifier, e.g. "3".
    pub take: Option<String>,
    /// When the most recent scene/take capture happened.
    pub captured_at: Option<Instant>,
}

impl PendingSlate {
    /// True when neither scene nor take has been captured.
    pub fn is_empty(&self) -> bool {
        self.scene.is_none() && self.take.is_none()
    }

    /// Reset scene, take, and capture timestamp.
    pub fn clear(&mut self) {
        self.scene = None;
        self.take = None;
        self.captured_at = None;
    }
}

/// Extracts scene/take identifiers and stamps capture time.
pub struct SlateExtractor {
    clock: Arc<dyn Clock>,
}

impl SlateExtractor {
    /// Creates an extractor using the given clock for capture timestamps.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Scan `text` and update `slate` in place.
    ///
    /// Unrecognized text leaves the slate untouched; extraction never fails.
    pub fn update(&self, text: &str, slate: &mut PendingSlate) {
        let tokens = tokenize(text);

        if let Some(scene) = extract_scene(&tokens) {
            slate.scene = Some(scene);
            slate.captured_at = Some(self.clock.now());
        }

        if let Some(take) = extract_take(&tokens) {
            slate.take = Some(take);
            slate.captured_at = Some(self.clock.now());
        }
    }
}

/// Lowercase word/digit/hyphen tokens, punctuation stripped.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|raw| {
            raw.chars()
                .filter(|c| c.is_alphanumeric() || *c == '-')
                .collect::<String>()
        })
        .filter(|token| !token.is_empty())
        .collect()
}

/// Tokens following `keyword` up to the first terminator or end of input.
fn block_after<'a>(tokens: &'a [String], keyword: &str) -> Option<&'a [String]> {
    let start = tokens.iter().position(|t| t == keyword)? + 1;
    let end = tokens[start..]
        .iter()
        .position(|t| TERMINATORS.contains(&t.as_str()))
        .map(|offset| start + offset)
        .unwrap_or(tokens.len());
    Some(&tokens[start..end])
}

/// Scene identifier from a `scene <block>` phrase: leading number plus
/// phonetic letter suffixes, e.g. "scene twelve alpha" → "12A".
fn extract_scene(tokens: &[String]) -> Option<String> {
    let block = block_after(tokens, "scene")?;
    if block.is_empty() {
        return None;
    }

    let (number, suffix_tokens) = match numbers::parse(&block.join(" ")) {
        Some(parsed) => (parsed.value.to_string(), &block[parsed.words_consumed..]),
        // Fallback: bare digit prefix of the first block token ("12a")
        None => {
            let digits: String = block[0]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            if digits.is_empty() {
                return None;
            }
            (digits, &block[1..])
        }
    };

    let letters: String = suffix_tokens
        .iter()
        .filter_map(|token| {
            phonetic::letter_for(token)
                .or_else(|| token.chars().next().map(|c| c.to_ascii_uppercase()))
        })
        .collect();

    Some(format!("{}{}", number, letters))
}

/// Take identifier from a `take <digits>` or `take <number words>` phrase.
///
/// The strict digit form always wins when present, avoiding ambiguity when
/// a literal number follows "take".
fn extract_take(tokens: &[String]) -> Option<String> {
    let take_pos = tokens.iter().position(|t| t == "take")?;

    // First pass: strict `take <digits>`
    if let Some(next) = tokens.get(take_pos + 1)
        && !next.is_empty()
        && next.bytes().all(|b| b.is_ascii_digit())
    {
        return Some(next.clone());
    }

    // Second pass: number words up to the next terminator
    let block = block_after(tokens, "take")?;
    numbers::parse(&block.join(" ")).map(|parsed| parsed.value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{MockClock, SystemClock};
    use std::time::Duration;

    fn extract(text: &str) -> PendingSlate {
        let extractor = SlateExtractor::new(Arc::new(SystemClock));
        let mut slate = PendingSlate::default();
        extractor.update(text, &mut slate);
        slate
    }

    #[test]
    fn extracts_scene_and_take_from_one_sentence() {
        let slate = extract("scene twelve alpha take 3");
        assert_eq!(slate.scene.as_deref(), Some("12A"));
        assert_eq!(slate.take.as_deref(), Some("3"));
        assert!(slate.captured_at.is_some());
    }

    #[test]
    fn scene_number_only() {
        let slate = extract("scene 5");
        assert_eq!(slate.scene.as_deref(), Some("5"));
        assert!(slate.take.is_none());
    }

    #[test]
    fn scene_with_multiple_suffix_letters() {
        let slate = extract("scene four alpha bravo");
        assert_eq!(slate.scene.as_deref(), Some("4AB"));
    }

    #[test]
    fn scene_suffix_falls_back_to_first_letter() {
        // "dog" is not NATO; its first letter contributes
        let slate = extract("scene seven dog");
        assert_eq!(slate.scene.as_deref(), Some("7D"));
    }

    #[test]
    fn scene_block_stops_at_take_keyword() {
        // Without the terminator lookahead, "take" would be swallowed
        // into the scene block and "3" lost
        let slate = extract("scene nine take three");
        assert_eq!(slate.scene.as_deref(), Some("9"));
        assert_eq!(slate.take.as_deref(), Some("3"));
    }

    #[test]
    fn scene_block_stops_at_action_keyword() {
        let slate = extract("scene two action");
        assert_eq!(slate.scene.as_deref(), Some("2"));
    }

    #[test]
    fn scene_digit_prefix_fallback() {
        // "12a" is not parseable as a number phrase; the digit prefix wins
        // and the rest of that token is dropped, as the suffix comes from
        // the following tokens
        let slate = extract("scene 12a bravo");
        assert_eq!(slate.scene.as_deref(), Some("12B"));
    }

    #[test]
    fn take_spelled_out() {
        let slate = extract("take twenty three");
        assert_eq!(slate.take.as_deref(), Some("23"));
        assert!(slate.scene.is_none());
    }

    #[test]
    fn strict_digit_take_wins() {
        let slate = extract("take 7");
        assert_eq!(slate.take.as_deref(), Some("7"));
    }

    #[test]
    fn punctuation_is_ignored() {
        let slate = extract("Scene 12, take 3.");
        assert_eq!(slate.scene.as_deref(), Some("12"));
        assert_eq!(slate.take.as_deref(), Some("3"));
    }

    #[test]
    fn xray_suffix_variants() {
        assert_eq!(extract("scene one x-ray").scene.as_deref(), Some("1X"));
        assert_eq!(extract("scene one xray").scene.as_deref(), Some("1X"));
        assert_eq!(extract("scene one juliett").scene.as_deref(), Some("1J"));
    }

    #[test]
    fn unrelated_text_leaves_slate_untouched() {
        let extractor = SlateExtractor::new(Arc::new(SystemClock));
        let mut slate = PendingSlate::default();
        extractor.update("the quick brown fox", &mut slate);
        assert!(slate.is_empty());
        assert!(slate.captured_at.is_none());
    }

    #[test]
    fn scene_without_number_is_ignored() {
        let slate = extract("scene heading interior");
        assert!(slate.scene.is_none());
    }

    #[test]
    fn later_capture_overwrites_and_restamps() {
        let clock = Arc::new(MockClock::new());
        let extractor = SlateExtractor::new(clock.clone());
        let mut slate = PendingSlate::default();

        extractor.update("scene 1", &mut slate);
        let first_stamp = slate.captured_at;

        clock.advance(Duration::from_secs(5));
        extractor.update("scene 2 take 4", &mut slate);

        assert_eq!(slate.scene.as_deref(), Some("2"));
        assert_eq!(slate.take.as_deref(), Some("4"));
        assert!(slate.captured_at > first_stamp);
    }

    #[test]
    fn clear_resets_all_fields() {
        let mut slate = extract("scene 3 take 1");
        assert!(!slate.is_empty());
        slate.clear();
        assert!(slate.is_empty());
        assert!(slate.captured_at.is_none());
    }

    #[test]
    fn empty_text_is_a_noop() {
        let slate = extract("");
        assert!(slate.is_empty());
    }
}
