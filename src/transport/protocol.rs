//! JSON wire messages exchanged with the transcription relay.
//!
//! The relay is an opaque duplex channel: binary PCM flows out, and
//! newline-delimited JSON transcript messages flow back. Unknown fields are
//! ignored and missing fields default, so a malformed or truncated message
//! degrades to an empty event instead of an error.

use serde::{Deserialize, Serialize};

/// Session greeting sent once after connecting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionHello {
    /// Short-lived token from the token endpoint.
    pub token: String,
    /// Capture sample rate in Hz; the relay interprets the PCM with it.
    pub sample_rate: u32,
}

impl SessionHello {
    /// Serialize to a single JSON line.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// One transcript message from the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TranscriptMessage {
    /// Transcript text; may be empty.
    pub transcript: String,
    /// True when this text is the settled end-of-turn transcript.
    pub end_of_turn: bool,
}

impl TranscriptMessage {
    /// Deserialize from a JSON line. Returns `None` for malformed input.
    pub fn from_json(line: &str) -> Option<Self> {
        serde_json::from_str(line).ok()
    }

    /// Serialize to a JSON line (used by tests and the mock relay).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hello_round_trip() {
        let hello = SessionHello {
            token: "abc123".to_string(),
            sample_rate: 48_000,
        };
        let json = hello.to_json().unwrap();
        assert!(json.contains("\"token\":\"abc123\""));
        assert!(json.contains("\"sample_rate\":48000"));
    }

    #[test]
    fn test_transcript_message_parse() {
        let msg =
            TranscriptMessage::from_json(r#"{"transcript":"scene one","end_of_turn":true}"#)
                .unwrap();
        assert_eq!(msg.transcript, "scene one");
        assert!(msg.end_of_turn);
    }

    #[test]
    fn test_missing_fields_default() {
        let msg = TranscriptMessage::from_json(r#"{"transcript":"partial"}"#).unwrap();
        assert_eq!(msg.transcript, "partial");
        assert!(!msg.end_of_turn);

        let empty = TranscriptMessage::from_json("{}").unwrap();
        assert!(empty.transcript.is_empty());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let msg = TranscriptMessage::from_json(
            r#"{"transcript":"hi","end_of_turn":false,"confidence":0.93}"#,
        )
        .unwrap();
        assert_eq!(msg.transcript, "hi");
    }

    #[test]
    fn test_malformed_json_is_none() {
        assert!(TranscriptMessage::from_json("not json").is_none());
        assert!(TranscriptMessage::from_json("").is_none());
        assert!(TranscriptMessage::from_json("[1,2,3]").is_none());
    }
}
