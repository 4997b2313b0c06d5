//! Client-facing stream event envelope.
//!
//! [`StreamEvent`] is the typed envelope multiplexed onto one ordered
//! channel per request: per-model token chunks tagged with the model's
//! identity, the synthesis sub-stream, and the lifecycle terminals. The
//! wire codec in the infrastructure layer serializes these as
//! `data: <json>\n\n` frames, so the format is defined once — here — for
//! both producer and consumer.
//!
//! Ordering guarantees carried by this envelope:
//! - `connected` is first, `done` (or a setup `error`) is last;
//! - within one model, `model_start` precedes every `model_chunk`, and
//!   exactly one terminal (`model_complete` | `model_error`) follows them;
//! - chunks of *different* models interleave arbitrarily;
//! - synthesis events appear only after every model reached its terminal.

use serde::{Deserialize, Serialize};

/// One event on a request's multiplexed stream.
///
/// The serialized form carries a mandatory `type` tag; field names are
/// camelCase on the wire, matching the JSON the transport layer exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum StreamEvent {
    /// Channel opened; emitted exactly once, before anything else.
    Connected { timestamp: u64 },
    /// A model's token stream is about to begin.
    ModelStart { model: String, color: String },
    /// An incremental text fragment, in provider-emission order.
    ModelChunk { model: String, text: String },
    /// Terminal: the model finished successfully.
    ModelComplete {
        model: String,
        duration_ms: u64,
        /// Rough chars/4 estimate; providers do not report usage on every stream.
        token_estimate: u32,
    },
    /// Terminal: the model failed; the batch continues without it.
    ModelError { model: String, reason: String },
    /// The synthesis sub-stream is about to begin (more than one model succeeded).
    SynthesisStart { model: String },
    SynthesisChunk { text: String },
    SynthesisComplete { duration_ms: u64 },
    /// Synthesis failed; the request still completes normally.
    SynthesisError { reason: String },
    /// Terminal for the whole request; always the last event.
    Done {
        total_models: usize,
        success_count: usize,
        timestamp: u64,
    },
    /// Channel setup failed before any model started.
    Error { message: String },
}

impl StreamEvent {
    /// The model a per-model event is tagged with, if any.
    pub fn model(&self) -> Option<&str> {
        match self {
            StreamEvent::ModelStart { model, .. }
            | StreamEvent::ModelChunk { model, .. }
            | StreamEvent::ModelComplete { model, .. }
            | StreamEvent::ModelError { model, .. } => Some(model),
            _ => None,
        }
    }

    /// Returns true if no further events may follow this one.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done { .. } | StreamEvent::Error { .. })
    }
}

/// Approximate token count reported in `model_complete` events.
pub fn estimate_tokens(text: &str) -> u32 {
    (text.chars().count().div_ceil(4)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tags_match_wire_contract() {
        let cases: Vec<(StreamEvent, &str)> = vec![
            (StreamEvent::Connected { timestamp: 1 }, "connected"),
            (
                StreamEvent::ModelStart {
                    model: "A".into(),
                    color: "#fff".into(),
                },
                "model_start",
            ),
            (
                StreamEvent::ModelChunk {
                    model: "A".into(),
                    text: "hi".into(),
                },
                "model_chunk",
            ),
            (
                StreamEvent::ModelComplete {
                    model: "A".into(),
                    duration_ms: 5,
                    token_estimate: 1,
                },
                "model_complete",
            ),
            (
                StreamEvent::ModelError {
                    model: "A".into(),
                    reason: "boom".into(),
                },
                "model_error",
            ),
            (StreamEvent::SynthesisStart { model: "S".into() }, "synthesis_start"),
            (StreamEvent::SynthesisChunk { text: "m".into() }, "synthesis_chunk"),
            (
                StreamEvent::SynthesisComplete { duration_ms: 9 },
                "synthesis_complete",
            ),
            (
                StreamEvent::SynthesisError { reason: "no".into() },
                "synthesis_error",
            ),
            (
                StreamEvent::Done {
                    total_models: 2,
                    success_count: 1,
                    timestamp: 2,
                },
                "done",
            ),
            (StreamEvent::Error { message: "down".into() }, "error"),
        ];

        for (event, tag) in cases {
            let value = serde_json::to_value(&event).unwrap();
            assert_eq!(value["type"], tag, "wrong tag for {event:?}");
        }
    }

    #[test]
    fn test_wire_fields_are_camel_case() {
        let value = serde_json::to_value(StreamEvent::Done {
            total_models: 3,
            success_count: 2,
            timestamp: 7,
        })
        .unwrap();
        assert_eq!(value["totalModels"], 3);
        assert_eq!(value["successCount"], 2);

        let value = serde_json::to_value(StreamEvent::ModelComplete {
            model: "A".into(),
            duration_ms: 10,
            token_estimate: 4,
        })
        .unwrap();
        assert_eq!(value["durationMs"], 10);
        assert_eq!(value["tokenEstimate"], 4);
    }

    #[test]
    fn test_roundtrip() {
        let event = StreamEvent::ModelChunk {
            model: "Claude".into(),
            text: "partial".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: StreamEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }

    #[test]
    fn test_model_accessor_and_terminals() {
        let chunk = StreamEvent::ModelChunk {
            model: "A".into(),
            text: "t".into(),
        };
        assert_eq!(chunk.model(), Some("A"));
        assert!(!chunk.is_terminal());
        assert!(
            StreamEvent::Done {
                total_models: 0,
                success_count: 0,
                timestamp: 0
            }
            .is_terminal()
        );
        assert!(StreamEvent::Error { message: "m".into() }.is_terminal());
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }
}
