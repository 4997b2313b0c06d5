//! SSE wire codec for the client-facing event stream.
//!
//! The format is defined once, here, for both sides: each event is one
//! `data: <json>` line terminated by a blank line, and consumers reassemble
//! events by buffering bytes and splitting on the double-newline frame
//! boundary. The JSON payload is a [`StreamEvent`] with its mandatory
//! `type` tag.

use chorus_domain::StreamEvent;
use thiserror::Error;

/// Errors that can occur while encoding or decoding frames
#[derive(Error, Debug)]
pub enum WireError {
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Encode one event as an SSE frame: `data: <json>\n\n`.
pub fn encode_frame(event: &StreamEvent) -> Result<String, WireError> {
    let json = serde_json::to_string(event)?;
    Ok(format!("data: {}\n\n", json))
}

/// Incremental frame decoder.
///
/// Feed it arbitrary byte slices as they arrive off the wire; it buffers
/// partial frames (including multi-byte characters split across reads) and
/// yields every completed event.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a byte slice, returning all events completed by it.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<StreamEvent>, WireError> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(end) = find_frame_end(&self.buffer) {
            let frame: Vec<u8> = self.buffer.drain(..end + 2).take(end).collect();
            if let Some(event) = decode_frame(&frame)? {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// Bytes held back waiting for a frame boundary.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

fn find_frame_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

/// Decode one complete frame. Frames without a `data:` line (comments,
/// keep-alives) decode to `None`.
fn decode_frame(frame: &[u8]) -> Result<Option<StreamEvent>, WireError> {
    let text = std::str::from_utf8(frame)
        .map_err(|e| WireError::MalformedFrame(e.to_string()))?;

    let payload: Vec<&str> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .collect();
    if payload.is_empty() {
        return Ok(None);
    }

    let event = serde_json::from_str(&payload.join("\n"))?;
    Ok(Some(event))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_events() -> Vec<StreamEvent> {
        vec![
            StreamEvent::Connected { timestamp: 1 },
            StreamEvent::ModelStart {
                model: "GPT-4o".into(),
                color: "#10a37f".into(),
            },
            StreamEvent::ModelChunk {
                model: "GPT-4o".into(),
                text: "héllo ✓".into(),
            },
            StreamEvent::ModelComplete {
                model: "GPT-4o".into(),
                duration_ms: 42,
                token_estimate: 2,
            },
            StreamEvent::Done {
                total_models: 1,
                success_count: 1,
                timestamp: 2,
            },
        ]
    }

    #[test]
    fn encode_produces_terminated_data_line() {
        let frame = encode_frame(&StreamEvent::Connected { timestamp: 7 }).unwrap();
        assert!(frame.starts_with("data: {"));
        assert!(frame.ends_with("\n\n"));
        assert!(frame.contains("\"type\":\"connected\""));
    }

    #[test]
    fn roundtrip_all_at_once() {
        let events = sample_events();
        let wire: String = events
            .iter()
            .map(|e| encode_frame(e).unwrap())
            .collect();

        let mut decoder = FrameDecoder::new();
        let decoded = decoder.feed(wire.as_bytes()).unwrap();
        assert_eq!(decoded, events);
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn roundtrip_byte_by_byte() {
        // Feeding one byte at a time splits multi-byte characters across
        // reads; the decoder must reassemble them losslessly.
        let events = sample_events();
        let wire: String = events
            .iter()
            .map(|e| encode_frame(e).unwrap())
            .collect();

        let mut decoder = FrameDecoder::new();
        let mut decoded = Vec::new();
        for byte in wire.as_bytes() {
            decoded.extend(decoder.feed(&[*byte]).unwrap());
        }
        assert_eq!(decoded, events);
    }

    #[test]
    fn partial_frame_is_held_back() {
        let frame = encode_frame(&StreamEvent::Connected { timestamp: 1 }).unwrap();
        let (head, tail) = frame.as_bytes().split_at(frame.len() - 5);

        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(head).unwrap().is_empty());
        assert!(decoder.pending() > 0);

        let decoded = decoder.feed(tail).unwrap();
        assert_eq!(decoded.len(), 1);
    }

    #[test]
    fn comment_frames_are_skipped() {
        let mut decoder = FrameDecoder::new();
        let decoded = decoder
            .feed(b": keep-alive\n\ndata: {\"type\":\"connected\",\"timestamp\":3}\n\n")
            .unwrap();
        assert_eq!(decoded, vec![StreamEvent::Connected { timestamp: 3 }]);
    }

    #[test]
    fn unknown_event_type_is_an_error() {
        let mut decoder = FrameDecoder::new();
        let result = decoder.feed(b"data: {\"type\":\"bogus\"}\n\n");
        assert!(matches!(result, Err(WireError::Json(_))));
    }
}
