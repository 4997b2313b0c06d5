//! Token-level streaming events for one provider invocation.
//!
//! [`TokenEvent`] bridges infrastructure-level streaming (SSE chunks from a
//! provider's HTTP API) to the application layer. These are per-invocation
//! events; the client-facing multiplexed envelope lives in
//! [`orchestration::events`](crate::orchestration::events).

/// An event in a single model's streaming response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenEvent {
    /// A text chunk from the model.
    Delta(String),
    /// The complete response text (signals stream end).
    Completed(String),
    /// An error that occurred during streaming.
    Error(String),
}

impl TokenEvent {
    /// Returns the text content if this is a Delta or Completed event.
    pub fn text(&self) -> Option<&str> {
        match self {
            TokenEvent::Delta(s) | TokenEvent::Completed(s) => Some(s),
            TokenEvent::Error(_) => None,
        }
    }

    /// Returns true if this event signals the end of the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TokenEvent::Completed(_) | TokenEvent::Error(_))
    }
}
