//! Invocation outcome value object

use crate::core::descriptor::ModelDescriptor;
use serde::{Deserialize, Serialize};

/// The settled result of one provider invocation (Value Object)
///
/// Produced exactly once per call, written by the invoking task alone, and
/// immutable after creation. A failed outcome carries no text; the reason
/// is logged at the invocation site and, on the streaming path, reported in
/// the model's terminal event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationOutcome {
    /// The model this outcome belongs to
    pub model: ModelDescriptor,
    /// The response text, absent on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Wall-clock duration of the call in milliseconds
    pub duration_ms: u64,
    /// Whether the call produced a usable response
    pub succeeded: bool,
}

impl InvocationOutcome {
    pub fn success(model: ModelDescriptor, text: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            model,
            text: Some(text.into()),
            duration_ms,
            succeeded: true,
        }
    }

    pub fn failure(model: ModelDescriptor, duration_ms: u64) -> Self {
        Self {
            model,
            text: None,
            duration_ms,
            succeeded: false,
        }
    }

    pub fn is_success(&self) -> bool {
        self.succeeded
    }
}
