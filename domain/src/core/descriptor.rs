//! Model descriptor value object

use crate::core::provider::ProviderId;
use serde::{Deserialize, Serialize};

/// Describes one invocable model (Value Object)
///
/// Immutable registry entry. `name` is the display identity and must be
/// unique within a registry; `model_id` is whatever string the provider's
/// API expects. `guaranteed` marks providers expected to be reliable — it
/// influences default selection and display hints, never failure handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Display identity, unique within a request
    pub name: String,
    /// Provider that serves this model
    pub provider_id: ProviderId,
    /// Provider-side model identifier
    pub model_id: String,
    /// Accent color used when attributing output to this model
    pub display_color: String,
    /// Expected-reliable flag (informational)
    pub guaranteed: bool,
}

impl ModelDescriptor {
    pub fn new(
        name: impl Into<String>,
        provider_id: ProviderId,
        model_id: impl Into<String>,
        display_color: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            provider_id,
            model_id: model_id.into(),
            display_color: display_color.into(),
            guaranteed: false,
        }
    }

    pub fn guaranteed(mut self) -> Self {
        self.guaranteed = true;
        self
    }
}

impl std::fmt::Display for ModelDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let model = ModelDescriptor::new("GPT-4o", ProviderId::OpenAi, "gpt-4o", "#10a37f");
        assert!(!model.guaranteed);
        assert_eq!(model.to_string(), "GPT-4o");

        let model = model.guaranteed();
        assert!(model.guaranteed);
    }

    #[test]
    fn test_serde_roundtrip() {
        let model =
            ModelDescriptor::new("Claude", ProviderId::Anthropic, "claude-sonnet-4-5", "#d97757")
                .guaranteed();
        let json = serde_json::to_string(&model).unwrap();
        let back: ModelDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(model, back);
    }
}
