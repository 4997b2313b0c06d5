//! Model registry and selection policy

use crate::core::descriptor::ModelDescriptor;
use crate::core::error::DomainError;
use crate::core::provider::ProviderId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Static, ordered list of invocable models plus the designated synthesis
/// model (Entity)
///
/// The registry is supplied by configuration and never mutated afterwards.
/// Selection policy lives here so it can be tested and swapped without
/// touching the fan-out coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRegistry {
    models: Vec<ModelDescriptor>,
    /// Model used to merge multiple answers. Falls back to the default
    /// selection when unset.
    synthesis: Option<ModelDescriptor>,
}

impl ModelRegistry {
    /// Create a registry. Names must be unique; an empty registry is an error.
    pub fn new(
        models: Vec<ModelDescriptor>,
        synthesis: Option<ModelDescriptor>,
    ) -> Result<Self, DomainError> {
        if models.is_empty() {
            return Err(DomainError::EmptyRegistry);
        }
        let mut seen = HashSet::new();
        for model in &models {
            if !seen.insert(model.name.as_str()) {
                return Err(DomainError::DuplicateModel(model.name.clone()));
            }
        }
        Ok(Self { models, synthesis })
    }

    /// Built-in registry used when no configuration file provides one.
    pub fn builtin() -> Self {
        let models = vec![
            ModelDescriptor::new("GPT-4o", ProviderId::OpenAi, "gpt-4o", "#10a37f").guaranteed(),
            ModelDescriptor::new(
                "Claude Sonnet",
                ProviderId::Anthropic,
                "claude-sonnet-4-5",
                "#d97757",
            )
            .guaranteed(),
            ModelDescriptor::new(
                "Llama 3.3 70B",
                ProviderId::OpenRouter,
                "meta-llama/llama-3.3-70b-instruct",
                "#0081fb",
            ),
            ModelDescriptor::new(
                "Mistral Large",
                ProviderId::OpenRouter,
                "mistralai/mistral-large-2411",
                "#ff7000",
            ),
        ];
        let synthesis = Some(ModelDescriptor::new(
            "GPT-4o Mini",
            ProviderId::OpenAi,
            "gpt-4o-mini",
            "#10a37f",
        ));
        // The built-in list is non-empty with unique names
        Self { models, synthesis }
    }

    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    /// Look up a model by display name
    pub fn get(&self, name: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.name == name)
    }

    /// Resolve an explicit selection, preserving the caller's order.
    ///
    /// Unknown names are an error rather than being dropped: the request's
    /// total count and attribution must match what the caller asked for.
    pub fn resolve(&self, names: &[String]) -> Result<Vec<ModelDescriptor>, DomainError> {
        names
            .iter()
            .map(|name| {
                self.get(name)
                    .cloned()
                    .ok_or_else(|| DomainError::UnknownModel(name.clone()))
            })
            .collect()
    }

    /// Default selection policy for an empty selection: the first guaranteed
    /// entry, or the first entry when nothing is marked guaranteed.
    ///
    /// The system must never silently answer with zero models.
    pub fn default_selection(&self) -> Vec<ModelDescriptor> {
        vec![self.fallback().clone()]
    }

    /// The model that merges multiple answers into one.
    pub fn synthesis_model(&self) -> &ModelDescriptor {
        self.synthesis.as_ref().unwrap_or_else(|| self.fallback())
    }

    fn fallback(&self) -> &ModelDescriptor {
        self.models
            .iter()
            .find(|m| m.guaranteed)
            .unwrap_or(&self.models[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> ModelDescriptor {
        ModelDescriptor::new(name, ProviderId::OpenAi, name.to_lowercase(), "#000000")
    }

    #[test]
    fn test_empty_registry_is_rejected() {
        let result = ModelRegistry::new(vec![], None);
        assert!(matches!(result, Err(DomainError::EmptyRegistry)));
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let result = ModelRegistry::new(vec![entry("A"), entry("A")], None);
        assert!(matches!(result, Err(DomainError::DuplicateModel(_))));
    }

    #[test]
    fn test_resolve_preserves_caller_order() {
        let registry = ModelRegistry::new(vec![entry("A"), entry("B"), entry("C")], None).unwrap();
        let selection = vec!["C".to_string(), "A".to_string()];
        let resolved = registry.resolve(&selection).unwrap();
        let names: Vec<_> = resolved.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A"]);
    }

    #[test]
    fn test_resolve_unknown_name_errors() {
        let registry = ModelRegistry::new(vec![entry("A")], None).unwrap();
        let result = registry.resolve(&["Nope".to_string()]);
        assert!(matches!(result, Err(DomainError::UnknownModel(name)) if name == "Nope"));
    }

    #[test]
    fn test_default_selection_prefers_guaranteed() {
        let registry =
            ModelRegistry::new(vec![entry("A"), entry("B").guaranteed()], None).unwrap();
        let selection = registry.default_selection();
        assert_eq!(selection.len(), 1);
        assert_eq!(selection[0].name, "B");
    }

    #[test]
    fn test_default_selection_falls_back_to_first_entry() {
        let registry = ModelRegistry::new(vec![entry("A"), entry("B")], None).unwrap();
        assert_eq!(registry.default_selection()[0].name, "A");
    }

    #[test]
    fn test_synthesis_model_defaults_to_fallback() {
        let registry =
            ModelRegistry::new(vec![entry("A"), entry("B").guaranteed()], None).unwrap();
        assert_eq!(registry.synthesis_model().name, "B");

        let registry =
            ModelRegistry::new(vec![entry("A")], Some(entry("Merger"))).unwrap();
        assert_eq!(registry.synthesis_model().name, "Merger");
    }

    #[test]
    fn test_builtin_registry_is_valid() {
        let registry = ModelRegistry::builtin();
        assert!(!registry.models().is_empty());
        assert!(registry.models().iter().any(|m| m.guaranteed));
    }
}
