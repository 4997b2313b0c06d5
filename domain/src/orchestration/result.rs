//! Orchestration result value objects - immutable outputs of a fan-out.
//!
//! [`OrchestrationResult::build`] is a pure function from the settled
//! outcomes plus the synthesis outcome to the composite payload; it performs
//! no I/O and is owned solely by the caller that requested the fan-out.

use crate::orchestration::outcome::InvocationOutcome;
use serde::{Deserialize, Serialize};

/// Attribution row for one model that contributed to the answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelAttribution {
    pub name: String,
    pub display_color: String,
    pub duration_ms: u64,
}

/// A model that was requested but produced no answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedModel {
    pub name: String,
}

/// What the synthesizer produced for a set of outcomes
///
/// `synthesized` reports what actually happened: it is false both for the
/// single-survivor passthrough and for the fallback taken when the
/// synthesis call itself fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisOutcome {
    pub text: String,
    pub synthesized: bool,
}

impl SynthesisOutcome {
    pub fn merged(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            synthesized: true,
        }
    }

    pub fn passthrough(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            synthesized: false,
        }
    }
}

/// Complete result of one fan-out request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationResult {
    /// The answer returned to the caller
    pub combined_text: String,
    /// Succeeded models in the caller's requested order
    pub contributing_models: Vec<ModelAttribution>,
    /// Requested models that produced no answer
    pub failed_models: Vec<FailedModel>,
    /// Whether `combined_text` came from a synthesis call
    pub synthesized: bool,
    pub success_count: usize,
    pub total_requested: usize,
}

impl OrchestrationResult {
    /// Assemble the composite payload from settled outcomes.
    ///
    /// `outcomes` must be in the caller's requested order; attribution
    /// preserves that order regardless of completion order.
    pub fn build(outcomes: &[InvocationOutcome], synthesis: SynthesisOutcome) -> Self {
        let contributing_models: Vec<ModelAttribution> = outcomes
            .iter()
            .filter(|o| o.succeeded)
            .map(|o| ModelAttribution {
                name: o.model.name.clone(),
                display_color: o.model.display_color.clone(),
                duration_ms: o.duration_ms,
            })
            .collect();

        let failed_models: Vec<FailedModel> = outcomes
            .iter()
            .filter(|o| !o.succeeded)
            .map(|o| FailedModel {
                name: o.model.name.clone(),
            })
            .collect();

        let success_count = contributing_models.len();
        debug_assert!(
            success_count == 0 || !synthesis.text.is_empty(),
            "an answered fan-out must carry a non-empty combined text"
        );

        Self {
            combined_text: synthesis.text,
            contributing_models,
            failed_models,
            synthesized: synthesis.synthesized,
            success_count,
            total_requested: outcomes.len(),
        }
    }
}
