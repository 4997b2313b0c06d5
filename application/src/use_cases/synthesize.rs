//! Synthesizer
//!
//! Merges the successful outcomes of a fan-out into one answer. A single
//! survivor is returned verbatim — no extra round-trip, no silent rewording.
//! Synthesis is an enhancement, not a dependency: if the merge call fails,
//! the first successful raw answer is returned instead.

use crate::use_cases::invoke::ProviderInvoker;
use chorus_domain::{InvocationOutcome, ModelDescriptor, SynthesisOutcome, SynthesisPrompt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Merges multiple model answers via the designated synthesis model.
pub struct Synthesizer {
    invoker: Arc<ProviderInvoker>,
    model: ModelDescriptor,
}

impl Synthesizer {
    pub fn new(invoker: Arc<ProviderInvoker>, model: ModelDescriptor) -> Self {
        Self { invoker, model }
    }

    /// The model designated to perform merges.
    pub fn model(&self) -> &ModelDescriptor {
        &self.model
    }

    /// Merge the successful outcomes into one answer.
    ///
    /// The coordinator guarantees at least one success before this is
    /// called; with none, an empty passthrough is returned rather than a
    /// panic.
    pub async fn synthesize(&self, outcomes: &[InvocationOutcome]) -> SynthesisOutcome {
        let successes: Vec<&InvocationOutcome> =
            outcomes.iter().filter(|o| o.succeeded).collect();
        debug_assert!(
            !successes.is_empty(),
            "synthesize requires at least one successful outcome"
        );

        let Some(first) = successes.first() else {
            return SynthesisOutcome::passthrough("");
        };
        let first_text = first.text.clone().unwrap_or_default();

        if successes.len() == 1 {
            debug!("Single successful model, skipping synthesis");
            return SynthesisOutcome::passthrough(first_text);
        }

        info!(
            "Synthesizing {} answers with {}",
            successes.len(),
            self.model.name
        );

        let contributions: Vec<(String, String)> = successes
            .iter()
            .map(|o| {
                (
                    o.model.name.clone(),
                    o.text.clone().unwrap_or_default(),
                )
            })
            .collect();
        let request = SynthesisPrompt::request(&contributions);

        let outcome = self.invoker.invoke(&self.model, &request).await;
        if outcome.succeeded
            && let Some(text) = outcome.text
        {
            SynthesisOutcome::merged(text)
        } else {
            warn!("Synthesis failed, falling back to first successful answer");
            SynthesisOutcome::passthrough(first_text)
        }
    }
}
