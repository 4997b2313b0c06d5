//! Fan-Out Coordinator
//!
//! Invokes every selected model concurrently and joins until all of them
//! have settled. There is no first-wins race: attribution needs the full
//! coverage picture, so the coordinator always waits for the whole set.

use crate::use_cases::invoke::ProviderInvoker;
use chorus_domain::{
    DomainError, InvocationOutcome, InvocationRequest, ModelDescriptor, ModelRegistry,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Errors that can terminate a fan-out
#[derive(Error, Debug)]
pub enum FanOutError {
    /// Every selected provider failed; there is no content to return.
    #[error("All providers unavailable")]
    AllProvidersFailed,

    #[error(transparent)]
    Selection(#[from] DomainError),
}

/// Coordinates one concurrent fan-out across the selected models.
pub struct FanOutCoordinator {
    invoker: Arc<ProviderInvoker>,
    registry: Arc<ModelRegistry>,
}

impl FanOutCoordinator {
    pub fn new(invoker: Arc<ProviderInvoker>, registry: Arc<ModelRegistry>) -> Self {
        Self { invoker, registry }
    }

    /// Fan a request out to the named models.
    ///
    /// An empty selection falls back to the registry's default selection.
    /// The returned outcomes are in the caller-specified model order
    /// regardless of completion order, exactly one per selected model.
    pub async fn fan_out(
        &self,
        request: &InvocationRequest,
        selection: &[String],
    ) -> Result<Vec<InvocationOutcome>, FanOutError> {
        let models = self.select(selection)?;
        info!("Fanning out to {} models", models.len());

        let outcomes = self.invoke_all(request, models).await;

        if outcomes.iter().all(|o| !o.succeeded) {
            return Err(FanOutError::AllProvidersFailed);
        }
        Ok(outcomes)
    }

    /// Resolve a selection against the registry without invoking anything.
    pub fn select(&self, selection: &[String]) -> Result<Vec<ModelDescriptor>, DomainError> {
        if selection.is_empty() {
            Ok(self.registry.default_selection())
        } else {
            self.registry.resolve(selection)
        }
    }

    /// Start all invocations concurrently and wait for every one to settle.
    pub async fn invoke_all(
        &self,
        request: &InvocationRequest,
        models: Vec<ModelDescriptor>,
    ) -> Vec<InvocationOutcome> {
        let mut join_set = JoinSet::new();

        for (idx, model) in models.iter().cloned().enumerate() {
            let invoker = Arc::clone(&self.invoker);
            let request = request.clone();

            join_set.spawn(async move {
                let outcome = invoker.invoke(&model, &request).await;
                (idx, outcome)
            });
        }

        // Slot each outcome by its request index: completion order is
        // arbitrary, the returned order is not.
        let mut slots: Vec<Option<InvocationOutcome>> = vec![None; models.len()];

        while let Some(result) = join_set.join_next().await {
            match result {
                Ok((idx, outcome)) => slots[idx] = Some(outcome),
                Err(e) => warn!("Task join error: {}", e),
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(idx, slot)| {
                // A panicked task still yields a failed outcome for its slot
                slot.unwrap_or_else(|| InvocationOutcome::failure(models[idx].clone(), 0))
            })
            .collect()
    }
}
