//! Run Chorus use case
//!
//! Composes the batch flow: fan out → synthesize → build the composite
//! result. Streaming callers use
//! [`StreamChorusUseCase`](super::stream::StreamChorusUseCase) instead,
//! which multiplexes the same coordination onto a live event channel.

use crate::config::ExecutionParams;
use crate::ports::llm_gateway::LlmGateway;
use crate::use_cases::fan_out::{FanOutCoordinator, FanOutError};
use crate::use_cases::invoke::ProviderInvoker;
use crate::use_cases::synthesize::Synthesizer;
use chorus_domain::{
    InvocationOutcome, InvocationRequest, ModelRegistry, OrchestrationResult,
};
use std::sync::Arc;
use tracing::info;

/// Input for one orchestrated turn
#[derive(Debug, Clone)]
pub struct ChorusInput {
    /// The request shared verbatim across all selected models
    pub request: InvocationRequest,
    /// Display names of the models to fan out to; empty means the
    /// registry's default selection
    pub selection: Vec<String>,
}

impl ChorusInput {
    pub fn new(request: InvocationRequest) -> Self {
        Self {
            request,
            selection: Vec::new(),
        }
    }

    pub fn with_selection(mut self, selection: Vec<String>) -> Self {
        self.selection = selection;
        self
    }
}

/// Everything a batch caller may want: the composite result plus the
/// per-model outcomes it was derived from (the transport layer exposes the
/// individual responses alongside the combined answer).
#[derive(Debug, Clone)]
pub struct ChorusReport {
    pub result: OrchestrationResult,
    pub outcomes: Vec<InvocationOutcome>,
}

/// Use case for running one batch fan-out with synthesis.
pub struct RunChorusUseCase {
    coordinator: FanOutCoordinator,
    synthesizer: Synthesizer,
}

impl RunChorusUseCase {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        registry: Arc<ModelRegistry>,
        params: ExecutionParams,
    ) -> Self {
        let invoker = Arc::new(ProviderInvoker::new(gateway, &params));
        let synthesizer = Synthesizer::new(
            Arc::clone(&invoker),
            registry.synthesis_model().clone(),
        );
        Self {
            coordinator: FanOutCoordinator::new(invoker, registry),
            synthesizer,
        }
    }

    pub async fn execute(&self, input: ChorusInput) -> Result<ChorusReport, FanOutError> {
        let outcomes = self
            .coordinator
            .fan_out(&input.request, &input.selection)
            .await?;

        let synthesis = self.synthesizer.synthesize(&outcomes).await;
        let result = OrchestrationResult::build(&outcomes, synthesis);

        info!(
            "Chorus complete: {}/{} models answered, synthesized={}",
            result.success_count, result.total_requested, result.synthesized
        );

        Ok(ChorusReport { result, outcomes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::GatewayError;
    use async_trait::async_trait;
    use chorus_domain::{ModelDescriptor, ProviderId};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted gateway keyed by model name, with a total call counter.
    struct ScriptedGateway {
        script: HashMap<String, Result<String, String>>,
        calls: AtomicUsize,
    }

    impl ScriptedGateway {
        fn new(script: Vec<(&str, Result<&str, &str>)>) -> Arc<Self> {
            Arc::new(Self {
                script: script
                    .into_iter()
                    .map(|(k, v)| {
                        (
                            k.to_string(),
                            v.map(str::to_string).map_err(str::to_string),
                        )
                    })
                    .collect(),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LlmGateway for ScriptedGateway {
        async fn complete(
            &self,
            model: &ModelDescriptor,
            _request: &InvocationRequest,
        ) -> Result<String, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.script.get(&model.name) {
                Some(Ok(text)) => Ok(text.clone()),
                Some(Err(reason)) => Err(GatewayError::RequestFailed(reason.clone())),
                None => Err(GatewayError::ProviderNotConfigured(model.name.clone())),
            }
        }
    }

    fn entry(name: &str) -> ModelDescriptor {
        ModelDescriptor::new(name, ProviderId::OpenAi, name.to_lowercase(), "#000000")
    }

    fn registry(names: &[&str]) -> Arc<ModelRegistry> {
        let models = names.iter().map(|n| entry(n)).collect();
        Arc::new(ModelRegistry::new(models, Some(entry("Merger"))).unwrap())
    }

    fn input(selection: &[&str]) -> ChorusInput {
        ChorusInput::new(InvocationRequest::from_user_message("", "question"))
            .with_selection(selection.iter().map(|s| s.to_string()).collect())
    }

    #[tokio::test]
    async fn all_models_succeed() {
        let gateway = ScriptedGateway::new(vec![
            ("A", Ok("a")),
            ("B", Ok("b")),
            ("C", Ok("c")),
            ("Merger", Ok("merged")),
        ]);
        let use_case = RunChorusUseCase::new(
            gateway.clone(),
            registry(&["A", "B", "C"]),
            ExecutionParams::default(),
        );

        let report = use_case.execute(input(&["A", "B", "C"])).await.unwrap();
        let result = &report.result;

        assert_eq!(result.success_count, 3);
        assert_eq!(result.total_requested, 3);
        assert!(result.synthesized);
        assert!(result.failed_models.is_empty());
        assert_eq!(result.combined_text, "merged");
        assert_eq!(report.outcomes.len(), 3);
    }

    #[tokio::test]
    async fn one_model_fails_batch_survives() {
        let gateway = ScriptedGateway::new(vec![
            ("A", Ok("a")),
            ("B", Err("provider exception")),
            ("C", Ok("c")),
            ("Merger", Ok("merged")),
        ]);
        let use_case = RunChorusUseCase::new(
            gateway,
            registry(&["A", "B", "C"]),
            ExecutionParams::default(),
        );

        let report = use_case.execute(input(&["A", "B", "C"])).await.unwrap();
        let result = &report.result;

        assert_eq!(result.success_count, 2);
        assert!(result.synthesized);
        assert_eq!(result.failed_models.len(), 1);
        assert_eq!(result.failed_models[0].name, "B");
    }

    #[tokio::test]
    async fn single_model_answer_is_verbatim() {
        let gateway = ScriptedGateway::new(vec![("A", Ok("raw text")), ("Merger", Ok("merged"))]);
        let use_case =
            RunChorusUseCase::new(gateway.clone(), registry(&["A"]), ExecutionParams::default());

        let report = use_case.execute(input(&["A"])).await.unwrap();

        assert!(!report.result.synthesized);
        assert_eq!(report.result.combined_text, "raw text");
        // One fan-out call, no synthesis call
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn all_models_fail_is_terminal() {
        let gateway =
            ScriptedGateway::new(vec![("A", Err("down")), ("B", Err("down"))]);
        let use_case = RunChorusUseCase::new(
            gateway,
            registry(&["A", "B"]),
            ExecutionParams::default(),
        );

        let result = use_case.execute(input(&["A", "B"])).await;
        assert!(matches!(result, Err(FanOutError::AllProvidersFailed)));
    }

    #[tokio::test]
    async fn synthesis_failure_falls_back_to_first_success() {
        let gateway = ScriptedGateway::new(vec![
            ("A", Ok("alpha")),
            ("B", Ok("beta")),
            ("Merger", Err("overloaded")),
        ]);
        let use_case = RunChorusUseCase::new(
            gateway,
            registry(&["A", "B"]),
            ExecutionParams::default(),
        );

        let report = use_case.execute(input(&["A", "B"])).await.unwrap();

        assert!(!report.result.synthesized);
        assert_eq!(report.result.combined_text, "alpha");
        assert_eq!(report.result.success_count, 2);
    }

    #[tokio::test]
    async fn identical_requests_yield_identical_results() {
        let gateway = ScriptedGateway::new(vec![
            ("A", Ok("a")),
            ("B", Ok("b")),
            ("Merger", Ok("merged")),
        ]);
        let use_case = RunChorusUseCase::new(
            gateway,
            registry(&["A", "B"]),
            ExecutionParams::default(),
        );

        let first = use_case.execute(input(&["A", "B"])).await.unwrap();
        let second = use_case.execute(input(&["A", "B"])).await.unwrap();
        assert_eq!(first.result.combined_text, second.result.combined_text);
    }
}
