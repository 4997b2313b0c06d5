//! Provider Invoker
//!
//! Wraps one outbound call to one model and converts every failure mode —
//! transport error, provider error, deadline expiry, empty payload — into a
//! failed [`InvocationOutcome`]. Nothing escapes this boundary: one bad
//! provider must not abort the batch. No retries; a failed invocation is
//! final for the current turn.

use crate::config::ExecutionParams;
use crate::ports::llm_gateway::LlmGateway;
use chorus_domain::{InvocationOutcome, InvocationRequest, ModelDescriptor};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Issues single provider invocations with a bounded deadline.
pub struct ProviderInvoker {
    gateway: Arc<dyn LlmGateway>,
    timeout: Duration,
}

impl ProviderInvoker {
    pub fn new(gateway: Arc<dyn LlmGateway>, params: &ExecutionParams) -> Self {
        Self {
            gateway,
            timeout: params.invocation_timeout,
        }
    }

    /// Invoke one model. Always settles; never returns an error.
    pub async fn invoke(
        &self,
        model: &ModelDescriptor,
        request: &InvocationRequest,
    ) -> InvocationOutcome {
        let started = Instant::now();
        let result = tokio::time::timeout(self.timeout, self.gateway.complete(model, request)).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(text)) if !text.trim().is_empty() => {
                debug!("Model {} responded in {}ms", model.name, duration_ms);
                InvocationOutcome::success(model.clone(), text, duration_ms)
            }
            Ok(Ok(_)) => {
                warn!("Model {} returned an empty response", model.name);
                InvocationOutcome::failure(model.clone(), duration_ms)
            }
            Ok(Err(e)) => {
                warn!("Model {} failed: {}", model.name, e);
                InvocationOutcome::failure(model.clone(), duration_ms)
            }
            Err(_) => {
                warn!(
                    "Model {} timed out after {:?}",
                    model.name, self.timeout
                );
                InvocationOutcome::failure(model.clone(), duration_ms)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::GatewayError;
    use async_trait::async_trait;
    use chorus_domain::ProviderId;

    struct FixedGateway {
        reply: Result<String, String>,
        delay: Duration,
    }

    #[async_trait]
    impl LlmGateway for FixedGateway {
        async fn complete(
            &self,
            _model: &ModelDescriptor,
            _request: &InvocationRequest,
        ) -> Result<String, GatewayError> {
            tokio::time::sleep(self.delay).await;
            self.reply
                .clone()
                .map_err(GatewayError::RequestFailed)
        }
    }

    fn model() -> ModelDescriptor {
        ModelDescriptor::new("GPT-4o", ProviderId::OpenAi, "gpt-4o", "#10a37f")
    }

    fn request() -> InvocationRequest {
        InvocationRequest::from_user_message("", "hello")
    }

    fn invoker(gateway: FixedGateway, timeout: Duration) -> ProviderInvoker {
        ProviderInvoker::new(
            Arc::new(gateway),
            &ExecutionParams::default().with_invocation_timeout(timeout),
        )
    }

    #[tokio::test]
    async fn success_carries_text_and_duration() {
        let invoker = invoker(
            FixedGateway {
                reply: Ok("answer".into()),
                delay: Duration::ZERO,
            },
            Duration::from_secs(5),
        );
        let outcome = invoker.invoke(&model(), &request()).await;
        assert!(outcome.succeeded);
        assert_eq!(outcome.text.as_deref(), Some("answer"));
    }

    #[tokio::test]
    async fn gateway_error_becomes_failed_outcome() {
        let invoker = invoker(
            FixedGateway {
                reply: Err("503".into()),
                delay: Duration::ZERO,
            },
            Duration::from_secs(5),
        );
        let outcome = invoker.invoke(&model(), &request()).await;
        assert!(!outcome.succeeded);
        assert!(outcome.text.is_none());
    }

    #[tokio::test]
    async fn empty_response_is_a_failure() {
        let invoker = invoker(
            FixedGateway {
                reply: Ok("   ".into()),
                delay: Duration::ZERO,
            },
            Duration::from_secs(5),
        );
        let outcome = invoker.invoke(&model(), &request()).await;
        assert!(!outcome.succeeded);
    }

    #[tokio::test]
    async fn deadline_expiry_is_an_ordinary_failure() {
        let invoker = invoker(
            FixedGateway {
                reply: Ok("late".into()),
                delay: Duration::from_millis(200),
            },
            Duration::from_millis(20),
        );
        let outcome = invoker.invoke(&model(), &request()).await;
        assert!(!outcome.succeeded);
    }
}
