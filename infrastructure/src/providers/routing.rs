//! Routing gateway — dispatches each invocation to the adapter whose kind
//! matches the model's provider id.

use crate::config::FileProvidersConfig;
use crate::providers::ProviderAdapter;
use crate::providers::anthropic::AnthropicAdapter;
use crate::providers::openai::OpenAiAdapter;
use async_trait::async_trait;
use chorus_application::ports::llm_gateway::{GatewayError, LlmGateway, StreamHandle};
use chorus_domain::{InvocationRequest, ModelDescriptor, ProviderId};
use std::sync::Arc;
use tracing::warn;

pub struct RoutingGateway {
    providers: Vec<Arc<dyn ProviderAdapter>>,
    default_kind: ProviderId,
}

impl RoutingGateway {
    pub fn new(providers: Vec<Arc<dyn ProviderAdapter>>, default_kind: ProviderId) -> Self {
        Self {
            providers,
            default_kind,
        }
    }

    /// Build adapters for every provider whose API key is present in the
    /// environment. All adapters share one HTTP client; it is safe for
    /// concurrent use across a fan-out.
    pub fn from_config(config: &FileProvidersConfig) -> Self {
        let client = reqwest::Client::new();
        let mut providers: Vec<Arc<dyn ProviderAdapter>> = Vec::new();

        if let Some(key) = read_key(&config.openai.api_key_env) {
            let adapter = match &config.openai.base_url {
                Some(base) => {
                    OpenAiAdapter::new(client.clone(), ProviderId::OpenAi, base.clone(), key)
                }
                None => OpenAiAdapter::openai(client.clone(), key),
            };
            providers.push(Arc::new(adapter));
        }
        if let Some(key) = read_key(&config.anthropic.api_key_env) {
            let adapter = match &config.anthropic.base_url {
                Some(base) => AnthropicAdapter::new(client.clone(), base.clone(), key),
                None => AnthropicAdapter::with_default_base(client.clone(), key),
            };
            providers.push(Arc::new(adapter));
        }
        if let Some(key) = read_key(&config.openrouter.api_key_env) {
            let adapter = match &config.openrouter.base_url {
                Some(base) => {
                    OpenAiAdapter::new(client.clone(), ProviderId::OpenRouter, base.clone(), key)
                }
                None => OpenAiAdapter::openrouter(client.clone(), key),
            };
            providers.push(Arc::new(adapter));
        }

        if providers.is_empty() {
            warn!("No provider API keys found in the environment; every invocation will fail");
        }

        Self::new(providers, config.default_kind())
    }

    /// Resolution priority:
    ///  1. adapter whose kind matches the model's provider id
    ///  2. adapter matching the configured default kind
    ///  3. first registered adapter
    ///  4. error when no adapter is registered at all
    fn resolve(&self, model: &ModelDescriptor) -> Result<&dyn ProviderAdapter, GatewayError> {
        if let Some(p) = self
            .providers
            .iter()
            .find(|p| p.kind() == model.provider_id)
        {
            return Ok(p.as_ref());
        }

        if let Some(p) = self
            .providers
            .iter()
            .find(|p| p.kind() == self.default_kind)
        {
            return Ok(p.as_ref());
        }

        self.providers
            .first()
            .map(|p| p.as_ref())
            .ok_or_else(|| GatewayError::ProviderNotConfigured(model.provider_id.to_string()))
    }
}

fn read_key(env_var: &str) -> Option<String> {
    std::env::var(env_var).ok().filter(|k| !k.is_empty())
}

#[async_trait]
impl LlmGateway for RoutingGateway {
    async fn complete(
        &self,
        model: &ModelDescriptor,
        request: &InvocationRequest,
    ) -> Result<String, GatewayError> {
        self.resolve(model)?.complete(model, request).await
    }

    async fn complete_streaming(
        &self,
        model: &ModelDescriptor,
        request: &InvocationRequest,
    ) -> Result<StreamHandle, GatewayError> {
        self.resolve(model)?.stream(model, request).await
    }
}
