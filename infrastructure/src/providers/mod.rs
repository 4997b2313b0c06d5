//! Provider adapters.
//!
//! Each adapter wraps one provider's HTTP API behind [`ProviderAdapter`];
//! the [`RoutingGateway`](routing::RoutingGateway) dispatches a model to
//! the adapter whose kind matches its `provider_id`.

pub mod anthropic;
pub mod openai;
pub mod routing;

use async_trait::async_trait;
use chorus_application::ports::llm_gateway::{GatewayError, StreamHandle};
use chorus_domain::{InvocationRequest, ModelDescriptor, ProviderId};

#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn kind(&self) -> ProviderId;

    async fn complete(
        &self,
        model: &ModelDescriptor,
        request: &InvocationRequest,
    ) -> Result<String, GatewayError>;

    async fn stream(
        &self,
        model: &ModelDescriptor,
        request: &InvocationRequest,
    ) -> Result<StreamHandle, GatewayError>;
}
