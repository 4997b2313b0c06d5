//! LLM Gateway port
//!
//! Defines the interface for communicating with LLM providers.

use async_trait::async_trait;
use chorus_domain::{InvocationRequest, ModelDescriptor, TokenEvent};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("No provider configured for: {0}")]
    ProviderNotConfigured(String),
}

/// Gateway for LLM communication
///
/// This port defines how the application layer reaches LLM providers.
/// Implementations (adapters) live in the infrastructure layer and must be
/// safe for concurrent use: one fan-out issues many calls through the same
/// gateway at once.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Send a request to one model and wait for the complete response text.
    async fn complete(
        &self,
        model: &ModelDescriptor,
        request: &InvocationRequest,
    ) -> Result<String, GatewayError>;

    /// Send a request to one model and stream the response.
    ///
    /// Default implementation calls `complete()` and wraps the result in a
    /// single `Completed` event, so non-streaming adapters work unchanged.
    async fn complete_streaming(
        &self,
        model: &ModelDescriptor,
        request: &InvocationRequest,
    ) -> Result<StreamHandle, GatewayError> {
        let result = self.complete(model, request).await?;
        let (tx, rx) = mpsc::channel(1);
        // If the receiver is already gone, that's fine
        let _ = tx.send(TokenEvent::Completed(result)).await;
        Ok(StreamHandle::new(rx))
    }
}

/// Handle for receiving streaming events from one model invocation.
///
/// Wraps an `mpsc::Receiver<TokenEvent>` and provides convenience methods
/// for consuming the stream.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<TokenEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<TokenEvent>) -> Self {
        Self { receiver }
    }

    /// Consume the stream and collect all text into a single string.
    pub async fn collect_text(mut self) -> Result<String, GatewayError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                TokenEvent::Delta(chunk) => full_text.push_str(&chunk),
                TokenEvent::Completed(text) => {
                    if full_text.is_empty() {
                        return Ok(text);
                    }
                    return Ok(full_text);
                }
                TokenEvent::Error(e) => {
                    return Err(GatewayError::RequestFailed(e));
                }
            }
        }
        // Channel closed without Completed — return what we have
        Ok(full_text)
    }
}
