//! Anthropic messages adapter.
//!
//! The messages API takes the system prompt as a top-level field and
//! streams typed SSE events: `content_block_delta` carries text fragments,
//! `message_stop` ends the stream, `error` aborts it.

use crate::providers::ProviderAdapter;
use async_trait::async_trait;
use chorus_application::ports::llm_gateway::{GatewayError, StreamHandle};
use chorus_domain::{InvocationRequest, ModelDescriptor, ProviderId, TokenEvent};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

const API_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Adapter for the Anthropic messages API.
pub struct AnthropicAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AnthropicAdapter {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn with_default_base(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self::new(client, ANTHROPIC_BASE_URL, api_key)
    }

    fn body(
        &self,
        model: &ModelDescriptor,
        request: &InvocationRequest,
        stream: bool,
    ) -> MessagesRequest {
        MessagesRequest {
            model: model.model_id.clone(),
            max_tokens: DEFAULT_MAX_TOKENS,
            system: if request.system_prompt().is_empty() {
                None
            } else {
                Some(request.system_prompt().to_string())
            },
            messages: request
                .messages()
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str().to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            stream,
        }
    }

    async fn send(
        &self,
        model: &ModelDescriptor,
        request: &InvocationRequest,
        stream: bool,
    ) -> Result<reqwest::Response, GatewayError> {
        let url = format!("{}/v1/messages", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&self.body(model, request, stream))
            .send()
            .await
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::RequestFailed(format!(
                "anthropic returned {}: {}",
                status, body
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn kind(&self) -> ProviderId {
        ProviderId::Anthropic
    }

    async fn complete(
        &self,
        model: &ModelDescriptor,
        request: &InvocationRequest,
    ) -> Result<String, GatewayError> {
        let response = self.send(model, request, false).await?;
        let message: MessagesResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        let text: String = message
            .content
            .iter()
            .filter_map(|block| block.text.as_deref())
            .collect();
        if text.is_empty() {
            return Err(GatewayError::MalformedResponse(
                "no text content in response".to_string(),
            ));
        }
        Ok(text)
    }

    async fn stream(
        &self,
        model: &ModelDescriptor,
        request: &InvocationRequest,
    ) -> Result<StreamHandle, GatewayError> {
        let response = self.send(model, request, true).await?;

        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(async move {
            let mut bytes = response.bytes_stream();
            let mut buffer = String::new();
            let mut full = String::new();

            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        let _ = tx.send(TokenEvent::Error(e.to_string())).await;
                        return;
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(pos) = buffer.find('\n') {
                    let line = buffer[..pos].to_string();
                    buffer.drain(..=pos);

                    match parse_sse_line(&line) {
                        Some(SseLine::Delta(delta)) => {
                            full.push_str(&delta);
                            if tx.send(TokenEvent::Delta(delta)).await.is_err() {
                                return;
                            }
                        }
                        Some(SseLine::Stop) => {
                            let _ = tx.send(TokenEvent::Completed(full)).await;
                            return;
                        }
                        Some(SseLine::Failed(reason)) => {
                            let _ = tx.send(TokenEvent::Error(reason)).await;
                            return;
                        }
                        None => {}
                    }
                }
            }
            debug!("SSE stream ended without message_stop");
            let _ = tx.send(TokenEvent::Completed(full)).await;
        });

        Ok(StreamHandle::new(rx))
    }
}

/// One meaningful SSE line from a messages stream.
#[derive(Debug, PartialEq)]
enum SseLine {
    Delta(String),
    Stop,
    Failed(String),
}

/// Parse one line of an Anthropic SSE body.
///
/// `event:` lines are redundant with the `type` field inside each data
/// payload, so only `data:` lines are inspected.
fn parse_sse_line(line: &str) -> Option<SseLine> {
    let payload = line.strip_prefix("data:")?.trim();
    let event: StreamEvent = serde_json::from_str(payload).ok()?;

    match event.kind.as_str() {
        "content_block_delta" => {
            let text = event.delta.and_then(|d| d.text)?;
            if text.is_empty() {
                None
            } else {
                Some(SseLine::Delta(text))
            }
        }
        "message_stop" => Some(SseLine::Stop),
        "error" => Some(SseLine::Failed(
            event
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| "provider error".to_string()),
        )),
        _ => None,
    }
}

// ==================== Wire types ====================

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<WireMessage>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    delta: Option<EventDelta>,
    #[serde(default)]
    error: Option<EventError>,
}

#[derive(Debug, Deserialize)]
struct EventDelta {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_content_block_delta() {
        let line = r#"data: {"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hel"}}"#;
        assert_eq!(parse_sse_line(line), Some(SseLine::Delta("Hel".into())));
    }

    #[test]
    fn parse_message_stop() {
        let line = r#"data: {"type":"message_stop"}"#;
        assert_eq!(parse_sse_line(line), Some(SseLine::Stop));
    }

    #[test]
    fn parse_error_event() {
        let line = r#"data: {"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        assert_eq!(
            parse_sse_line(line),
            Some(SseLine::Failed("Overloaded".into()))
        );
    }

    #[test]
    fn event_and_ping_lines_are_ignored() {
        assert_eq!(parse_sse_line("event: content_block_delta"), None);
        assert_eq!(parse_sse_line(r#"data: {"type":"ping"}"#), None);
        assert_eq!(parse_sse_line(""), None);
    }

    #[test]
    fn complete_response_concatenates_text_blocks() {
        let json = r#"{"content":[{"type":"text","text":"Hello "},{"type":"text","text":"world"}]}"#;
        let parsed: MessagesResponse = serde_json::from_str(json).unwrap();
        let text: String = parsed
            .content
            .iter()
            .filter_map(|b| b.text.as_deref())
            .collect();
        assert_eq!(text, "Hello world");
    }

    #[test]
    fn body_moves_system_prompt_to_top_level() {
        let adapter = AnthropicAdapter::with_default_base(reqwest::Client::new(), "key");
        let model = ModelDescriptor::new(
            "Claude",
            ProviderId::Anthropic,
            "claude-sonnet-4-5",
            "#d97757",
        );
        let request = InvocationRequest::from_user_message("be brief", "hello");

        let body = adapter.body(&model, &request, true);
        assert_eq!(body.system.as_deref(), Some("be brief"));
        assert_eq!(body.messages.len(), 1);
        assert!(body.stream);
    }
}
