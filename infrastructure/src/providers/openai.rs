//! OpenAI-compatible chat-completions adapter.
//!
//! Serves both the `openai` kind and OpenAI-compatible aggregators such as
//! OpenRouter — the wire format is identical, only the base URL and key
//! differ. Streaming responses arrive as SSE `data:` lines terminated by a
//! `[DONE]` sentinel.

use crate::providers::ProviderAdapter;
use async_trait::async_trait;
use chorus_application::ports::llm_gateway::{GatewayError, StreamHandle};
use chorus_domain::{InvocationRequest, ModelDescriptor, ProviderId, TokenEvent};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Adapter for OpenAI-compatible chat-completions endpoints.
pub struct OpenAiAdapter {
    client: reqwest::Client,
    kind: ProviderId,
    base_url: String,
    api_key: String,
}

impl OpenAiAdapter {
    pub fn new(
        client: reqwest::Client,
        kind: ProviderId,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            kind,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn openai(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self::new(client, ProviderId::OpenAi, OPENAI_BASE_URL, api_key)
    }

    pub fn openrouter(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self::new(client, ProviderId::OpenRouter, OPENROUTER_BASE_URL, api_key)
    }

    fn body(&self, model: &ModelDescriptor, request: &InvocationRequest, stream: bool) -> ChatRequest {
        let mut messages = Vec::with_capacity(request.messages().len() + 1);
        if !request.system_prompt().is_empty() {
            messages.push(WireMessage {
                role: "system".to_string(),
                content: request.system_prompt().to_string(),
            });
        }
        for message in request.messages() {
            messages.push(WireMessage {
                role: message.role.as_str().to_string(),
                content: message.content.clone(),
            });
        }
        ChatRequest {
            model: model.model_id.clone(),
            messages,
            stream,
        }
    }

    async fn send(
        &self,
        model: &ModelDescriptor,
        request: &InvocationRequest,
        stream: bool,
    ) -> Result<reqwest::Response, GatewayError> {
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.body(model, request, stream))
            .send()
            .await
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::RequestFailed(format!(
                "{} returned {}: {}",
                self.kind, status, body
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn kind(&self) -> ProviderId {
        self.kind
    }

    async fn complete(
        &self,
        model: &ModelDescriptor,
        request: &InvocationRequest,
    ) -> Result<String, GatewayError> {
        let response = self.send(model, request, false).await?;
        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.map(|m| m.content))
            .ok_or_else(|| GatewayError::MalformedResponse("no choices in response".to_string()))
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
                        Some(SseLine::Done) => {
                            let _ = tx.send(TokenEvent::Completed(full)).await;
                            return;
                        }
                        Some(SseLine::Delta(delta)) => {
                            full.push_str(&delta);
                            if tx.send(TokenEvent::Delta(delta)).await.is_err() {
                                return;
                            }
                        }
                        None => {}
                    }
                }
            }
            // Stream ended without [DONE]; return what we have
            debug!("SSE stream ended without terminator");
            let _ = tx.send(TokenEvent::Completed(full)).await;
        });

        Ok(StreamHandle::new(rx))
    }
}

/// One meaningful SSE line from a chat-completions stream.
#[derive(Debug, PartialEq)]
enum SseLine {
    Delta(String),
    Done,
}

/// Parse one line of an OpenAI-compatible SSE body.
///
/// Pure function: comments, keep-alives, empty deltas, and unparseable
/// frames all map to `None`.
fn parse_sse_line(line: &str) -> Option<SseLine> {
    let payload = line.strip_prefix("data:")?.trim();
    if payload == "[DONE]" {
        return Some(SseLine::Done);
    }
    let chunk: StreamChunk = serde_json::from_str(payload).ok()?;
    let delta = chunk.choices.into_iter().next()?.delta?.content?;
    if delta.is_empty() {
        None
    } else {
        Some(SseLine::Delta(delta))
    }
}

// ==================== Wire types ====================

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<WireMessage>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Option<Delta>,
}

#[derive(Debug, Deserialize)]
struct Delta {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_delta_line() {
        let line = r#"data: {"choices":[{"delta":{"content":"Hel"}}]}"#;
        assert_eq!(parse_sse_line(line), Some(SseLine::Delta("Hel".into())));
    }

    #[test]
    fn parse_done_sentinel() {
        assert_eq!(parse_sse_line("data: [DONE]"), Some(SseLine::Done));
    }

    #[test]
    fn non_data_lines_are_ignored() {
        assert_eq!(parse_sse_line(": keep-alive"), None);
        assert_eq!(parse_sse_line(""), None);
        assert_eq!(parse_sse_line("event: ping"), None);
    }

    #[test]
    fn empty_and_role_only_deltas_are_ignored() {
        assert_eq!(
            parse_sse_line(r#"data: {"choices":[{"delta":{"content":""}}]}"#),
            None
        );
        assert_eq!(
            parse_sse_line(r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#),
            None
        );
    }

    #[test]
    fn complete_response_extracts_first_choice() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"hi"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].message.as_ref().unwrap().content, "hi");
    }

    #[test]
    fn body_prepends_system_prompt() {
        let adapter = OpenAiAdapter::openai(reqwest::Client::new(), "key");
        let model = ModelDescriptor::new("GPT-4o", ProviderId::OpenAi, "gpt-4o", "#10a37f");
        let request = InvocationRequest::from_user_message("be brief", "hello");

        let body = adapter.body(&model, &request, false);
        assert_eq!(body.model, "gpt-4o");
        assert_eq!(body.messages.len(), 2);
        assert_eq!(body.messages[0].role, "system");
        assert_eq!(body.messages[1].role, "user");
    }

    #[test]
    fn body_omits_empty_system_prompt() {
        let adapter = OpenAiAdapter::openai(reqwest::Client::new(), "key");
        let model = ModelDescriptor::new("GPT-4o", ProviderId::OpenAi, "gpt-4o", "#10a37f");
        let request = InvocationRequest::from_user_message("", "hello");

        let body = adapter.body(&model, &request, false);
        assert_eq!(body.messages.len(), 1);
    }
}
