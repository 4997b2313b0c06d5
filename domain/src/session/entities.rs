//! Session domain entities

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A message in a conversation (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One user turn, shared verbatim across every model in a fan-out (Value Object)
///
/// Constructed once per turn by the transport layer. The message list is
/// guaranteed non-empty; the system prompt may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationRequest {
    system_prompt: String,
    messages: Vec<Message>,
}

impl InvocationRequest {
    pub fn new(
        system_prompt: impl Into<String>,
        messages: Vec<Message>,
    ) -> Result<Self, DomainError> {
        if messages.is_empty() {
            return Err(DomainError::EmptyRequest);
        }
        Ok(Self {
            system_prompt: system_prompt.into(),
            messages,
        })
    }

    /// Convenience for the common single-message turn.
    pub fn from_user_message(
        system_prompt: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            messages: vec![Message::user(content)],
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}
