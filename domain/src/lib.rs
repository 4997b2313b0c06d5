//! Domain layer for chorus
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Fan-out
//!
//! One user request is issued concurrently to every selected model. Each
//! invocation settles independently; a failed provider never aborts the
//! batch.
//!
//! ## Synthesis
//!
//! When more than one model answers, a designated synthesis model merges
//! the surviving answers into a single response. With a single survivor the
//! raw answer is returned verbatim and no extra call is made.

pub mod core;
pub mod orchestration;
pub mod prompt;
pub mod session;

// Re-export commonly used types
pub use self::core::{
    descriptor::ModelDescriptor,
    error::DomainError,
    provider::ProviderId,
    registry::ModelRegistry,
};
pub use orchestration::{
    events::{StreamEvent, estimate_tokens},
    outcome::InvocationOutcome,
    result::{FailedModel, ModelAttribution, OrchestrationResult, SynthesisOutcome},
};
pub use prompt::SynthesisPrompt;
pub use session::{
    entities::{InvocationRequest, Message, Role},
    stream::TokenEvent,
};
