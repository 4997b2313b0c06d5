//! Application layer for chorus
//!
//! Ports (interfaces the infrastructure implements) and use cases (the
//! orchestration flows). This crate owns the concurrency design: the
//! fan-out/join over provider invocations, the synthesis step, and the
//! multiplexed streaming variant.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::llm_gateway::{GatewayError, LlmGateway, StreamHandle};
pub use use_cases::fan_out::{FanOutCoordinator, FanOutError};
pub use use_cases::invoke::ProviderInvoker;
pub use use_cases::orchestrate::{ChorusInput, ChorusReport, RunChorusUseCase};
pub use use_cases::stream::StreamChorusUseCase;
pub use use_cases::synthesize::Synthesizer;
