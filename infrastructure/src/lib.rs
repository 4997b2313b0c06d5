//! Infrastructure layer for chorus
//!
//! Adapters behind the application's ports: HTTP provider clients, the
//! routing gateway that dispatches on a model's provider id, the SSE wire
//! codec for the client-facing event stream, and the configuration loader.

pub mod config;
pub mod providers;
pub mod wire;

pub use config::{ConfigError, ConfigLoader, FileConfig};
pub use providers::routing::RoutingGateway;
pub use wire::{FrameDecoder, WireError, encode_frame};
