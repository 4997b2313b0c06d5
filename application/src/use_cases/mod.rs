//! Use cases - the orchestration flows.
//!
//! `invoke` wraps a single provider call, `fan_out` runs many of them
//! concurrently, `synthesize` merges the survivors, `orchestrate` composes
//! the batch flow, and `stream` is the same coordination multiplexed onto a
//! live event channel.

pub mod fan_out;
pub mod invoke;
pub mod orchestrate;
pub mod stream;
pub mod synthesize;
