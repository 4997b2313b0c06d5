//! Execution parameters — fan-out control.
//!
//! [`ExecutionParams`] groups the static parameters that bound a fan-out.
//! These are application-layer concerns, not domain policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Parameters bounding one orchestrated request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Deadline for each provider invocation. A call that has not settled
    /// by then is recorded as an ordinary provider failure.
    pub invocation_timeout: Duration,
    /// Capacity of the multiplexed event channel handed to streaming callers.
    pub channel_capacity: usize,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            invocation_timeout: Duration::from_secs(120),
            channel_capacity: 64,
        }
    }
}

impl ExecutionParams {
    pub fn with_invocation_timeout(mut self, timeout: Duration) -> Self {
        self.invocation_timeout = timeout;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }
}
