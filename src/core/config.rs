//! Pipeline configuration.
//!
//! Queue depths are bounded so backpressure is explicit: when a consumer
//! falls behind, the pipeline waits on publication instead of buffering.

use serde::{Deserialize, Serialize};

/// Pipeline configuration parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Card batches that may wait before `submit` blocks.
    pub inbound_capacity: usize,

    /// Published updates that may wait before the pipeline blocks.
    pub outbound_capacity: usize,

    /// Published rejections that may wait before the pipeline blocks.
    pub error_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            inbound_capacity: 16,
            outbound_capacity: 16,
            error_capacity: 16,
        }
    }
}

impl PipelineConfig {
    /// Set the inbound queue depth.
    #[must_use]
    pub fn with_inbound_capacity(mut self, capacity: usize) -> Self {
        self.inbound_capacity = capacity;
        self
    }

    /// Set the update queue depth.
    #[must_use]
    pub fn with_outbound_capacity(mut self, capacity: usize) -> Self {
        self.outbound_capacity = capacity;
        self
    }

    /// Set the rejection queue depth.
    #[must_use]
    pub fn with_error_capacity(mut self, capacity: usize) -> Self {
        self.error_capacity = capacity;
        self
    }

    /// Parse a configuration from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Tokio channels reject a zero capacity.
    pub(crate) fn clamped(&self) -> (usize, usize, usize) {
        (
            self.inbound_capacity.max(1),
            self.outbound_capacity.max(1),
            self.error_capacity.max(1),
        )
    }
}
