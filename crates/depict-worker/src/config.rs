use anyhow::{Context, Result};
use depict::GraphConfig;
use serde::{Deserialize, Serialize};

/// Configuration parameters for a worker-hosted graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkerConfig {
    /// Period of the frame loop. Default: 16 ms.
    pub frame_interval_ms: u64,
    /// Minimum distance between two forwarded pointer moves. Default: 16 ms.
    pub move_throttle_ms: u64,
    /// Capacity of the host to worker channel. Default: 64.
    pub channel_capacity: usize,
    /// Configuration of the graph living on the worker.
    pub graph: GraphConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            move_throttle_ms: 16,
            channel_capacity: 64,
            graph: GraphConfig::default(),
        }
    }
}

impl WorkerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid worker config")
    }
}
