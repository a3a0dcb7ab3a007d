//! Per-request `QueryTrace` (§3), owned write-only by the orchestrator (Design Notes:
//! "Tracer is a write-only sink... holds no back-reference").
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::strategy::Strategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Running,
    Success,
    Error,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    pub status: StageStatus,
    pub input_data: Value,
    pub output_data: Value,
    pub processing_time_ms: u64,
    pub error_message: Option<String>,
    pub debug_info: Value,
}

impl Default for Stage {
    fn default() -> Self {
        Self {
            status: StageStatus::Pending,
            input_data: Value::Null,
            output_data: Value::Null,
            processing_time_ms: 0,
            error_message: None,
            debug_info: Value::Null,
        }
    }
}

impl Stage {
    pub fn start(&mut self, input: Value) {
        self.status = StageStatus::Running;
        self.input_data = input;
    }

    pub fn succeed(&mut self, output: Value, elapsed_ms: u64) {
        self.status = StageStatus::Success;
        self.output_data = output;
        self.processing_time_ms = elapsed_ms;
    }

    pub fn fail(&mut self, message: String, elapsed_ms: u64) {
        self.status = StageStatus::Error;
        self.error_message = Some(message);
        self.processing_time_ms = elapsed_ms;
    }

    pub fn skip(&mut self, reason: &str) {
        self.status = StageStatus::Skipped;
        self.debug_info = Value::String(reason.to_string());
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryTrace {
    pub request_id: String,
    pub original_query: String,
    pub start_ts: Option<DateTime<Utc>>,
    pub classification: Stage,
    pub extraction: Stage,
    pub routing: Stage,
    /// Exactly the strategies selected by the Router (§3 invariant); extra or missing
    /// entries are a bug, not a degraded result.
    pub searches: BTreeMap<Strategy, Stage>,
    pub fusion: Stage,
}

impl QueryTrace {
    pub fn new(request_id: String, original_query: String, start_ts: DateTime<Utc>) -> Self {
        Self {
            request_id,
            original_query,
            start_ts: Some(start_ts),
            ..Default::default()
        }
    }
}
