use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// One line of the engine's JSONL trace: parse failures, data-source loads,
/// action executions, config fetches.
#[derive(Debug, Serialize)]
pub struct EngineEvent {
    pub timestamp_ms: u128,

    /// What the engine was doing: "parse", "data_load", "action", "fetch",
    /// "queue_flush".
    pub phase: String,

    pub page_code: Option<String>,
    pub source_id: Option<String>,
    pub detail: Option<String>,
    pub error: Option<String>,
}

impl EngineEvent {
    pub fn now(phase: &str) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0),
            phase: phase.to_string(),
            page_code: None,
            source_id: None,
            detail: None,
            error: None,
        }
    }

    pub fn with_page(mut self, page_code: &str) -> Self {
        self.page_code = Some(page_code.to_string());
        self
    }

    pub fn with_source(mut self, source_id: &str) -> Self {
        self.source_id = Some(source_id.to_string());
        self
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }

    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }
}
