use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// One line of the session trace: a single extractor invocation and how it
/// went.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,

    /// Operation name ("list", "extract", "click-absolute", ...).
    pub operation: String,

    pub args: Vec<String>,

    pub exit_status: Option<i32>,

    pub outcome: Option<String>,
    pub detail: Option<String>,

    pub duration_ms: Option<u64>,
}

impl TraceEvent {
    pub fn now(operation: &str) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_millis(),
            operation: operation.to_string(),
            args: vec![],
            exit_status: None,
            outcome: None,
            detail: None,
            duration_ms: None,
        }
    }

    pub fn with_args(mut self, args: &[String]) -> Self {
        self.args = args.to_vec();
        self
    }

    pub fn with_status(mut self, status: Option<i32>) -> Self {
        self.exit_status = status;
        self
    }

    pub fn with_outcome(mut self, outcome: impl ToString) -> Self {
        self.outcome = Some(outcome.to_string());
        self
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}
