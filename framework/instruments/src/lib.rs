mod report;

use geo_tunnel_core::prelude::{QueryFailure, RunResult};

pub use report::{format_elapsed, render, SummaryReportCollector};

/// The outcome of one query run, as kept for the end of session summary.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRecord {
    pub(crate) operation_id: String,
    pub(crate) result: RunResult,
    /// The endpoint status code when the query failed.
    pub(crate) failed_with: Option<u16>,
}

impl OperationRecord {
    pub fn succeeded(operation_id: impl Into<String>, result: RunResult) -> Self {
        Self {
            operation_id: operation_id.into(),
            result,
            failed_with: None,
        }
    }

    /// Record a failed query. The partial progress is what gets reported.
    pub fn failed(operation_id: impl Into<String>, failure: &QueryFailure) -> Self {
        Self {
            operation_id: operation_id.into(),
            result: failure.partial,
            failed_with: Some(failure.error.status),
        }
    }
}
