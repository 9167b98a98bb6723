use crate::model::RunResult;

/// The endpoint rejected or failed a request, after any retries of its own.
///
/// The status is the endpoint's status code for the failed request and the message is the
/// endpoint's own description of the problem. Neither is interpreted by the runner.
#[derive(derive_more::Error, derive_more::Display, Debug, Clone, PartialEq, Eq)]
#[display("{status} error occurred: {message}")]
pub struct EndpointError {
    pub status: u16,
    pub message: String,
}

impl EndpointError {
    /// Status used when no response was received at all.
    pub const SERVICE_UNAVAILABLE: u16 = 503;

    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(Self::SERVICE_UNAVAILABLE, message)
    }
}

/// The endpoint connection could not be established at start-up.
///
/// There is nothing to recover to when this happens so the process should report it and exit.
#[derive(derive_more::Error, derive_more::Display, Debug)]
#[display("Unable to connect to the query endpoint: {reason}")]
pub struct FatalStartupError {
    reason: String,
}

impl FatalStartupError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Returned when a catalog lookup does not match any scenario.
#[derive(derive_more::Error, derive_more::Display, Debug, Clone, Copy, PartialEq, Eq)]
#[display("No scenario with id {id}")]
pub struct ScenarioNotFound {
    pub id: u32,
}

/// A query that failed part way through.
///
/// The endpoint error is the outcome of the query. The partial result holds what was consumed
/// before the failure so that it can be inspected when diagnosing the problem.
#[derive(derive_more::Error, derive_more::Display, Debug, Clone, PartialEq)]
#[display("{error}")]
pub struct QueryFailure {
    #[error(source)]
    pub error: EndpointError,
    pub partial: RunResult,
    pub pages_consumed: usize,
}
