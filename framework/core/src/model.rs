use std::fmt::{Display, Formatter};
use std::time::Duration;

/// A single record returned by a query. The runner never looks inside these, it only counts them.
pub type Document = serde_json::Value;

/// Query text in the endpoint's own query language.
///
/// This is opaque to the runner. Scenarios produce it and endpoints consume it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryText(String);

impl QueryText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for QueryText {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for QueryText {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for QueryText {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Paging hints passed to the endpoint when a query is opened.
///
/// A value of `-1` means "let the endpoint decide".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOptions {
    pub max_items_per_page: i32,
    pub max_concurrency: i32,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            max_items_per_page: 100,
            max_concurrency: -1,
        }
    }
}

/// One page of results as reported by the endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Document>,
    /// The cost the endpoint charged for producing this page.
    pub cost_units: f64,
}

impl Page {
    pub fn new(items: Vec<Document>, cost_units: f64) -> Self {
        Self { items, cost_units }
    }
}

/// The aggregate outcome of running a query to completion.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunResult {
    pub item_count: u64,
    pub total_cost: f64,
    pub elapsed: Duration,
}

impl RunResult {
    pub fn new(item_count: u64, total_cost: f64, elapsed: Duration) -> Self {
        Self {
            item_count,
            total_cost,
            elapsed,
        }
    }
}
