use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::endpoint::{QueryCursor, QueryEndpoint};
use crate::error::EndpointError;
use crate::model::{Page, PageOptions, QueryText};

/// A query that was opened against an [InMemoryEndpoint].
#[derive(Debug, Clone, PartialEq)]
pub struct OpenedQuery {
    pub query: QueryText,
    pub options: PageOptions,
}

/// An endpoint that serves a fixed set of pages from memory.
///
/// Every query opened against it sees the same pages, regardless of the query text. This is useful
/// while developing scenarios and in tests, where there is no database to talk to. Queries that were
/// opened are recorded and can be inspected with [InMemoryEndpoint::opened_queries].
#[derive(Debug, Clone, Default)]
pub struct InMemoryEndpoint {
    pages: Vec<Page>,
    fail_at: Option<(usize, EndpointError)>,
    fail_on_open: Option<EndpointError>,
    opened: Arc<Mutex<Vec<OpenedQuery>>>,
}

impl InMemoryEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page to the end of the result stream.
    pub fn with_page(mut self, page: Page) -> Self {
        self.pages.push(page);
        self
    }

    /// Add a page of `count` generated documents which costs `cost_units`.
    pub fn with_generated_page(self, count: usize, cost_units: f64) -> Self {
        let offset = self.pages.iter().map(|p| p.items.len()).sum::<usize>();
        let items = (offset..offset + count)
            .map(|n| serde_json::json!({ "id": n.to_string() }))
            .collect();

        self.with_page(Page::new(items, cost_units))
    }

    /// Make the fetch of page `index` (zero based) fail with `error` instead of returning a page.
    ///
    /// Pages before `index` are served as normal. Nothing is served after the failure.
    pub fn with_failure_at(mut self, index: usize, error: EndpointError) -> Self {
        self.fail_at = Some((index, error));
        self
    }

    /// Make opening any query fail with `error`.
    pub fn with_open_failure(mut self, error: EndpointError) -> Self {
        self.fail_on_open = Some(error);
        self
    }

    /// The queries opened so far, in the order they were opened.
    pub fn opened_queries(&self) -> Vec<OpenedQuery> {
        self.opened.lock().clone()
    }
}

impl QueryEndpoint for InMemoryEndpoint {
    type Cursor = InMemoryCursor;

    fn open_query(
        &self,
        query: &QueryText,
        options: &PageOptions,
    ) -> Result<Self::Cursor, EndpointError> {
        self.opened.lock().push(OpenedQuery {
            query: query.clone(),
            options: *options,
        });

        if let Some(err) = &self.fail_on_open {
            return Err(err.clone());
        }

        let mut remaining = self
            .pages
            .iter()
            .cloned()
            .map(Ok)
            .collect::<VecDeque<_>>();

        if let Some((index, err)) = &self.fail_at {
            remaining.truncate(*index);
            remaining.push_back(Err(err.clone()));
        }

        log::trace!("Opened in-memory cursor with {} pages", remaining.len());

        Ok(InMemoryCursor { remaining })
    }
}

#[derive(Debug)]
pub struct InMemoryCursor {
    remaining: VecDeque<Result<Page, EndpointError>>,
}

impl QueryCursor for InMemoryCursor {
    fn has_more(&self) -> bool {
        !self.remaining.is_empty()
    }

    fn fetch_next(&mut self) -> Result<Page, EndpointError> {
        self.remaining.pop_front().unwrap_or_else(|| {
            Err(EndpointError::new(
                400,
                "No more pages are available for this query",
            ))
        })
    }
}
