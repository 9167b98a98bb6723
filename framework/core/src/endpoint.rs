use crate::error::EndpointError;
use crate::model::{Page, PageOptions, QueryText};

/// A remote service that can run queries and hand back their results a page at a time.
///
/// Anything that happens behind this interface (connection pooling, retries after rate limiting,
/// consistency settings) belongs to the implementation and is configured when it is constructed.
pub trait QueryEndpoint {
    type Cursor: QueryCursor;

    /// Open a cursor over the results of `query`. Opening is not expected to fetch anything.
    fn open_query(
        &self,
        query: &QueryText,
        options: &PageOptions,
    ) -> Result<Self::Cursor, EndpointError>;
}

/// A resumable handle over the pages of a single query.
pub trait QueryCursor {
    /// Whether the endpoint may have another page for this query.
    fn has_more(&self) -> bool;

    /// Fetch the next page. Only valid while [QueryCursor::has_more] returns true.
    fn fetch_next(&mut self) -> Result<Page, EndpointError>;
}
