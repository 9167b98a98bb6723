use std::ops::ControlFlow;
use std::time::Instant;

use geo_tunnel_core::prelude::{
    Document, PageOptions, QueryCursor, QueryEndpoint, QueryFailure, QueryText, RunResult,
};

/// Drives a query against an endpoint until every page has been consumed.
///
/// Pages are fetched one at a time. The next page is not requested until the previous one has been
/// handled.
pub struct QueryRunner<'a, E: QueryEndpoint> {
    endpoint: &'a E,
}

impl<'a, E: QueryEndpoint> QueryRunner<'a, E> {
    pub fn new(endpoint: &'a E) -> Self {
        Self { endpoint }
    }

    /// Run `query` to completion and report how many items it returned and what it cost.
    pub fn execute(
        &self,
        query: &QueryText,
        options: &PageOptions,
    ) -> Result<RunResult, QueryFailure> {
        self.execute_with(query, options, |_| ControlFlow::Continue(()))
    }

    /// As [QueryRunner::execute], also passing every item to `on_item` as its page arrives.
    ///
    /// If a page fails, the error is returned along with the totals for the pages that were
    /// consumed before it.
    ///
    /// When `on_item` breaks, no further pages are fetched. The page it broke on still counts
    /// towards the totals.
    pub fn execute_with<F>(
        &self,
        query: &QueryText,
        options: &PageOptions,
        mut on_item: F,
    ) -> Result<RunResult, QueryFailure>
    where
        F: FnMut(&Document) -> ControlFlow<()>,
    {
        let mut cursor = self
            .endpoint
            .open_query(query, options)
            .map_err(|error| QueryFailure {
                error,
                partial: RunResult::default(),
                pages_consumed: 0,
            })?;

        let mut item_count = 0u64;
        let mut total_cost = 0.0f64;
        let mut pages_consumed = 0usize;

        let started = Instant::now();
        while cursor.has_more() {
            let page = match cursor.fetch_next() {
                Ok(page) => page,
                Err(error) => {
                    log::warn!("Query failed on page {}: {}", pages_consumed + 1, error);
                    return Err(QueryFailure {
                        error,
                        partial: RunResult::new(item_count, total_cost, started.elapsed()),
                        pages_consumed,
                    });
                }
            };

            pages_consumed += 1;
            total_cost += page.cost_units;
            item_count += page.items.len() as u64;
            let visited = page.items.iter().try_for_each(&mut on_item);

            log::debug!(
                "Page {} returned {} items costing {}, result count: {}",
                pages_consumed,
                page.items.len(),
                page.cost_units,
                item_count
            );

            if visited.is_break() {
                log::debug!("Item visitor stopped the query after page {pages_consumed}");
                break;
            }
        }
        let elapsed = started.elapsed();

        Ok(RunResult::new(item_count, total_cost, elapsed))
    }
}
