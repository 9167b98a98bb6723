use std::sync::Arc;

use geo_tunnel_core::prelude::{
    EndpointError, FatalStartupError, Page, PageOptions, QueryCursor, QueryEndpoint, QueryText,
};
use geo_tunnel_runner::prelude::Executor;

use crate::client::CosmosContainerClient;
use crate::connection::ConnectionString;

/// A [QueryEndpoint] backed by a Cosmos DB container.
///
/// Each page is fetched by blocking on the async client with the shared [Executor].
#[derive(Debug, Clone)]
pub struct CosmosEndpoint {
    client: Arc<CosmosContainerClient>,
    executor: Arc<Executor>,
}

impl CosmosEndpoint {
    /// Connect to the container and check that it can be read.
    ///
    /// Any problem here means that no query would succeed, so it is reported as fatal.
    pub fn connect(
        connection_string: &str,
        database: &str,
        container: &str,
        executor: Arc<Executor>,
    ) -> Result<Self, FatalStartupError> {
        let connection = ConnectionString::parse(connection_string)?;
        log::info!(
            "Connecting to container {container} in database {database} at {}",
            connection.endpoint()
        );

        let client = CosmosContainerClient::new(connection, database, container)?;
        let endpoint = Self::from_client(client, executor)?;

        log::info!("Connected to container {container}");

        Ok(endpoint)
    }

    /// Wrap a client once its container has been read successfully.
    pub(crate) fn from_client(
        client: CosmosContainerClient,
        executor: Arc<Executor>,
    ) -> Result<Self, FatalStartupError> {
        executor
            .execute_in_place(client.read_container())
            .map_err(|e| {
                log::error!("Unable to read container: {e}");
                FatalStartupError::new(e.to_string())
            })?;

        Ok(Self {
            client: Arc::new(client),
            executor,
        })
    }
}

impl QueryEndpoint for CosmosEndpoint {
    type Cursor = CosmosCursor;

    fn open_query(
        &self,
        query: &QueryText,
        options: &PageOptions,
    ) -> Result<Self::Cursor, EndpointError> {
        Ok(CosmosCursor {
            client: self.client.clone(),
            executor: self.executor.clone(),
            query: query.clone(),
            options: *options,
            continuation: None,
            finished: false,
        })
    }
}

/// Walks the pages of one query by following continuation tokens.
#[derive(Debug)]
pub struct CosmosCursor {
    client: Arc<CosmosContainerClient>,
    executor: Arc<Executor>,
    query: QueryText,
    options: PageOptions,
    continuation: Option<String>,
    finished: bool,
}

impl QueryCursor for CosmosCursor {
    fn has_more(&self) -> bool {
        !self.finished
    }

    fn fetch_next(&mut self) -> Result<Page, EndpointError> {
        if self.finished {
            return Err(EndpointError::new(
                400,
                "No more pages are available for this query",
            ));
        }

        let (page, continuation) = self.executor.execute_in_place(self.client.query_page(
            &self.query,
            &self.options,
            self.continuation.as_deref(),
        ))?;

        self.finished = continuation.is_none();
        self.continuation = continuation;

        Ok(page)
    }
}
