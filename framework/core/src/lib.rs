mod endpoint;
mod error;
mod in_memory;
mod model;

pub mod prelude {
    pub use crate::endpoint::{QueryCursor, QueryEndpoint};
    pub use crate::error::{EndpointError, FatalStartupError, QueryFailure, ScenarioNotFound};
    pub use crate::in_memory::{InMemoryCursor, InMemoryEndpoint, OpenedQuery};
    pub use crate::model::{Document, Page, PageOptions, QueryText, RunResult};
}
