mod auth;
mod client;
mod connection;
mod endpoint;

pub mod prelude {
    pub use crate::client::CosmosContainerClient;
    pub use crate::connection::ConnectionString;
    pub use crate::endpoint::{CosmosCursor, CosmosEndpoint};
}
