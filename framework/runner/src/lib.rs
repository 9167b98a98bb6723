mod cli;
mod definition;
mod executor;
mod init;
mod query;
mod shell;
mod types;

pub mod prelude {
    pub use crate::cli::GeoTunnelCli;
    pub use crate::definition::{Scenario, ScenarioCatalog, ScenarioCatalogBuilder};
    pub use crate::executor::Executor;
    pub use crate::init::init;
    pub use crate::query::QueryRunner;
    pub use crate::shell::{InteractiveShell, ShellOptions, ShellState};
    pub use crate::types::GeoTunnelResult;

    /// Re-export of the core prelude so that scenarios can depend on the runner alone.
    pub use geo_tunnel_core::prelude::*;
}
