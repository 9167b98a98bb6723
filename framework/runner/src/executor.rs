use std::future::Future;

use anyhow::Context;

/// Owns the async runtime that endpoint bindings use to talk to remote services.
///
/// The runner itself is synchronous, so bindings hand their futures to [Executor::execute_in_place]
/// and block until they complete.
#[derive(Debug)]
pub struct Executor {
    runtime: tokio::runtime::Runtime,
}

impl Executor {
    pub fn new() -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;

        Ok(Self { runtime })
    }

    /// Run async code in place, blocking until it completes.
    ///
    /// There is no cancellation or timeout applied here. Any timeouts belong to the client that
    /// produced the future.
    pub fn execute_in_place<F: Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }
}
