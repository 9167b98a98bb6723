/// Recommended error type for a scenario binary's `main` function and any start-up code that it
/// shares. Typed errors from the core convert into it, so `?` can be used throughout.
pub type GeoTunnelResult<T> = anyhow::Result<T>;
