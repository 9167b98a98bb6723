use clap::Parser;

/// Initialise logging and parse the command line for a scenario binary.
///
/// The binary supplies its own parser so that it can add options next to the flattened
/// [crate::cli::GeoTunnelCli].
pub fn init<C: Parser>() -> C {
    env_logger::init();

    C::parse()
}
