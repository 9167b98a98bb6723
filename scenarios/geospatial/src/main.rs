use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use cosmos_query_client::prelude::CosmosEndpoint;
use geo_tunnel_runner::prelude::*;

/// Outline of a building footprint on Hawaii, as a closed ring.
const FOOTPRINT_RING: &str = "[[-155.814379,20.230111], [-155.814352,20.230218], [-155.814578,20.230268], [-155.814605,20.230161], [-155.814379,20.230111]]";

/// The first vertex of [FOOTPRINT_RING].
const REFERENCE_POINT: &str = "[-155.814379,20.230111]";

/// Search radius for the proximity scenario, in metres.
const PROXIMITY_METRES: u32 = 3000;

const VALIDATION_POINT: &str = "[118.99, 32.94667]";

/// The last vertex does not match the first, so the ring is not closed.
const UNCLOSED_RING: &str =
    "[[118.99, 32.94667], [32, -5], [32, -4.7], [31.8, -4.7], [117, 32.94667]]";

fn proximity_query() -> QueryText {
    format!(
        "SELECT * FROM c WHERE ST_DISTANCE(c.geometry, {{'type': 'Point', 'coordinates': {REFERENCE_POINT}}}) < {PROXIMITY_METRES}"
    )
    .into()
}

fn containment_query() -> QueryText {
    format!(
        "SELECT * FROM c WHERE ST_WITHIN(c.geometry, {{'type': 'Polygon', 'coordinates': [{FOOTPRINT_RING}]}})"
    )
    .into()
}

fn intersection_query() -> QueryText {
    format!(
        "SELECT * FROM c WHERE ST_INTERSECTS(c.geometry, {{'type': 'Polygon', 'coordinates': [{FOOTPRINT_RING}]}})"
    )
    .into()
}

fn validation_query() -> QueryText {
    format!("SELECT ST_ISVALID({{'type': 'Point', 'coordinates': {VALIDATION_POINT}}})").into()
}

fn validation_detailed_query() -> QueryText {
    format!(
        "SELECT ST_ISVALIDDETAILED({{'type': 'Polygon', 'coordinates': [{UNCLOSED_RING}]}})"
    )
    .into()
}

/// The scenarios offered in the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScenarioSet {
    /// Every scenario
    All,
    /// Proximity, containment and the two validation scenarios
    Original,
    /// Proximity, containment and intersection
    Revised,
}

fn catalog(set: ScenarioSet) -> ScenarioCatalog {
    let builder = ScenarioCatalogBuilder::new()
        .with_scenario(
            "Proximity",
            "Perform a proximity query against spatial data",
            proximity_query,
        )
        .with_scenario(
            "Containment",
            "Perform a query to check if a point lies within a Polygon",
            containment_query,
        );

    let builder = match set {
        ScenarioSet::All | ScenarioSet::Revised => builder.with_scenario(
            "Intersection",
            "Perform a query to check if spatial data intersects a Polygon",
            intersection_query,
        ),
        ScenarioSet::Original => builder,
    };

    match set {
        ScenarioSet::All | ScenarioSet::Original => builder
            .with_scenario(
                "Validation",
                "Perform a query to check if a spatial object is valid",
                validation_query,
            )
            .with_scenario(
                "Validation detailed",
                "Perform a query to validate a Polygon that is not closed",
                validation_detailed_query,
            )
            .build(),
        ScenarioSet::Revised => builder.build(),
    }
}

#[derive(Parser)]
#[command(about, long_about = None)]
struct Cli {
    #[command(flatten)]
    runner: GeoTunnelCli,

    /// Which set of scenarios to offer in the menu
    #[clap(long, env = "GEO_TUNNEL_SCENARIOS", value_enum, default_value_t = ScenarioSet::All)]
    scenarios: ScenarioSet,
}

fn main() -> GeoTunnelResult<()> {
    let cli = init::<Cli>();

    let executor = Arc::new(Executor::new()?);
    let endpoint = CosmosEndpoint::connect(
        &cli.runner.connection_string,
        &cli.runner.database,
        &cli.runner.container,
        executor,
    )?;

    let catalog = catalog(cli.scenarios);
    log::debug!("Offering {} scenarios", catalog.list().len());

    let mut shell = InteractiveShell::new(
        catalog,
        endpoint,
        cli.runner.shell_options(),
        std::io::stdin().lock(),
        std::io::stdout(),
    );
    shell.run().context("Interactive session failed")?;

    println!("End of demo.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use pretty_assertions::assert_eq;

    fn labels(set: ScenarioSet) -> Vec<String> {
        catalog(set)
            .list()
            .iter()
            .map(|s| format!("{} {}", s.id(), s.label()))
            .collect()
    }

    #[test]
    fn scenario_sets() {
        assert_eq!(
            vec![
                "1 Proximity",
                "2 Containment",
                "3 Intersection",
                "4 Validation",
                "5 Validation detailed"
            ],
            labels(ScenarioSet::All)
        );
        assert_eq!(
            vec![
                "1 Proximity",
                "2 Containment",
                "3 Validation",
                "4 Validation detailed"
            ],
            labels(ScenarioSet::Original)
        );
        assert_eq!(
            vec!["1 Proximity", "2 Containment", "3 Intersection"],
            labels(ScenarioSet::Revised)
        );
    }

    #[test]
    fn queries_are_deterministic() {
        let catalog = catalog(ScenarioSet::All);

        for scenario in catalog.list() {
            assert_eq!(scenario.build(), scenario.build(), "{}", scenario.label());
        }
    }

    #[test]
    fn catalog_order_is_stable() {
        let catalog = catalog(ScenarioSet::All);

        let first = catalog.list().iter().map(|s| s.id()).collect::<Vec<_>>();
        let second = catalog.list().iter().map(|s| s.id()).collect::<Vec<_>>();
        assert_eq!(first, second);
    }

    #[test]
    fn geometry_is_embedded_literally() {
        assert_eq!(
            "SELECT * FROM c WHERE ST_DISTANCE(c.geometry, {'type': 'Point', 'coordinates': [-155.814379,20.230111]}) < 3000",
            proximity_query().as_str()
        );
        assert_eq!(
            "SELECT ST_ISVALIDDETAILED({'type': 'Polygon', 'coordinates': [[[118.99, 32.94667], [32, -5], [32, -4.7], [31.8, -4.7], [117, 32.94667]]]})",
            validation_detailed_query().as_str()
        );
        assert!(containment_query().as_str().starts_with("SELECT * FROM c WHERE ST_WITHIN("));
        assert!(intersection_query().as_str().contains(FOOTPRINT_RING));
        assert!(validation_query().as_str().contains(VALIDATION_POINT));
    }

    #[test]
    fn selecting_proximity_reports_items_from_all_pages() {
        let endpoint = InMemoryEndpoint::new()
            .with_generated_page(5, 6.1)
            .with_generated_page(0, 0.0);
        let options = ShellOptions {
            container_name: "nasa".to_string(),
            page_options: PageOptions::default(),
            print_items: false,
            show_summary: false,
        };
        let mut shell = InteractiveShell::new(
            catalog(ScenarioSet::All),
            endpoint,
            options,
            Cursor::new(b"1\nq\n".to_vec()),
            Vec::new(),
        );

        shell.run().unwrap();

        assert_eq!(
            proximity_query(),
            shell.endpoint().opened_queries()[0].query
        );
        let output = String::from_utf8(shell.output().clone()).unwrap();
        assert!(output.contains("Query returned 5 results"));
        assert!(output.contains("Total request units consumed: 6.1"));
    }
}
