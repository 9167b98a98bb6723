use clap::Args;
use geo_tunnel_core::prelude::PageOptions;

use crate::shell::ShellOptions;

/// Options shared by every scenario binary. Flatten this into the binary's own parser.
#[derive(Args, Debug, Clone)]
pub struct GeoTunnelCli {
    /// A connection string for the database account, in the form
    /// `AccountEndpoint=<url>;AccountKey=<key>;`
    #[clap(long, env = "COSMOS_CONNECTION_STRING", hide_env_values = true)]
    pub connection_string: String,

    /// The database that holds the container to query
    #[clap(long, env = "COSMOS_DATABASE")]
    pub database: String,

    /// The container to run the queries against
    #[clap(long, env = "COSMOS_CONTAINER")]
    pub container: String,

    /// The maximum number of items the endpoint should return in each page. Use -1 to let the
    /// endpoint decide.
    #[clap(
        long,
        env = "GEO_TUNNEL_MAX_ITEM_COUNT",
        default_value = "100",
        allow_negative_numbers = true,
        value_parser = parse_max_item_count
    )]
    pub max_item_count: i32,

    /// How many partitions the endpoint may query in parallel on behalf of a single query. Use -1
    /// to let the endpoint decide, or 0 to query partitions one at a time.
    #[clap(
        long,
        env = "GEO_TUNNEL_MAX_CONCURRENCY",
        default_value = "-1",
        allow_negative_numbers = true,
        value_parser = parse_max_concurrency
    )]
    pub max_concurrency: i32,

    /// Print every item returned by a query as it arrives.
    #[clap(long, default_value = "false")]
    pub print_items: bool,

    /// Do not print the summary table of all queries when exiting.
    #[clap(long, default_value = "false")]
    pub no_summary: bool,
}

impl GeoTunnelCli {
    pub fn page_options(&self) -> PageOptions {
        PageOptions {
            max_items_per_page: self.max_item_count,
            max_concurrency: self.max_concurrency,
        }
    }

    pub fn shell_options(&self) -> ShellOptions {
        ShellOptions {
            container_name: self.container.clone(),
            page_options: self.page_options(),
            print_items: self.print_items,
            show_summary: !self.no_summary,
        }
    }
}

fn parse_max_item_count(s: &str) -> anyhow::Result<i32> {
    let value = s.parse::<i32>()?;
    if value == 0 || value < -1 {
        anyhow::bail!("Max item count must be -1 or a positive number, got {value}");
    }

    Ok(value)
}

fn parse_max_concurrency(s: &str) -> anyhow::Result<i32> {
    let value = s.parse::<i32>()?;
    if value < -1 {
        anyhow::bail!("Max concurrency must be -1 or greater, got {value}");
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        runner: GeoTunnelCli,
    }

    const REQUIRED: [&str; 7] = [
        "test",
        "--connection-string",
        "AccountEndpoint=https://localhost:8081/;AccountKey=a2V5;",
        "--database",
        "geo",
        "--container",
        "places",
    ];

    #[test]
    fn defaults_match_page_option_defaults() {
        let cli = TestCli::try_parse_from(REQUIRED).unwrap();

        assert_eq!(PageOptions::default(), cli.runner.page_options());
        assert!(!cli.runner.print_items);
        assert!(cli.runner.shell_options().show_summary);
        assert_eq!("places", cli.runner.shell_options().container_name);
    }

    #[test]
    fn accepts_unbounded_page_size() {
        let args = REQUIRED
            .iter()
            .copied()
            .chain(["--max-item-count", "-1", "--max-concurrency", "0"]);
        let cli = TestCli::try_parse_from(args).unwrap();

        assert_eq!(
            PageOptions {
                max_items_per_page: -1,
                max_concurrency: 0,
            },
            cli.runner.page_options()
        );
    }

    #[test]
    fn rejects_zero_page_size() {
        let args = REQUIRED.iter().copied().chain(["--max-item-count", "0"]);

        assert!(TestCli::try_parse_from(args).is_err());
    }
}
