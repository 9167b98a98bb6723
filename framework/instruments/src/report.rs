mod summary_report;

use std::time::Duration;

use geo_tunnel_core::prelude::RunResult;

pub use summary_report::SummaryReportCollector;

/// Format a duration as `HH:MM:SS.mmm`.
///
/// Hours are not wrapped, so a run longer than a day shows as `24:00:00.000` and upwards.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        total_secs / 3600,
        (total_secs % 3600) / 60,
        total_secs % 60,
        elapsed.subsec_millis()
    )
}

/// Render the summary of a single query run.
///
/// The output is three lines: elapsed time, item count and total cost. The cost is printed with
/// full precision.
pub fn render(result: &RunResult) -> String {
    format!(
        "\tTotal time: {}\n\tQuery returned {} results\n\tTotal request units consumed: {}\n",
        format_elapsed(result.elapsed),
        result.item_count,
        result.total_cost
    )
}
