use std::io::{BufRead, Write};
use std::ops::ControlFlow;

use anyhow::Context;
use geo_tunnel_core::prelude::{PageOptions, QueryEndpoint, QueryFailure, RunResult};
use geo_tunnel_instruments::{render, OperationRecord, SummaryReportCollector};

use crate::definition::{Scenario, ScenarioCatalog};
use crate::query::QueryRunner;
use crate::types::GeoTunnelResult;

const RULE: &str = "---------------------------------------------------------------------";

/// Inputs, besides end of input, that end the session.
const EXIT_INPUTS: [&str; 4] = ["q", "quit", "exit", "esc"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellState {
    AwaitingSelection,
    Terminated,
}

#[derive(Debug, Clone)]
pub struct ShellOptions {
    /// Shown alongside each query so the user can see what is being queried.
    pub container_name: String,
    pub page_options: PageOptions,
    /// Print each item returned by a query.
    pub print_items: bool,
    /// Print a table of every query run when the session ends.
    pub show_summary: bool,
}

/// A menu driven session over a [ScenarioCatalog].
///
/// Each selection runs one scenario to completion before the next selection is read.
pub struct InteractiveShell<E: QueryEndpoint, R: BufRead, W: Write> {
    catalog: ScenarioCatalog,
    endpoint: E,
    options: ShellOptions,
    input: R,
    output: W,
    state: ShellState,
    summary: SummaryReportCollector,
}

impl<E: QueryEndpoint, R: BufRead, W: Write> InteractiveShell<E, R, W> {
    pub fn new(
        catalog: ScenarioCatalog,
        endpoint: E,
        options: ShellOptions,
        input: R,
        output: W,
    ) -> Self {
        Self {
            catalog,
            endpoint,
            options,
            input,
            output,
            state: ShellState::AwaitingSelection,
            summary: SummaryReportCollector::new(),
        }
    }

    pub fn state(&self) -> ShellState {
        self.state
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    /// Keep prompting and running scenarios until the user exits or input runs out.
    pub fn run(&mut self) -> GeoTunnelResult<()> {
        while self.state == ShellState::AwaitingSelection {
            self.step()?;
        }

        if self.options.show_summary && !self.summary.is_empty() {
            write!(self.output, "{}", self.summary.finalize())?;
        }
        self.output.flush()?;

        Ok(())
    }

    /// Print the menu, read one selection and act on it.
    pub fn step(&mut self) -> GeoTunnelResult<ShellState> {
        if self.state == ShellState::Terminated {
            return Ok(self.state);
        }

        self.print_prompt()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read selection")?;

        self.state = if read == 0 {
            log::debug!("End of input, stopping");
            writeln!(self.output, "Exiting...")?;
            ShellState::Terminated
        } else {
            self.handle_input(line.trim())?
        };

        Ok(self.state)
    }

    fn handle_input(&mut self, input: &str) -> GeoTunnelResult<ShellState> {
        if EXIT_INPUTS.contains(&input.to_ascii_lowercase().as_str()) {
            writeln!(self.output, "Exiting...")?;
            return Ok(ShellState::Terminated);
        }

        let scenario = match input.parse::<u32>().ok().map(|id| self.catalog.get(id)) {
            Some(Ok(scenario)) => scenario.clone(),
            _ => {
                log::trace!("Ignoring unrecognised input {input:?}");
                writeln!(self.output, "Select choice")?;
                return Ok(ShellState::AwaitingSelection);
            }
        };

        match self.run_scenario(&scenario)? {
            Ok(result) => {
                writeln!(self.output, "{}", render(&result))?;
                self.summary
                    .add_operation(OperationRecord::succeeded(scenario.label(), result));
            }
            Err(failure) => {
                self.print_failure(&failure)?;
                self.summary
                    .add_operation(OperationRecord::failed(scenario.label(), &failure));
            }
        }

        Ok(ShellState::AwaitingSelection)
    }

    /// Run a scenario. The outer result is for problems writing output, the inner one is the
    /// outcome of the query itself.
    fn run_scenario(
        &mut self,
        scenario: &Scenario,
    ) -> GeoTunnelResult<Result<RunResult, QueryFailure>> {
        let query = scenario.build();
        let page_options = self.options.page_options;

        log::info!("Running scenario {} - {}", scenario.id(), scenario.label());
        writeln!(
            self.output,
            "Running query: \"{}\" against container {}\n",
            query, self.options.container_name
        )?;
        writeln!(
            self.output,
            "Using MaxConcurrency: {}",
            page_options.max_concurrency
        )?;
        writeln!(
            self.output,
            "Using MaxItemCountPerPage: {}\n",
            page_options.max_items_per_page
        )?;

        let runner = QueryRunner::new(&self.endpoint);
        let outcome = if self.options.print_items {
            let output = &mut self.output;
            let mut write_error = None;
            let outcome = runner.execute_with(&query, &page_options, |item| {
                let printed = serde_json::to_string_pretty(item)
                    .map_err(std::io::Error::from)
                    .and_then(|text| writeln!(output, "{text}"));
                match printed {
                    Ok(()) => ControlFlow::Continue(()),
                    Err(e) => {
                        log::warn!("Failed to print query item, not fetching any more pages: {e}");
                        write_error = Some(e);
                        ControlFlow::Break(())
                    }
                }
            });
            if let Some(e) = write_error {
                return Err(e).context("Failed to print query item");
            }
            outcome
        } else {
            runner.execute(&query, &page_options)
        };

        Ok(outcome)
    }

    fn print_failure(&mut self, failure: &QueryFailure) -> GeoTunnelResult<()> {
        writeln!(self.output, "{}", failure.error)?;
        if failure.pages_consumed > 0 {
            writeln!(
                self.output,
                "\t{} pages were consumed before the error, returning {} results and {} request units",
                failure.pages_consumed, failure.partial.item_count, failure.partial.total_cost
            )?;
        }
        writeln!(self.output)?;

        Ok(())
    }

    fn print_prompt(&mut self) -> GeoTunnelResult<()> {
        writeln!(self.output, "{RULE}\n")?;
        writeln!(self.output, "Press for demo scenario:\n")?;
        for scenario in self.catalog.list() {
            writeln!(
                self.output,
                "{id} - Scenario {id}: {description}",
                id = scenario.id(),
                description = scenario.description()
            )?;
        }
        writeln!(self.output, "{RULE}\n")?;
        writeln!(self.output, "Enter q to exit.\n")?;
        self.output.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use geo_tunnel_core::prelude::{EndpointError, InMemoryEndpoint};

    use super::*;
    use crate::definition::ScenarioCatalogBuilder;

    fn catalog() -> ScenarioCatalog {
        ScenarioCatalogBuilder::new()
            .with_scenario("Everything", "Select everything", || {
                "SELECT * FROM c".into()
            })
            .with_scenario("Nothing", "Select nothing", || {
                "SELECT * FROM c WHERE false".into()
            })
            .build()
    }

    fn options() -> ShellOptions {
        ShellOptions {
            container_name: "places".to_string(),
            page_options: PageOptions::default(),
            print_items: false,
            show_summary: true,
        }
    }

    fn shell(
        endpoint: InMemoryEndpoint,
        options: ShellOptions,
        input: &str,
    ) -> InteractiveShell<InMemoryEndpoint, Cursor<Vec<u8>>, Vec<u8>> {
        InteractiveShell::new(
            catalog(),
            endpoint,
            options,
            Cursor::new(input.as_bytes().to_vec()),
            Vec::new(),
        )
    }

    fn output_of<E: QueryEndpoint, R: BufRead>(shell: &InteractiveShell<E, R, Vec<u8>>) -> String {
        String::from_utf8(shell.output().clone()).unwrap()
    }

    #[test]
    fn runs_selected_scenario_then_exits() {
        let endpoint = InMemoryEndpoint::new()
            .with_generated_page(4, 2.5)
            .with_generated_page(1, 0.5);
        let mut shell = shell(endpoint, options(), "2\nq\n");

        shell.run().unwrap();

        assert_eq!(ShellState::Terminated, shell.state());
        let opened = shell.endpoint().opened_queries();
        assert_eq!(1, opened.len());
        assert_eq!("SELECT * FROM c WHERE false", opened[0].query.as_str());

        let output = output_of(&shell);
        assert!(output.contains("2 - Scenario 2: Select nothing"));
        assert!(output.contains("Running query: \"SELECT * FROM c WHERE false\" against container places"));
        assert!(output.contains("Query returned 5 results"));
        assert!(output.contains("Total request units consumed: 3"));
        assert!(output.contains("Summary of operations"));
        assert!(output.ends_with("\n"));
    }

    #[test]
    fn unrecognised_input_reprompts() {
        let mut shell = shell(InMemoryEndpoint::new(), options(), "7\nhello\n\n");

        assert_eq!(ShellState::AwaitingSelection, shell.step().unwrap());
        assert_eq!(ShellState::AwaitingSelection, shell.step().unwrap());
        assert_eq!(ShellState::AwaitingSelection, shell.step().unwrap());
        assert_eq!(ShellState::Terminated, shell.step().unwrap());

        assert!(shell.endpoint().opened_queries().is_empty());
        assert_eq!(3, output_of(&shell).matches("Select choice").count());
    }

    #[test]
    fn endpoint_error_returns_to_menu() {
        let endpoint = InMemoryEndpoint::new()
            .with_generated_page(3, 1.0)
            .with_generated_page(3, 1.0)
            .with_failure_at(1, EndpointError::new(429, "Request rate is large"));
        let mut shell = shell(endpoint, options(), "1\n1\nexit\n");

        shell.run().unwrap();

        let output = output_of(&shell);
        assert_eq!(2, output.matches("429 error occurred: Request rate is large").count());
        assert!(output.contains("1 pages were consumed before the error, returning 3 results"));
        assert!(output.contains("failed (429)"));
        assert_eq!(2, shell.endpoint().opened_queries().len());
    }

    #[test]
    fn prints_items_when_asked() {
        let mut options = options();
        options.print_items = true;
        options.show_summary = false;
        let mut shell = shell(
            InMemoryEndpoint::new().with_generated_page(2, 1.0),
            options,
            "1\n",
        );

        shell.run().unwrap();

        let output = output_of(&shell);
        assert!(output.contains("\"id\": \"0\""));
        assert!(output.contains("\"id\": \"1\""));
        assert!(!output.contains("Summary of operations"));
    }

    /// Accepts everything except writes that start a JSON object.
    #[derive(Default)]
    struct ItemRejectingWriter {
        written: Vec<u8>,
        item_writes: usize,
    }

    impl Write for ItemRejectingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if buf.starts_with(b"{") {
                self.item_writes += 1;
                return Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_item_write_stops_the_query() {
        let mut options = options();
        options.print_items = true;
        let endpoint = InMemoryEndpoint::new()
            .with_generated_page(2, 1.0)
            .with_generated_page(2, 1.0)
            .with_generated_page(2, 1.0);
        let mut shell = InteractiveShell::new(
            catalog(),
            endpoint,
            options,
            Cursor::new(b"1\n1\n".to_vec()),
            ItemRejectingWriter::default(),
        );

        let err = shell.run().unwrap_err();

        assert!(err.to_string().contains("Failed to print query item"));
        assert_eq!(1, shell.output().item_writes);
        assert_eq!(1, shell.endpoint().opened_queries().len());
    }

    #[test]
    fn no_summary_when_nothing_ran() {
        let mut shell = shell(InMemoryEndpoint::new(), options(), "ESC\n");

        shell.run().unwrap();

        let output = output_of(&shell);
        assert!(output.contains("Exiting..."));
        assert!(!output.contains("Summary of operations"));
    }
}
