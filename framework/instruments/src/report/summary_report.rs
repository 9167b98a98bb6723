mod operations_table;

use tabled::settings::Style;
use tabled::Table;

use crate::report::format_elapsed;
use crate::report::summary_report::operations_table::OperationRow;
use crate::OperationRecord;

/// Keeps every query run in a session and renders them as a table when the session ends.
#[derive(Debug, Default)]
pub struct SummaryReportCollector {
    operation_records: Vec<OperationRecord>,
}

impl SummaryReportCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_operation(&mut self, operation_record: OperationRecord) {
        log::trace!("Recording operation {}", operation_record.operation_id);
        self.operation_records.push(operation_record);
    }

    pub fn is_empty(&self) -> bool {
        self.operation_records.is_empty()
    }

    /// Render the summary of operations, one row per query in the order they were run.
    pub fn finalize(&self) -> String {
        let rows = self
            .operation_records
            .iter()
            .map(|record| OperationRow {
                operation_id: record.operation_id.clone(),
                outcome: match record.failed_with {
                    None => "ok".to_string(),
                    Some(status) => format!("failed ({status})"),
                },
                item_count: record.result.item_count,
                total_cost: record.result.total_cost,
                elapsed: format_elapsed(record.result.elapsed),
            })
            .collect::<Vec<_>>();

        let mut table = Table::new(rows);
        table.with(Style::modern());

        format!("\nSummary of operations\n{table}\n")
    }
}
