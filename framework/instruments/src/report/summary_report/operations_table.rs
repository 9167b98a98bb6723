use tabled::Tabled;

#[derive(Tabled)]
pub struct OperationRow {
    #[tabled(rename = "Scenario")]
    pub operation_id: String,
    #[tabled(rename = "Outcome")]
    pub outcome: String,
    #[tabled(rename = "Results")]
    pub item_count: u64,
    #[tabled(rename = "Request units", display = "float2")]
    pub total_cost: f64,
    #[tabled(rename = "Elapsed")]
    pub elapsed: String,
}

fn float2(n: &f64) -> String {
    format!("{:.2}", n)
}
