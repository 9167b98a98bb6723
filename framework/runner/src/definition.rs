use geo_tunnel_core::prelude::{QueryText, ScenarioNotFound};

pub type QueryBuilder = fn() -> QueryText;

/// A named query that can be selected from the menu.
#[derive(Debug, Clone)]
pub struct Scenario {
    id: u32,
    label: String,
    description: String,
    build: QueryBuilder,
}

impl Scenario {
    /// The number used to select this scenario.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Produce the query text for this scenario. The same text is produced on every call.
    pub fn build(&self) -> QueryText {
        (self.build)()
    }
}

/// The builder for a scenario catalog.
///
/// Scenarios are numbered from 1 in the order that they are added, which is also the order they
/// are listed in the menu.
#[derive(Debug, Default)]
pub struct ScenarioCatalogBuilder {
    scenarios: Vec<Scenario>,
}

impl ScenarioCatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scenario to the end of the catalog.
    ///
    /// The `label` is a short name, used in the summary at the end of a session. The `description`
    /// is shown in the menu.
    pub fn with_scenario(mut self, label: &str, description: &str, build: QueryBuilder) -> Self {
        let id = self.scenarios.len() as u32 + 1;
        self.scenarios.push(Scenario {
            id,
            label: label.to_string(),
            description: description.to_string(),
            build,
        });
        self
    }

    pub fn build(self) -> ScenarioCatalog {
        ScenarioCatalog {
            scenarios: self.scenarios,
        }
    }
}

/// An ordered, read-only set of scenarios.
#[derive(Debug, Clone)]
pub struct ScenarioCatalog {
    scenarios: Vec<Scenario>,
}

impl ScenarioCatalog {
    /// All scenarios, in display order.
    pub fn list(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn get(&self, id: u32) -> Result<&Scenario, ScenarioNotFound> {
        self.scenarios
            .iter()
            .find(|s| s.id == id)
            .ok_or(ScenarioNotFound { id })
    }
}
