//! Typed view of the Cucumber JSON report format.
//!
//! Only the fields needed for aggregation are modelled; everything else in
//! the report (names, keywords, line numbers, durations, embeddings) is
//! ignored. Missing or mistyped required fields fail deserialization.

use serde::Deserialize;

/// Status a step must report for its scenario to count as passed.
pub const PASSED: &str = "passed";

/// A feature file and its scenarios.
#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    pub uri: String,
    /// Scenarios, scenario outlines examples and backgrounds, as emitted by
    /// the Cucumber JSON formatter.
    #[serde(rename = "elements")]
    pub scenarios: Vec<Scenario>,
}

/// A single scenario.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub steps: Vec<Step>,
}

impl Scenario {
    /// A scenario fails as soon as one of its steps did not pass.
    pub fn is_failed(&self) -> bool {
        self.steps.iter().any(|step| !step.is_passed())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    pub result: StepResult,
}

impl Step {
    pub fn is_passed(&self) -> bool {
        self.result.status == PASSED
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StepResult {
    /// `passed`, `failed`, `skipped`, `pending`, `undefined`, ...
    pub status: String,
}

/// Parse a Cucumber JSON document.
pub fn parse_str(json: &str) -> Result<Vec<Feature>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Parse an already decoded Cucumber JSON document.
pub fn parse_value(value: &serde_json::Value) -> Result<Vec<Feature>, serde_json::Error> {
    Vec::<Feature>::deserialize(value)
}
