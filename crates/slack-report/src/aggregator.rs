//! Aggregation of parsed Cucumber reports into pass statistics.

use crate::document::{self, Feature};
use crate::error::ReportError;
use crate::model::{CucumberResult, FeatureResult};

/// Options for aggregation.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregateOptions {
    /// Leave features whose scenarios all passed out of the listing. They
    /// still count toward the run totals.
    pub hide_fully_passing_features: bool,
}

/// Percentage of `total` items that did not fail, using truncating integer
/// division. `None` when there is nothing to measure.
pub fn pass_percentage(total: usize, failed: usize) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let passed = total.saturating_sub(failed);
    // passed <= total, so the quotient is at most 100.
    Some((passed * 100 / total) as u8)
}

/// Aggregate a parsed report.
///
/// Fails with [`ReportError::NoScenarios`] when the report holds no
/// scenarios, since the run's pass percentage is then undefined.
pub fn aggregate(
    features: &[Feature],
    options: &AggregateOptions,
) -> Result<CucumberResult, ReportError> {
    let mut feature_results = Vec::with_capacity(features.len());
    let mut total_scenarios = 0;
    let mut total_failed = 0;

    for feature in features {
        let scenarios = feature.scenarios.len();
        let failed = feature.scenarios.iter().filter(|s| s.is_failed()).count();
        total_scenarios += scenarios;
        total_failed += failed;

        // A feature without scenarios has nothing failing.
        let percentage = pass_percentage(scenarios, failed).unwrap_or(100);
        if percentage == 100 && options.hide_fully_passing_features {
            continue;
        }
        feature_results.push(FeatureResult::new(&feature.uri, percentage));
    }

    let overall =
        pass_percentage(total_scenarios, total_failed).ok_or(ReportError::NoScenarios)?;
    Ok(CucumberResult::new(feature_results, total_scenarios, overall))
}

/// Parse and aggregate a Cucumber JSON string.
pub fn aggregate_json(
    json: &str,
    options: &AggregateOptions,
) -> Result<CucumberResult, ReportError> {
    let features = document::parse_str(json)?;
    aggregate(&features, options)
}

/// Parse and aggregate an already decoded Cucumber JSON document.
pub fn aggregate_value(
    value: &serde_json::Value,
    options: &AggregateOptions,
) -> Result<CucumberResult, ReportError> {
    let features = document::parse_value(value)?;
    aggregate(&features, options)
}
