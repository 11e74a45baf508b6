//! Cucumber result aggregation and Slack message rendering.
//!
//! This library turns the JSON written by Cucumber's JSON formatter into pass
//! statistics per feature and for the whole run, and renders those
//! statistics as a Slack incoming-webhook message. Everything here is pure
//! except the file loading helpers; delivery lives in
//! `cucumber-slack-notifier`.
//!
//! # Example
//!
//! ```no_run
//! use cucumber_slack_report::{aggregate, load_path, render, AggregateOptions, RunContext};
//! use std::path::Path;
//!
//! let features = load_path(Path::new("target/cucumber"))?;
//! let options = AggregateOptions { hide_fully_passing_features: true };
//! let result = aggregate(&features, &options)?;
//!
//! let run = RunContext::new("http://jenkins:8080/", "job/acceptance/42/", 42, "acceptance");
//! let payload = render(&result, "qa", &run, None);
//! println!("{}", payload.to_json()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod aggregator;
pub mod document;
mod error;
mod model;
mod render;

use std::path::Path;

pub use aggregator::{
    aggregate, aggregate_json, aggregate_value, pass_percentage, AggregateOptions,
};
pub use document::Feature;
pub use error::ReportError;
pub use model::{CucumberResult, FeatureResult};
pub use render::{fields, header, render, Field, Payload, RunContext, Severity, REPORT_PATH};

/// Read and parse a single Cucumber JSON file.
pub fn load_file(path: &Path) -> Result<Vec<Feature>, ReportError> {
    let content = std::fs::read_to_string(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(document::parse_str(&content)?)
}

/// Read Cucumber results from a file, or from every `.json` file in a
/// directory (non-recursive).
///
/// Directory entries are read in file name order and their features are
/// concatenated, so one run split over several reports aggregates as a whole.
/// An entry that cannot be listed fails the load instead of being skipped.
pub fn load_path(path: &Path) -> Result<Vec<Feature>, ReportError> {
    if !path.is_dir() {
        return load_file(path);
    }

    let entries = std::fs::read_dir(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file = entry.path();
        if file.is_file() && file.extension().is_some_and(|ext| ext == "json") {
            files.push(file);
        }
    }
    if files.is_empty() {
        return Err(ReportError::NoResultFiles(path.to_path_buf()));
    }
    files.sort();

    let mut features = Vec::new();
    for file in &files {
        features.extend(load_file(file)?);
    }
    Ok(features)
}
