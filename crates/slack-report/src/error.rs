//! Error type for loading and aggregating Cucumber results.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while turning Cucumber JSON into a [`CucumberResult`].
///
/// [`CucumberResult`]: crate::CucumberResult
#[derive(Error, Debug)]
pub enum ReportError {
    /// The document is not valid JSON or does not have the
    /// feature → scenario → step shape.
    #[error("Invalid cucumber result document: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document parsed but contains no scenarios at all, so no pass
    /// percentage can be computed.
    #[error("Cucumber results contain no scenarios")]
    NoScenarios,

    /// A result file or directory could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory was given but holds no `.json` files.
    #[error("No cucumber JSON files found in {}", .0.display())]
    NoResultFiles(PathBuf),
}
