//! Aggregated pass statistics for a Cucumber run.

const FEATURE_SUFFIX: &str = ".feature";

/// Pass statistics for a single feature file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureResult {
    display_name: String,
    feature_uri: String,
    pass_percentage: u8,
}

impl FeatureResult {
    /// Create a result from the feature's source `uri` (e.g.
    /// `"login/sign_in.feature"`) and its pass percentage.
    ///
    /// The display name and report page name are derived from the uri the
    /// same way the HTML report generator names its pages.
    pub fn new(uri: impl AsRef<str>, pass_percentage: u8) -> Self {
        let uri = uri.as_ref();
        Self {
            display_name: display_name(uri),
            feature_uri: report_page(uri),
            pass_percentage: pass_percentage.min(100),
        }
    }

    /// Human-readable feature title.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Report page for this feature, relative to the report root.
    pub fn feature_uri(&self) -> &str {
        &self.feature_uri
    }

    /// Percentage of this feature's scenarios that passed.
    pub fn pass_percentage(&self) -> u8 {
        self.pass_percentage
    }
}

/// `features/validate_home_page.feature` -> `validate home page`
fn display_name(uri: &str) -> String {
    let file_name = uri.rsplit(['/', '\\']).next().unwrap_or(uri);
    let stem = file_name.strip_suffix(FEATURE_SUFFIX).unwrap_or(file_name);
    stem.replace('_', " ")
}

/// `features/validate_home_page.feature` -> `features-validate_home_page-feature.html`
fn report_page(uri: &str) -> String {
    let flattened = uri.replace(['/', '\\'], "-");
    let page = match flattened.strip_suffix(FEATURE_SUFFIX) {
        Some(stem) => format!("{stem}-feature"),
        None => flattened,
    };
    format!("{page}.html")
}

/// Aggregate outcome of a complete Cucumber run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CucumberResult {
    feature_results: Vec<FeatureResult>,
    total_scenarios: usize,
    pass_percentage: u8,
}

impl CucumberResult {
    /// Create an aggregate result.
    ///
    /// `total_scenarios` and `pass_percentage` describe the whole run, even
    /// when `feature_results` only lists a subset of its features.
    pub fn new(
        feature_results: Vec<FeatureResult>,
        total_scenarios: usize,
        pass_percentage: u8,
    ) -> Self {
        Self {
            feature_results,
            total_scenarios,
            pass_percentage: pass_percentage.min(100),
        }
    }

    /// A one-feature, fully passing result used to check that a webhook is
    /// reachable without a real test run.
    pub fn placeholder() -> Self {
        Self::new(vec![FeatureResult::new("Dummy Test", 100)], 1, 100)
    }

    /// Listed features, in document order.
    pub fn feature_results(&self) -> &[FeatureResult] {
        &self.feature_results
    }

    /// Number of listed features.
    pub fn total_features(&self) -> usize {
        self.feature_results.len()
    }

    /// Number of scenarios across every feature of the run.
    pub fn total_scenarios(&self) -> usize {
        self.total_scenarios
    }

    /// Percentage of all scenarios that passed.
    pub fn pass_percentage(&self) -> u8 {
        self.pass_percentage
    }

    /// Whether every scenario of the run passed.
    pub fn is_fully_passing(&self) -> bool {
        self.pass_percentage == 100
    }
}
