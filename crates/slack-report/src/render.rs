//! Rendering of aggregated results into a Slack webhook message.

use crate::model::CucumberResult;
use serde::{Deserialize, Serialize};

/// Path of the HTML report below a build's page.
pub const REPORT_PATH: &str = "cucumber-html-reports/";

const SEPARATOR_WIDE: &str = "-------------------------------";
const SEPARATOR_NARROW: &str = "-------";

/// Severity tier of a run, driving the attachment color and icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Every scenario passed.
    Good,
    /// At least 98% of the scenarios passed.
    Warning,
    /// Anything worse.
    Danger,
}

impl Severity {
    pub fn from_percentage(pass_percentage: u8) -> Self {
        match pass_percentage {
            100.. => Severity::Good,
            98..=99 => Severity::Warning,
            _ => Severity::Danger,
        }
    }

    /// Slack attachment color.
    pub fn color(&self) -> &'static str {
        match self {
            Severity::Good => "good",
            Severity::Warning => "warning",
            Severity::Danger => "danger",
        }
    }

    /// Slack emoji name, without the surrounding colons.
    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Good => "thumbsup",
            Severity::Warning => "hand",
            Severity::Danger => "thumbsdown",
        }
    }
}

/// The CI build a notification is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Root URL of the CI server, e.g. `http://jenkins:8080/`.
    pub base_url: String,
    /// Path of the build page below `base_url`, e.g. `job/acceptance/42/`.
    pub run_path: String,
    /// Build number.
    pub number: u64,
    /// Display name of the job, used as the message's user name.
    pub job_name: String,
}

impl RunContext {
    pub fn new(
        base_url: impl Into<String>,
        run_path: impl Into<String>,
        number: u64,
        job_name: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            run_path: run_path.into(),
            number,
            job_name: job_name.into(),
        }
    }

    /// Jenkins build path for a `JOB_NAME`, which names jobs inside folders
    /// as `team/app`: `job/team/job/app/{number}/`, each segment
    /// percent-encoded.
    pub fn jenkins_run_path(job_name: &str, number: u64) -> String {
        let mut path = String::new();
        for segment in job_name.split('/').filter(|s| !s.is_empty()) {
            path.push_str("job/");
            path.push_str(&urlencoding::encode(segment));
            path.push('/');
        }
        path.push_str(&number.to_string());
        path.push('/');
        path
    }

    /// Name Jenkins displays for a `JOB_NAME`: its last folder segment.
    pub fn jenkins_display_name(job_name: &str) -> &str {
        job_name
            .rsplit('/')
            .find(|s| !s.is_empty())
            .unwrap_or(job_name)
    }

    /// Build path taken from an absolute `BUILD_URL`, when it lives below
    /// `base_url`.
    pub fn run_path_from_build_url(base_url: &str, build_url: &str) -> Option<String> {
        let base = base_url.trim().trim_end_matches('/');
        let rest = build_url.trim().strip_prefix(base)?.strip_prefix('/')?;
        let mut path = rest.to_string();
        if !path.ends_with('/') {
            path.push('/');
        }
        Some(path)
    }

    /// Absolute URL of the build page.
    pub fn run_link(&self) -> String {
        let mut link = String::with_capacity(self.base_url.len() + self.run_path.len() + 1);
        link.push_str(&self.base_url);
        if !self.base_url.trim().ends_with('/') {
            link.push('/');
        }
        link.push_str(&self.run_path);
        link
    }

    /// Absolute URL of the build's Cucumber HTML report.
    pub fn report_link(&self) -> String {
        format!("{}{REPORT_PATH}", self.run_link())
    }
}

/// One cell of the attachment's field table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Lay the cell out side by side with its neighbour.
    pub short: bool,
}

impl Field {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            value: None,
            short: true,
        }
    }

    pub fn value(value: impl Into<String>) -> Self {
        Self {
            title: None,
            value: Some(value.into()),
            short: true,
        }
    }
}

/// Slack incoming-webhook message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub channel: String,
    pub pretext: String,
    pub fields: Vec<Field>,
    pub color: String,
    pub icon_emoji: String,
    pub username: String,
}

impl Payload {
    /// Serialize to the JSON body posted to the webhook.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Header line: optional extra text, then feature, scenario and build summary.
pub fn header(result: &CucumberResult, run: &RunContext, extra: Option<&str>) -> String {
    let extra = extra.unwrap_or_default();
    format!(
        "{extra}Features: {}, Scenarios: {}, Build: <{}|{}>",
        result.total_features(),
        result.total_scenarios(),
        run.report_link(),
        run.number
    )
}

/// Field table: a title row, one row per listed feature, a separator and
/// the run total.
pub fn fields(result: &CucumberResult, run: &RunContext) -> Vec<Field> {
    let report_link = run.report_link();
    let mut fields = Vec::with_capacity(2 * result.total_features() + 6);

    fields.push(Field::title("Features"));
    fields.push(Field::title("Pass %"));
    for feature in result.feature_results() {
        fields.push(Field::value(format!(
            "<{report_link}{}|{}>",
            feature.feature_uri(),
            feature.display_name()
        )));
        fields.push(Field::value(format!("{} %", feature.pass_percentage())));
    }
    fields.push(Field::value(SEPARATOR_WIDE));
    fields.push(Field::value(SEPARATOR_NARROW));
    fields.push(Field::value("Total Passed"));
    fields.push(Field::value(format!("{} %", result.pass_percentage())));
    fields
}

/// Render the webhook message for `result`.
///
/// `channel` may be given with or without its leading `#`.
pub fn render(
    result: &CucumberResult,
    channel: &str,
    run: &RunContext,
    extra_header_text: Option<&str>,
) -> Payload {
    let severity = Severity::from_percentage(result.pass_percentage());
    Payload {
        channel: format!("#{}", channel.trim_start_matches('#')),
        pretext: header(result, run, extra_header_text),
        fields: fields(result, run),
        color: severity.color().to_string(),
        icon_emoji: format!(":{}:", severity.icon()),
        username: run.job_name.clone(),
    }
}
