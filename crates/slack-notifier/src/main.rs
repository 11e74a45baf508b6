//! Cucumber Slack Notifier CLI
//!
//! Posts a summary of a build's Cucumber JSON results to a Slack channel.
//! Meant to run as a post-build step; Jenkins' `JOB_NAME`, `BUILD_NUMBER`,
//! `BUILD_URL` and `JENKINS_URL` are picked up from the environment.
//!
//! Usage:
//!   cucumber-slack-notifier --channel qa --results target/cucumber [OPTIONS]

use anyhow::Context;
use clap::Parser;
use cucumber_slack_notifier::{Notifier, NotifierConfig, NotifyError, SlackClient};
use cucumber_slack_report::{
    aggregate, load_path, render, AggregateOptions, CucumberResult, Payload, RunContext,
};
use std::path::PathBuf;
use tracing::{info, warn};

/// Cucumber Slack Notifier
#[derive(Parser, Debug)]
#[command(name = "cucumber-slack-notifier")]
#[command(author, version, about = "Post Cucumber test results to a Slack channel")]
struct Args {
    /// YAML configuration file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Slack incoming-webhook URL
    #[arg(long, env = "SLACK_WEBHOOK_URL", hide_env_values = true)]
    webhook_url: Option<String>,

    /// Channel to post to
    #[arg(long, env = "SLACK_CHANNEL")]
    channel: Option<String>,

    /// Root URL of the CI server
    #[arg(long, env = "JENKINS_URL")]
    base_url: Option<String>,

    /// Job display name
    #[arg(long, env = "JOB_NAME")]
    job_name: String,

    /// Build number
    #[arg(long, env = "BUILD_NUMBER")]
    build_number: u64,

    /// Absolute URL of the build page
    #[arg(long, env = "BUILD_URL")]
    build_url: Option<String>,

    /// Build page path below the base URL [default: taken from --build-url,
    /// else job/<job-name>/<build-number>/]
    #[arg(long)]
    run_path: Option<String>,

    /// Cucumber JSON file, or directory of JSON files
    #[arg(short, long, default_value = ".")]
    results: PathBuf,

    /// Only list features with failing scenarios
    #[arg(long)]
    hide_successful: bool,

    /// Text placed before the summary header
    #[arg(short, long)]
    extra: Option<String>,

    /// Print the message instead of posting it
    #[arg(long)]
    dry_run: bool,

    /// Post a placeholder message to check the webhook, ignoring --results
    #[arg(long)]
    test_message: bool,

    /// Log delivery failures instead of failing
    #[arg(long)]
    ignore_delivery_errors: bool,
}

impl Args {
    fn notifier_config(&self) -> anyhow::Result<NotifierConfig> {
        let mut config = match &self.config {
            Some(path) => NotifierConfig::read_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => NotifierConfig::new(
                match &self.webhook_url {
                    Some(url) => url.clone(),
                    // Dry runs never post.
                    None if self.dry_run => String::new(),
                    None => anyhow::bail!("--webhook-url or SLACK_WEBHOOK_URL is required"),
                },
                self.channel
                    .clone()
                    .context("--channel or SLACK_CHANNEL is required")?,
                self.base_url
                    .clone()
                    .context("--base-url or JENKINS_URL is required")?,
            ),
        };

        if let Some(webhook_url) = &self.webhook_url {
            config.webhook_url = webhook_url.clone();
        }
        if let Some(channel) = &self.channel {
            config.channel = channel.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if self.hide_successful {
            config.hide_successful_results = true;
        }

        if self.dry_run {
            config.validate_rendering()?;
        } else {
            config.validate()?;
        }
        Ok(config)
    }

    fn run_context(&self, config: &NotifierConfig) -> RunContext {
        let run_path = self
            .run_path
            .clone()
            .or_else(|| {
                self.build_url
                    .as_deref()
                    .and_then(|url| RunContext::run_path_from_build_url(&config.base_url, url))
            })
            .unwrap_or_else(|| RunContext::jenkins_run_path(&self.job_name, self.build_number));
        RunContext::new(
            &config.base_url,
            run_path,
            self.build_number,
            RunContext::jenkins_display_name(&self.job_name),
        )
    }
}

/// Render the message a run would post, without a webhook client.
fn preview(args: &Args, config: &NotifierConfig, run: &RunContext) -> anyhow::Result<Payload> {
    let extra = args.extra.as_deref();
    if args.test_message {
        return Ok(render(&CucumberResult::placeholder(), &config.channel, run, extra));
    }

    info!("Reading cucumber results from {}", args.results.display());
    let features = load_path(&args.results)?;
    let options = AggregateOptions {
        hide_fully_passing_features: config.hide_successful_results,
    };
    let result = aggregate(&features, &options)?;
    Ok(render(&result, &config.channel, run, extra))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.notifier_config()?;
    let run = args.run_context(&config);
    let extra = args.extra.as_deref();

    if args.dry_run {
        let payload = preview(&args, &config, &run)?;
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let client = SlackClient::new(&config)?;
    let notifier = Notifier::new(client, &config);

    if args.test_message {
        return finish(notifier.notify_placeholder(&run, extra).await, &args);
    }

    info!("Reading cucumber results from {}", args.results.display());
    let features = load_path(&args.results)?;
    finish(notifier.notify(&features, &run, extra).await, &args)
}

fn finish<T>(outcome: Result<T, NotifyError>, args: &Args) -> anyhow::Result<()> {
    match outcome {
        Ok(_) => {
            info!("Notification sent");
            Ok(())
        }
        Err(NotifyError::Delivery(e)) if args.ignore_delivery_errors => {
            warn!("Message could not be posted: {e}");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
