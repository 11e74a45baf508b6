//! Cucumber Slack Notifier - post Cucumber summaries from CI builds to Slack
//!
//! This crate wires the aggregation and rendering of `cucumber-slack-report`
//! to a Slack incoming webhook.
//!
//! # Example
//!
//! ```no_run
//! use cucumber_slack_notifier::{Notifier, NotifierConfig, SlackClient};
//! use cucumber_slack_report::{load_path, RunContext};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = NotifierConfig::from_file("notifier.yaml")?;
//!     let notifier = Notifier::new(SlackClient::new(&config)?, &config);
//!
//!     let features = load_path(Path::new("target/cucumber.json"))?;
//!     let run = RunContext::new(&config.base_url, "job/acceptance/42/", 42, "acceptance");
//!     notifier.notify(&features, &run, None).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod notify;

pub use client::{DeliveryError, MessageSink, SlackClient};
pub use config::{NotifierConfig, ProxyConfig};
pub use notify::{NotifyError, Notifier};
