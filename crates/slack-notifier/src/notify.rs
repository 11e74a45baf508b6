//! Notification pipeline: aggregate, render, deliver.

use crate::client::{DeliveryError, MessageSink};
use crate::config::NotifierConfig;
use cucumber_slack_report::{
    aggregate, render, AggregateOptions, CucumberResult, Feature, Payload, ReportError, RunContext,
};
use thiserror::Error;
use tracing::info;

/// Errors from a notification attempt.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

/// Sends Cucumber summaries for builds to one channel.
pub struct Notifier<S> {
    sink: S,
    channel: String,
    options: AggregateOptions,
}

impl<S: MessageSink> Notifier<S> {
    pub fn new(sink: S, config: &NotifierConfig) -> Self {
        Self {
            sink,
            channel: config.channel.clone(),
            options: AggregateOptions {
                hide_fully_passing_features: config.hide_successful_results,
            },
        }
    }

    /// Get the underlying sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Aggregate `features` and render the message without sending it.
    pub fn prepare(
        &self,
        features: &[Feature],
        run: &RunContext,
        extra: Option<&str>,
    ) -> Result<Payload, ReportError> {
        let result = aggregate(features, &self.options)?;
        info!(
            features = result.total_features(),
            scenarios = result.total_scenarios(),
            pass_percentage = result.pass_percentage(),
            "Aggregated cucumber results"
        );
        Ok(render(&result, &self.channel, run, extra))
    }

    /// Publish the summary of `features` for `run`.
    pub async fn notify(
        &self,
        features: &[Feature],
        run: &RunContext,
        extra: Option<&str>,
    ) -> Result<Payload, NotifyError> {
        let payload = self.prepare(features, run, extra)?;
        self.deliver(&payload).await?;
        Ok(payload)
    }

    /// Publish a one-feature, fully passing summary to check the webhook.
    pub async fn notify_placeholder(
        &self,
        run: &RunContext,
        extra: Option<&str>,
    ) -> Result<Payload, NotifyError> {
        let payload = render(&CucumberResult::placeholder(), &self.channel, run, extra);
        self.deliver(&payload).await?;
        Ok(payload)
    }

    async fn deliver(&self, payload: &Payload) -> Result<(), DeliveryError> {
        info!("Publishing test report to slack channel: {}", payload.channel);
        self.sink.send(payload).await
    }
}
