//! HTTP client for Slack incoming webhooks

use crate::config::{NotifierConfig, ProxyConfig};
use async_trait::async_trait;
use cucumber_slack_report::Payload;
use regex::Regex;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when delivering a message
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Received HTTP status code [{status}] while posting to Slack: {body}")]
    Status { status: u16, body: String },
    #[error("Webhook URI error: {0}")]
    InvalidWebhook(String),
    #[error("Invalid proxy configuration: {0}")]
    Proxy(String),
    #[error("Failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Destination for rendered messages.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send(&self, payload: &Payload) -> Result<(), DeliveryError>;
}

/// Posts messages to a Slack incoming webhook.
#[derive(Debug, Clone)]
pub struct SlackClient {
    client: Client,
    webhook_url: Url,
}

impl SlackClient {
    /// Create a client for the configured webhook.
    ///
    /// Proxy settings come only from `config`; proxy environment variables
    /// are ignored.
    pub fn new(config: &NotifierConfig) -> Result<Self, DeliveryError> {
        let webhook_url = Url::parse(&config.webhook_url)
            .map_err(|e| DeliveryError::InvalidWebhook(format!("{}: {e}", config.webhook_url)))?;
        let host = webhook_url
            .host_str()
            .ok_or_else(|| DeliveryError::InvalidWebhook(config.webhook_url.clone()))?;

        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs));

        builder = match &config.proxy {
            Some(proxy) if should_proxy(proxy, host)? => {
                info!("Using proxy {}:{}", proxy.host, proxy.port);
                builder.proxy(build_proxy(proxy)?)
            }
            Some(_) => {
                info!("Webhook host {host} matches no_proxy_hosts, proxy not used");
                builder.no_proxy()
            }
            None => builder.no_proxy(),
        };

        Ok(Self {
            client: builder.build()?,
            webhook_url,
        })
    }

    /// Get the webhook URL
    pub fn webhook_url(&self) -> &Url {
        &self.webhook_url
    }
}

/// Whether `host` should be reached through `proxy`.
///
/// Patterns must match the whole host name.
pub fn should_proxy(proxy: &ProxyConfig, host: &str) -> Result<bool, DeliveryError> {
    for pattern in &proxy.no_proxy_hosts {
        let anchored = format!("^(?:{pattern})$");
        let re = Regex::new(&anchored)
            .map_err(|e| DeliveryError::Proxy(format!("{pattern}: {e}")))?;
        if re.is_match(host) {
            return Ok(false);
        }
    }
    Ok(true)
}

fn build_proxy(config: &ProxyConfig) -> Result<reqwest::Proxy, DeliveryError> {
    let mut proxy =
        reqwest::Proxy::all(config.url()).map_err(|e| DeliveryError::Proxy(e.to_string()))?;
    if let Some((username, password)) = config.credentials() {
        info!("Using proxy authentication (user={username})");
        proxy = proxy.basic_auth(username, password);
    }
    Ok(proxy)
}

#[async_trait]
impl MessageSink for SlackClient {
    async fn send(&self, payload: &Payload) -> Result<(), DeliveryError> {
        let body = payload.to_json()?;
        debug!("Json being posted: {body}");

        let resp = self
            .client
            .post(self.webhook_url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json; charset=utf-8")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
