//! Notifier configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Where and how to post notifications.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NotifierConfig {
    /// Slack incoming-webhook URL.
    pub webhook_url: String,
    /// Channel to post to, with or without the leading `#`.
    pub channel: String,
    /// Root URL of the CI server, used for links back to the build.
    pub base_url: String,
    /// Only list features that had failing scenarios.
    #[serde(default)]
    pub hide_successful_results: bool,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// HTTP proxy used to reach the webhook
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyConfig>,
}

/// HTTP proxy settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Regex patterns; a webhook host matching any of them is reached
    /// directly.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub no_proxy_hosts: Vec<String>,
}

impl ProxyConfig {
    /// Proxy URL in the form reqwest expects.
    pub fn url(&self) -> String {
        if self.host.contains("://") {
            format!("{}:{}", self.host, self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }

    /// Credentials, when a non-blank user name is configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let username = self.username.as_deref()?;
        if username.trim().is_empty() {
            return None;
        }
        Some((username, self.password.as_deref().unwrap_or_default()))
    }
}

impl NotifierConfig {
    pub fn new(
        webhook_url: impl Into<String>,
        channel: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            channel: channel.into(),
            base_url: base_url.into(),
            hide_successful_results: false,
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            proxy: None,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration file without validating it, so values can be
    /// overridden before [`validate`](Self::validate) runs.
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// Validate the settings needed to render a message.
    pub fn validate_rendering(&self) -> Result<(), anyhow::Error> {
        if self.channel.trim_start_matches('#').trim().is_empty() {
            anyhow::bail!("'channel' is required");
        }

        if self.base_url.trim().is_empty() {
            anyhow::bail!("'base_url' is required to link back to the build");
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.webhook_url.trim().is_empty() {
            anyhow::bail!("'webhook_url' is required");
        }
        if !(self.webhook_url.starts_with("http://") || self.webhook_url.starts_with("https://")) {
            anyhow::bail!(
                "Unsupported webhook URL: '{}'. Expected an http or https URL",
                self.webhook_url
            );
        }

        self.validate_rendering()?;

        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            anyhow::bail!("Timeouts must be at least one second");
        }

        if let Some(ref proxy) = self.proxy {
            if proxy.host.trim().is_empty() {
                anyhow::bail!("'proxy.host' must not be empty");
            }
            for pattern in &proxy.no_proxy_hosts {
                regex::Regex::new(pattern).map_err(|e| {
                    anyhow::anyhow!("Invalid no_proxy_hosts pattern '{pattern}': {e}")
                })?;
            }
        }

        Ok(())
    }
}
