//! Service discovery against the local flex service.
//!
//! The service answers `POST /_command/discover` with the names of its
//! registered service objects, business logic handlers and auth handlers.

use crate::error::{CliError, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataLink {
    #[serde(default)]
    pub service_objects: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Handlers {
    #[serde(default)]
    pub handlers: Vec<String>,
}

/// Body of a discovery answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discovery {
    #[serde(default)]
    pub data_link: DataLink,
    #[serde(default)]
    pub business_logic: Handlers,
    #[serde(default)]
    pub auth: Handlers,
}

impl Discovery {
    /// Endpoint urls in registration order: data, then functions, then auth.
    pub fn endpoints(&self, flex_url: &str) -> Vec<String> {
        let base = flex_url.trim_end_matches('/');
        let data = self
            .data_link
            .service_objects
            .iter()
            .map(|name| format!("{base}/{name}"));
        let functions = self
            .business_logic
            .handlers
            .iter()
            .map(|name| format!("{base}/_flexFunctions/{name}"));
        let auth = self
            .auth
            .handlers
            .iter()
            .map(|name| format!("{base}/_auth/{name}"));

        data.chain(functions).chain(auth).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.data_link.service_objects.is_empty()
            && self.business_logic.handlers.is_empty()
            && self.auth.handlers.is_empty()
    }
}

/// Retry policy for discovery while the service boots.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, interval: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            interval,
        }
    }
}

/// Asks the service once for its registrations.
pub async fn discover(client: &reqwest::Client, flex_url: &str) -> Result<Discovery> {
    let url = format!("{}/_command/discover", flex_url.trim_end_matches('/'));
    let response = client
        .post(&url)
        .send()
        .await
        .map_err(|e| CliError::Discovery(e.to_string()))?;

    if !response.status().is_success() {
        return Err(CliError::Discovery(format!(
            "{url} answered {}",
            response.status()
        )));
    }

    response
        .json::<Discovery>()
        .await
        .map_err(|e| CliError::Discovery(format!("invalid discovery answer: {e}")))
}

/// Repeats [`discover`] until it succeeds or the policy is exhausted.
///
/// Returns the last error when every attempt failed.
pub async fn discover_with_retry(
    client: &reqwest::Client,
    flex_url: &str,
    policy: RetryPolicy,
) -> Result<Discovery> {
    let mut attempt = 1;
    loop {
        match discover(client, flex_url).await {
            Ok(discovery) => return Ok(discovery),
            Err(err) if attempt >= policy.attempts => return Err(err),
            Err(err) => {
                debug!(attempt, error = %err, "discovery not ready, retrying");
                attempt += 1;
                tokio::time::sleep(policy.interval).await;
            }
        }
    }
}
