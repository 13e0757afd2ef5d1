//! Public HTTP endpoint probe.

use async_trait::async_trait;
use credo_core::{CredoError, CredoResult, ObservationSource};
use reqwest::Client;
use serde_json::{json, Value};

/// GETs a URL (default `https://api.github.com/zen`) and records the body as
/// `{"type": "api", "endpoint": ..., "data": body}`.
pub struct HttpProbeSource {
    name: String,
    url: String,
    client: Client,
}

impl HttpProbeSource {
    pub const DEFAULT_NAME: &'static str = "api_endpoints";

    /// `endpoint` label stored with each record.
    pub const ENDPOINT_LABEL: &'static str = "github_zen";

    pub fn new(url: impl Into<String>, client: Client) -> Self {
        Self {
            name: Self::DEFAULT_NAME.to_string(),
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl ObservationSource for HttpProbeSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn collect(&self) -> CredoResult<Vec<Value>> {
        let response = self
            .client
            .get(&self.url)
            .header("User-Agent", concat!("credo-agent/", env!("CARGO_PKG_VERSION")))
            .send()
            .await
            .map_err(|e| CredoError::source(&self.name, format!("request to {} failed: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CredoError::source(&self.name, format!("{} returned {}", self.url, status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CredoError::source(&self.name, format!("cannot read body: {}", e)))?;

        Ok(vec![json!({ "type": "api", "endpoint": Self::ENDPOINT_LABEL, "data": body })])
    }
}
