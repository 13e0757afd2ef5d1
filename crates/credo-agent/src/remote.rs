//! HTTP remote coordinator: status endpoint plus a GitHub repository dispatch.

use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use credo_core::config::RetryConfig;
use credo_core::{CredoError, CredoResult, ErrorCode, RemoteConfig, RemoteCoordinator};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::{debug, warn};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// `event_type` of the repository dispatch.
pub const DISPATCH_EVENT: &str = "quantum-processing-trigger";

const DISPATCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Talks to the status endpoint and the dispatch API over HTTP.
pub struct HttpCoordinator {
    client: Client,
    status_url: Option<String>,
    repository: Option<String>,
    token: Option<SecretString>,
    api_base: String,
    retry: RetryConfig,
}

impl HttpCoordinator {
    pub fn new(config: &RemoteConfig) -> CredoResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("credo-agent/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CredoError::Configuration(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            status_url: config.status_url.as_ref().map(|u| u.trim_end_matches('/').to_string()),
            repository: config.repository.clone(),
            token: config.token.clone(),
            api_base: DEFAULT_API_BASE.to_string(),
            retry: config.retry.clone(),
        })
    }

    /// Builder method to point dispatches at another API host.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_max_times(self.retry.max_attempts.saturating_sub(1))
            .with_min_delay(Duration::from_millis(self.retry.initial_delay_ms))
            .with_max_delay(Duration::from_millis(self.retry.max_delay_ms))
    }
}

fn request_error(url: &str, err: reqwest::Error) -> CredoError {
    let code = if err.is_timeout() {
        ErrorCode::NetTimeout
    } else {
        ErrorCode::NetConnectionFailed
    };
    CredoError::Remote {
        message: format!("request to {} failed: {}", url, err),
        code,
        source: Some(Box::new(err)),
    }
}

#[async_trait]
impl RemoteCoordinator for HttpCoordinator {
    async fn report_status(&self, component: &str, status: &str, metrics: Value) -> CredoResult<()> {
        let Some(base) = &self.status_url else {
            return Ok(());
        };
        let url = format!("{}/api/status", base);
        let payload = json!({
            "component": component,
            "status": status,
            "metrics": metrics,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let post_once = || async {
            let response = self
                .client
                .post(&url)
                .json(&payload)
                .send()
                .await
                .map_err(|e| request_error(&url, e))?;

            let code = response.status();
            if code.is_success() {
                Ok(())
            } else if code.is_server_error() {
                Err(CredoError::remote(format!("{} returned {}", url, code)))
            } else {
                let body = response.text().await.unwrap_or_default();
                Err(CredoError::remote_rejected(format!("{} returned {}: {}", url, code, body)))
            }
        };

        post_once
            .retry(self.backoff())
            .when(|e| e.is_transient())
            .notify(|err, dur| {
                warn!(url = %url, error = %err, "Status report failed, retrying in {:?}", dur);
            })
            .await?;

        debug!(component, status, "Status reported");
        Ok(())
    }

    async fn trigger_remote_job(&self) -> CredoResult<bool> {
        let (Some(repository), Some(token)) = (&self.repository, &self.token) else {
            debug!("Remote trigger skipped, repository or token not configured");
            return Ok(false);
        };
        let url = format!("{}/repos/{}/dispatches", self.api_base, repository);
        let payload = json!({
            "event_type": DISPATCH_EVENT,
            "client_payload": {
                "source": "credo-agent",
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        });

        let response = self
            .client
            .post(&url)
            .timeout(DISPATCH_TIMEOUT)
            .header("Accept", "application/vnd.github.v3+json")
            .header("Authorization", format!("token {}", token.expose_secret()))
            .json(&payload)
            .send()
            .await
            .map_err(|e| request_error(&url, e))?;

        if response.status() == StatusCode::NO_CONTENT {
            Ok(true)
        } else {
            warn!(repository = %repository, status = %response.status(), "Remote trigger not accepted");
            Ok(false)
        }
    }
}
