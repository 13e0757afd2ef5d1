//! Agent configuration.
//!
//! Loaded from a `.toml`, `.json` or `.yaml` file, then overlaid with
//! `CREDO_*` environment variables. The remote auth token is only ever read
//! from the environment.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cycle::{CycleSettings, DEFAULT_COMPONENT};
use crate::desires::{DEFAULT_METHOD, DEFAULT_TOP_K};
use crate::error::{CredoError, CredoResult};
use crate::planning::{SolverPreference, DEFAULT_PLAN_CAPACITY};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "CREDO_CONFIG";

/// Top-level agent configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub cycle_interval_secs: u64,
    /// Label recorded with each optimization. Does not change the formulas.
    pub optimization_method: String,
    pub db_path: PathBuf,
    pub source_timeout_secs: u64,
    pub error_backoff_secs: u64,
    pub top_k: usize,
    pub solver: SolverPreference,
    pub plan_capacity: f64,
    pub sources: SourcesConfig,
    /// Command used to send notifications. Notifications are only logged
    /// when unset.
    pub notification_command: Option<String>,
    pub remote: RemoteConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            cycle_interval_secs: 30,
            optimization_method: DEFAULT_METHOD.to_string(),
            db_path: default_db_path(),
            source_timeout_secs: 10,
            error_backoff_secs: 60,
            top_k: DEFAULT_TOP_K,
            solver: SolverPreference::default(),
            plan_capacity: DEFAULT_PLAN_CAPACITY,
            sources: SourcesConfig::default(),
            notification_command: Some("termux-notification".to_string()),
            remote: RemoteConfig::default(),
        }
    }
}

fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".credo"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("credo.db")
}

/// Observation source settings. A `None` entry disables that source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub sensor_command: Option<String>,
    pub probe_url: Option<String>,
    pub disk_mount_point: Option<PathBuf>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            sensor_command: Some("termux-battery-status".to_string()),
            probe_url: Some("https://api.github.com/zen".to_string()),
            disk_mount_point: Some(PathBuf::from("/")),
        }
    }
}

/// Remote status endpoint and job trigger.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL; status is posted to `{status_url}/api/status`.
    pub status_url: Option<String>,
    /// `owner/name` of the repository whose job is triggered.
    pub repository: Option<String>,
    pub trigger_every_cycles: Option<u64>,
    pub timeout_secs: u64,
    pub retry: RetryConfig,
    pub component: String,
    /// Read from `CREDO_REMOTE_TOKEN` or `GITHUB_TOKEN`; never serialized.
    #[serde(skip)]
    pub token: Option<SecretString>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            status_url: None,
            repository: None,
            trigger_every_cycles: None,
            timeout_secs: 15,
            retry: RetryConfig::default(),
            component: DEFAULT_COMPONENT.to_string(),
            token: None,
        }
    }
}

impl RemoteConfig {
    /// Whether anything remote is configured.
    pub fn is_enabled(&self) -> bool {
        self.status_url.is_some() || self.repository.is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Exponential backoff for status delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: usize,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 500,
            max_delay_ms: 10_000,
        }
    }
}

impl AgentConfig {
    /// Load configuration from a file.
    pub fn from_file(path: impl AsRef<Path>) -> CredoResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => toml::from_str(&content).map_err(|e| CredoError::Configuration(e.to_string())),
            Some("json") => serde_json::from_str(&content).map_err(|e| CredoError::Configuration(e.to_string())),
            Some("yaml" | "yml") => {
                serde_yaml::from_str(&content).map_err(|e| CredoError::Configuration(e.to_string()))
            }
            _ => Err(CredoError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Load from `CREDO_CONFIG` if set, then overlay the environment.
    pub fn load() -> CredoResult<Self> {
        let base = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        Ok(base.with_env())
    }

    /// Overlay `CREDO_*` variables from the process environment.
    pub fn with_env(self) -> Self {
        self.with_vars(|key| std::env::var(key).ok())
    }

    /// Overlay variables from `lookup`. Unparseable numbers are ignored.
    pub fn with_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parsed<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
            lookup(key).and_then(|v| v.trim().parse().ok())
        }

        if let Some(secs) = parsed(&lookup, "CREDO_CYCLE_INTERVAL_SECS") {
            self.cycle_interval_secs = secs;
        }
        if let Some(method) = lookup("CREDO_OPTIMIZATION_METHOD") {
            self.optimization_method = method;
        }
        if let Some(path) = lookup("CREDO_DB_PATH") {
            self.db_path = PathBuf::from(path);
        }
        if let Some(secs) = parsed(&lookup, "CREDO_SOURCE_TIMEOUT_SECS") {
            self.source_timeout_secs = secs;
        }
        if let Some(secs) = parsed(&lookup, "CREDO_ERROR_BACKOFF_SECS") {
            self.error_backoff_secs = secs;
        }
        if let Some(solver) = parsed(&lookup, "CREDO_SOLVER") {
            self.solver = solver;
        }
        if let Some(capacity) = parsed(&lookup, "CREDO_PLAN_CAPACITY") {
            self.plan_capacity = capacity;
        }
        if let Some(command) = lookup("CREDO_NOTIFICATION_COMMAND") {
            self.notification_command = if command.is_empty() { None } else { Some(command) };
        }
        if let Some(url) = lookup("CREDO_STATUS_URL") {
            self.remote.status_url = Some(url);
        }
        if let Some(repo) = lookup("CREDO_REMOTE_REPOSITORY") {
            self.remote.repository = Some(repo);
        }
        if let Some(every) = parsed(&lookup, "CREDO_TRIGGER_EVERY_CYCLES") {
            self.remote.trigger_every_cycles = Some(every);
        }
        if let Some(token) = lookup("CREDO_REMOTE_TOKEN").or_else(|| lookup("GITHUB_TOKEN")) {
            self.remote.token = Some(SecretString::new(token));
        }

        self
    }

    /// Create a new builder.
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Reject settings the loop cannot run with.
    pub fn validate(&self) -> CredoResult<()> {
        if self.cycle_interval_secs == 0 {
            return Err(CredoError::Configuration("cycle_interval_secs must be > 0".to_string()));
        }
        if self.source_timeout_secs == 0 {
            return Err(CredoError::Configuration("source_timeout_secs must be > 0".to_string()));
        }
        if self.remote.timeout_secs == 0 {
            return Err(CredoError::Configuration("remote.timeout_secs must be > 0".to_string()));
        }
        if !self.plan_capacity.is_finite() || self.plan_capacity < 0.0 {
            return Err(CredoError::Configuration(format!(
                "plan_capacity must be a non-negative number, got {}",
                self.plan_capacity
            )));
        }

        if let Some(url) = &self.sources.probe_url {
            check_url("sources.probe_url", url)?;
        }
        if let Some(url) = &self.remote.status_url {
            check_url("remote.status_url", url)?;
        }
        if let Some(repo) = &self.remote.repository {
            let mut parts = repo.split('/');
            let valid = matches!(
                (parts.next(), parts.next(), parts.next()),
                (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty()
            );
            if !valid {
                return Err(CredoError::Configuration(format!(
                    "remote.repository must look like 'owner/name', got '{}'",
                    repo
                )));
            }
        }
        Ok(())
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs)
    }

    pub fn cycle_settings(&self) -> CycleSettings {
        CycleSettings {
            interval: Duration::from_secs(self.cycle_interval_secs),
            error_backoff: Duration::from_secs(self.error_backoff_secs),
            trigger_every_cycles: self.remote.trigger_every_cycles,
            component: self.remote.component.clone(),
        }
    }
}

fn check_url(field: &str, value: &str) -> CredoResult<()> {
    let url = url::Url::parse(value)
        .map_err(|e| CredoError::Configuration(format!("{} is not a valid URL ('{}'): {}", field, value, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(CredoError::Configuration(format!(
            "{} must use http or https, got '{}'",
            field, other
        ))),
    }
}

/// Builder for AgentConfig.
#[derive(Default)]
pub struct AgentConfigBuilder {
    config: AgentConfig,
}

impl AgentConfigBuilder {
    pub fn cycle_interval_secs(mut self, secs: u64) -> Self {
        self.config.cycle_interval_secs = secs;
        self
    }

    pub fn optimization_method(mut self, method: impl Into<String>) -> Self {
        self.config.optimization_method = method.into();
        self
    }

    pub fn db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.db_path = path.into();
        self
    }

    pub fn source_timeout_secs(mut self, secs: u64) -> Self {
        self.config.source_timeout_secs = secs;
        self
    }

    pub fn error_backoff_secs(mut self, secs: u64) -> Self {
        self.config.error_backoff_secs = secs;
        self
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.config.top_k = top_k;
        self
    }

    pub fn solver(mut self, solver: SolverPreference) -> Self {
        self.config.solver = solver;
        self
    }

    pub fn plan_capacity(mut self, capacity: f64) -> Self {
        self.config.plan_capacity = capacity;
        self
    }

    pub fn sources(mut self, sources: SourcesConfig) -> Self {
        self.config.sources = sources;
        self
    }

    pub fn notification_command(mut self, command: Option<String>) -> Self {
        self.config.notification_command = command;
        self
    }

    pub fn remote(mut self, remote: RemoteConfig) -> Self {
        self.config.remote = remote;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> AgentConfig {
        self.config
    }
}
