//! Device sensor read through a command that prints JSON.

use async_trait::async_trait;
use credo_core::{CredoError, CredoResult, ObservationSource};
use serde_json::{json, Value};
use tokio::process::Command;
use tracing::debug;

/// Runs a command (default `termux-battery-status`) and records its JSON
/// output as `{"type": "battery", "data": ...}`.
pub struct SensorCommandSource {
    program: String,
    args: Vec<String>,
}

impl SensorCommandSource {
    pub const DEFAULT_NAME: &'static str = "local_sensors";

    /// `command` is split on whitespace into program and arguments.
    pub fn new(command: &str) -> CredoResult<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| CredoError::Configuration("sensor command is empty".to_string()))?;

        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

#[async_trait]
impl ObservationSource for SensorCommandSource {
    fn name(&self) -> &str {
        Self::DEFAULT_NAME
    }

    async fn collect(&self) -> CredoResult<Vec<Value>> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| CredoError::source(self.name(), format!("cannot run '{}': {}", self.program, e)))?;

        if !output.status.success() {
            return Err(CredoError::source(
                self.name(),
                format!("'{}' exited with {}", self.program, output.status),
            ));
        }

        let data: Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| CredoError::source(self.name(), format!("output is not JSON: {}", e)))?;
        debug!(source = self.name(), "Sensor read");

        Ok(vec![json!({ "type": "battery", "data": data })])
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_parses_json_output() {
        let source = SensorCommandSource::new(r#"echo {"percentage":80,"status":"CHARGING"}"#).unwrap();
        let records = source.collect().await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["type"], "battery");
        assert_eq!(records[0]["data"]["percentage"], 80);
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_error() {
        let source = SensorCommandSource::new("false").unwrap();
        assert!(source.collect().await.is_err());
    }

    #[tokio::test]
    async fn test_missing_command_is_error() {
        let source = SensorCommandSource::new("credo-no-such-sensor-command").unwrap();
        let err = source.collect().await.unwrap_err();
        assert!(err.to_string().contains("local_sensors"));
    }

    #[tokio::test]
    async fn test_non_json_output_is_error() {
        let source = SensorCommandSource::new("echo not-json").unwrap();
        assert!(source.collect().await.is_err());
    }

    #[test]
    fn test_empty_command_rejected() {
        assert!(SensorCommandSource::new("   ").is_err());
    }
}
