//! Notifiers: a device notification command, or the log.

use async_trait::async_trait;
use credo_core::{CredoError, CredoResult, Delivery, Notifier};
use tokio::process::Command;
use tracing::info;

/// Runs `<program> --title <title> --content <body>`.
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    program: String,
}

impl CommandNotifier {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl Notifier for CommandNotifier {
    async fn notify(&self, title: &str, body: &str) -> CredoResult<Delivery> {
        let output = Command::new(&self.program)
            .arg("--title")
            .arg(title)
            .arg("--content")
            .arg(body)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| CredoError::action(format!("cannot run '{}': {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CredoError::action(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(Delivery::Sent)
    }
}

/// Used when no notification command is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, title: &str, body: &str) -> CredoResult<Delivery> {
        info!(title, body, "Notification (simulated)");
        Ok(Delivery::Simulated)
    }
}
