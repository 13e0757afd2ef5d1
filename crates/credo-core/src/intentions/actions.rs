//! Built-in actions and the notifier capability.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::{ActionParams, ActionStatus};
use crate::error::CredoResult;

/// How a notification was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Handed to the device.
    Sent,
    /// Only logged; no device was involved.
    Simulated,
}

/// Sends a user-visible notification.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, title: &str, body: &str) -> CredoResult<Delivery>;
}

/// One kind of action the executor can run.
#[async_trait]
pub trait Action: Send + Sync {
    async fn run(&self, params: &ActionParams) -> ActionStatus;
}

/// Sends `title` / `body` through a [`Notifier`].
pub struct NotifyAction {
    notifier: Arc<dyn Notifier>,
}

impl NotifyAction {
    pub const DEFAULT_TITLE: &'static str = "Agent Action";
    pub const DEFAULT_BODY: &'static str = "An action was executed.";

    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

#[async_trait]
impl Action for NotifyAction {
    async fn run(&self, params: &ActionParams) -> ActionStatus {
        let title = params.get("title").unwrap_or(Self::DEFAULT_TITLE);
        let body = params.get("body").unwrap_or(Self::DEFAULT_BODY);

        match self.notifier.notify(title, body).await {
            Ok(Delivery::Sent) => {
                info!(title, "Notification sent");
                ActionStatus::Success
            }
            Ok(Delivery::Simulated) => ActionStatus::SimulatedSuccess,
            Err(e) => {
                warn!(title, code = e.code().as_str(), error = %e, "Notification failed");
                ActionStatus::failed(e.to_string())
            }
        }
    }
}

/// Pretends to work for a short while, then reports `simulated_success`.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedAction {
    delay: Duration,
}

impl Default for SimulatedAction {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(500),
        }
    }
}

impl SimulatedAction {
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Action for SimulatedAction {
    async fn run(&self, params: &ActionParams) -> ActionStatus {
        let name = params.get("name").unwrap_or("unknown action");
        info!(action = name, "Running simulated action");
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        ActionStatus::SimulatedSuccess
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CredoError;
    use mockall::mock;

    mock! {
        pub Notifier {}

        #[async_trait]
        impl Notifier for Notifier {
            async fn notify(&self, title: &str, body: &str) -> CredoResult<Delivery>;
        }
    }

    #[tokio::test]
    async fn test_notify_action_success() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|title, body| title == "Revenue Generation" && body == "hello")
            .times(1)
            .returning(|_, _| Ok(Delivery::Sent));

        let action = NotifyAction::new(Arc::new(notifier));
        let params = ActionParams::new()
            .with("title", "Revenue Generation")
            .with("body", "hello");
        assert_eq!(action.run(&params).await, ActionStatus::Success);
    }

    #[tokio::test]
    async fn test_notify_action_failure_reason() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .returning(|_, _| Err(CredoError::action("command not found")));

        let action = NotifyAction::new(Arc::new(notifier));
        let status = action.run(&ActionParams::new()).await;
        assert!(status.is_failure());
        assert!(status.to_string().starts_with("failed: "));
        assert!(status.to_string().contains("command not found"));
    }

    #[tokio::test]
    async fn test_notify_action_uses_defaults() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|title, body| title == NotifyAction::DEFAULT_TITLE && body == NotifyAction::DEFAULT_BODY)
            .returning(|_, _| Ok(Delivery::Simulated));

        let action = NotifyAction::new(Arc::new(notifier));
        assert_eq!(action.run(&ActionParams::new()).await, ActionStatus::SimulatedSuccess);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_action() {
        let status = SimulatedAction::default()
            .run(&ActionParams::new().with("name", "warmup"))
            .await;
        assert_eq!(status, ActionStatus::SimulatedSuccess);
    }

    #[test]
    fn test_simulated_action_without_delay() {
        let action = SimulatedAction::with_delay(Duration::ZERO);
        let status = tokio_test::block_on(action.run(&ActionParams::new()));
        assert_eq!(status, ActionStatus::SimulatedSuccess);
    }
}
