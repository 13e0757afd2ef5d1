//! Cycle coordinator: drives collect → optimize → act → report on a fixed
//! interval until cancelled.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{CyclePhase, CycleReport, CycleSettings, RemoteCoordinator};
use crate::beliefs::BeliefAggregator;
use crate::desires::DesireOptimizer;
use crate::error::CredoResult;
use crate::intentions::IntentionExecutor;
use crate::planning::ActionPlanner;

/// Counters kept across cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Cycles that reached the reporting phase.
    pub completed: u64,
    /// Completed cycles without an optimization error.
    pub successful: u64,
    /// Cycles that aborted with an error or panic.
    pub aborted: u64,
    /// Remote jobs triggered.
    pub triggered: u64,
}

pub struct CycleCoordinator {
    aggregator: BeliefAggregator,
    optimizer: DesireOptimizer,
    executor: IntentionExecutor,
    planner: Option<ActionPlanner>,
    remote: Option<Arc<dyn RemoteCoordinator>>,
    settings: CycleSettings,
    phase: CyclePhase,
    stats: RunStats,
}

impl CycleCoordinator {
    pub fn new(aggregator: BeliefAggregator, optimizer: DesireOptimizer, executor: IntentionExecutor) -> Self {
        Self {
            aggregator,
            optimizer,
            executor,
            planner: None,
            remote: None,
            settings: CycleSettings::default(),
            phase: CyclePhase::Idle,
            stats: RunStats::default(),
        }
    }

    pub fn with_settings(mut self, settings: CycleSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_planner(mut self, planner: ActionPlanner) -> Self {
        self.planner = Some(planner);
        self
    }

    pub fn with_remote(mut self, remote: Arc<dyn RemoteCoordinator>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn settings(&self) -> &CycleSettings {
        &self.settings
    }

    fn enter(&mut self, phase: CyclePhase) {
        debug!(from = %self.phase, to = %phase, "Cycle phase");
        self.phase = phase;
    }

    /// Run one full cycle.
    ///
    /// Source failures and remote failures are absorbed. An optimization
    /// failure yields a report with `error` set and no action. Anything else
    /// propagates.
    pub async fn run_cycle(&mut self) -> CredoResult<CycleReport> {
        let start = Instant::now();
        let cycle = self.stats.completed + self.stats.aborted + 1;
        let id = Uuid::new_v4();
        info!(cycle, %id, "Cycle started");

        self.enter(CyclePhase::Collecting);
        let summary = self.aggregator.update_beliefs().await?;

        self.enter(CyclePhase::Optimizing);
        let mut report = CycleReport {
            id,
            cycle,
            summary,
            top_goal: None,
            actions_taken: 0,
            plan: None,
            error: None,
            duration: 0.0,
        };

        match self.optimizer.optimize(&report.summary) {
            Ok(result) => {
                report.top_goal = result.top_goal().map(|g| g.goal.id.clone());
                report.plan = self.planner.as_ref().map(|p| p.plan(&result.top));

                self.enter(CyclePhase::Acting);
                let execution = self.executor.execute(&result.ranked).await?;
                report.actions_taken = execution.actions_taken;
            }
            Err(e) => {
                warn!(cycle, code = e.code().as_str(), error = %e, "Optimization failed, no action this cycle");
                report.error = Some(e.to_string());
            }
        }

        self.enter(CyclePhase::Reporting);
        report.duration = start.elapsed().as_secs_f64();
        self.stats.completed += 1;
        if report.is_ok() {
            self.stats.successful += 1;
        }
        self.report(&report).await;

        info!(
            cycle,
            top_goal = report.top_goal.as_deref().unwrap_or("none"),
            actions = report.actions_taken,
            duration_ms = (report.duration * 1000.0) as u64,
            "Cycle finished"
        );
        Ok(report)
    }

    async fn report(&mut self, report: &CycleReport) {
        let Some(remote) = self.remote.clone() else {
            return;
        };

        if let Err(e) = remote
            .report_status(&self.settings.component, "online", report.metrics())
            .await
        {
            warn!(code = e.code().as_str(), error = %e, "Status report failed");
        }

        if report.is_ok() && self.settings.should_trigger(self.stats.successful) {
            match remote.trigger_remote_job().await {
                Ok(true) => {
                    self.stats.triggered += 1;
                    info!(cycle = report.cycle, "Remote job triggered");
                }
                Ok(false) => warn!(cycle = report.cycle, "Remote job was not accepted"),
                Err(e) => warn!(code = e.code().as_str(), error = %e, "Remote trigger failed"),
            }
        }
    }

    /// Run cycles until `token` is cancelled.
    ///
    /// Cancellation is checked between cycles and interrupts the sleep; a
    /// cycle in flight always finishes. Errors and panics inside a cycle
    /// never end the loop.
    pub async fn run(&mut self, token: CancellationToken) -> RunStats {
        info!(
            interval_secs = self.settings.interval.as_secs_f64(),
            backoff_secs = self.settings.error_backoff.as_secs_f64(),
            "Agent loop starting"
        );

        while !token.is_cancelled() {
            let started = Instant::now();
            let outcome = AssertUnwindSafe(self.run_cycle()).catch_unwind().await;

            let pause = match outcome {
                Ok(Ok(_)) => self.settings.sleep_after(started.elapsed()),
                Ok(Err(e)) => {
                    self.enter(CyclePhase::Aborting);
                    self.stats.aborted += 1;
                    error!(code = e.code().as_str(), error = %e, "Cycle aborted");
                    self.settings.error_backoff
                }
                Err(panic) => {
                    self.enter(CyclePhase::Aborting);
                    self.stats.aborted += 1;
                    error!(panic = %panic_message(&*panic), "Cycle panicked");
                    self.settings.error_backoff
                }
            };

            self.enter(CyclePhase::Sleeping);
            debug!(sleep_ms = pause.as_millis() as u64, "Sleeping until next cycle");
            if !sleep_or_cancel(pause, &token).await {
                break;
            }
        }

        self.enter(CyclePhase::Idle);
        self.go_offline().await;
        info!(
            completed = self.stats.completed,
            aborted = self.stats.aborted,
            "Agent loop stopped"
        );
        self.stats
    }

    async fn go_offline(&self) {
        if let Some(remote) = &self.remote {
            let metrics = serde_json::json!({
                "cycles_completed": self.stats.completed,
                "cycles_aborted": self.stats.aborted,
            });
            if let Err(e) = remote.report_status(&self.settings.component, "offline", metrics).await {
                warn!(error = %e, "Offline status report failed");
            }
        }
    }
}

/// Returns `false` if cancelled before `duration` elapsed.
async fn sleep_or_cancel(duration: Duration, token: &CancellationToken) -> bool {
    tokio::select! {
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
