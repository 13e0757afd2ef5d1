//! credo-agent - Wires the credo cycle to real sources, notifiers and the
//! remote coordinator.

pub mod notify;
pub mod remote;
pub mod sources;

use std::sync::Arc;

use credo_core::intentions::{SEND_NOTIFICATION, SIMULATE_ACTION};
use credo_core::{
    select_solver, ActionPlanner, AgentConfig, BeliefAggregator, CredoError, CredoResult, CycleCoordinator,
    DesireOptimizer, GoalRegistry, IntentionExecutor, Notifier, NotifyAction, ObservationSource, SimulatedAction,
    SqliteStore,
};
use tracing::info;

pub use notify::{CommandNotifier, LogNotifier};
pub use remote::HttpCoordinator;
pub use sources::{DiskUsageSource, HttpProbeSource, SensorCommandSource};

/// Instantiate the observation sources named in the config.
pub fn build_sources(config: &AgentConfig) -> CredoResult<Vec<Box<dyn ObservationSource>>> {
    let mut sources: Vec<Box<dyn ObservationSource>> = Vec::new();
    let cfg = &config.sources;

    if let Some(command) = &cfg.sensor_command {
        sources.push(Box::new(SensorCommandSource::new(command)?));
    }
    if let Some(url) = &cfg.probe_url {
        let client = reqwest::Client::builder()
            .timeout(config.source_timeout())
            .build()
            .map_err(|e| CredoError::Configuration(format!("cannot build HTTP client: {}", e)))?;
        sources.push(Box::new(HttpProbeSource::new(url.clone(), client)));
    }
    if let Some(mount) = &cfg.disk_mount_point {
        sources.push(Box::new(DiskUsageSource::new(mount.clone())));
    }

    Ok(sources)
}

/// Build a ready-to-run coordinator on top of `store`.
pub fn build_coordinator(config: &AgentConfig, store: Arc<SqliteStore>) -> CredoResult<CycleCoordinator> {
    let mut aggregator = BeliefAggregator::new(store.clone()).with_timeout(config.source_timeout());
    for source in build_sources(config)? {
        aggregator.add_source(source);
    }
    info!(sources = ?aggregator.source_names(), "Belief sources registered");

    let optimizer = DesireOptimizer::new(GoalRegistry::new(store.clone()), store.clone())
        .with_method(config.optimization_method.clone())
        .with_top_k(config.top_k);

    let notifier: Arc<dyn Notifier> = match &config.notification_command {
        Some(command) => Arc::new(CommandNotifier::new(command.clone())),
        None => Arc::new(LogNotifier),
    };
    let executor = IntentionExecutor::new(store)
        .with_action(SEND_NOTIFICATION, Arc::new(NotifyAction::new(notifier)))
        .with_action(SIMULATE_ACTION, Arc::new(SimulatedAction::default()));

    let planner = ActionPlanner::new(Arc::new(select_solver(config.solver))).with_capacity(config.plan_capacity);

    let mut coordinator = CycleCoordinator::new(aggregator, optimizer, executor)
        .with_settings(config.cycle_settings())
        .with_planner(planner);

    if config.remote.is_enabled() {
        coordinator = coordinator.with_remote(Arc::new(HttpCoordinator::new(&config.remote)?));
        info!("Remote coordination enabled");
    }

    Ok(coordinator)
}
