//! Session state engine.
//!
//! [`SessionEngine`] merges the three update sources of the console into
//! one canonical [`SessionState`]:
//!
//! - full or partial `status_update` pushes ([`SessionEngine::apply_push`]),
//! - discrete setup events ([`SessionEngine::on_setup_started`],
//!   [`SessionEngine::on_setup_progress`]),
//! - locally issued optimistic actions ([`SessionEngine::apply_optimistic_start`],
//!   [`SessionEngine::apply_optimistic_stop`]).
//!
//! It is the only writer of the state, the setup batch, and the runtime
//! baselines. Mutations run to completion one at a time; callers share the
//! engine behind a single lock and render a [`SessionSnapshot`] afterwards.
//!
//! Optimistic actions are not rolled back if a later confirmation fails.
//! A caller that wants compensation re-applies a saved state through
//! [`SessionEngine::apply_push`].

pub mod batch;
pub mod estimator;
pub mod snapshot;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::channel::InboundEvent;
use crate::clock::Clock;
use crate::config::GlobalConfig;
use crate::models::{
    BenchmarkInfo, CycleRate, DatabaseConfig, PartialSessionState, SessionState, SetupBatch,
    WorkloadId,
};
use crate::Result;

use self::batch::{SetupBatchController, SetupTransition};
use self::estimator::RuntimeEstimator;
use self::snapshot::{BenchmarkControl, ConnectionStatus, SessionSnapshot};

/// Canonical owner of session state for one operator session.
#[derive(Debug)]
pub struct SessionEngine {
    clock: Arc<dyn Clock>,
    default_cycle_rate: CycleRate,
    state: SessionState,
    setup: SetupBatchController,
    estimator: RuntimeEstimator,
    connection: ConnectionStatus,
    revision: u64,
}

impl SessionEngine {
    /// Create an engine with empty state.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, default_cycle_rate: CycleRate) -> Self {
        Self {
            clock,
            default_cycle_rate,
            state: SessionState::default(),
            setup: SetupBatchController::new(),
            estimator: RuntimeEstimator::new(),
            connection: ConnectionStatus::default(),
            revision: 0,
        }
    }

    /// Create an engine using the configured default cycle rate.
    #[must_use]
    pub fn from_config(config: &GlobalConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(clock, config.default_cycle_rate())
    }

    // ── Push merge ──────────────────────────────────────

    /// Shallow-merge a `status_update` payload over the canonical state.
    ///
    /// Fields absent from `partial` are left untouched. When the payload
    /// carries `running_benchmarks`, runtime baselines are re-synced first:
    /// every reported running workload gets a fresh baseline and every
    /// tracked workload no longer reported running is dropped.
    pub fn apply_push(&mut self, partial: PartialSessionState) {
        if let Some(err) = &partial.error {
            warn!(error = %err, "status update carried a server error");
        }
        if partial.is_empty() {
            debug!("status update carried no state fields");
        }

        let now = self.clock.now_ms();
        let PartialSessionState {
            infrastructure_ready,
            databases_configured,
            database_config,
            setup_status,
            running_benchmarks,
            error: _,
        } = partial;

        if let Some(running) = &running_benchmarks {
            for (workload, info) in running.iter().filter(|(_, info)| info.is_running()) {
                self.estimator.sync(workload, info.runtime_seconds, now);
            }
            self.estimator
                .retain(|workload| running.get(workload).is_some_and(BenchmarkInfo::is_running));
        }

        if let Some(ready) = infrastructure_ready {
            self.state.infrastructure_ready = ready;
        }
        if let Some(configured) = databases_configured {
            self.state.databases_configured = configured;
        }
        if let Some(config) = database_config {
            self.state.database_config = config;
        }
        if let Some(status) = setup_status {
            self.state.setup_status = status;
        }
        if let Some(running) = running_benchmarks {
            self.state.running_benchmarks = running;
        }

        self.bump("status_update");
    }

    // ── Optimistic and confirmed local updates ──────────

    /// Record a benchmark the server just accepted, ahead of any push.
    pub fn apply_optimistic_start(&mut self, workload: &WorkloadId, cycle_rate: CycleRate, pid: u32) {
        let now = self.clock.now_ms();
        self.state
            .running_benchmarks
            .insert(workload.clone(), BenchmarkInfo::started(pid, cycle_rate));
        self.estimator.sync(workload, 0.0, now);
        info!(%workload, pid, %cycle_rate, "benchmark marked running");
        self.bump("optimistic_start");
    }

    /// Remove a benchmark the server just stopped, with its runtime baseline.
    pub fn apply_optimistic_stop(&mut self, workload: &WorkloadId) {
        let had_entry = self.state.running_benchmarks.remove(workload).is_some();
        let was_tracked = self.estimator.discard(workload);
        if !had_entry && !was_tracked {
            debug!(%workload, "stop for workload with no benchmark entry");
        }
        info!(%workload, "benchmark marked stopped");
        self.bump("optimistic_stop");
    }

    /// Update the rate of a running benchmark after a confirmed change.
    pub fn apply_cycle_rate(&mut self, workload: &WorkloadId, cycle_rate: CycleRate) {
        match self.state.running_benchmarks.get_mut(workload) {
            Some(info) if info.is_running() => {
                info.cycle_rate = cycle_rate;
                self.bump("cycle_rate");
            }
            _ => debug!(%workload, "cycle rate update for workload not running"),
        }
    }

    /// Record confirmed infrastructure start/stop.
    pub fn set_infrastructure_ready(&mut self, ready: bool) {
        self.state.infrastructure_ready = ready;
        self.bump("infrastructure");
    }

    /// Record a confirmed database configuration.
    pub fn apply_database_config(&mut self, config: DatabaseConfig) {
        self.state.databases_configured = true;
        self.state.database_config = config;
        self.bump("database_config");
    }

    /// Record a notification channel link change.
    pub fn set_connection(&mut self, connection: ConnectionStatus) {
        if self.connection != connection {
            info!(?connection, "notification channel state changed");
            self.connection = connection;
            self.bump("connection");
        }
    }

    // ── Setup batch ─────────────────────────────────────

    /// Reserve a setup batch over `workloads` and return its generation.
    ///
    /// The first workload is marked running immediately; the rest pending.
    ///
    /// # Errors
    ///
    /// Returns `AppError::AlreadyRunning` if a batch is already active (the
    /// active batch is left untouched), or `AppError::InvalidInput` for an
    /// empty or duplicated workload list.
    pub fn start_setup_batch(&mut self, workloads: Vec<WorkloadId>) -> Result<u64> {
        let generation = self.setup.start(workloads)?.generation;
        self.bump("setup_batch_started");
        Ok(generation)
    }

    /// Drop the batch started as `generation` without recording outcomes.
    /// Used when the server does not accept the run-setup command; a batch
    /// started after it is left alone.
    pub fn abandon_setup_batch(&mut self, generation: u64) -> Option<SetupBatch> {
        let abandoned = self.setup.abandon(generation);
        if abandoned.is_some() {
            self.bump("setup_batch_abandoned");
        }
        abandoned
    }

    /// Route a `setup_started` event.
    pub fn on_setup_started(&mut self, workload: &WorkloadId) -> SetupTransition {
        let transition = self.setup.on_started(workload);
        if transition != SetupTransition::Ignored {
            self.bump("setup_started");
        }
        transition
    }

    /// Route a `setup_progress` event.
    ///
    /// Outcomes for workloads outside the active batch are ignored. A
    /// success adds the workload to `completed_this_session`.
    pub fn on_setup_progress(&mut self, workload: &WorkloadId, success: bool) -> SetupTransition {
        let transition = self.setup.on_progress(workload, success);
        if transition == SetupTransition::Ignored {
            return transition;
        }
        self.state.setup_status.insert(workload.clone(), success);
        if success {
            self.state.completed_this_session.insert(workload.clone());
        }
        self.bump("setup_progress");
        transition
    }

    // ── Event dispatch ──────────────────────────────────

    /// Apply one inbound notification channel event.
    pub fn handle(&mut self, event: InboundEvent) {
        match event {
            InboundEvent::StatusUpdate(partial) => self.apply_push(partial),
            InboundEvent::SetupStarted { workload } => {
                self.on_setup_started(&workload);
            }
            InboundEvent::SetupProgress { workload, success } => {
                self.on_setup_progress(&workload, success);
            }
            InboundEvent::Connected => self.set_connection(ConnectionStatus::Connected),
            InboundEvent::Disconnected => self.set_connection(ConnectionStatus::Disconnected),
        }
    }

    /// Refresh-tick hook. Never mutates; reports whether a re-render would
    /// show moving runtimes.
    #[must_use]
    pub fn tick(&self) -> bool {
        self.has_running_benchmarks()
    }

    // ── Reads ───────────────────────────────────────────

    /// Estimated runtime of `workload` now, if it is running.
    #[must_use]
    pub fn current_estimate(&self, workload: &WorkloadId) -> Option<u64> {
        self.current_estimate_at(workload, self.clock.now_ms())
    }

    /// Estimated runtime of `workload` at clock reading `now_ms`.
    #[must_use]
    pub fn current_estimate_at(&self, workload: &WorkloadId, now_ms: u64) -> Option<u64> {
        self.estimator.current_estimate(workload, now_ms)
    }

    /// Build an immutable snapshot with derived views.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let now = self.clock.now_ms();
        SessionSnapshot {
            revision: self.revision,
            taken_at_ms: now,
            connection: self.connection,
            state: self.state.clone(),
            setup_batch: self.setup.active().cloned(),
            runtimes: self.estimator.estimates_at(now),
            controls: self.controls(),
            can_run_setup: self.state.databases_configured && !self.setup.is_active(),
        }
    }

    /// Borrow the canonical state.
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The active setup batch, if any.
    #[must_use]
    pub fn setup_batch(&self) -> Option<&SetupBatch> {
        self.setup.active()
    }

    /// Whether a runtime baseline exists for `workload`.
    #[must_use]
    pub fn is_tracking(&self, workload: &WorkloadId) -> bool {
        self.estimator.is_tracking(workload)
    }

    /// Whether any benchmark is running.
    #[must_use]
    pub fn has_running_benchmarks(&self) -> bool {
        self.state.running().next().is_some()
    }

    /// Mutation counter.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Clock reading from the engine's clock source.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    fn controls(&self) -> Vec<BenchmarkControl> {
        self.state
            .completed_this_session
            .iter()
            .filter(|workload| self.state.setup_status.get(*workload) == Some(&true))
            .map(|workload| {
                let running = self
                    .state
                    .running_benchmarks
                    .get(workload)
                    .filter(|info| info.is_running());
                BenchmarkControl {
                    workload: workload.clone(),
                    running: running.is_some(),
                    cycle_rate: running.map_or(self.default_cycle_rate, |info| info.cycle_rate),
                }
            })
            .collect()
    }

    fn bump(&mut self, cause: &'static str) {
        self.revision += 1;
        debug!(revision = self.revision, cause, "session state mutated");
    }
}
