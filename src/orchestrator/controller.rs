//! Presentation-facing session controller.
//!
//! Wraps the [`SessionEngine`] together with the command sender and the
//! presenter. Each operator action validates its input, awaits the
//! command sender without holding the engine lock, and only mutates the
//! engine once the server confirmed the action. Failures raise a notice
//! and leave state untouched.
//!
//! Every mutation renders a snapshot while still holding the engine lock,
//! so the presenter sees snapshots in mutation order.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::channel::InboundEvent;
use crate::driver::CommandSender;
use crate::engine::snapshot::SessionSnapshot;
use crate::engine::SessionEngine;
use crate::models::workload::ensure_available;
use crate::models::{
    CycleRate, DatabaseConfig, Notice, NoticeLevel, SessionState, WorkloadCatalog, WorkloadId,
};
use crate::presenter::Presenter;
use crate::{AppError, Result};

/// Engine shared between the controller, the event consumer, and the ticker.
pub type SharedEngine = Arc<Mutex<SessionEngine>>;

/// Routes operator actions and push events into the session engine.
pub struct SessionController {
    engine: SharedEngine,
    sender: Arc<dyn CommandSender>,
    presenter: Arc<dyn Presenter>,
    catalog: Mutex<Option<WorkloadCatalog>>,
}

impl SessionController {
    /// Build a controller owning `engine`.
    #[must_use]
    pub fn new(
        engine: SessionEngine,
        sender: Arc<dyn CommandSender>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            sender,
            presenter,
            catalog: Mutex::new(None),
        }
    }

    /// Shared handle to the engine.
    #[must_use]
    pub fn engine(&self) -> SharedEngine {
        Arc::clone(&self.engine)
    }

    /// Current snapshot.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.engine.lock().await.snapshot()
    }

    /// Last workload catalog fetched from the server.
    pub async fn catalog(&self) -> Option<WorkloadCatalog> {
        self.catalog.lock().await.clone()
    }

    // ── Inbound events and ticks ────────────────────────

    /// Apply a notification channel event and re-render.
    pub async fn handle_event(&self, event: InboundEvent) {
        debug!(event = event.name(), "applying inbound event");
        self.mutate(|engine| engine.handle(event)).await;
    }

    /// Refresh tick: re-render while any benchmark is running so runtime
    /// estimates advance. Returns whether a render happened.
    pub async fn tick(&self) -> bool {
        let engine = self.engine.lock().await;
        if engine.tick() {
            self.presenter.render(&engine.snapshot());
            true
        } else {
            false
        }
    }

    /// Re-apply a previously captured state as a push.
    ///
    /// Optimistic updates are never undone automatically; this is the
    /// explicit compensation hook for callers that want it.
    pub async fn reapply_state(&self, saved: SessionState) {
        info!("re-applying saved session state");
        self.mutate(|engine| engine.apply_push(saved.into())).await;
    }

    // ── Infrastructure ──────────────────────────────────

    /// Start the monitoring infrastructure.
    ///
    /// # Errors
    ///
    /// Propagates `AppError::Transport` / `AppError::Rejected` from the sender.
    pub async fn start_infrastructure(&self) -> Result<()> {
        match self.sender.start_infrastructure().await {
            Ok(()) => {
                self.mutate(|engine| engine.set_infrastructure_ready(true))
                    .await;
                self.notify(NoticeLevel::Success, "Infrastructure started successfully");
                Ok(())
            }
            Err(err) => Err(self.command_failed(
                "start infrastructure",
                "starting infrastructure",
                err,
            )),
        }
    }

    /// Stop the monitoring infrastructure.
    ///
    /// # Errors
    ///
    /// Propagates `AppError::Transport` / `AppError::Rejected` from the sender.
    pub async fn stop_infrastructure(&self) -> Result<()> {
        match self.sender.stop_infrastructure().await {
            Ok(()) => {
                self.mutate(|engine| engine.set_infrastructure_ready(false))
                    .await;
                self.notify(NoticeLevel::Success, "Infrastructure stopped successfully");
                Ok(())
            }
            Err(err) => Err(self.command_failed(
                "stop infrastructure",
                "stopping infrastructure",
                err,
            )),
        }
    }

    // ── Database configuration ──────────────────────────

    /// Save database endpoints, then refresh the workload catalog.
    ///
    /// A failed catalog refresh is logged but does not fail the save.
    ///
    /// # Errors
    ///
    /// Propagates `AppError::Transport` / `AppError::Rejected` from the sender.
    pub async fn save_database_config(&self, config: DatabaseConfig) -> Result<()> {
        match self.sender.save_database_config(config).await {
            Ok(saved) => {
                self.mutate(|engine| engine.apply_database_config(saved))
                    .await;
                self.notify(NoticeLevel::Success, "Database configuration saved");
            }
            Err(err) => {
                return Err(self.command_failed(
                    "save configuration",
                    "saving configuration",
                    err,
                ))
            }
        }
        if let Err(err) = self.refresh_workloads().await {
            warn!(%err, "workload catalog refresh after config save failed");
        }
        Ok(())
    }

    /// Fetch the available-workload catalog.
    ///
    /// Returns an empty catalog without calling the server while no
    /// database is configured.
    ///
    /// # Errors
    ///
    /// Propagates `AppError::Transport` / `AppError::Rejected` from the sender.
    pub async fn refresh_workloads(&self) -> Result<WorkloadCatalog> {
        if !self.engine.lock().await.state().databases_configured {
            debug!("databases not configured; skipping workload listing");
            return Ok(WorkloadCatalog::new());
        }
        let catalog = self.sender.list_workloads().await?;
        info!(count = catalog.len(), "workload catalog refreshed");
        *self.catalog.lock().await = Some(catalog.clone());
        Ok(catalog)
    }

    // ── Setup ───────────────────────────────────────────

    /// Run setup for `workloads` in order.
    ///
    /// The batch is reserved in the engine before the command is sent so
    /// that setup events racing ahead of the reply land in it. If the
    /// server does not accept the command the reservation is abandoned,
    /// unless a newer batch has replaced it in the meantime.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` for an empty selection or a workload
    /// that is not available, `AppError::AlreadyRunning` while a batch is in
    /// flight, and propagates sender failures.
    pub async fn run_setup(&self, workloads: Vec<WorkloadId>) -> Result<()> {
        if workloads.is_empty() {
            return Err(self.input_rejected(AppError::InvalidInput(
                "Please select at least one workload".into(),
            )));
        }
        self.ensure_in_catalog(&workloads).await?;

        let generation = match self
            .mutate(|engine| engine.start_setup_batch(workloads.clone()))
            .await
        {
            Ok(generation) => generation,
            Err(err) => return Err(self.input_rejected(err)),
        };

        let span = info_span!("run_setup", count = workloads.len());
        match self.sender.run_setup(workloads).instrument(span).await {
            Ok(()) => {
                self.notify(NoticeLevel::Info, "Setup started. Check progress below.");
                Ok(())
            }
            Err(err) => {
                self.mutate(|engine| engine.abandon_setup_batch(generation))
                    .await;
                Err(self.command_failed("start setup", "starting setup", err))
            }
        }
    }

    // ── Benchmarks ──────────────────────────────────────

    /// Start a benchmark and mark it running as soon as the server accepts.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` for an out-of-range rate or an
    /// unavailable workload, and propagates sender failures.
    pub async fn start_benchmark(&self, workload: WorkloadId, cycle_rate: u32) -> Result<()> {
        let cycle_rate = CycleRate::new(cycle_rate).map_err(|err| self.input_rejected(err))?;
        self.ensure_in_catalog(std::slice::from_ref(&workload)).await?;

        match self
            .sender
            .start_benchmark(workload.clone(), cycle_rate)
            .await
        {
            Ok(pid) => {
                self.mutate(|engine| engine.apply_optimistic_start(&workload, cycle_rate, pid))
                    .await;
                self.notify(
                    NoticeLevel::Success,
                    format!("Started benchmark: {workload}"),
                );
                Ok(())
            }
            Err(err) => Err(self.command_failed("start benchmark", "starting benchmark", err)),
        }
    }

    /// Stop a benchmark and drop it from the view as soon as the server accepts.
    ///
    /// # Errors
    ///
    /// Propagates sender failures.
    pub async fn stop_benchmark(&self, workload: WorkloadId) -> Result<()> {
        match self.sender.stop_benchmark(workload.clone()).await {
            Ok(()) => {
                self.mutate(|engine| engine.apply_optimistic_stop(&workload))
                    .await;
                self.notify(
                    NoticeLevel::Success,
                    format!("Stopped benchmark: {workload}"),
                );
                Ok(())
            }
            Err(err) => Err(self.command_failed("stop benchmark", "stopping benchmark", err)),
        }
    }

    /// Change the rate of a running benchmark.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` for an out-of-range rate and
    /// propagates sender failures.
    pub async fn update_cycle_rate(&self, workload: WorkloadId, cycle_rate: u32) -> Result<()> {
        let cycle_rate = CycleRate::new(cycle_rate).map_err(|err| self.input_rejected(err))?;
        match self
            .sender
            .update_cycle_rate(workload.clone(), cycle_rate)
            .await
        {
            Ok(()) => {
                self.mutate(|engine| engine.apply_cycle_rate(&workload, cycle_rate))
                    .await;
                self.notify(
                    NoticeLevel::Success,
                    format!("Updated cycle rate for {workload} to {cycle_rate}"),
                );
                Ok(())
            }
            Err(err) => Err(self.command_failed(
                "update cycle rate",
                "updating cycle rate",
                err,
            )),
        }
    }

    // ── Private helpers ─────────────────────────────────

    async fn mutate<R>(&self, apply: impl FnOnce(&mut SessionEngine) -> R) -> R {
        let mut engine = self.engine.lock().await;
        let out = apply(&mut engine);
        self.presenter.render(&engine.snapshot());
        out
    }

    async fn ensure_in_catalog(&self, workloads: &[WorkloadId]) -> Result<()> {
        let catalog = self.catalog.lock().await;
        let Some(catalog) = catalog.as_ref() else {
            return Ok(());
        };
        for workload in workloads {
            ensure_available(catalog, workload).map_err(|err| self.input_rejected(err))?;
        }
        Ok(())
    }

    fn notify(&self, level: NoticeLevel, message: impl Into<String>) {
        self.presenter.notify(&Notice::new(level, message));
    }

    fn input_rejected(&self, err: AppError) -> AppError {
        let message = match &err {
            AppError::InvalidInput(msg) | AppError::AlreadyRunning(msg) => msg.clone(),
            other => other.to_string(),
        };
        warn!(%err, "operator input rejected");
        self.notify(NoticeLevel::Warning, message);
        err
    }

    fn command_failed(&self, action: &str, doing: &str, err: AppError) -> AppError {
        let message = match &err {
            AppError::Rejected(reason) => format!("Failed to {action}: {reason}"),
            AppError::Transport(reason) => format!("Error {doing}: {reason}"),
            other => format!("Error {doing}: {other}"),
        };
        warn!(%err, action, "command failed");
        self.notify(NoticeLevel::Danger, message);
        err
    }
}
