//! Setup batch state machine.
//!
//! Each workload in a batch moves `pending → running → completed | failed`.
//! The first workload is marked running when the batch is created because
//! the caller is about to invoke its setup; the rest wait for their own
//! `setup_started` event. A failure does not block later workloads. Once
//! every workload has an outcome the batch is cleared and reported as
//! finished; it is never restarted automatically.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use crate::models::{SetupBatch, SetupStepStatus, WorkloadId};
use crate::{AppError, Result};

/// Result of routing a setup event into the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupTransition {
    /// Event referenced a workload outside the active batch, or no batch is active.
    Ignored,
    /// Event changed (or re-confirmed) a workload's step state.
    Applied(SetupStepStatus),
    /// Event recorded the last outstanding outcome; the batch is now cleared.
    BatchFinished(SetupBatch),
}

/// Drives the single active setup batch.
#[derive(Debug, Default)]
pub struct SetupBatchController {
    active: Option<SetupBatch>,
    generation: u64,
}

impl SetupBatchController {
    /// Create an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a batch over `workloads` in the given order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::AlreadyRunning` if a batch is active, or
    /// `AppError::InvalidInput` if `workloads` is empty or repeats a workload.
    pub fn start(&mut self, workloads: Vec<WorkloadId>) -> Result<&SetupBatch> {
        if let Some(batch) = &self.active {
            return Err(AppError::AlreadyRunning(format!(
                "setup batch of {} workload(s) still in progress",
                batch.workloads.len()
            )));
        }
        if workloads.is_empty() {
            return Err(AppError::InvalidInput(
                "setup batch requires at least one workload".into(),
            ));
        }
        let mut seen = BTreeSet::new();
        if let Some(dup) = workloads.iter().find(|w| !seen.insert(*w)) {
            return Err(AppError::InvalidInput(format!(
                "workload {dup} listed twice in setup batch"
            )));
        }

        let per_workload_status: BTreeMap<_, _> = workloads
            .iter()
            .enumerate()
            .map(|(index, workload)| {
                let status = if index == 0 {
                    SetupStepStatus::Running
                } else {
                    SetupStepStatus::Pending
                };
                (workload.clone(), status)
            })
            .collect();

        self.generation += 1;
        info!(
            count = workloads.len(),
            first = %workloads[0],
            generation = self.generation,
            "setup batch started"
        );
        Ok(self.active.insert(SetupBatch {
            generation: self.generation,
            workloads,
            per_workload_status,
        }))
    }

    /// Handle a `setup_started` event.
    pub fn on_started(&mut self, workload: &WorkloadId) -> SetupTransition {
        let Some(status) = self.step_mut(workload) else {
            warn!(%workload, "setup_started for workload outside active batch");
            return SetupTransition::Ignored;
        };
        if status.is_terminal() {
            debug!(%workload, ?status, "late setup_started after outcome; keeping outcome");
            return SetupTransition::Applied(*status);
        }
        *status = SetupStepStatus::Running;
        debug!(%workload, "setup running");
        SetupTransition::Applied(SetupStepStatus::Running)
    }

    /// Handle a `setup_progress` event. Redelivered outcomes overwrite
    /// the earlier one.
    pub fn on_progress(&mut self, workload: &WorkloadId, success: bool) -> SetupTransition {
        let next = if success {
            SetupStepStatus::Completed
        } else {
            SetupStepStatus::Failed
        };
        let Some(status) = self.step_mut(workload) else {
            warn!(%workload, success, "setup_progress for workload outside active batch");
            return SetupTransition::Ignored;
        };
        *status = next;
        info!(%workload, outcome = next.label(), "setup outcome recorded");

        match self.active.take_if(|batch| batch.is_finished()) {
            Some(batch) => {
                info!(count = batch.workloads.len(), "setup batch finished");
                SetupTransition::BatchFinished(batch)
            }
            None => SetupTransition::Applied(next),
        }
    }

    /// Discard the active batch without recording outcomes, but only if it
    /// is still the batch started as `generation`. A later batch is kept.
    pub fn abandon(&mut self, generation: u64) -> Option<SetupBatch> {
        let abandoned = self
            .active
            .take_if(|batch| batch.generation == generation);
        match (&abandoned, &self.active) {
            (Some(batch), _) => {
                info!(count = batch.workloads.len(), generation, "setup batch abandoned");
            }
            (None, Some(current)) => debug!(
                generation,
                active = current.generation,
                "abandon for superseded batch; keeping active batch"
            ),
            (None, None) => debug!(generation, "abandon with no active batch"),
        }
        abandoned
    }

    /// The batch in flight, if any.
    #[must_use]
    pub fn active(&self) -> Option<&SetupBatch> {
        self.active.as_ref()
    }

    /// Whether a batch is in flight.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    fn step_mut(&mut self, workload: &WorkloadId) -> Option<&mut SetupStepStatus> {
        self.active
            .as_mut()
            .and_then(|batch| batch.per_workload_status.get_mut(workload))
    }
}
