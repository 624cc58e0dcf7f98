//! Read-only views handed to the presentation layer.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{CycleRate, SessionState, SetupBatch, WorkloadId};

/// Notification channel link state.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// No connect event observed yet.
    #[default]
    Unknown,
    /// Push events are flowing.
    Connected,
    /// The channel dropped; state may be stale until the next push.
    Disconnected,
}

/// Start/stop control for a workload whose setup succeeded this session.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct BenchmarkControl {
    /// Workload the control operates.
    pub workload: WorkloadId,
    /// Whether a benchmark is currently running.
    pub running: bool,
    /// Rate of the running benchmark, or the default for a new start.
    pub cycle_rate: CycleRate,
}

/// Immutable copy of engine state plus derived views.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct SessionSnapshot {
    /// Mutation counter at the time of the snapshot.
    pub revision: u64,
    /// Clock reading used for `runtimes`.
    pub taken_at_ms: u64,
    /// Channel link state.
    pub connection: ConnectionStatus,
    /// Canonical state.
    pub state: SessionState,
    /// Batch in flight, if any.
    pub setup_batch: Option<SetupBatch>,
    /// Estimated runtime in whole seconds per running workload.
    pub runtimes: BTreeMap<WorkloadId, u64>,
    /// Controls for workloads set up during this session.
    pub controls: Vec<BenchmarkControl>,
    /// Whether a new setup batch may be requested.
    pub can_run_setup: bool,
}

impl SessionSnapshot {
    /// Estimated runtime for `workload`, if it is running.
    #[must_use]
    pub fn runtime_of(&self, workload: &WorkloadId) -> Option<u64> {
        self.runtimes.get(workload).copied()
    }

    /// Control for `workload`, if one is shown.
    #[must_use]
    pub fn control_for(&self, workload: &WorkloadId) -> Option<&BenchmarkControl> {
        self.controls.iter().find(|c| &c.workload == workload)
    }
}
