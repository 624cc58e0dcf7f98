//! Setup batch records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::workload::WorkloadId;

/// Per-workload setup step state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SetupStepStatus {
    /// Queued behind earlier workloads.
    Pending,
    /// Setup is executing on the server.
    Running,
    /// Setup finished successfully.
    Completed,
    /// Setup finished with an error.
    Failed,
}

impl SetupStepStatus {
    /// Whether the step has a recorded outcome.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        }
    }
}

/// An operator-initiated ordered set of workloads being provisioned.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SetupBatch {
    /// Sequence number assigned when the batch was started.
    pub generation: u64,
    /// Workloads in submission order.
    pub workloads: Vec<WorkloadId>,
    /// Current step state of each workload.
    pub per_workload_status: BTreeMap<WorkloadId, SetupStepStatus>,
}

impl SetupBatch {
    /// Step state of `workload`, if it belongs to the batch.
    #[must_use]
    pub fn status_of(&self, workload: &WorkloadId) -> Option<SetupStepStatus> {
        self.per_workload_status.get(workload).copied()
    }

    /// Whether every workload has a recorded outcome.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.per_workload_status
            .values()
            .all(|status| status.is_terminal())
    }

    /// Workloads in submission order with their step state.
    pub fn steps(&self) -> impl Iterator<Item = (&WorkloadId, SetupStepStatus)> {
        self.workloads.iter().filter_map(|workload| {
            self.per_workload_status
                .get(workload)
                .map(|status| (workload, *status))
        })
    }
}
