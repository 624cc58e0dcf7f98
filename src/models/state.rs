//! Canonical session state and the partial form delivered by pushes.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::benchmark::BenchmarkInfo;
use super::workload::WorkloadId;

/// A single database configuration value. Opaque to the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Numeric value such as a port.
    Int(i64),
    /// Text value such as a host name.
    Text(String),
}

/// Database connection settings keyed by field name (`cassandra_host`, ...).
pub type DatabaseConfig = BTreeMap<String, ConfigValue>;

/// The operator's view of the fleet, owned by the session engine.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct SessionState {
    /// Monitoring infrastructure is up.
    pub infrastructure_ready: bool,
    /// Database endpoints have been saved.
    pub databases_configured: bool,
    /// Last known database configuration.
    pub database_config: DatabaseConfig,
    /// Outcome of the most recent setup attempt per workload.
    pub setup_status: BTreeMap<WorkloadId, bool>,
    /// Benchmarks reported by the server or started locally.
    pub running_benchmarks: BTreeMap<WorkloadId, BenchmarkInfo>,
    /// Workloads whose setup succeeded during this engine's lifetime.
    ///
    /// Only locally observed setup-progress events add to this set.
    pub completed_this_session: BTreeSet<WorkloadId>,
}

impl SessionState {
    /// Whether `workload` has a live benchmark entry.
    #[must_use]
    pub fn is_running(&self, workload: &WorkloadId) -> bool {
        self.running_benchmarks
            .get(workload)
            .is_some_and(BenchmarkInfo::is_running)
    }

    /// Iterate over workloads with live benchmark entries.
    pub fn running(&self) -> impl Iterator<Item = (&WorkloadId, &BenchmarkInfo)> {
        self.running_benchmarks
            .iter()
            .filter(|(_, info)| info.is_running())
    }
}

/// A possibly partial `status_update` payload. Absent fields are left
/// untouched when merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct PartialSessionState {
    /// Replacement for `infrastructure_ready`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infrastructure_ready: Option<bool>,
    /// Replacement for `databases_configured`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub databases_configured: Option<bool>,
    /// Replacement for `database_config`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_config: Option<DatabaseConfig>,
    /// Replacement for `setup_status`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_status: Option<BTreeMap<WorkloadId, bool>>,
    /// Replacement for `running_benchmarks`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running_benchmarks: Option<BTreeMap<WorkloadId, BenchmarkInfo>>,
    /// Server-side failure while assembling the status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PartialSessionState {
    /// Whether the payload carries no state fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.infrastructure_ready.is_none()
            && self.databases_configured.is_none()
            && self.database_config.is_none()
            && self.setup_status.is_none()
            && self.running_benchmarks.is_none()
    }
}

/// Full snapshot as a push, for re-applying a saved view after a failed
/// command. `completed_this_session` is never carried.
impl From<SessionState> for PartialSessionState {
    fn from(state: SessionState) -> Self {
        Self {
            infrastructure_ready: Some(state.infrastructure_ready),
            databases_configured: Some(state.databases_configured),
            database_config: Some(state.database_config),
            setup_status: Some(state.setup_status),
            running_benchmarks: Some(state.running_benchmarks),
            error: None,
        }
    }
}
