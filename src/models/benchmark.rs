//! Running-benchmark records as reported by the server.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use super::workload::CycleRate;

/// Phase name recorded for a benchmark started from this console.
pub const RUN_PHASE: &str = "run";

/// Process status of a reported benchmark.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkStatus {
    /// Benchmark process is alive.
    Running,
    /// Process exited; the server reports it once before forgetting it.
    #[serde(other)]
    Terminated,
}

/// One benchmark entry in `running_benchmarks`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct BenchmarkInfo {
    /// Process status.
    pub status: BenchmarkStatus,
    /// Server-side process id.
    #[serde(default)]
    pub pid: u32,
    /// Configured operations per second. Reported values outside the
    /// accepted range are clamped rather than rejected.
    #[serde(default, deserialize_with = "reported_cycle_rate")]
    pub cycle_rate: CycleRate,
    /// Workload phase being executed.
    #[serde(default)]
    pub phase: String,
    /// Elapsed runtime reported by the server at its last sample.
    #[serde(default)]
    pub runtime_seconds: f64,
}

impl BenchmarkInfo {
    /// Record for a benchmark the console just started.
    #[must_use]
    pub fn started(pid: u32, cycle_rate: CycleRate) -> Self {
        Self {
            status: BenchmarkStatus::Running,
            pid,
            cycle_rate,
            phase: RUN_PHASE.to_owned(),
            runtime_seconds: 0.0,
        }
    }

    /// Whether the entry describes a live process.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == BenchmarkStatus::Running
    }
}

fn reported_cycle_rate<'de, D>(deserializer: D) -> Result<CycleRate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    let rate = CycleRate::clamped(raw);
    if i64::from(rate.get()) != raw {
        warn!(reported = raw, clamped = %rate, "pushed cycle rate out of range");
    }
    Ok(rate)
}
