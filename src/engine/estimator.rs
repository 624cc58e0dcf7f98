//! Local extrapolation of benchmark runtimes between server samples.
//!
//! Each running workload carries a baseline `(backend_runtime_seconds,
//! last_sync_ms)`. Estimates add the locally elapsed time to that baseline,
//! so the displayed counter keeps moving between the server's slow status
//! pushes and only jumps when a push moves the baseline.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::models::WorkloadId;

/// Baseline for one running workload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuntimeTrackingEntry {
    /// Runtime the server reported at the last sync.
    pub backend_runtime_seconds: f64,
    /// Clock reading (ms) when the baseline was taken.
    pub last_sync_ms: u64,
}

impl RuntimeTrackingEntry {
    /// Estimated whole seconds of runtime at `now_ms`.
    ///
    /// Never below the baseline, even if `now_ms` precedes the sync.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn estimate_at(&self, now_ms: u64) -> u64 {
        let elapsed = now_ms.saturating_sub(self.last_sync_ms) as f64 / 1000.0;
        let baseline = self.backend_runtime_seconds.floor();
        (self.backend_runtime_seconds + elapsed).floor().max(baseline) as u64
    }
}

/// Per-workload runtime baselines. Mutated only by the session engine.
#[derive(Debug, Default)]
pub struct RuntimeEstimator {
    entries: BTreeMap<WorkloadId, RuntimeTrackingEntry>,
}

impl RuntimeEstimator {
    /// Create an estimator with no tracked workloads.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset or create the baseline for `workload`.
    pub fn sync(&mut self, workload: &WorkloadId, reported_seconds: f64, now_ms: u64) {
        let backend_runtime_seconds = if reported_seconds.is_finite() && reported_seconds >= 0.0 {
            reported_seconds
        } else {
            warn!(%workload, reported_seconds, "ignoring invalid reported runtime");
            0.0
        };
        debug!(%workload, backend_runtime_seconds, now_ms, "runtime baseline synced");
        self.entries.insert(
            workload.clone(),
            RuntimeTrackingEntry {
                backend_runtime_seconds,
                last_sync_ms: now_ms,
            },
        );
    }

    /// Drop the baseline for `workload`. Returns whether one existed.
    pub fn discard(&mut self, workload: &WorkloadId) -> bool {
        self.entries.remove(workload).is_some()
    }

    /// Drop every baseline whose workload fails `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&WorkloadId) -> bool) {
        self.entries.retain(|workload, _| {
            let kept = keep(workload);
            if !kept {
                debug!(%workload, "runtime tracking discarded");
            }
            kept
        });
    }

    /// Estimated runtime of `workload` at `now_ms`, if it is tracked.
    #[must_use]
    pub fn current_estimate(&self, workload: &WorkloadId, now_ms: u64) -> Option<u64> {
        self.entries
            .get(workload)
            .map(|entry| entry.estimate_at(now_ms))
    }

    /// Whether `workload` is tracked.
    #[must_use]
    pub fn is_tracking(&self, workload: &WorkloadId) -> bool {
        self.entries.contains_key(workload)
    }

    /// Estimates for every tracked workload at `now_ms`.
    #[must_use]
    pub fn estimates_at(&self, now_ms: u64) -> BTreeMap<WorkloadId, u64> {
        self.entries
            .iter()
            .map(|(workload, entry)| (workload.clone(), entry.estimate_at(now_ms)))
            .collect()
    }

    /// Whether nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
