//! Workload identity, cycle-rate bounds, and the available-workload catalog.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{AppError, Result};

/// Identifier of a benchmark scenario (e.g. `cassandra_sai`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WorkloadId(String);

impl WorkloadId {
    /// Build a workload identifier, rejecting blank input.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` if `raw` is empty or whitespace.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "workload id must not be empty".into(),
            ));
        }
        Ok(Self(raw))
    }

    /// Borrow the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for WorkloadId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<WorkloadId> for String {
    fn from(value: WorkloadId) -> Self {
        value.0
    }
}

impl AsRef<str> for WorkloadId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Benchmark operations-per-second target, always within
/// [`CycleRate::MIN`]..=[`CycleRate::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct CycleRate(u32);

impl CycleRate {
    /// Lowest accepted rate.
    pub const MIN: u32 = 1;
    /// Highest accepted rate.
    pub const MAX: u32 = 10_000;

    /// Validate a raw rate.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` if `rate` is outside `[1, 10000]`.
    pub fn new(rate: u32) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&rate) {
            Ok(Self(rate))
        } else {
            Err(AppError::InvalidInput(format!(
                "cycle rate {rate} outside [{}, {}]",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    /// Pull an arbitrary reported rate into range.
    #[must_use]
    pub fn clamped(raw: i64) -> Self {
        let bounded = raw.clamp(i64::from(Self::MIN), i64::from(Self::MAX));
        Self(u32::try_from(bounded).unwrap_or(Self::MAX))
    }

    /// The raw rate value.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for CycleRate {
    fn default() -> Self {
        Self(10)
    }
}

impl TryFrom<u32> for CycleRate {
    type Error = AppError;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<CycleRate> for u32 {
    fn from(value: CycleRate) -> Self {
        value.0
    }
}

impl fmt::Display for CycleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Availability of one workload under the current database configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct WorkloadInfo {
    /// Whether the workload's target database is configured.
    pub available: bool,
    /// Target database technology (e.g. `cassandra`).
    pub database: String,
}

/// Catalog returned by the "list available workloads" command.
pub type WorkloadCatalog = BTreeMap<WorkloadId, WorkloadInfo>;

/// Confirm that `workload` is present and available in `catalog`.
///
/// # Errors
///
/// Returns `AppError::InvalidInput` if the workload is unknown or its
/// database is not configured.
pub fn ensure_available(catalog: &WorkloadCatalog, workload: &WorkloadId) -> Result<()> {
    match catalog.get(workload) {
        Some(info) if info.available => Ok(()),
        Some(info) => Err(AppError::InvalidInput(format!(
            "workload {workload} cannot run: {} database not configured",
            info.database
        ))),
        None => Err(AppError::InvalidInput(format!(
            "unknown workload {workload}"
        ))),
    }
}
