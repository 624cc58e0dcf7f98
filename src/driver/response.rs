//! JSON reply envelope shared by every server command.

use serde::{Deserialize, Serialize};

use crate::models::{DatabaseConfig, WorkloadCatalog};
use crate::{AppError, Result};

/// Reply body returned by the benchmark server's command endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct CommandResponse {
    /// Whether the server carried out the command.
    pub success: bool,
    /// Failure reason when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Process id of a started benchmark.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    /// Normalized database configuration echo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<DatabaseConfig>,
    /// Workload catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workloads: Option<WorkloadCatalog>,
    /// Informational message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CommandResponse {
    /// Parse a reply body.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Transport` if the body is not a valid envelope;
    /// a garbled reply means the exchange itself failed.
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body)
            .map_err(|err| AppError::Transport(format!("unreadable command reply: {err}")))
    }

    /// Convert a `success: false` reply into `AppError::Rejected`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Rejected` carrying the server's reason verbatim.
    pub fn into_result(self) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(AppError::Rejected(
                self.error.unwrap_or_else(|| "unknown error".into()),
            ))
        }
    }

    /// Process id from a successful start reply.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Transport` if the reply omits the pid.
    pub fn pid(&self) -> Result<u32> {
        self.pid
            .ok_or_else(|| AppError::Transport("start reply missing pid".into()))
    }

    /// Configuration echo, falling back to what was submitted.
    #[must_use]
    pub fn config_or(self, submitted: DatabaseConfig) -> DatabaseConfig {
        self.config.unwrap_or(submitted)
    }

    /// Workload catalog from a successful listing reply.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Transport` if the reply omits the catalog.
    pub fn workloads(self) -> Result<WorkloadCatalog> {
        self.workloads
            .ok_or_else(|| AppError::Transport("workload reply missing catalog".into()))
    }
}
