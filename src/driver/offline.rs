//! Sender used when no command transport is configured.

use tracing::warn;

use super::{CommandFuture, CommandSender};
use crate::models::{CycleRate, DatabaseConfig, WorkloadCatalog, WorkloadId};
use crate::AppError;

/// Fails every command with `AppError::Transport`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineSender;

impl OfflineSender {
    fn refuse<T: Send + 'static>(command: &'static str) -> CommandFuture<'static, T> {
        Box::pin(async move {
            warn!(command, "command issued with no transport configured");
            Err::<T, _>(AppError::Transport(
                "no command transport configured".into(),
            ))
        })
    }
}

impl CommandSender for OfflineSender {
    fn start_infrastructure(&self) -> CommandFuture<'_, ()> {
        Self::refuse("start_infrastructure")
    }

    fn stop_infrastructure(&self) -> CommandFuture<'_, ()> {
        Self::refuse("stop_infrastructure")
    }

    fn save_database_config(&self, _config: DatabaseConfig) -> CommandFuture<'_, DatabaseConfig> {
        Self::refuse("save_database_config")
    }

    fn list_workloads(&self) -> CommandFuture<'_, WorkloadCatalog> {
        Self::refuse("list_workloads")
    }

    fn run_setup(&self, _workloads: Vec<WorkloadId>) -> CommandFuture<'_, ()> {
        Self::refuse("run_setup")
    }

    fn start_benchmark(
        &self,
        _workload: WorkloadId,
        _cycle_rate: CycleRate,
    ) -> CommandFuture<'_, u32> {
        Self::refuse("start_benchmark")
    }

    fn stop_benchmark(&self, _workload: WorkloadId) -> CommandFuture<'_, ()> {
        Self::refuse("stop_benchmark")
    }

    fn update_cycle_rate(
        &self,
        _workload: WorkloadId,
        _cycle_rate: CycleRate,
    ) -> CommandFuture<'_, ()> {
        Self::refuse("update_cycle_rate")
    }
}
