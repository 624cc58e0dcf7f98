//! Command sender abstraction.
//!
//! The [`CommandSender`] trait decouples the session controller from the
//! transport that issues imperative actions to the benchmark server. A
//! call resolves to `Ok` only when the server confirmed the action;
//! transport problems surface as [`AppError::Transport`](crate::AppError::Transport)
//! and refusals as [`AppError::Rejected`](crate::AppError::Rejected).

pub mod offline;
pub mod response;

use std::future::Future;
use std::pin::Pin;

use crate::models::{CycleRate, DatabaseConfig, WorkloadCatalog, WorkloadId};
use crate::Result;

pub use offline::OfflineSender;
pub use response::CommandResponse;

/// Boxed future returned by [`CommandSender`] methods.
pub type CommandFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Outbound command interface to the benchmark server.
///
/// # Errors
///
/// Every method returns [`AppError::Transport`](crate::AppError::Transport)
/// when the request could not be completed and
/// [`AppError::Rejected`](crate::AppError::Rejected) when the server
/// answered `success: false`.
pub trait CommandSender: Send + Sync {
    /// Start the monitoring infrastructure.
    fn start_infrastructure(&self) -> CommandFuture<'_, ()>;

    /// Stop the monitoring infrastructure.
    fn stop_infrastructure(&self) -> CommandFuture<'_, ()>;

    /// Save database endpoints; resolves to the server's normalized copy.
    fn save_database_config(&self, config: DatabaseConfig) -> CommandFuture<'_, DatabaseConfig>;

    /// List workloads with their availability under the current config.
    fn list_workloads(&self) -> CommandFuture<'_, WorkloadCatalog>;

    /// Ask the server to run setup for `workloads` in order.
    ///
    /// Resolves once the request is accepted; outcomes arrive later as
    /// `setup_started` / `setup_progress` events.
    fn run_setup(&self, workloads: Vec<WorkloadId>) -> CommandFuture<'_, ()>;

    /// Start a benchmark; resolves to the server-side process id.
    fn start_benchmark(&self, workload: WorkloadId, cycle_rate: CycleRate)
        -> CommandFuture<'_, u32>;

    /// Stop a running benchmark.
    fn stop_benchmark(&self, workload: WorkloadId) -> CommandFuture<'_, ()>;

    /// Change the rate of a running benchmark.
    fn update_cycle_rate(&self, workload: WorkloadId, cycle_rate: CycleRate)
        -> CommandFuture<'_, ()>;
}
