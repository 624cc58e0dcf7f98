//! Domain model module declarations.

pub mod benchmark;
pub mod notice;
pub mod setup;
pub mod state;
pub mod workload;

pub use benchmark::{BenchmarkInfo, BenchmarkStatus};
pub use notice::{Notice, NoticeLevel};
pub use setup::{SetupBatch, SetupStepStatus};
pub use state::{ConfigValue, DatabaseConfig, PartialSessionState, SessionState};
pub use workload::{CycleRate, WorkloadCatalog, WorkloadId, WorkloadInfo};
