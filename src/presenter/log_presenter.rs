//! Presenter that writes renders and notices to the tracing log.

use tracing::{error, info, warn};

use super::{display_name, format_runtime, Presenter};
use crate::engine::snapshot::SessionSnapshot;
use crate::models::{Notice, NoticeLevel};

/// Headless presenter for the replay CLI and for debugging.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPresenter;

impl Presenter for LogPresenter {
    fn render(&self, snapshot: &SessionSnapshot) {
        let state = &snapshot.state;
        info!(
            revision = snapshot.revision,
            connection = ?snapshot.connection,
            infrastructure_ready = state.infrastructure_ready,
            databases_configured = state.databases_configured,
            can_run_setup = snapshot.can_run_setup,
            controls = snapshot.controls.len(),
            "session render"
        );
        if let Some(batch) = &snapshot.setup_batch {
            for (workload, status) in batch.steps() {
                info!(workload = %display_name(workload), status = status.label(), "setup step");
            }
        }
        for (workload, bench) in state.running() {
            let runtime = snapshot.runtime_of(workload).unwrap_or_default();
            info!(
                workload = %display_name(workload),
                pid = bench.pid,
                cycle_rate = %bench.cycle_rate,
                runtime = %format_runtime(runtime),
                "benchmark running"
            );
        }
    }

    fn notify(&self, notice: &Notice) {
        match notice.level {
            NoticeLevel::Success | NoticeLevel::Info => info!(notice = %notice.message),
            NoticeLevel::Warning => warn!(notice = %notice.message),
            NoticeLevel::Danger => error!(notice = %notice.message),
        }
    }
}
