//! Presentation layer contract and display helpers.
//!
//! A [`Presenter`] only ever receives owned snapshots and notices; it
//! holds no write access to engine state.

pub mod log_presenter;

use crate::engine::snapshot::SessionSnapshot;
use crate::models::{Notice, WorkloadId};

pub use log_presenter::LogPresenter;

/// Renders session snapshots and operator notices.
pub trait Presenter: Send + Sync {
    /// Redraw from a fresh snapshot.
    fn render(&self, snapshot: &SessionSnapshot);

    /// Show a transient notice.
    fn notify(&self, notice: &Notice);
}

/// Format whole seconds as `HH:MM:SS`. Hours are not wrapped at 24.
#[must_use]
pub fn format_runtime(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Human-readable workload label: the first underscore becomes a space and
/// each word is capitalized (`cassandra_sai` → `Cassandra Sai`).
#[must_use]
pub fn display_name(workload: &WorkloadId) -> String {
    let spaced = workload.as_str().replacen('_', " ", 1);
    let mut out = String::with_capacity(spaced.len());
    let mut at_word_start = true;
    for ch in spaced.chars() {
        if at_word_start && ch.is_alphanumeric() {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = !(ch.is_alphanumeric() || ch == '_');
    }
    out
}
