//! Notification channel contract.
//!
//! Push events arrive as JSON frames of the form
//! `{"event": "<name>", "data": {...}}` and are decoded into the
//! [`InboundEvent`] sum type before they reach the engine, so an
//! unrecognized event name fails at the boundary instead of being
//! silently skipped inside dispatch.

pub mod codec;

use serde::{Deserialize, Serialize};

use crate::models::{PartialSessionState, WorkloadId};
use crate::Result;

/// An event delivered by the notification channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Full or partial state push.
    StatusUpdate(PartialSessionState),
    /// Server began setup for a workload.
    SetupStarted {
        /// Workload being set up.
        workload: WorkloadId,
    },
    /// Server finished setup for a workload.
    SetupProgress {
        /// Workload that finished.
        workload: WorkloadId,
        /// Whether every setup phase succeeded.
        success: bool,
    },
    /// Channel (re)connected.
    Connected,
    /// Channel dropped.
    Disconnected,
}

impl InboundEvent {
    /// Short event name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::StatusUpdate(_) => "status_update",
            Self::SetupStarted { .. } => "setup_started",
            Self::SetupProgress { .. } => "setup_progress",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        }
    }
}

/// Decode one JSON frame.
///
/// # Errors
///
/// Returns `AppError::Codec` if the frame is not valid JSON, names an
/// unknown event, or carries a payload of the wrong shape.
pub fn decode_frame(raw: &str) -> Result<InboundEvent> {
    Ok(serde_json::from_str(raw.trim())?)
}
