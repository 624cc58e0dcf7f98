//! Inbound event consumer: drains push events into the controller.
//!
//! Events are applied strictly in delivery order, one at a time. Nothing
//! is reordered or coalesced, so a push arriving right after an
//! optimistic update supersedes it.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, Instrument};

use crate::channel::InboundEvent;

use super::controller::SessionController;

/// Spawn a background task that applies inbound events to the session.
///
/// The task runs until the `CancellationToken` fires or the `mpsc` channel
/// closes. Returns a `JoinHandle` so the caller can await clean shutdown.
///
/// # Arguments
///
/// * `rx`         - Receiving end of the inbound event channel.
/// * `controller` - Session controller that owns the engine.
/// * `cancel`     - Cancellation token for graceful shutdown.
#[must_use]
pub fn spawn_event_consumer(
    mut rx: mpsc::Receiver<InboundEvent>,
    controller: Arc<SessionController>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(
        async move {
            let mut applied: u64 = 0;
            loop {
                let event = tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        info!(applied, "event consumer shutting down");
                        break;
                    }
                    maybe_event = rx.recv() => {
                        if let Some(e) = maybe_event { e } else {
                            info!(applied, "inbound event channel closed");
                            break;
                        }
                    }
                };

                debug!(event = event.name(), "inbound event received");
                controller.handle_event(event).await;
                applied += 1;
            }
        }
        .instrument(info_span!("event_consumer")),
    )
}
