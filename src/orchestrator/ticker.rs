//! Fixed-interval refresh tick for runtime estimates.
//!
//! The tick never touches runtime baselines; it only asks the controller
//! to re-render while benchmarks are running, so the displayed runtime
//! advances between the server's status pushes. Runs on tokio time, so
//! tests drive it with a paused runtime instead of real waits.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, Instrument};

use super::controller::SessionController;

/// Builder for the refresh ticker.
///
/// Call [`spawn`](Self::spawn) to start the background task.
pub struct RuntimeTicker {
    period: Duration,
    controller: Arc<SessionController>,
    cancel: CancellationToken,
}

impl RuntimeTicker {
    /// Construct a ticker (does not start it yet).
    #[must_use]
    pub fn new(
        period: Duration,
        controller: Arc<SessionController>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            period,
            controller,
            cancel,
        }
    }

    /// Spawn the background tick task and return a handle for it.
    #[must_use]
    pub fn spawn(self) -> RuntimeTickerHandle {
        let ticks = Arc::new(AtomicU64::new(0));
        let renders = Arc::new(AtomicU64::new(0));
        let cancel_for_handle = self.cancel.clone();

        let join_handle = tokio::spawn(
            Self::run(
                self.period,
                self.controller,
                self.cancel,
                Arc::clone(&ticks),
                Arc::clone(&renders),
            )
            .instrument(info_span!("runtime_ticker")),
        );

        RuntimeTickerHandle {
            ticks,
            renders,
            join_handle: Some(join_handle),
            cancel: cancel_for_handle,
        }
    }

    async fn run(
        period: Duration,
        controller: Arc<SessionController>,
        cancel: CancellationToken,
        ticks: Arc<AtomicU64>,
        renders: Arc<AtomicU64>,
    ) {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!("runtime ticker cancelled");
                    return;
                }
                _ = interval.tick() => {}
            }

            ticks.fetch_add(1, Ordering::SeqCst);
            if controller.tick().await {
                renders.fetch_add(1, Ordering::SeqCst);
            }
        }
    }
}

/// Handle returned from [`RuntimeTicker::spawn`].
pub struct RuntimeTickerHandle {
    ticks: Arc<AtomicU64>,
    renders: Arc<AtomicU64>,
    join_handle: Option<JoinHandle<()>>,
    cancel: CancellationToken,
}

impl Drop for RuntimeTickerHandle {
    /// Cancel the background task when the handle is dropped.
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl RuntimeTickerHandle {
    /// Ticks elapsed since spawn.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    /// Ticks that produced a render.
    #[must_use]
    pub fn renders(&self) -> u64 {
        self.renders.load(Ordering::SeqCst)
    }

    /// Stop the ticker and wait for its task to exit.
    pub async fn await_completion(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.await;
        }
    }
}
