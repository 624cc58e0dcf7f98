//! Session orchestration.
//!
//! Covers the presentation-facing controller, the inbound event consumer
//! task, and the runtime refresh ticker.

pub mod controller;
pub mod event_consumer;
pub mod ticker;

pub use controller::{SessionController, SharedEngine};
pub use event_consumer::spawn_event_consumer;
pub use ticker::{RuntimeTicker, RuntimeTickerHandle};
