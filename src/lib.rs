#![forbid(unsafe_code)]

//! `benchdash`: session state engine for a benchmark-workload console.
//!
//! Merges full-state pushes, setup progress events, and optimistic local
//! actions into one consistent view of a fleet of long-running benchmarks.

pub mod channel;
pub mod clock;
pub mod config;
pub mod driver;
pub mod engine;
pub mod errors;
pub mod models;
pub mod orchestrator;
pub mod presenter;

pub use config::GlobalConfig;
pub use engine::SessionEngine;
pub use errors::{AppError, Result};
