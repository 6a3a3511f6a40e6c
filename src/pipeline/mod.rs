//! Asynchronous pipeline around `analyze` and `apply`.
//!
//! ## Key Types
//!
//! - `Pipeline`: owns the authoritative state; spawned as one tokio task
//! - `PipelineHandle`: submit card batches, read updates/rejections, cancel
//! - `ActionSelector`: the injected decision layer choosing what to apply
//! - `spawn_analysis_stage`: state snapshots in, analyses out
//!
//! Tasks share nothing mutable. All communication goes through bounded
//! `tokio::sync::mpsc` queues and `watch` channels.

pub mod selector;
pub mod orchestrator;
pub mod handle;
pub mod stage;

pub use selector::{ActionSelector, AllForArrivals, FirstPerArrival, RandomPerArrival};
pub use orchestrator::{Phase, Pipeline, Rejection, Update};
pub use handle::{Outcome, PipelineHandle};
pub use stage::spawn_analysis_stage;
