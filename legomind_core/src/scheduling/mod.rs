//! Thread-per-node execution.
//!
//! The robot program runs exactly one background node (the reflex loop) next
//! to the controller thread, so instead of a multi-node scheduler this module
//! provides a worker that owns a single node and ticks it at a fixed interval.

pub mod worker;

pub use worker::{
    NodeWorker, StopHandle, WorkerConfig, WorkerHandle, WorkerReport, DEFAULT_TICK_INTERVAL,
};
