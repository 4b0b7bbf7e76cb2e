//! # Core types and traits for LEGOMIND
//!
//! - **Node**: The base trait for every unit of work run by a worker thread
//! - **NodeInfo**: Runtime context (state, metrics, logging, params) handed to nodes
//!
//! ## Node Lifecycle
//!
//! 1. **Construction** - Node is created with its hardware handles and configuration
//! 2. **Initialization** - `init()` is called once on the worker thread
//! 3. **Execution** - `tick()` is called once per sampling interval
//! 4. **Shutdown** - `shutdown()` is called after the stop flag is observed

pub mod node;
pub mod node_info_ext;

pub use node::{LogSummary, Node, NodeConfig, NodeInfo, NodeMetrics, NodeState};
pub use node_info_ext::NodeInfoExt;
