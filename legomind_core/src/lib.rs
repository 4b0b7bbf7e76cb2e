//! # LEGOMIND Core
//!
//! The runtime underneath the LEGOMIND EV3 robot program.
//!
//! - **Nodes**: Units of work with an init / tick / shutdown lifecycle
//! - **Scheduling**: A worker that runs one node on its own thread with a cooperative stop flag
//! - **HAL**: Traits for motors, the distance sensor, LCD, status light and buttons
//! - **Params**: Runtime key-value configuration, loadable from YAML
//!
//! ## Quick Start
//!
//! ```rust
//! use legomind_core::{Node, NodeInfo, NodeWorker, WorkerConfig, LegoResult};
//!
//! struct Blink;
//!
//! impl Node for Blink {
//!     fn name(&self) -> &'static str { "blink" }
//!
//!     fn tick(&mut self, _ctx: Option<&mut NodeInfo>) -> LegoResult<()> {
//!         Ok(())
//!     }
//! }
//!
//! let worker = NodeWorker::spawn(Blink, WorkerConfig::default()).unwrap();
//! let report = worker.stop_and_join().unwrap();
//! assert!(report.outcome.is_ok());
//! ```

pub mod core;
pub mod error;
pub mod hal;
pub mod params;
pub mod scheduling;

// Re-export commonly used types for easy access
pub use core::{LogSummary, Node, NodeConfig, NodeInfo, NodeInfoExt, NodeMetrics, NodeState};
pub use error::{LegoError, LegoResult};
pub use params::RuntimeParams;
pub use scheduling::{NodeWorker, StopHandle, WorkerConfig, WorkerHandle, WorkerReport};
