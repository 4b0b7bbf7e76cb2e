//! # LEGOMIND Library
//!
//! Robot-level building blocks on top of `legomind_core`.
//!
//! ## Structure
//!
//! ```text
//! legomind_library/
//! ── messages/       # Distance readings, zone thresholds, proximity zones
//! ── nodes/          # Reflex loop and sensor probe
//! ── demos/          # One-shot motor demonstrations
//! ── sim/            # Simulated EV3 brick with an inspectable event log
//! ```

pub mod demos;
pub mod messages;
pub mod nodes;
pub mod sim;

// Re-export core traits needed for message types
pub use legomind_core::core::LogSummary;

// Re-export message types at the crate root for convenience
pub use messages::*;

pub use demos::{DemoConfig, MotorDemo};
pub use nodes::{
    DriveMotors, ReflexConfig, ReflexHardware, ReflexNode, ReflexOutcome, ReflexStats,
    SensorProbeNode,
};
