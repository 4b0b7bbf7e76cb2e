//! LEGOMIND Nodes
//!
//! - `ReflexNode` - Ultrasonic obstacle avoidance driving the two wheel motors
//! - `SensorProbeNode` - Sensor check that only drives the LCD and status light
//!
//! # Usage Examples
//!
//! ```rust
//! use legomind_library::nodes::{DriveMotors, ReflexConfig, ReflexHardware, ReflexNode};
//! use legomind_library::sim::SimBrick;
//!
//! let brick = SimBrick::new(vec![0.30, 0.30, 0.08]);
//! let hardware = ReflexHardware {
//!     drive: DriveMotors::new(Box::new(brick.left), Box::new(brick.right)),
//!     sensor: Box::new(brick.sensor),
//!     lcd: Box::new(brick.lcd),
//!     light: Box::new(brick.light),
//! };
//! let mut reflex = ReflexNode::new(hardware, ReflexConfig::default());
//! for _ in 0..3 {
//!     reflex.step(None).unwrap();
//! }
//! assert_eq!(reflex.stats().actuations(), 2);
//! ```

pub mod reflex_node;
pub mod sensor_probe_node;

pub use reflex_node::{
    DriveMotors, ReflexConfig, ReflexHardware, ReflexNode, ReflexOutcome, ReflexStats,
};
pub use sensor_probe_node::SensorProbeNode;
