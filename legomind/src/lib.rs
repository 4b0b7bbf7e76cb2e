//! # LEGOMIND - EV3 obstacle-avoidance robot program
//!
//! Drives a two-wheeled LEGO Mindstorms EV3 robot that slows down when an
//! obstacle gets close and turns away when it gets too close, using an
//! ultrasonic distance sensor.
//!
//! ## Quick Start
//!
//! ```rust
//! use legomind::prelude::*;
//! use legomind::library::sim::{ScriptedKeys, SimBrick};
//!
//! let brick = SimBrick::new(vec![0.30, 0.30, 0.08]);
//! let keys = ScriptedKeys::new(brick.log.clone())
//!     .press_after(Duration::from_millis(50), Button::Enter);
//! let hardware = ReflexHardware {
//!     drive: DriveMotors::new(Box::new(brick.left), Box::new(brick.right)),
//!     sensor: Box::new(brick.sensor),
//!     lcd: Box::new(brick.lcd),
//!     light: Box::new(brick.light),
//! };
//!
//! let mut reflex = ReflexConfig::default();
//! reflex.sample_interval_ms = 5;
//! let app = Ev3App::with_config(hardware, Box::new(keys), reflex, DemoConfig::instant()).unwrap();
//! let summary = app.run(RunOptions::reflex_only()).unwrap();
//! assert!(summary.reflex.is_some());
//! ```
//!
//! ## Crates
//!
//! - [`legomind_core`]: nodes, worker threads, runtime params, HAL traits
//! - [`legomind_library`]: messages, the reflex and probe nodes, demos, simulated brick

pub mod app;

// Re-export core components
pub use legomind_core::{self, *};

// Re-export standard library with alias
pub use legomind_library as library;

pub use app::{Ev3App, ReflexRun, RunOptions, RunSummary};

/// The LEGOMIND prelude - everything needed to wire up a robot program
pub mod prelude {
    // Core node types
    pub use legomind_core::core::node::NodeConfig;
    pub use legomind_core::core::{Node, NodeInfo, NodeInfoExt, NodeState};

    // Scheduling
    pub use legomind_core::scheduling::{NodeWorker, StopHandle, WorkerConfig, WorkerHandle};

    // Hardware abstraction
    pub use legomind_core::hal::{
        Button, DistanceSensor, Keys, Lcd, LedPattern, MotorPort, RegulatedMotor, SensorPort,
        StatusLight,
    };

    // Configuration
    pub use legomind_core::params::RuntimeParams;

    // Error types
    pub use legomind_core::error::{LegoError, LegoResult};
    pub type Result<T> = LegoResult<T>;

    // Common std types
    pub use std::sync::{Arc, Mutex};
    pub use std::time::{Duration, Instant};

    // Common traits
    pub use serde::{Deserialize, Serialize};

    // Re-export anyhow for error handling
    pub use anyhow::{anyhow, bail, ensure, Context, Result as AnyResult};

    // Robot building blocks
    pub use legomind_library::messages::*;
    pub use legomind_library::{
        DemoConfig, DriveMotors, MotorDemo, ReflexConfig, ReflexHardware, ReflexNode,
        ReflexOutcome, ReflexStats, SensorProbeNode,
    };

    // Lifecycle controller
    pub use crate::app::{Ev3App, RunOptions, RunSummary};
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get LEGOMIND version
pub fn version() -> &'static str {
    VERSION
}
