//! Simulated EV3 brick
//!
//! Every simulated device writes the calls it receives into one shared
//! [`EventLog`], so a test (or the console binary) can see exactly what the
//! robot program asked the hardware to do and in which order.

pub mod event_log;
pub mod keys;
pub mod lcd;
pub mod light;
pub mod motor;
pub mod ultrasonic;

pub use event_log::{EventLog, HardwareEvent, MotorCommand};
pub use keys::{ChannelKeys, ScriptedKeys};
pub use lcd::{SimLcd, LCD_COLUMNS, LCD_ROWS};
pub use light::SimLight;
pub use motor::SimMotor;
pub use ultrasonic::{ScriptEnd, ScriptedUltrasonic};

use legomind_core::hal::{MotorPort, SensorPort};

/// Port wiring of the robot: drive motors on B and C, ultrasonic on S4
pub const LEFT_MOTOR_PORT: MotorPort = MotorPort::B;
pub const RIGHT_MOTOR_PORT: MotorPort = MotorPort::C;
pub const ULTRASONIC_PORT: SensorPort = SensorPort::S4;

/// A full set of simulated devices sharing one event log
pub struct SimBrick {
    pub log: EventLog,
    pub left: SimMotor,
    pub right: SimMotor,
    pub sensor: ScriptedUltrasonic,
    pub lcd: SimLcd,
    pub light: SimLight,
}

impl SimBrick {
    /// Build a brick whose sensor replays `distances` (meters), then reports no echo
    pub fn new(distances: Vec<f32>) -> Self {
        Self::with_log(distances, EventLog::new())
    }

    /// Like [`SimBrick::new`], recording into `log` (e.g. an [`EventLog::bounded`] one)
    pub fn with_log(distances: Vec<f32>, log: EventLog) -> Self {
        Self {
            left: SimMotor::new(LEFT_MOTOR_PORT, log.clone()),
            right: SimMotor::new(RIGHT_MOTOR_PORT, log.clone()),
            sensor: ScriptedUltrasonic::new(ULTRASONIC_PORT, distances, log.clone()),
            lcd: SimLcd::new(log.clone()),
            light: SimLight::new(log.clone()),
            log,
        }
    }

    /// Change what the sensor does once its script is exhausted
    pub fn with_script_end(mut self, end: ScriptEnd) -> Self {
        self.sensor = self.sensor.with_end(end);
        self
    }

    /// Make motor moves take real time
    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.left = self.left.with_realtime(realtime);
        self.right = self.right.with_realtime(realtime);
        self
    }
}
