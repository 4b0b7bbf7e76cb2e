//! Hardware Abstraction Layer for the EV3 brick
//!
//! Drivers for real bricks and the simulated backend both implement these
//! traits. Every handle is `Send` so it can be moved onto a worker thread.

use crate::error::LegoResult;
use std::fmt;

/// Motor output port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotorPort {
    A,
    B,
    C,
    D,
}

impl fmt::Display for MotorPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MotorPort::A => "A",
            MotorPort::B => "B",
            MotorPort::C => "C",
            MotorPort::D => "D",
        };
        write!(f, "{}", name)
    }
}

/// Sensor input port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorPort {
    S1,
    S2,
    S3,
    S4,
}

impl fmt::Display for SensorPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SensorPort::S1 => "S1",
            SensorPort::S2 => "S2",
            SensorPort::S3 => "S3",
            SensorPort::S4 => "S4",
        };
        write!(f, "{}", name)
    }
}

/// Brick status light patterns, numbered as the EV3 firmware numbers them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LedPattern {
    Off = 0,
    Green = 1,
    Red = 2,
    Orange = 3,
    GreenBlink = 4,
    RedBlink = 5,
    OrangeBlink = 6,
    GreenDoubleBlink = 7,
    RedDoubleBlink = 8,
    OrangeDoubleBlink = 9,
}

impl LedPattern {
    /// Numeric pattern code (0-9)
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Look up a pattern by its numeric code
    pub fn from_code(code: u8) -> Option<Self> {
        let pattern = match code {
            0 => LedPattern::Off,
            1 => LedPattern::Green,
            2 => LedPattern::Red,
            3 => LedPattern::Orange,
            4 => LedPattern::GreenBlink,
            5 => LedPattern::RedBlink,
            6 => LedPattern::OrangeBlink,
            7 => LedPattern::GreenDoubleBlink,
            8 => LedPattern::RedDoubleBlink,
            9 => LedPattern::OrangeDoubleBlink,
            _ => return None,
        };
        Some(pattern)
    }
}

/// Brick buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Escape,
}

/// Direction a regulated motor is currently driven in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorDirection {
    Forward,
    Backward,
    Stopped,
}

/// Speed-regulated motor with a tachometer
///
/// Speeds are in degrees per second, angles in degrees.
pub trait RegulatedMotor: Send {
    /// Port this motor is attached to
    fn port(&self) -> MotorPort;

    /// Set the regulated speed used by subsequent moves
    fn set_speed(&mut self, degrees_per_second: i32) -> LegoResult<()>;

    /// Currently configured speed
    fn speed(&self) -> i32;

    /// Run forward until told otherwise
    fn forward(&mut self) -> LegoResult<()>;

    /// Run backward until told otherwise
    fn backward(&mut self) -> LegoResult<()>;

    /// Stop and hold
    fn stop(&mut self) -> LegoResult<()>;

    /// Rotate by `degrees` relative to the current position
    ///
    /// With `immediate_return` false the call blocks until the move is done.
    fn rotate(&mut self, degrees: i32, immediate_return: bool) -> LegoResult<()>;

    /// Rotate to an absolute tachometer angle
    fn rotate_to(&mut self, angle: i32, immediate_return: bool) -> LegoResult<()>;

    /// Block until the current move has completed
    fn wait_complete(&mut self) -> LegoResult<()>;

    /// Tachometer position in degrees
    fn tacho_count(&self) -> i32;

    /// Zero the tachometer
    fn reset_tacho_count(&mut self) -> LegoResult<()>;

    /// Whether a move is in progress
    fn is_moving(&self) -> bool;

    fn direction(&self) -> MotorDirection;
}

/// Distance sensor returning one sample in meters
///
/// A non-finite sample (normally +infinity) means no echo was received.
pub trait DistanceSensor: Send {
    fn port(&self) -> SensorPort;

    /// Fetch one distance sample in meters
    fn fetch_sample(&mut self) -> LegoResult<f32>;

    /// Switch the sensor off
    fn disable(&mut self) -> LegoResult<()>;
}

/// Brick LCD, addressed in text cells
pub trait Lcd: Send {
    fn clear(&mut self) -> LegoResult<()>;

    fn draw_string(&mut self, text: &str, x: u32, y: u32) -> LegoResult<()>;
}

/// Brick status light
pub trait StatusLight: Send {
    fn set_pattern(&mut self, pattern: LedPattern) -> LegoResult<()>;
}

/// Brick buttons
pub trait Keys: Send {
    /// Block until any button is pressed and return it
    fn wait_for_any_press(&mut self) -> LegoResult<Button>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_led_pattern_codes_roundtrip() {
        for code in 0..=9 {
            let pattern = LedPattern::from_code(code).unwrap();
            assert_eq!(pattern.code(), code);
        }
        assert_eq!(LedPattern::from_code(10), None);
    }

    #[test]
    fn test_port_display() {
        assert_eq!(MotorPort::B.to_string(), "B");
        assert_eq!(SensorPort::S4.to_string(), "S4");
    }
}
