//! One-shot demonstration routines run before the reflex loop starts.
//!
//! They exercise the motor primitives one at a time so the behaviour of
//! relative and absolute moves can be watched on the robot.

pub mod motor_demo;

pub use motor_demo::{DemoConfig, MotorDemo};
