use crate::nodes::DriveMotors;
use legomind_core::hal::{LedPattern, Lcd, RegulatedMotor, StatusLight};
use legomind_core::{LegoError, LegoResult, RuntimeParams};
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;

/// Timing of the demo routines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// How long each continuous run lasts
    pub step_ms: u64,
    /// Pause between two position moves
    pub pause_ms: u64,
    /// Speed used when backing up (deg/s)
    pub reverse_speed: i32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            step_ms: 3000,
            pause_ms: 1000,
            reverse_speed: 100,
        }
    }
}

impl DemoConfig {
    pub fn from_params(params: &RuntimeParams) -> LegoResult<Self> {
        let defaults = Self::default();
        let config = Self {
            step_ms: params.get_u64("demo_step_ms", defaults.step_ms),
            pause_ms: params.get_u64("demo_pause_ms", defaults.pause_ms),
            reverse_speed: params.get_i32("demo_reverse_speed", defaults.reverse_speed),
        };
        if config.reverse_speed <= 0 {
            return Err(LegoError::config(format!(
                "reverse speed must be positive (got {})",
                config.reverse_speed
            )));
        }
        Ok(config)
    }

    /// Demo settings that skip all waiting, for tests and dry runs
    pub fn instant() -> Self {
        Self {
            step_ms: 0,
            pause_ms: 0,
            ..Default::default()
        }
    }

    fn step(&self) -> Duration {
        Duration::from_millis(self.step_ms)
    }

    fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }
}

/// Runs the motor demonstrations against borrowed hardware
pub struct MotorDemo {
    config: DemoConfig,
}

impl MotorDemo {
    pub fn new(config: DemoConfig) -> Self {
        Self { config }
    }

    /// Greeting on the LCD with a steady green light
    pub fn hello_world(&self, lcd: &mut dyn Lcd, light: &mut dyn StatusLight) -> LegoResult<()> {
        lcd.draw_string("Hello World", 0, 0)?;
        light.set_pattern(LedPattern::Green)
    }

    /// Forward for one step, then slowly backward for one step
    pub fn forward_and_back(&self, motor: &mut dyn RegulatedMotor) -> LegoResult<()> {
        log::info!("Demo: motor {} forward, then back", motor.port());
        motor.forward()?;
        thread::sleep(self.config.step());
        motor.stop()?;
        motor.set_speed(self.config.reverse_speed)?;
        motor.backward()?;
        thread::sleep(self.config.step());
        motor.stop()
    }

    /// Relative moves: each `rotate(360)` turns a further full turn, `rotate(0)` does nothing
    pub fn rotate_relative(&self, motor: &mut dyn RegulatedMotor) -> LegoResult<()> {
        log::info!("Demo: motor {} relative rotation", motor.port());
        motor.rotate(360, false)?;
        thread::sleep(self.config.pause());
        motor.rotate(360, false)?;
        thread::sleep(self.config.pause());
        motor.rotate(0, false)
    }

    /// Absolute moves: the second `rotate_to(360)` is already there, `rotate_to(0)` goes back
    pub fn rotate_absolute(&self, motor: &mut dyn RegulatedMotor) -> LegoResult<()> {
        log::info!("Demo: motor {} absolute rotation", motor.port());
        motor.rotate_to(360, false)?;
        thread::sleep(self.config.pause());
        motor.rotate_to(360, false)?;
        thread::sleep(self.config.pause());
        motor.rotate_to(0, false)
    }

    /// Relative on the left wheel and absolute on the right, blocking and immediate
    pub fn rotate_mixed(&self, drive: &mut DriveMotors) -> LegoResult<()> {
        log::info!("Demo: mixed blocking and immediate rotation");
        drive.left.rotate(360, false)?;
        drive.right.rotate_to(360, false)?;
        thread::sleep(self.config.pause());
        drive.left.rotate(360, true)?;
        drive.right.rotate_to(360, true)?;
        thread::sleep(self.config.pause());
        drive.left.rotate(360, false)?;
        drive.right.rotate_to(360, false)
    }

    /// Every demo in order
    pub fn run_all(
        &self,
        drive: &mut DriveMotors,
        lcd: &mut dyn Lcd,
        light: &mut dyn StatusLight,
    ) -> LegoResult<()> {
        self.hello_world(lcd, light)?;
        self.forward_and_back(drive.left.as_mut())?;
        self.rotate_relative(drive.left.as_mut())?;
        self.rotate_absolute(drive.right.as_mut())?;
        self.rotate_mixed(drive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{MotorCommand, SimBrick, LEFT_MOTOR_PORT, RIGHT_MOTOR_PORT};

    #[test]
    fn test_forward_and_back_commands() {
        let mut brick = SimBrick::new(vec![]);
        let demo = MotorDemo::new(DemoConfig::instant());
        demo.forward_and_back(&mut brick.left).unwrap();

        assert_eq!(
            brick.log.commands_for(LEFT_MOTOR_PORT),
            vec![
                MotorCommand::Forward,
                MotorCommand::Stop,
                MotorCommand::SetSpeed(100),
                MotorCommand::Backward,
                MotorCommand::Stop,
            ]
        );
    }

    #[test]
    fn test_relative_vs_absolute() {
        let mut brick = SimBrick::new(vec![]);
        let demo = MotorDemo::new(DemoConfig::instant());

        demo.rotate_relative(&mut brick.left).unwrap();
        assert_eq!(brick.left.tacho_count(), 720);

        demo.rotate_absolute(&mut brick.right).unwrap();
        assert_eq!(brick.right.tacho_count(), 0);
    }

    #[test]
    fn test_run_all_touches_both_motors() {
        let brick = SimBrick::new(vec![]);
        let log = brick.log.clone();
        let mut lcd = brick.lcd;
        let mut light = brick.light;
        let mut drive = DriveMotors::new(Box::new(brick.left), Box::new(brick.right));

        MotorDemo::new(DemoConfig::instant())
            .run_all(&mut drive, &mut lcd, &mut light)
            .unwrap();

        assert_eq!(log.lcd_texts(), vec!["Hello World"]);
        assert_eq!(log.led_patterns(), vec![LedPattern::Green]);
        assert_eq!(drive.left.tacho_count(), 360 * 5);
        assert_eq!(drive.right.tacho_count(), 360);
        assert!(!log.commands_for(RIGHT_MOTOR_PORT).is_empty());
    }

    #[test]
    fn test_config_from_params() {
        let params = RuntimeParams::new();
        params.set("demo_step_ms", 10).unwrap();
        let config = DemoConfig::from_params(&params).unwrap();
        assert_eq!(config.step_ms, 10);
        assert_eq!(config.pause_ms, 1000);
        assert_eq!(config.reverse_speed, 100);
    }

    #[test]
    fn test_reverse_speed_independent_of_slow_speed() {
        let params = RuntimeParams::new();
        params.set("slow_speed", 60).unwrap();
        assert_eq!(DemoConfig::from_params(&params).unwrap().reverse_speed, 100);

        params.set("demo_reverse_speed", 250).unwrap();
        assert_eq!(DemoConfig::from_params(&params).unwrap().reverse_speed, 250);
    }
}
