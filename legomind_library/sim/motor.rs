use super::event_log::{EventLog, HardwareEvent, MotorCommand};
use legomind_core::hal::{MotorDirection, MotorPort, RegulatedMotor};
use legomind_core::{LegoError, LegoResult};
use std::time::{Duration, Instant};

/// Simulated EV3 large motor
///
/// Position moves complete instantly unless real-time mode is on, in which
/// case a move lasts `|degrees| / speed` seconds and blocking calls sleep.
pub struct SimMotor {
    port: MotorPort,
    speed: i32,
    direction: MotorDirection,
    tacho: i32,
    move_deadline: Option<Instant>,
    realtime: bool,
    // Fault injection: fail every command once this many have succeeded
    fail_after: Option<usize>,
    panic_after: Option<usize>,
    commands: usize,
    log: EventLog,
}

impl SimMotor {
    pub fn new(port: MotorPort, log: EventLog) -> Self {
        Self {
            port,
            speed: 0,
            direction: MotorDirection::Stopped,
            tacho: 0,
            move_deadline: None,
            realtime: false,
            fail_after: None,
            panic_after: None,
            commands: 0,
            log,
        }
    }

    /// Make position moves take as long as they would on the brick
    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    /// Fail every command after `commands` successful ones
    pub fn failing_after(mut self, commands: usize) -> Self {
        self.fail_after = Some(commands);
        self
    }

    /// Panic on the first command after `commands` successful ones
    pub fn panicking_after(mut self, commands: usize) -> Self {
        self.panic_after = Some(commands);
        self
    }

    fn command(&mut self, command: MotorCommand) -> LegoResult<()> {
        if self.panic_after.is_some_and(|limit| self.commands >= limit) {
            panic!("motor {} driver crashed on {:?}", self.port, command);
        }
        if let Some(limit) = self.fail_after {
            if self.commands >= limit {
                return Err(LegoError::hardware(
                    format!("motor {}", self.port),
                    format!("no response to {:?}", command),
                ));
            }
        }
        self.commands += 1;
        log::trace!("motor {}: {:?}", self.port, command);
        self.log.record(HardwareEvent::Motor {
            port: self.port,
            command,
        });
        Ok(())
    }

    fn start_move(&mut self, degrees: i32, immediate_return: bool) -> LegoResult<()> {
        self.tacho += degrees;
        self.direction = MotorDirection::Stopped;
        self.move_deadline = if self.realtime && self.speed > 0 {
            let secs = f64::from(degrees.unsigned_abs()) / f64::from(self.speed);
            Some(Instant::now() + Duration::from_secs_f64(secs))
        } else {
            None
        };
        if !immediate_return {
            self.finish_move();
        }
        Ok(())
    }

    fn finish_move(&mut self) {
        if let Some(deadline) = self.move_deadline.take() {
            let now = Instant::now();
            if deadline > now {
                std::thread::sleep(deadline - now);
            }
        }
    }
}

impl RegulatedMotor for SimMotor {
    fn port(&self) -> MotorPort {
        self.port
    }

    fn set_speed(&mut self, degrees_per_second: i32) -> LegoResult<()> {
        self.command(MotorCommand::SetSpeed(degrees_per_second))?;
        self.speed = degrees_per_second.abs();
        Ok(())
    }

    fn speed(&self) -> i32 {
        self.speed
    }

    fn forward(&mut self) -> LegoResult<()> {
        self.command(MotorCommand::Forward)?;
        self.move_deadline = None;
        self.direction = MotorDirection::Forward;
        Ok(())
    }

    fn backward(&mut self) -> LegoResult<()> {
        self.command(MotorCommand::Backward)?;
        self.move_deadline = None;
        self.direction = MotorDirection::Backward;
        Ok(())
    }

    fn stop(&mut self) -> LegoResult<()> {
        self.command(MotorCommand::Stop)?;
        self.move_deadline = None;
        self.direction = MotorDirection::Stopped;
        Ok(())
    }

    fn rotate(&mut self, degrees: i32, immediate_return: bool) -> LegoResult<()> {
        self.command(MotorCommand::Rotate {
            degrees,
            immediate: immediate_return,
        })?;
        self.start_move(degrees, immediate_return)
    }

    fn rotate_to(&mut self, angle: i32, immediate_return: bool) -> LegoResult<()> {
        self.command(MotorCommand::RotateTo {
            angle,
            immediate: immediate_return,
        })?;
        let delta = angle - self.tacho;
        self.start_move(delta, immediate_return)
    }

    fn wait_complete(&mut self) -> LegoResult<()> {
        self.command(MotorCommand::WaitComplete)?;
        self.finish_move();
        Ok(())
    }

    fn tacho_count(&self) -> i32 {
        self.tacho
    }

    fn reset_tacho_count(&mut self) -> LegoResult<()> {
        self.command(MotorCommand::ResetTacho)?;
        self.tacho = 0;
        Ok(())
    }

    fn is_moving(&self) -> bool {
        self.direction != MotorDirection::Stopped
            || self
                .move_deadline
                .is_some_and(|deadline| deadline > Instant::now())
    }

    fn direction(&self) -> MotorDirection {
        self.direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_and_absolute_rotation() {
        let log = EventLog::new();
        let mut motor = SimMotor::new(MotorPort::C, log.clone());

        motor.rotate(360, false).unwrap();
        motor.rotate(360, false).unwrap();
        assert_eq!(motor.tacho_count(), 720);

        motor.rotate_to(360, false).unwrap();
        assert_eq!(motor.tacho_count(), 360);
        // Already there: rotate_to is a no-op move
        motor.rotate_to(360, false).unwrap();
        assert_eq!(motor.tacho_count(), 360);

        motor.reset_tacho_count().unwrap();
        assert_eq!(motor.tacho_count(), 0);
        assert_eq!(log.commands_for(MotorPort::C).len(), 5);
    }

    #[test]
    fn test_direction_tracking() {
        let mut motor = SimMotor::new(MotorPort::B, EventLog::new());
        assert!(!motor.is_moving());
        motor.forward().unwrap();
        assert_eq!(motor.direction(), MotorDirection::Forward);
        assert!(motor.is_moving());
        motor.backward().unwrap();
        assert_eq!(motor.direction(), MotorDirection::Backward);
        motor.stop().unwrap();
        assert!(!motor.is_moving());
    }

    #[test]
    fn test_realtime_blocking_rotate_takes_time() {
        let mut motor = SimMotor::new(MotorPort::B, EventLog::new()).with_realtime(true);
        motor.set_speed(1000).unwrap();

        let started = Instant::now();
        motor.rotate(50, false).unwrap();
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert!(!motor.is_moving());

        motor.rotate(1000, true).unwrap();
        assert!(motor.is_moving());
        motor.wait_complete().unwrap();
        assert!(!motor.is_moving());
    }

    #[test]
    fn test_fault_injection() {
        let mut motor = SimMotor::new(MotorPort::B, EventLog::new()).failing_after(1);
        motor.set_speed(400).unwrap();
        let err = motor.forward().unwrap_err();
        assert!(matches!(err, LegoError::Hardware { .. }));
    }

    #[test]
    #[should_panic(expected = "driver crashed")]
    fn test_panic_injection() {
        let mut motor = SimMotor::new(MotorPort::B, EventLog::new()).panicking_after(1);
        motor.set_speed(400).unwrap();
        let _ = motor.forward();
    }
}
