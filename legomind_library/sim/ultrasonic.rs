use super::event_log::{EventLog, HardwareEvent};
use legomind_core::hal::{DistanceSensor, SensorPort};
use legomind_core::{LegoError, LegoResult};

/// What the scripted sensor returns once its script runs out
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptEnd {
    /// Start over from the first sample
    Cycle,
    /// Keep returning the last sample
    HoldLast,
    /// Report no echo (+infinity)
    NoEcho,
}

/// Simulated ultrasonic sensor replaying a fixed list of samples (meters)
pub struct ScriptedUltrasonic {
    port: SensorPort,
    script: Vec<f32>,
    position: usize,
    end: ScriptEnd,
    enabled: bool,
    log: EventLog,
}

impl ScriptedUltrasonic {
    pub fn new(port: SensorPort, script: Vec<f32>, log: EventLog) -> Self {
        Self {
            port,
            script,
            position: 0,
            end: ScriptEnd::NoEcho,
            enabled: true,
            log,
        }
    }

    pub fn with_end(mut self, end: ScriptEnd) -> Self {
        self.end = end;
        self
    }

    fn next_sample(&mut self) -> f32 {
        if let Some(&sample) = self.script.get(self.position) {
            self.position += 1;
            return sample;
        }
        match self.end {
            ScriptEnd::Cycle if !self.script.is_empty() => {
                self.position = 1;
                self.script[0]
            }
            ScriptEnd::HoldLast => self.script.last().copied().unwrap_or(f32::INFINITY),
            _ => f32::INFINITY,
        }
    }
}

impl DistanceSensor for ScriptedUltrasonic {
    fn port(&self) -> SensorPort {
        self.port
    }

    fn fetch_sample(&mut self) -> LegoResult<f32> {
        if !self.enabled {
            return Err(LegoError::hardware(
                format!("ultrasonic sensor {}", self.port),
                "sample requested after disable",
            ));
        }
        let meters = self.next_sample();
        self.log.record(HardwareEvent::Sample {
            port: self.port,
            meters,
        });
        Ok(meters)
    }

    fn disable(&mut self) -> LegoResult<()> {
        self.enabled = false;
        self.log.record(HardwareEvent::SensorDisabled(self.port));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(sensor: &mut ScriptedUltrasonic, n: usize) -> Vec<f32> {
        (0..n).map(|_| sensor.fetch_sample().unwrap()).collect()
    }

    #[test]
    fn test_script_end_modes() {
        let log = EventLog::new();
        let mut cycle = ScriptedUltrasonic::new(SensorPort::S4, vec![0.1, 0.2], log.clone())
            .with_end(ScriptEnd::Cycle);
        assert_eq!(samples(&mut cycle, 5), vec![0.1, 0.2, 0.1, 0.2, 0.1]);

        let mut hold = ScriptedUltrasonic::new(SensorPort::S4, vec![0.1, 0.2], log.clone())
            .with_end(ScriptEnd::HoldLast);
        assert_eq!(samples(&mut hold, 3), vec![0.1, 0.2, 0.2]);

        let mut no_echo = ScriptedUltrasonic::new(SensorPort::S4, vec![0.1], log.clone());
        assert_eq!(no_echo.fetch_sample().unwrap(), 0.1);
        assert!(no_echo.fetch_sample().unwrap().is_infinite());

        assert_eq!(log.sample_count(), 10);
    }

    #[test]
    fn test_empty_cycle_reports_no_echo() {
        let mut sensor = ScriptedUltrasonic::new(SensorPort::S1, Vec::new(), EventLog::new())
            .with_end(ScriptEnd::Cycle);
        assert!(sensor.fetch_sample().unwrap().is_infinite());
    }

    #[test]
    fn test_disabled_sensor_errors() {
        let log = EventLog::new();
        let mut sensor = ScriptedUltrasonic::new(SensorPort::S4, vec![0.3], log.clone());
        sensor.disable().unwrap();
        assert!(sensor.fetch_sample().is_err());
        assert!(log.contains(&HardwareEvent::SensorDisabled(SensorPort::S4)));
    }
}
