use crate::messages::{DistanceReading, ProximityZone, ZoneThresholds};
use legomind_core::hal::{DistanceSensor, Lcd, StatusLight};
use legomind_core::{LegoResult, Node, NodeInfo, NodeInfoExt};
use std::time::Duration;

/// Sensor Probe Node - checks the ultrasonic sensor without moving
///
/// Shows each actionable reading on the LCD and lights the status LED
/// steady green, orange or red by zone. Readings without a zone leave the
/// display and light untouched. No motors are involved.
pub struct SensorProbeNode<'a> {
    sensor: &'a mut dyn DistanceSensor,
    lcd: &'a mut dyn Lcd,
    light: &'a mut dyn StatusLight,
    thresholds: ZoneThresholds,
    readings: Vec<DistanceReading>,
}

impl<'a> SensorProbeNode<'a> {
    pub fn new(
        sensor: &'a mut dyn DistanceSensor,
        lcd: &'a mut dyn Lcd,
        light: &'a mut dyn StatusLight,
        thresholds: ZoneThresholds,
    ) -> Self {
        Self {
            sensor,
            lcd,
            light,
            thresholds,
            readings: Vec::new(),
        }
    }

    /// Readings taken so far
    pub fn readings(&self) -> &[DistanceReading] {
        &self.readings
    }

    /// Take one reading and show it if it falls in a zone
    pub fn probe_once(&mut self) -> LegoResult<Option<ProximityZone>> {
        let reading = DistanceReading::from_meters(self.sensor.fetch_sample()?);
        self.readings.push(reading);

        let zone = ProximityZone::classify_reading(&reading, &self.thresholds);
        if let Some(zone) = zone {
            self.light.set_pattern(zone.steady_indicator())?;
            self.lcd.clear()?;
            self.lcd.draw_string(&reading.display_text(), 0, 0)?;
        }
        Ok(zone)
    }

    /// Probe `samples` times, pausing `interval` after each reading
    pub fn run(&mut self, samples: usize, interval: Duration) -> LegoResult<()> {
        let mut ctx = NodeInfo::new(self.name().to_string(), true);
        ctx.initialize()?;
        for _ in 0..samples {
            ctx.start_tick();
            self.tick(Some(&mut ctx))?;
            ctx.record_tick();
            std::thread::sleep(interval);
        }
        ctx.shutdown()
    }
}

impl Node for SensorProbeNode<'_> {
    fn name(&self) -> &'static str {
        "SensorProbeNode"
    }

    fn tick(&mut self, mut ctx: Option<&mut NodeInfo>) -> LegoResult<()> {
        let zone = self.probe_once()?;
        if let Some(reading) = self.readings.last() {
            ctx.log_debug(&format!(
                "{} -> {}",
                reading.display_text(),
                zone.map(|z| z.as_str()).unwrap_or("no zone")
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimBrick;
    use legomind_core::hal::LedPattern;

    #[test]
    fn test_probe_lights_steady_colours() {
        let mut brick = SimBrick::new(vec![0.5, 0.15, 0.05, 0.02, f32::INFINITY]);
        let mut probe = SensorProbeNode::new(
            &mut brick.sensor,
            &mut brick.lcd,
            &mut brick.light,
            ZoneThresholds::default(),
        );

        probe.run(5, Duration::ZERO).unwrap();
        assert_eq!(probe.readings().len(), 5);
        drop(probe);

        assert_eq!(
            brick.log.led_patterns(),
            vec![LedPattern::Green, LedPattern::Orange, LedPattern::Red]
        );
        assert_eq!(
            brick.log.lcd_texts(),
            vec!["Distance : 50", "Distance : 15", "Distance : 5"]
        );
        assert!(brick.log.motor_commands().is_empty());
    }

    #[test]
    fn test_probe_repeats_same_zone() {
        let mut brick = SimBrick::new(vec![0.15, 0.15]);
        let mut probe = SensorProbeNode::new(
            &mut brick.sensor,
            &mut brick.lcd,
            &mut brick.light,
            ZoneThresholds::default(),
        );
        assert_eq!(probe.probe_once().unwrap(), Some(ProximityZone::Warning));
        assert_eq!(probe.probe_once().unwrap(), Some(ProximityZone::Warning));
        drop(probe);

        // No change detection: the light is set on every reading
        assert_eq!(brick.log.led_patterns().len(), 2);
    }
}
