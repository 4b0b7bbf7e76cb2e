use crate::messages::{DistanceReading, ProximityZone, ZoneCell, ZoneThresholds};
use legomind_core::core::LogSummary;
use legomind_core::hal::{DistanceSensor, Lcd, RegulatedMotor, StatusLight};
use legomind_core::{LegoError, LegoResult, Node, NodeInfo, NodeInfoExt, RuntimeParams};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Tunables of the reflex loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflexConfig {
    pub thresholds: ZoneThresholds,
    /// Drive speed in the normal zone (deg/s)
    pub cruise_speed: i32,
    /// Drive speed in the warning zone (deg/s)
    pub slow_speed: i32,
    /// Left-wheel rotation used to turn away from an obstacle (degrees)
    pub evade_angle: i32,
    pub sample_interval_ms: u64,
}

impl Default for ReflexConfig {
    fn default() -> Self {
        Self {
            thresholds: ZoneThresholds::default(),
            cruise_speed: 400,
            slow_speed: 100,
            evade_angle: 360 + 79,
            sample_interval_ms: 100,
        }
    }
}

impl ReflexConfig {
    /// Read the reflex settings from runtime params, falling back to defaults
    pub fn from_params(params: &RuntimeParams) -> LegoResult<Self> {
        let defaults = Self::default();
        let t = defaults.thresholds;
        let config = Self {
            thresholds: ZoneThresholds {
                min_cm: params.get_i32("min_range_cm", t.min_cm),
                critical_cm: params.get_i32("critical_cm", t.critical_cm),
                warning_cm: params.get_i32("warning_cm", t.warning_cm),
                max_cm: params.get_i32("max_range_cm", t.max_cm),
            },
            cruise_speed: params.get_i32("cruise_speed", defaults.cruise_speed),
            slow_speed: params.get_i32("slow_speed", defaults.slow_speed),
            evade_angle: params.get_i32("evade_angle_deg", defaults.evade_angle),
            sample_interval_ms: params.get_u64("sample_interval_ms", defaults.sample_interval_ms),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LegoResult<()> {
        self.thresholds.validate()?;
        if self.cruise_speed <= 0 || self.slow_speed <= 0 {
            return Err(LegoError::config(format!(
                "drive speeds must be positive (cruise {}, slow {})",
                self.cruise_speed, self.slow_speed
            )));
        }
        if self.sample_interval_ms == 0 {
            return Err(LegoError::config("sample_interval_ms must be at least 1"));
        }
        Ok(())
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }
}

/// The two drive wheels
pub struct DriveMotors {
    pub left: Box<dyn RegulatedMotor>,
    pub right: Box<dyn RegulatedMotor>,
}

impl DriveMotors {
    pub fn new(left: Box<dyn RegulatedMotor>, right: Box<dyn RegulatedMotor>) -> Self {
        Self { left, right }
    }

    pub fn set_speed(&mut self, degrees_per_second: i32) -> LegoResult<()> {
        self.left.set_speed(degrees_per_second)?;
        self.right.set_speed(degrees_per_second)
    }

    pub fn forward(&mut self) -> LegoResult<()> {
        self.left.forward()?;
        self.right.forward()
    }

    pub fn stop(&mut self) -> LegoResult<()> {
        self.left.stop()?;
        self.right.stop()
    }

    pub fn reset_tacho_counts(&mut self) -> LegoResult<()> {
        self.left.reset_tacho_count()?;
        self.right.reset_tacho_count()
    }
}

/// Everything the reflex loop drives or reads
pub struct ReflexHardware {
    pub drive: DriveMotors,
    pub sensor: Box<dyn DistanceSensor>,
    pub lcd: Box<dyn Lcd>,
    pub light: Box<dyn StatusLight>,
}

/// What one iteration of the loop did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflexOutcome {
    /// The sensor got no echo; only the display was refreshed
    NoEcho,
    /// The distance is outside the measurable range; only the display was refreshed
    OutOfRange(i32),
    /// Same zone as last time, nothing actuated
    Unchanged(ProximityZone),
    /// Zone changed and its policy was executed
    Actuated(ProximityZone),
}

/// Counters kept by the reflex loop
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReflexStats {
    pub samples: u64,
    pub missing: u64,
    pub out_of_range: u64,
    pub normal_actuations: u64,
    pub warning_actuations: u64,
    pub critical_actuations: u64,
    pub last_reading: Option<DistanceReading>,
}

impl ReflexStats {
    pub fn actuations(&self) -> u64 {
        self.normal_actuations + self.warning_actuations + self.critical_actuations
    }

    pub fn actuations_for(&self, zone: ProximityZone) -> u64 {
        match zone {
            ProximityZone::Normal => self.normal_actuations,
            ProximityZone::Warning => self.warning_actuations,
            ProximityZone::Critical => self.critical_actuations,
        }
    }

    fn count_actuation(&mut self, zone: ProximityZone) {
        match zone {
            ProximityZone::Normal => self.normal_actuations += 1,
            ProximityZone::Warning => self.warning_actuations += 1,
            ProximityZone::Critical => self.critical_actuations += 1,
        }
    }
}

/// Reflex Node - ultrasonic obstacle avoidance for a two-wheeled EV3 robot
///
/// Samples the distance sensor once per tick and maps the reading to a
/// [`ProximityZone`]. Motors are only commanded when the zone differs from
/// the last one acted on:
///
/// - Normal: both wheels at cruise speed, driving forward
/// - Warning: both wheels slowed down, direction unchanged
/// - Critical: stop, turn on the left wheel by `evade_angle`, drive on
///
/// The display is refreshed with the raw distance on every tick, before any
/// actuation.
pub struct ReflexNode {
    hardware: ReflexHardware,
    config: ReflexConfig,
    zone: Arc<ZoneCell>,
    stats: ReflexStats,
}

impl ReflexNode {
    pub fn new(hardware: ReflexHardware, config: ReflexConfig) -> Self {
        Self {
            hardware,
            config,
            zone: Arc::new(ZoneCell::new()),
            stats: ReflexStats::default(),
        }
    }

    pub fn config(&self) -> &ReflexConfig {
        &self.config
    }

    pub fn stats(&self) -> &ReflexStats {
        &self.stats
    }

    /// Zone last acted on, `None` until the first actionable reading
    pub fn current_zone(&self) -> Option<ProximityZone> {
        self.zone.load()
    }

    /// Shared view of the current zone for observers on other threads
    pub fn zone_cell(&self) -> Arc<ZoneCell> {
        self.zone.clone()
    }

    /// Give the hardware back, e.g. for teardown after the worker exits
    pub fn into_hardware(self) -> ReflexHardware {
        self.hardware
    }

    /// Run one sampling iteration (without the pause that follows it)
    pub fn step(&mut self, mut ctx: Option<&mut NodeInfo>) -> LegoResult<ReflexOutcome> {
        let meters = self.hardware.sensor.fetch_sample()?;
        let reading = DistanceReading::from_meters(meters);
        self.stats.samples += 1;
        self.stats.last_reading = Some(reading);

        self.hardware.lcd.clear()?;
        self.hardware.lcd.draw_string(&reading.display_text(), 0, 0)?;

        let Some(cm) = reading.centimeters else {
            self.stats.missing += 1;
            ctx.log_debug("No echo from ultrasonic sensor");
            return Ok(ReflexOutcome::NoEcho);
        };

        let Some(zone) = ProximityZone::classify(cm, &self.config.thresholds) else {
            self.stats.out_of_range += 1;
            ctx.log_debug(&format!("Reading {}cm outside measurable range", cm));
            return Ok(ReflexOutcome::OutOfRange(cm));
        };

        if self.zone.load() == Some(zone) {
            return Ok(ReflexOutcome::Unchanged(zone));
        }

        self.actuate(zone, &reading, ctx.as_deref_mut())?;
        self.zone.store(Some(zone));
        Ok(ReflexOutcome::Actuated(zone))
    }

    fn actuate(
        &mut self,
        zone: ProximityZone,
        reading: &DistanceReading,
        mut ctx: Option<&mut NodeInfo>,
    ) -> LegoResult<()> {
        ctx.log_info(&format!(
            "Zone {} -> {} at {}",
            self.zone.load().log_summary(),
            zone,
            reading.log_summary()
        ));

        self.hardware.light.set_pattern(zone.indicator())?;
        let drive = &mut self.hardware.drive;
        match zone {
            ProximityZone::Normal => {
                drive.set_speed(self.config.cruise_speed)?;
                drive.forward()?;
            }
            ProximityZone::Warning => {
                drive.set_speed(self.config.slow_speed)?;
            }
            ProximityZone::Critical => {
                drive.stop()?;
                drive.left.rotate(self.config.evade_angle, false)?;
                drive.left.wait_complete()?;
                drive.forward()?;
            }
        }
        self.stats.count_actuation(zone);
        Ok(())
    }
}

impl Node for ReflexNode {
    fn name(&self) -> &'static str {
        "ReflexNode"
    }

    fn init(&mut self, ctx: &mut NodeInfo) -> LegoResult<()> {
        let t = &self.config.thresholds;
        ctx.log_info(&format!(
            "Reflex loop started: critical <= {}cm, warning <= {}cm, range {}-{}cm, every {}ms",
            t.critical_cm, t.warning_cm, t.min_cm, t.max_cm, self.config.sample_interval_ms
        ));
        Ok(())
    }

    fn tick(&mut self, ctx: Option<&mut NodeInfo>) -> LegoResult<()> {
        self.step(ctx).map(|_| ())
    }

    fn shutdown(&mut self, ctx: &mut NodeInfo) -> LegoResult<()> {
        ctx.log_info(&format!(
            "Reflex loop stopped after {} samples ({} actuations, {} without echo, {} out of range)",
            self.stats.samples,
            self.stats.actuations(),
            self.stats.missing,
            self.stats.out_of_range
        ));
        Ok(())
    }
}
