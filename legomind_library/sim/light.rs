use super::event_log::{EventLog, HardwareEvent};
use legomind_core::hal::{LedPattern, StatusLight};
use legomind_core::LegoResult;

/// Simulated brick status light
pub struct SimLight {
    pattern: LedPattern,
    log: EventLog,
}

impl SimLight {
    pub fn new(log: EventLog) -> Self {
        Self {
            pattern: LedPattern::Off,
            log,
        }
    }

    pub fn pattern(&self) -> LedPattern {
        self.pattern
    }
}

impl StatusLight for SimLight {
    fn set_pattern(&mut self, pattern: LedPattern) -> LegoResult<()> {
        log::debug!("LED pattern {} ({:?})", pattern.code(), pattern);
        self.pattern = pattern;
        self.log.record(HardwareEvent::Led(pattern));
        Ok(())
    }
}
