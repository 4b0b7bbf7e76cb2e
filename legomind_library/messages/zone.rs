//! Proximity zones derived from distance readings

use super::distance::{DistanceReading, ZoneThresholds};
use legomind_core::core::LogSummary;
use legomind_core::hal::LedPattern;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Obstacle proximity band, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProximityZone {
    Normal,
    Warning,
    Critical,
}

impl ProximityZone {
    pub const ALL: [ProximityZone; 3] = [
        ProximityZone::Normal,
        ProximityZone::Warning,
        ProximityZone::Critical,
    ];

    /// Classify a centimeter distance
    ///
    /// Returns `None` outside `(min_cm, max_cm]`; callers skip actuation then.
    pub fn classify(cm: i32, thresholds: &ZoneThresholds) -> Option<Self> {
        if !thresholds.in_range(cm) {
            None
        } else if cm <= thresholds.critical_cm {
            Some(ProximityZone::Critical)
        } else if cm <= thresholds.warning_cm {
            Some(ProximityZone::Warning)
        } else {
            Some(ProximityZone::Normal)
        }
    }

    /// Classify a reading; no echo never has a zone
    pub fn classify_reading(reading: &DistanceReading, thresholds: &ZoneThresholds) -> Option<Self> {
        reading
            .centimeters
            .and_then(|cm| Self::classify(cm, thresholds))
    }

    /// Blinking light shown while the reflex loop is in this zone
    pub fn indicator(self) -> LedPattern {
        match self {
            ProximityZone::Normal => LedPattern::GreenBlink,
            ProximityZone::Critical => LedPattern::RedBlink,
            ProximityZone::Warning => LedPattern::OrangeBlink,
        }
    }

    /// Steady light used by the sensor probe
    pub fn steady_indicator(self) -> LedPattern {
        match self {
            ProximityZone::Normal => LedPattern::Green,
            ProximityZone::Critical => LedPattern::Red,
            ProximityZone::Warning => LedPattern::Orange,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProximityZone::Normal => "Normal",
            ProximityZone::Warning => "Warning",
            ProximityZone::Critical => "Critical",
        }
    }

    fn to_raw(zone: Option<Self>) -> u8 {
        match zone {
            None => 0,
            Some(ProximityZone::Normal) => 1,
            Some(ProximityZone::Warning) => 2,
            Some(ProximityZone::Critical) => 3,
        }
    }

    fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(ProximityZone::Normal),
            2 => Some(ProximityZone::Warning),
            3 => Some(ProximityZone::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for ProximityZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl LogSummary for ProximityZone {
    fn log_summary(&self) -> String {
        self.as_str().to_string()
    }
}

/// Last zone acted on, readable from any thread
///
/// Starts unset so the first actionable reading always actuates.
#[derive(Debug, Default)]
pub struct ZoneCell(AtomicU8);

impl ZoneCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(0))
    }

    pub fn load(&self) -> Option<ProximityZone> {
        ProximityZone::from_raw(self.0.load(Ordering::Relaxed))
    }

    pub fn store(&self, zone: Option<ProximityZone>) {
        self.0.store(ProximityZone::to_raw(zone), Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_bands() {
        let t = ZoneThresholds::default();
        for cm in 4..=10 {
            assert_eq!(ProximityZone::classify(cm, &t), Some(ProximityZone::Critical), "{}", cm);
        }
        for cm in 11..=20 {
            assert_eq!(ProximityZone::classify(cm, &t), Some(ProximityZone::Warning), "{}", cm);
        }
        for cm in [21, 100, 250] {
            assert_eq!(ProximityZone::classify(cm, &t), Some(ProximityZone::Normal), "{}", cm);
        }
    }

    #[test]
    fn test_classify_out_of_range() {
        let t = ZoneThresholds::default();
        for cm in [i32::MIN, -5, 0, 2, 3, 251, 1000, i32::MAX] {
            assert_eq!(ProximityZone::classify(cm, &t), None, "{}", cm);
        }
    }

    #[test]
    fn test_classify_reading_without_echo() {
        let t = ZoneThresholds::default();
        assert_eq!(ProximityZone::classify_reading(&DistanceReading::no_echo(), &t), None);
        assert_eq!(
            ProximityZone::classify_reading(&DistanceReading::from_meters(0.15), &t),
            Some(ProximityZone::Warning)
        );
    }

    #[test]
    fn test_severity_order() {
        assert!(ProximityZone::Normal < ProximityZone::Warning);
        assert!(ProximityZone::Warning < ProximityZone::Critical);
    }

    #[test]
    fn test_indicator_codes() {
        assert_eq!(ProximityZone::Normal.indicator().code(), 4);
        assert_eq!(ProximityZone::Critical.indicator().code(), 5);
        assert_eq!(ProximityZone::Warning.indicator().code(), 6);
        assert_eq!(ProximityZone::Normal.steady_indicator().code(), 1);
        assert_eq!(ProximityZone::Critical.steady_indicator().code(), 2);
        assert_eq!(ProximityZone::Warning.steady_indicator().code(), 3);
    }

    #[test]
    fn test_zone_cell() {
        let cell = ZoneCell::new();
        assert_eq!(cell.load(), None);
        for zone in ProximityZone::ALL {
            cell.store(Some(zone));
            assert_eq!(cell.load(), Some(zone));
        }
        cell.store(None);
        assert_eq!(cell.load(), None);
    }
}
