//! Distance readings from the ultrasonic sensor
//!
//! The sensor reports meters as `f32`; the robot reasons in whole
//! centimeters. A missing echo is modelled as `None` rather than a sentinel
//! number.

use legomind_core::core::LogSummary;
use legomind_core::{LegoError, LegoResult};
use serde::{Deserialize, Serialize};

/// Prefix of the distance line drawn on the LCD
pub const DISTANCE_LABEL: &str = "Distance : ";

/// One sensor sample converted to centimeters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceReading {
    /// Truncated centimeters, `None` when no echo came back
    pub centimeters: Option<i32>,
}

impl DistanceReading {
    /// Convert a raw sample in meters
    ///
    /// `value * 100` truncated toward zero. NaN and infinities mean no echo.
    /// Finite values too large for `i32` saturate and end up out of range.
    pub fn from_meters(meters: f32) -> Self {
        let centimeters = if meters.is_finite() {
            Some((meters * 100.0) as i32)
        } else {
            None
        };
        Self { centimeters }
    }

    /// A reading that carried no echo
    pub fn no_echo() -> Self {
        Self { centimeters: None }
    }

    pub fn from_centimeters(centimeters: i32) -> Self {
        Self {
            centimeters: Some(centimeters),
        }
    }

    pub fn is_echo(&self) -> bool {
        self.centimeters.is_some()
    }

    /// Text drawn on the LCD for this reading
    pub fn display_text(&self) -> String {
        match self.centimeters {
            Some(cm) => format!("{}{}", DISTANCE_LABEL, cm),
            None => format!("{}--", DISTANCE_LABEL),
        }
    }
}

impl LogSummary for DistanceReading {
    fn log_summary(&self) -> String {
        match self.centimeters {
            Some(cm) => format!("{}cm", cm),
            None => "no echo".to_string(),
        }
    }
}

/// Distance bands, all in centimeters
///
/// A reading `d` is actionable when `min_cm < d <= max_cm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneThresholds {
    /// Closest distance the sensor measures reliably (exclusive)
    pub min_cm: i32,
    /// Upper bound (inclusive) of the critical band
    pub critical_cm: i32,
    /// Upper bound (inclusive) of the warning band
    pub warning_cm: i32,
    /// Farthest distance the sensor measures (inclusive)
    pub max_cm: i32,
}

impl Default for ZoneThresholds {
    fn default() -> Self {
        Self {
            min_cm: 3,
            critical_cm: 10,
            warning_cm: 20,
            max_cm: 250,
        }
    }
}

impl ZoneThresholds {
    /// Check that the bands are strictly increasing
    pub fn validate(&self) -> LegoResult<()> {
        if self.min_cm < 0 {
            return Err(LegoError::config(format!(
                "min_cm must not be negative (got {})",
                self.min_cm
            )));
        }
        if !(self.min_cm < self.critical_cm
            && self.critical_cm < self.warning_cm
            && self.warning_cm < self.max_cm)
        {
            return Err(LegoError::config(format!(
                "zone thresholds must satisfy min < critical < warning < max (got {} / {} / {} / {})",
                self.min_cm, self.critical_cm, self.warning_cm, self.max_cm
            )));
        }
        Ok(())
    }

    /// Whether `cm` falls inside the measurable range
    pub fn in_range(&self, cm: i32) -> bool {
        cm > self.min_cm && cm <= self.max_cm
    }
}
