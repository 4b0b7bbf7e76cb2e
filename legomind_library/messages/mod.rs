//! Message types for LEGOMIND
//!
//! - Distance: sensor samples converted to centimeters, zone thresholds
//! - Zone: proximity zones and the shared cell holding the last one acted on
//!
//! All message types are re-exported at the crate root for convenience.

pub mod distance;
pub mod zone;

pub use distance::{DistanceReading, ZoneThresholds, DISTANCE_LABEL};
pub use zone::{ProximityZone, ZoneCell};
