//! Sensor interfaces for the localizer
//!
//! A [`RangeFinder`] is the raw hardware driver; a [`DistanceSensor`] wraps
//! one with its mount geometry and turns raw readings into validated
//! field distances.

mod distance;
mod simulated;

pub use distance::{beam_direction, mount_position, DistanceSensor, INVALID_READING};
pub use simulated::SimulatedRangeFinder;

/// Millimetres per inch
pub const MM_PER_INCH: f64 = 25.4;

/// A raw time-of-flight range finder
pub trait RangeFinder: Send {
    /// Get the sensor name
    fn name(&self) -> &str;

    /// Distance to the detected object in millimetres; non-positive means no object
    fn distance_mm(&mut self) -> f64;

    /// Apparent size of the detected object, `None` when the hardware cannot tell
    fn object_size(&mut self) -> Option<f64>;
}
