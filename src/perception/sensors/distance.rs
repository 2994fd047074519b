//! Fixed-mount distance sensor

use super::{RangeFinder, MM_PER_INCH};
use crate::common::Point;
use crate::error::{LocalizationError, Result};
use std::f64::consts::{FRAC_PI_2, SQRT_2};

/// Reading reported when there is no usable measurement
pub const INVALID_READING: f64 = -1.0;

/// Readings at or beyond the field diagonal cannot be a wall
const MAX_VALID_READING: f64 = 143.0 * SQRT_2;

/// Default minimum object size for a reading to count as a wall
const DEFAULT_SIZE_THRESHOLD: f64 = 60.0;

/// Default measurement noise: 25 mm expressed in inches
const DEFAULT_NOISE_STD: f64 = 25.0 / MM_PER_INCH;

/// World position of a sensor mounted at `offset` on a robot at `position`.
///
/// `offset.x` runs along the robot's forward axis and `offset.y` to its left.
pub fn mount_position(position: Point, heading: f64, offset: Point) -> Point {
    let (sin, cos) = heading.sin_cos();
    Point::new(
        position.x + offset.x * sin - offset.y * cos,
        position.y + offset.x * cos + offset.y * sin,
    )
}

/// `(cos, sin)` of the beam for a robot heading; heading 0 points toward +Y.
pub fn beam_direction(heading: f64, heading_offset: f64) -> (f64, f64) {
    let angle = FRAC_PI_2 - (heading + heading_offset);
    (angle.cos(), angle.sin())
}

/// A distance sensor at a fixed mount on the robot
pub struct DistanceSensor {
    offset: Point,
    heading_offset: f64,

    // Last robot pose seen; reading and trig are only refreshed on change
    last_heading: f64,
    last_position: Point,

    cached_sin: f64,
    cached_cos: f64,
    enabled: bool,

    size_threshold: f64,
    noise_std: f64,
    last_distance_reading: f64,

    range_finder: Box<dyn RangeFinder>,
}

impl DistanceSensor {
    /// Create a sensor mounted at `offset` (inches) pointing `heading_offset`
    /// radians clockwise from the robot's forward axis
    pub fn new(offset: Point, heading_offset: f64, range_finder: Box<dyn RangeFinder>) -> Self {
        DistanceSensor {
            offset,
            heading_offset,
            last_heading: f64::INFINITY,
            last_position: Point::new(f64::INFINITY, f64::INFINITY),
            cached_sin: 0.0,
            cached_cos: 1.0,
            enabled: true,
            size_threshold: DEFAULT_SIZE_THRESHOLD,
            noise_std: DEFAULT_NOISE_STD,
            last_distance_reading: INVALID_READING,
            range_finder,
        }
    }

    /// Minimum reported object size for a reading to be trusted
    pub fn with_size_threshold(mut self, size_threshold: f64) -> Result<Self> {
        if !size_threshold.is_finite() || size_threshold < 0.0 {
            return Err(LocalizationError::invalid("size_threshold", "must be non-negative"));
        }
        self.size_threshold = size_threshold;
        Ok(self)
    }

    /// Measurement noise std dev in inches; must be positive
    pub fn with_noise_std(mut self, noise_std: f64) -> Result<Self> {
        if !noise_std.is_finite() || noise_std <= 0.0 {
            return Err(LocalizationError::invalid("noise_std", "must be positive"));
        }
        self.noise_std = noise_std;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        self.range_finder.name()
    }

    /// Enable or disable the sensor. A disabled sensor reports
    /// [`INVALID_READING`] until it is re-enabled and refreshed.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        // Force the next update to re-read the hardware
        self.last_position = Point::new(f64::INFINITY, f64::INFINITY);
        if !enabled {
            self.last_distance_reading = INVALID_READING;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Refresh the cached beam direction and reading for a new robot pose
    pub fn update(&mut self, robot_position: Point, robot_heading: f64) {
        let heading_changed = robot_heading != self.last_heading;
        let position_changed = robot_position != self.last_position;

        if heading_changed {
            self.last_heading = robot_heading;
            let (cos, sin) = beam_direction(robot_heading, self.heading_offset);
            self.cached_cos = cos;
            self.cached_sin = sin;
        }

        if position_changed {
            self.last_position = robot_position;
        }

        if heading_changed || position_changed {
            self.last_distance_reading = self.read_validated();
        }
    }

    fn read_validated(&mut self) -> f64 {
        if !self.enabled {
            return INVALID_READING;
        }

        let reading = self.range_finder.distance_mm() / MM_PER_INCH;
        let too_small = match self.range_finder.object_size() {
            Some(size) => size < self.size_threshold,
            None => false,
        };

        if reading <= 0.0 || reading >= MAX_VALID_READING || too_small {
            INVALID_READING
        } else {
            reading
        }
    }

    /// Position of this sensor for a robot at `robot_position` facing `robot_heading`
    pub fn get_sensor_position(&self, robot_position: Point, robot_heading: f64) -> Point {
        mount_position(robot_position, robot_heading, self.offset)
    }

    pub fn get_cosine_cache(&self) -> f64 {
        self.cached_cos
    }

    pub fn get_sine_cache(&self) -> f64 {
        self.cached_sin
    }

    /// Last validated reading in inches, or [`INVALID_READING`]
    pub fn get_distance_reading(&self) -> f64 {
        self.last_distance_reading
    }

    pub fn get_distance_sensor_std(&self) -> f64 {
        self.noise_std
    }
}

impl std::fmt::Debug for DistanceSensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistanceSensor")
            .field("name", &self.range_finder.name())
            .field("offset", &self.offset)
            .field("heading_offset", &self.heading_offset)
            .field("enabled", &self.enabled)
            .field("last_distance_reading", &self.last_distance_reading)
            .finish()
    }
}
