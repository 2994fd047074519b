//! Common utilities and types for the localizer

use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

/// Upper bound applied to every coordinate accumulated through `+=`, in inches
pub const FIELD_EXTENT: f64 = 144.0;

/// A 2D point in field inches
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Euclidean length
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

/// Accumulation is clamped to `[0, FIELD_EXTENT]` on both axes.
impl AddAssign for Point {
    fn add_assign(&mut self, other: Point) {
        self.x = (self.x + other.x).clamp(0.0, FIELD_EXTENT);
        self.y = (self.y + other.y).clamp(0.0, FIELD_EXTENT);
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, other: Point) {
        self.x -= other.x;
        self.y -= other.y;
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }
}

/// A robot pose: position in inches, heading in radians.
///
/// Heading 0 points toward +Y and grows clockwise, matching the drivetrain
/// odometry that produces it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

impl Pose {
    /// Create a new pose
    pub const fn new(x: f64, y: f64, theta: f64) -> Self {
        Pose { x, y, theta }
    }

    /// Position component of the pose
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Same heading, new position
    pub fn with_position(&self, position: Point) -> Self {
        Pose::new(position.x, position.y, self.theta)
    }
}
