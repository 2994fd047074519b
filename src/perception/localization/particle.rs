//! A single position hypothesis

use crate::common::Point;

/// One weighted position hypothesis
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Particle {
    position: Point,
    weight: f64,
}

impl Particle {
    pub fn new(position: Point, weight: f64) -> Self {
        Particle { position, weight }
    }

    pub fn get_position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn get_weight(&self) -> f64 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    /// Translate by `delta`; the result is clamped to the field extent
    pub fn move_by(&mut self, delta: Point) {
        self.position += delta;
    }

    /// Divide the weight by `total`. A non-positive total leaves it untouched.
    pub fn normalize(&mut self, total: f64) {
        if total > 0.0 {
            self.weight /= total;
        }
    }
}
