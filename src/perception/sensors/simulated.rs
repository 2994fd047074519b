//! Range finder backed by a ground-truth pose and the field model

use super::distance::{beam_direction, mount_position};
use super::{RangeFinder, MM_PER_INCH};
use crate::common::{Point, Pose};
use crate::perception::field::Field;
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use std::sync::Arc;

/// Simulated time-of-flight sensor.
///
/// Reports the exact wall distance from the true robot pose plus Gaussian
/// noise, in millimetres, the way the hardware driver would.
pub struct SimulatedRangeFinder {
    name: String,
    field: Arc<Field>,
    truth: Arc<RwLock<Pose>>,
    offset: Point,
    heading_offset: f64,
    noise_std: f64,
    rng: StdRng,
}

impl SimulatedRangeFinder {
    /// `noise_std` is in inches; zero gives exact readings
    pub fn new(
        name: &str,
        field: Arc<Field>,
        truth: Arc<RwLock<Pose>>,
        offset: Point,
        heading_offset: f64,
        noise_std: f64,
        seed: u64,
    ) -> Self {
        SimulatedRangeFinder {
            name: name.to_string(),
            field,
            truth,
            offset,
            heading_offset,
            noise_std,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Noise-free wall distance in inches for the current true pose
    pub fn true_distance(&self) -> f64 {
        let truth = *self.truth.read();
        let origin = mount_position(truth.position(), truth.theta, self.offset);
        let (cos, sin) = beam_direction(truth.theta, self.heading_offset);
        self.field.get_distance_to_wall(origin, cos, sin)
    }
}

impl RangeFinder for SimulatedRangeFinder {
    fn name(&self) -> &str {
        &self.name
    }

    fn distance_mm(&mut self) -> f64 {
        let distance = self.true_distance();
        if !distance.is_finite() {
            return 0.0;
        }

        let noise = if self.noise_std > 0.0 {
            self.noise_std * self.rng.sample::<f64, _>(StandardNormal)
        } else {
            0.0
        };
        (distance + noise) * MM_PER_INCH
    }

    /// Walls are always large enough; the size is reported as unknown
    fn object_size(&mut self) -> Option<f64> {
        None
    }
}
