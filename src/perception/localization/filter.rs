//! Particle filter core
//!
//! [`MclFilter`] is the synchronous half of the localizer: given a new robot
//! pose it runs one full predict → weigh → normalize → resample → refine →
//! convergence cycle. It performs no I/O and owns its random number
//! generator, so a seeded filter is fully reproducible.

use super::particle::Particle;
use crate::common::{Point, Pose, FIELD_EXTENT};
use crate::config::MclConfig;
use crate::error::{LocalizationError, Result};
use crate::perception::field::Field;
use crate::perception::sensors::DistanceSensor;
use nalgebra::{Matrix2, Vector2};
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Neighbor directions probed by the hill climb, in scan order
const HILL_CLIMB_DIRECTIONS: [(f64, f64); 8] = [
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
    (1.0, 1.0),
    (-1.0, -1.0),
    (1.0, -1.0),
    (-1.0, 1.0),
];

/// What the convergence check decided at the end of a cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// Neither converged nor lost
    Tracking,
    /// Converged with write-back enabled; the estimate should be applied
    Converged(Point),
    /// Variance exceeded the divergence bound; particles were reinitialized
    Diverged,
}

/// Diagnostics from one filter cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    /// Effective sample size after normalization
    pub n_eff: f64,
    /// Weighted position variance (in²) used by the convergence check
    pub variance: f64,
    pub resampled: bool,
    pub outcome: CycleOutcome,
}

/// Effective sample size `1 / Σw²` of a set of weights
pub fn effective_sample_size<I>(weights: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let sum_squared: f64 = weights.into_iter().map(|w| w * w).sum();
    1.0 / sum_squared
}

/// Write the running sum of particle weights into `cdf`
pub fn build_cdf(particles: &[Particle], cdf: &mut [f64]) {
    let mut total = 0.0;
    for (slot, particle) in cdf.iter_mut().zip(particles) {
        total += particle.get_weight();
        *slot = total;
    }
}

/// Systematic resampling over a cumulative weight array.
///
/// Draw `i` sits at `offset + i / N` and selects the first index whose
/// cumulative weight reaches it. The index only ever moves forward.
pub fn systematic_indices(cdf: &[f64], offset: f64) -> impl Iterator<Item = usize> + '_ {
    let n = cdf.len();
    let step = 1.0 / n as f64;
    let mut index = 0;

    (0..n).map(move |i| {
        let u = offset + i as f64 * step;
        while index + 1 < n && u > cdf[index] {
            index += 1;
        }
        index
    })
}

/// Summed sensor log-likelihood of the robot being at `position` with `heading`.
///
/// Sensors without a valid reading are skipped. The sum never drops below `floor`.
fn log_likelihood(
    field: &Field,
    sensors: &[DistanceSensor],
    floor: f64,
    position: Point,
    heading: f64,
) -> f64 {
    let mut exponent = 0.0;

    for sensor in sensors {
        let measured = sensor.get_distance_reading();
        if measured <= 0.0 {
            continue;
        }

        let origin = sensor.get_sensor_position(position, heading);
        let expected =
            field.get_distance_to_wall(origin, sensor.get_cosine_cache(), sensor.get_sine_cache());
        let std = sensor.get_distance_sensor_std();

        exponent -= (measured - expected).powi(2) / (2.0 * std * std);
    }

    // f64::max also maps a NaN sum onto the floor
    exponent.max(floor)
}

fn normal(name: &str, std: f64) -> Result<Normal<f64>> {
    Normal::new(0.0, std).map_err(|e| LocalizationError::invalid(name, e.to_string()))
}

/// Monte Carlo localization over a fixed-size particle population
pub struct MclFilter<R: Rng = StdRng> {
    config: MclConfig,
    field: Arc<Field>,
    sensors: Vec<DistanceSensor>,

    particles: Box<[Particle]>,
    // Resample / refine target, swapped with `particles` afterwards
    scratch: Box<[Particle]>,
    cdf: Box<[f64]>,

    last_position: Point,
    last_heading: f64,
    point_estimate: Point,

    rng: R,
    translation_noise: Normal<f64>,
    rotation_noise: Normal<f64>,
    position_jitter: Normal<f64>,
    roughening: Normal<f64>,
}

impl<R: Rng> MclFilter<R> {
    /// Create a filter with particles spread on a grid over the field
    pub fn new(
        config: MclConfig,
        field: Arc<Field>,
        sensors: Vec<DistanceSensor>,
        initial_pose: Pose,
        rng: R,
    ) -> Result<Self> {
        config.validate()?;

        let count = config.particle_count;
        let weight = 1.0 / count as f64;
        let grid_size = (count as f64).sqrt().ceil() as usize;
        let max = field.get_max_point();
        let spacing = Point::new(max.x / grid_size as f64, max.y / grid_size as f64);

        let particles: Box<[Particle]> = (0..count)
            .map(|index| {
                let row = (index / grid_size) as f64;
                let column = (index % grid_size) as f64;
                Particle::new(Point::new(column * spacing.x, row * spacing.y), weight)
            })
            .collect();

        debug!(
            "Initialized {} particles on a {}x{} grid",
            count, grid_size, grid_size
        );

        let mut filter = MclFilter {
            translation_noise: normal("translation_noise_std", config.translation_noise_std)?,
            rotation_noise: normal("rotation_noise_std", config.rotation_noise_std)?,
            position_jitter: normal("position_jitter_std", config.position_jitter_std)?,
            roughening: normal("roughening_std", config.roughening_std)?,
            scratch: particles.clone(),
            cdf: vec![0.0; count].into_boxed_slice(),
            particles,
            field,
            sensors,
            last_position: initial_pose.position(),
            last_heading: initial_pose.theta,
            point_estimate: Point::default(),
            config,
            rng,
        };
        filter.point_estimate = filter.weighted_centroid();
        Ok(filter)
    }

    /// The pose recorded at the end of the previous cycle
    pub fn last_pose(&self) -> Pose {
        Pose::new(self.last_position.x, self.last_position.y, self.last_heading)
    }

    /// Record `pose` as the baseline for the next displacement without filtering
    pub fn record_pose(&mut self, pose: Pose) {
        self.last_position = pose.position();
        self.last_heading = pose.theta;
    }

    /// Run one full filter cycle for a robot that has moved to `pose`
    pub fn update(&mut self, pose: Pose) -> CycleReport {
        let position = pose.position();
        for sensor in &mut self.sensors {
            sensor.update(position, pose.theta);
        }

        let delta_trans = (position - self.last_position).norm();
        let delta_rot = pose.theta - self.last_heading;

        let total_weight = self.predict_and_weigh(pose.theta, delta_trans, delta_rot);
        let n_eff = self.normalize(total_weight);

        let resample_below = self.config.resample_ratio * self.particles.len() as f64;
        let resampled = n_eff < resample_below;
        if resampled {
            self.resample();
            self.refine(pose.theta, total_weight);
            self.point_estimate = self.weighted_centroid();
        }

        let variance = self.get_position_estimate_variance();
        let outcome = if variance > self.config.divergence_variance {
            warn!(
                "Particle variance {:.2} in² exceeds {:.2}, reinitializing",
                variance, self.config.divergence_variance
            );
            self.scatter_uniform();
            CycleOutcome::Diverged
        } else if variance < self.config.odometry_reset_threshold && self.config.enabled {
            CycleOutcome::Converged(self.point_estimate)
        } else {
            CycleOutcome::Tracking
        };

        trace!(
            n_eff,
            variance,
            resampled,
            x = self.point_estimate.x,
            y = self.point_estimate.y,
            "MCL cycle complete"
        );

        self.record_pose(pose);

        CycleReport {
            n_eff,
            variance,
            resampled,
            outcome,
        }
    }

    /// Move every particle by a noisy copy of the robot's motion and score it
    /// against the sensors. Returns the total unnormalized weight.
    fn predict_and_weigh(&mut self, robot_heading: f64, delta_trans: f64, delta_rot: f64) -> f64 {
        let min = self.field.get_min_point();
        let max = self.field.get_max_point();
        let floor = self.config.log_likelihood_floor;
        let mut total_weight = 0.0;

        for particle in self.particles.iter_mut() {
            let noisy_trans = delta_trans + self.translation_noise.sample(&mut self.rng);
            let noisy_rot = delta_rot + self.rotation_noise.sample(&mut self.rng);
            let heading = robot_heading + noisy_rot;

            let jitter_x = 1.0 + self.position_jitter.sample(&mut self.rng);
            let jitter_y = 1.0 + self.position_jitter.sample(&mut self.rng);
            particle.move_by(Point::new(
                noisy_trans * heading.sin() * jitter_x,
                noisy_trans * heading.cos() * jitter_y,
            ));

            // Re-seed escapees anywhere on the field rather than piling them on a wall
            if !self.field.contains(particle.get_position()) {
                particle.set_position(Point::new(
                    self.rng.gen_range(min.x..max.x),
                    self.rng.gen_range(min.y..max.y),
                ));
            }

            let exponent = log_likelihood(
                &self.field,
                &self.sensors,
                floor,
                particle.get_position(),
                heading,
            );
            particle.set_weight(exponent.exp());
            total_weight += particle.get_weight();
        }

        total_weight
    }

    /// Normalize weights, refresh the point estimate and return `N_eff`.
    ///
    /// A zero total leaves the weights as they are.
    fn normalize(&mut self, total_weight: f64) -> f64 {
        let mut estimate = Point::default();

        for particle in self.particles.iter_mut() {
            particle.normalize(total_weight);
            estimate += particle.get_position() * particle.get_weight();
        }

        self.point_estimate = estimate;
        effective_sample_size(self.particles.iter().map(|p| p.get_weight()))
    }

    /// Systematic resampling with roughening into the scratch buffer
    fn resample(&mut self) {
        let count = self.particles.len();
        let step = 1.0 / count as f64;
        build_cdf(&self.particles, &mut self.cdf);

        let offset = self.rng.gen::<f64>() * step;
        for (slot, source) in self
            .scratch
            .iter_mut()
            .zip(systematic_indices(&self.cdf, offset))
        {
            let position = self.particles[source].get_position();
            let rough = Point::new(
                position.x + self.roughening.sample(&mut self.rng),
                position.y + self.roughening.sample(&mut self.rng),
            );
            *slot = Particle::new(rough, step);
        }

        std::mem::swap(&mut self.particles, &mut self.scratch);
    }

    /// Hill-climb the most likely particles toward higher sensor likelihood.
    ///
    /// The climb scores neighbors with the robot's actual heading and takes
    /// the first improving neighbor in scan order, then keeps scanning from
    /// the improved weight.
    fn refine(&mut self, robot_heading: f64, total_weight: f64) {
        let refined = self.config.refined_count().min(self.particles.len());
        if refined == 0 {
            return;
        }

        let normalizer = if total_weight > 0.0 { total_weight } else { 1.0 };
        let floor = self.config.log_likelihood_floor;
        let step = self.config.hill_climb_step;
        let weight_at = |position: Point| {
            log_likelihood(&self.field, &self.sensors, floor, position, robot_heading).exp()
                / normalizer
        };

        self.scratch.copy_from_slice(&self.particles);
        self.scratch
            .sort_by(|a, b| b.get_weight().total_cmp(&a.get_weight()));

        for particle in self.scratch.iter_mut().take(refined) {
            let mut position = particle.get_position();
            let mut current_weight = weight_at(position);

            for _ in 0..self.config.hill_climb_iterations {
                let center = position;
                for (dx, dy) in HILL_CLIMB_DIRECTIONS {
                    let neighbor = Point::new(center.x + dx * step, center.y + dy * step);
                    let neighbor_weight = weight_at(neighbor);
                    if neighbor_weight > current_weight {
                        position = neighbor;
                        current_weight = neighbor_weight;
                    }
                }
            }

            particle.set_position(position);
        }

        std::mem::swap(&mut self.particles, &mut self.scratch);
    }

    fn weighted_centroid(&self) -> Point {
        let mut estimate = Point::default();
        for particle in self.particles.iter() {
            estimate += particle.get_position() * particle.get_weight();
        }
        estimate
    }

    fn scatter_uniform(&mut self) {
        let min = self.field.get_min_point();
        let max = self.field.get_max_point();
        let weight = 1.0 / self.particles.len() as f64;

        for particle in self.particles.iter_mut() {
            let position = Point::new(
                self.rng.gen_range(min.x..max.x),
                self.rng.gen_range(min.y..max.y),
            );
            *particle = Particle::new(position, weight);
        }
    }

    /// Scatter every particle uniformly within `guess ± spread` with equal weight
    pub fn reset_particles(&mut self, guess: Point, spread: f64) {
        let spread = spread.abs();
        let weight = 1.0 / self.particles.len() as f64;

        for particle in self.particles.iter_mut() {
            let x = guess.x + self.rng.gen_range(-1.0..=1.0) * spread;
            let y = guess.y + self.rng.gen_range(-1.0..=1.0) * spread;
            *particle = Particle::new(
                Point::new(x.clamp(0.0, FIELD_EXTENT), y.clamp(0.0, FIELD_EXTENT)),
                weight,
            );
        }

        self.point_estimate = self.weighted_centroid();
        debug!(
            "Particles reset around ({:.2}, {:.2}) with spread {:.2}",
            guess.x, guess.y, spread
        );
    }

    /// Weighted 2x2 covariance of particle positions about the point estimate
    pub fn position_covariance(&self) -> Matrix2<f64> {
        let mut covariance = Matrix2::zeros();
        for particle in self.particles.iter() {
            let delta = particle.get_position() - self.point_estimate;
            let d = Vector2::new(delta.x, delta.y);
            covariance += d * d.transpose() * particle.get_weight();
        }
        covariance
    }

    /// Weighted mean squared distance of the particles from the estimate (in²)
    pub fn get_position_estimate_variance(&self) -> f64 {
        self.position_covariance().trace()
    }

    pub fn get_point_estimate(&self) -> Point {
        self.point_estimate
    }

    pub fn get_particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn get_particle(&self, index: usize) -> Option<Particle> {
        self.particles.get(index).copied()
    }

    pub fn get_particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn set_odometry_reset_threshold(&mut self, threshold: f64) {
        self.config.odometry_reset_threshold = threshold;
    }

    pub fn config(&self) -> &MclConfig {
        &self.config
    }

    pub fn field(&self) -> &Arc<Field> {
        &self.field
    }

    pub fn sensors(&self) -> &[DistanceSensor] {
        &self.sensors
    }

    pub fn sensor_mut(&mut self, index: usize) -> Option<&mut DistanceSensor> {
        self.sensors.get_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perception::sensors::SimulatedRangeFinder;
    use approx::assert_relative_eq;
    use parking_lot::RwLock;
    use rand::SeedableRng;
    use std::f64::consts::{FRAC_PI_2, PI, SQRT_2};

    const CENTER: Point = Point::new(72.0, 72.0);

    fn open_field() -> Arc<Field> {
        Arc::new(Field::new(Point::new(0.0, 0.0), Point::new(144.0, 144.0)).unwrap())
    }

    fn blind_filter(config: MclConfig) -> MclFilter<StdRng> {
        MclFilter::new(
            config,
            open_field(),
            Vec::new(),
            Pose::new(72.0, 72.0, 0.0),
            StdRng::seed_from_u64(42),
        )
        .unwrap()
    }

    /// 80 particles (one refined) seeing the walls from (72, 72) with exact sensors
    fn sighted_filter() -> MclFilter<StdRng> {
        let field = open_field();
        let truth = Arc::new(RwLock::new(Pose::new(72.0, 72.0, 0.0)));
        let sensors = [0.0, FRAC_PI_2, PI, -FRAC_PI_2]
            .iter()
            .map(|&heading_offset| {
                let finder = SimulatedRangeFinder::new(
                    "exact",
                    Arc::clone(&field),
                    Arc::clone(&truth),
                    Point::default(),
                    heading_offset,
                    0.0,
                    0,
                );
                DistanceSensor::new(Point::default(), heading_offset, Box::new(finder))
            })
            .collect();

        let config = MclConfig {
            particle_count: 80,
            ..MclConfig::default()
        };
        let mut filter = MclFilter::new(
            config,
            field,
            sensors,
            Pose::new(72.0, 72.0, 0.0),
            StdRng::seed_from_u64(8),
        )
        .unwrap();
        for sensor in filter.sensors.iter_mut() {
            sensor.update(Point::new(72.0, 72.0), 0.0);
        }
        filter
    }

    fn weight_sum(filter: &MclFilter<StdRng>) -> f64 {
        filter.get_particles().iter().map(|p| p.get_weight()).sum()
    }

    #[test]
    fn test_grid_initialization_fills_every_slot() {
        let config = MclConfig {
            particle_count: 10,
            ..MclConfig::default()
        };
        let filter = blind_filter(config);

        assert_eq!(filter.get_particle_count(), 10);
        // ceil(sqrt(10)) = 4 columns of 36in
        assert_eq!(filter.get_particle(5).unwrap().get_position(), Point::new(36.0, 36.0));
        assert_eq!(filter.get_particle(9).unwrap().get_position(), Point::new(36.0, 72.0));
        assert!(filter.get_particle(10).is_none());
        assert_relative_eq!(weight_sum(&filter), 1.0, epsilon = 1e-12);

        // The estimate starts at the grid centroid, not the origin
        let estimate = filter.get_point_estimate();
        assert_relative_eq!(estimate.x, 46.8, epsilon = 1e-9);
        assert_relative_eq!(estimate.y, 28.8, epsilon = 1e-9);
    }

    #[test]
    fn test_uniform_weights_give_full_sample_size() {
        assert_eq!(effective_sample_size(vec![0.25; 4]), 4.0);
        assert_relative_eq!(effective_sample_size(vec![1.0 / 800.0; 800]), 800.0, epsilon = 1e-6);
    }

    #[test]
    fn test_systematic_resampling_order() {
        let cdf = [0.5, 0.8, 1.0];
        let indices: Vec<usize> = systematic_indices(&cdf, 0.0).collect();
        assert_eq!(indices, vec![0, 0, 1]);
    }

    #[test]
    fn test_systematic_resampling_never_runs_past_end() {
        // A CDF that falls short of 1.0 must still yield valid indices
        let cdf = [0.1, 0.2, 0.3];
        let indices: Vec<usize> = systematic_indices(&cdf, 0.3).collect();
        assert_eq!(indices, vec![2, 2, 2]);
    }

    #[test]
    fn test_build_cdf() {
        let particles = [
            Particle::new(Point::default(), 0.5),
            Particle::new(Point::default(), 0.3),
            Particle::new(Point::default(), 0.2),
        ];
        let mut cdf = [0.0; 3];
        build_cdf(&particles, &mut cdf);
        assert_relative_eq!(cdf[0], 0.5);
        assert_relative_eq!(cdf[1], 0.8);
        assert_relative_eq!(cdf[2], 1.0);
    }

    #[test]
    fn test_refine_climbs_toward_truth() {
        let mut filter = sighted_filter();
        assert_eq!(filter.config().refined_count(), 1);
        let start = Point::new(71.0, 72.4);
        for particle in filter.particles.iter_mut() {
            *particle = Particle::new(start, 1.0 / 80.0);
        }

        filter.refine(0.0, 1.0);

        // Diagonal steps while both axes improve, then +x only: 8 + 7 steps of 0.05
        let refined = filter.get_particle(0).unwrap().get_position();
        assert_relative_eq!(refined.x, 71.75, epsilon = 1e-9);
        assert_relative_eq!(refined.y, 72.0, epsilon = 1e-9);

        let iterations = filter.config().hill_climb_iterations as f64;
        let max_travel = iterations * filter.config().hill_climb_step * SQRT_2;
        assert!((refined - start).norm() <= max_travel + 1e-9);
        assert!((refined - CENTER).norm() < (start - CENTER).norm());

        for particle in &filter.get_particles()[1..] {
            assert_eq!(particle.get_position(), start);
            assert_relative_eq!(particle.get_weight(), 1.0 / 80.0);
        }
    }

    #[test]
    fn test_refine_takes_heaviest_particle_first() {
        let mut filter = sighted_filter();
        let rest = Point::new(71.0, 72.4);
        for particle in filter.particles.iter_mut() {
            *particle = Particle::new(rest, 0.5 / 79.0);
        }
        filter.particles[5] = Particle::new(Point::new(70.0, 72.0), 0.5);

        filter.refine(0.0, 1.0);

        // Sorted heaviest first; only that one moves, 15 steps along +x
        let refined = filter.get_particle(0).unwrap();
        assert_relative_eq!(refined.get_position().x, 70.75, epsilon = 1e-9);
        assert_relative_eq!(refined.get_position().y, 72.0, epsilon = 1e-9);
        assert_relative_eq!(refined.get_weight(), 0.5);
        assert!(filter.get_particles()[1..]
            .iter()
            .all(|p| p.get_position() == rest));
    }

    #[test]
    fn test_zero_total_weight_leaves_weights_unnormalized() {
        let mut filter = blind_filter(MclConfig {
            particle_count: 16,
            ..MclConfig::default()
        });
        for particle in filter.particles.iter_mut() {
            particle.set_weight(0.0);
        }

        let n_eff = filter.normalize(0.0);

        // No renormalization happens: every weight stays at zero
        assert!(filter.get_particles().iter().all(|p| p.get_weight() == 0.0));
        assert!(n_eff.is_infinite());
    }

    #[test]
    fn test_spread_cloud_diverges_and_reinitializes() {
        let mut filter = blind_filter(MclConfig {
            particle_count: 100,
            ..MclConfig::default()
        });

        let report = filter.update(Pose::new(72.5, 72.0, 0.0));

        assert_eq!(report.outcome, CycleOutcome::Diverged);
        assert!(report.variance > 14.0);
        assert!(!report.resampled);
        let field = open_field();
        for particle in filter.get_particles() {
            assert_relative_eq!(particle.get_weight(), 0.01);
            assert!(field.contains(particle.get_position()));
        }
    }

    #[test]
    fn test_tight_cloud_converges_only_when_enabled() {
        let mut filter = blind_filter(MclConfig {
            particle_count: 200,
            ..MclConfig::default()
        });
        filter.reset_particles(Point::new(50.0, 60.0), 0.05);

        let report = filter.update(Pose::new(72.0, 72.5, 0.0));
        assert_eq!(report.outcome, CycleOutcome::Tracking);
        assert!(report.variance < 1.0);

        filter.set_enabled(true);
        filter.reset_particles(Point::new(50.0, 60.0), 0.05);
        let report = filter.update(Pose::new(72.0, 73.0, 0.0));
        match report.outcome {
            CycleOutcome::Converged(estimate) => {
                assert!((estimate.x - 50.0).abs() < 1.0);
                // The robot moved 0.5in toward +Y and the cloud followed
                assert!((estimate.y - 60.5).abs() < 1.0);
            }
            other => panic!("expected convergence, got {:?}", other),
        }
    }

    #[test]
    fn test_update_records_pose() {
        let mut filter = blind_filter(MclConfig::default());
        let pose = Pose::new(10.0, 20.0, 0.3);
        filter.update(pose);
        assert_eq!(filter.last_pose(), pose);

        filter.record_pose(Pose::new(1.0, 2.0, 3.0));
        assert_eq!(filter.last_pose(), Pose::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_reset_particles_stays_in_spread() {
        let mut filter = blind_filter(MclConfig::default());
        filter.reset_particles(Point::new(20.0, 30.0), 2.0);

        for particle in filter.get_particles() {
            let p = particle.get_position();
            assert!((p.x - 20.0).abs() <= 2.0);
            assert!((p.y - 30.0).abs() <= 2.0);
        }
        assert_relative_eq!(weight_sum(&filter), 1.0, epsilon = 1e-9);
        assert!(filter.get_position_estimate_variance() < 8.0);
    }

    #[test]
    fn test_covariance_trace_matches_variance() {
        let mut filter = blind_filter(MclConfig {
            particle_count: 4,
            ..MclConfig::default()
        });
        let positions = [(10.0, 10.0), (12.0, 10.0), (10.0, 12.0), (12.0, 12.0)];
        for (particle, (x, y)) in filter.particles.iter_mut().zip(positions) {
            *particle = Particle::new(Point::new(x, y), 0.25);
        }
        filter.point_estimate = filter.weighted_centroid();

        let covariance = filter.position_covariance();
        assert_relative_eq!(covariance[(0, 0)], 1.0);
        assert_relative_eq!(covariance[(1, 1)], 1.0);
        assert_relative_eq!(covariance[(0, 1)], 0.0);
        assert_relative_eq!(filter.get_position_estimate_variance(), 2.0);
    }

    #[test]
    fn test_same_seed_same_cycle() {
        let run = || {
            let mut filter = blind_filter(MclConfig {
                particle_count: 64,
                ..MclConfig::default()
            });
            filter.update(Pose::new(73.0, 72.0, 0.1));
            filter.get_particles().to_vec()
        };
        assert_eq!(run(), run());
    }
}
