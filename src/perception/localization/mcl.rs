//! Background localizer
//!
//! [`Mcl`] owns a worker thread that waits for the pose source to report
//! motion, runs one filter cycle and, once the particle cloud has converged,
//! writes the corrected position back. The filter lives behind a mutex that
//! the worker holds only for the duration of a cycle, so telemetry readers
//! observe either the previous or the current cycle's state.

use super::filter::{CycleOutcome, CycleReport, MclFilter};
use super::particle::Particle;
use super::PoseSource;
use crate::common::{Point, Pose};
use crate::config::MclConfig;
use crate::error::{LocalizationError, Result};
use crate::lifecycle::{LifecycleNode, LifecycleNodeBase, State};
use crate::perception::field::Field;
use crate::perception::sensors::DistanceSensor;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info};

/// State shared between the handle and the worker
struct Shared {
    filter: Mutex<MclFilter<StdRng>>,
    running: AtomicBool,
    cycles: AtomicU64,
    last_report: Mutex<Option<CycleReport>>,
}

/// Monte Carlo localizer running on its own thread
pub struct Mcl {
    base: LifecycleNodeBase,
    shared: Arc<Shared>,
    pose_source: Arc<dyn PoseSource>,
    poll_interval: Duration,
    worker: Option<JoinHandle<()>>,
}

impl Mcl {
    /// Create a localizer without starting its worker.
    ///
    /// The filter's baseline pose is read from `pose_source` here.
    pub fn new(
        config: MclConfig,
        pose_source: Arc<dyn PoseSource>,
        field: Arc<Field>,
        sensors: Vec<DistanceSensor>,
        rng: StdRng,
    ) -> Result<Self> {
        let poll_interval = config.poll_interval();
        let filter = MclFilter::new(config, field, sensors, pose_source.get_pose(), rng)?;

        Ok(Mcl {
            base: LifecycleNodeBase::new("mcl_localizer"),
            shared: Arc::new(Shared {
                filter: Mutex::new(filter),
                running: AtomicBool::new(false),
                cycles: AtomicU64::new(0),
                last_report: Mutex::new(None),
            }),
            pose_source,
            poll_interval,
            worker: None,
        })
    }

    /// Create a localizer and start its worker immediately
    pub fn spawn(
        config: MclConfig,
        pose_source: Arc<dyn PoseSource>,
        field: Arc<Field>,
        sensors: Vec<DistanceSensor>,
        rng: StdRng,
    ) -> Result<Self> {
        let mut mcl = Mcl::new(config, pose_source, field, sensors, rng)?;
        mcl.start()?;
        mcl.base.set_state(State::Active);
        Ok(mcl)
    }

    /// Start the worker thread if it is not already running
    pub fn start(&mut self) -> Result<()> {
        if self.worker.is_some() {
            return Ok(());
        }

        self.shared.running.store(true, Ordering::Release);
        let shared = Arc::clone(&self.shared);
        let pose_source = Arc::clone(&self.pose_source);
        let poll_interval = self.poll_interval;

        let handle = thread::Builder::new()
            .name("mcl-worker".to_string())
            .spawn(move || run_worker(&shared, pose_source.as_ref(), poll_interval))
            .map_err(|e| {
                self.shared.running.store(false, Ordering::Release);
                LocalizationError::Lifecycle(format!("failed to spawn worker: {}", e))
            })?;

        self.worker = Some(handle);
        info!("Localization worker started");
        Ok(())
    }

    /// Signal the worker to stop and wait for it to exit
    pub fn stop(&mut self) -> Result<()> {
        self.shared.running.store(false, Ordering::Release);

        if let Some(handle) = self.worker.take() {
            handle
                .join()
                .map_err(|_| LocalizationError::WorkerPanicked)?;
            info!("Localization worker stopped");
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some() && self.shared.running.load(Ordering::Acquire)
    }

    /// Number of completed filter cycles
    pub fn cycle_count(&self) -> u64 {
        self.shared.cycles.load(Ordering::Acquire)
    }

    /// Diagnostics from the most recent completed cycle
    pub fn last_report(&self) -> Option<CycleReport> {
        *self.shared.last_report.lock()
    }

    pub fn get_point_estimate(&self) -> Point {
        self.shared.filter.lock().get_point_estimate()
    }

    pub fn get_position_estimate_variance(&self) -> f64 {
        self.shared.filter.lock().get_position_estimate_variance()
    }

    pub fn get_particle(&self, index: usize) -> Option<Particle> {
        self.shared.filter.lock().get_particle(index)
    }

    /// Snapshot of the whole population
    pub fn get_particles(&self) -> Vec<Particle> {
        self.shared.filter.lock().get_particles().to_vec()
    }

    pub fn get_particle_count(&self) -> usize {
        self.shared.filter.lock().get_particle_count()
    }

    /// Allow or suppress writing converged estimates back to the pose source
    pub fn set_enabled(&self, enabled: bool) {
        self.shared.filter.lock().set_enabled(enabled);
    }

    pub fn set_odometry_reset_threshold(&self, threshold: f64) {
        self.shared.filter.lock().set_odometry_reset_threshold(threshold);
    }

    /// Restart the population around a known position
    pub fn reset_particles(&self, guess: Point, spread: f64) {
        self.shared.filter.lock().reset_particles(guess, spread);
    }

    pub fn set_sensor_enabled(&self, index: usize, enabled: bool) -> Result<()> {
        let mut filter = self.shared.filter.lock();
        let sensor = filter.sensor_mut(index).ok_or_else(|| {
            LocalizationError::invalid("sensor_index", format!("no sensor at index {}", index))
        })?;
        sensor.set_enabled(enabled);
        debug!("Sensor {} {}", sensor.name(), if enabled { "enabled" } else { "disabled" });
        Ok(())
    }
}

/// Poll `source` until its pose differs from `last`.
///
/// Returns the new pose and the time spent waiting, or `None` once `running`
/// is cleared.
fn wait_for_motion(
    running: &AtomicBool,
    source: &dyn PoseSource,
    last: Pose,
    poll_interval: Duration,
) -> Option<(Pose, Duration)> {
    let mut pose = source.get_pose();
    let mut waited = Duration::ZERO;

    while pose == last {
        if !running.load(Ordering::Acquire) {
            return None;
        }
        thread::sleep(poll_interval);
        waited += poll_interval;
        pose = source.get_pose();
    }

    Some((pose, waited))
}

fn run_worker(shared: &Shared, source: &dyn PoseSource, poll_interval: Duration) {
    while shared.running.load(Ordering::Acquire) {
        let last = shared.filter.lock().last_pose();
        let Some((pose, waited)) = wait_for_motion(&shared.running, source, last, poll_interval)
        else {
            break;
        };

        // The pose changed before a full poll interval elapsed
        if waited.is_zero() {
            shared.filter.lock().record_pose(pose);
            continue;
        }

        let report = shared.filter.lock().update(pose);

        if let CycleOutcome::Converged(estimate) = report.outcome {
            debug!(
                "Correcting pose to ({:.2}, {:.2}), variance {:.3}",
                estimate.x, estimate.y, report.variance
            );
            source.set_pose(pose.with_position(estimate));
        }

        *shared.last_report.lock() = Some(report);
        shared.cycles.fetch_add(1, Ordering::AcqRel);
    }
}

impl LifecycleNode for Mcl {
    fn name(&self) -> &str {
        &self.base.name
    }

    fn on_configure(&mut self) -> Result<()> {
        self.shared.filter.lock().config().validate()?;
        self.base.set_state(State::Inactive);
        Ok(())
    }

    fn on_activate(&mut self) -> Result<()> {
        self.start()?;
        self.base.set_state(State::Active);
        Ok(())
    }

    fn on_deactivate(&mut self) -> Result<()> {
        self.stop()?;
        self.base.set_state(State::Inactive);
        Ok(())
    }

    fn on_cleanup(&mut self) -> Result<()> {
        self.stop()?;
        self.base.set_state(State::Unconfigured);
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Drop for Mcl {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
