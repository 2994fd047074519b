//! Monte Carlo localization
//!
//! The filter fuses the drivetrain's pose estimate with distance sensor
//! readings against the known field. [`MclFilter`] holds the algorithm;
//! [`Mcl`] runs it on a background worker against a live [`PoseSource`].

mod filter;
mod mcl;
mod particle;

pub use filter::{
    build_cdf, effective_sample_size, systematic_indices, CycleOutcome, CycleReport, MclFilter,
};
pub use mcl::Mcl;
pub use particle::Particle;

use crate::common::Pose;

/// The odometry system being corrected
pub trait PoseSource: Send + Sync {
    /// Current pose estimate, heading in radians
    fn get_pose(&self) -> Pose;

    /// Overwrite the pose estimate, heading in radians
    fn set_pose(&self, pose: Pose);
}
