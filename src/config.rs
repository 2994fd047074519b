//! Tunables for the Monte Carlo localizer
//!
//! Parameters can come from three places: [`MclConfig::default`], a TOML
//! document ([`MclConfig::from_toml_str`]) or a named parameter map
//! ([`MclConfig::configure`]). Every path ends in [`MclConfig::validate`].

use crate::error::{LocalizationError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Configuration for the particle filter and its worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MclConfig {
    /// Number of particles in the population
    pub particle_count: usize,
    /// Sleep between pose polls while waiting for motion
    pub poll_interval_ms: u64,
    /// Std dev of the translational noise added during prediction (inches)
    pub translation_noise_std: f64,
    /// Std dev of the angular noise added during prediction (radians)
    pub rotation_noise_std: f64,
    /// Std dev of the multiplicative per-axis jitter on the predicted step
    pub position_jitter_std: f64,
    /// Std dev of the additive jitter applied after resampling (inches)
    pub roughening_std: f64,
    /// Resample when `N_eff < resample_ratio * N`
    pub resample_ratio: f64,
    /// The top `N / refine_divisor` particles are hill-climbed after resampling
    pub refine_divisor: usize,
    pub hill_climb_iterations: usize,
    /// Neighbor offset used by the hill climb (inches)
    pub hill_climb_step: f64,
    /// Lower bound on the summed log-likelihood of one particle
    pub log_likelihood_floor: f64,
    /// Weighted variance (in²) above which the filter reinitializes
    pub divergence_variance: f64,
    /// Weighted variance (in²) below which the estimate is written back
    pub odometry_reset_threshold: f64,
    /// Whether converged estimates are written back to the pose source
    pub enabled: bool,
}

impl Default for MclConfig {
    fn default() -> Self {
        MclConfig {
            particle_count: 800,
            poll_interval_ms: 2,
            translation_noise_std: 0.3,
            rotation_noise_std: 0.3,
            position_jitter_std: 0.01,
            roughening_std: 0.005,
            resample_ratio: 0.5,
            refine_divisor: 80,
            hill_climb_iterations: 15,
            hill_climb_step: 0.05,
            log_likelihood_floor: -50.0,
            divergence_variance: 14.0,
            odometry_reset_threshold: 1.0,
            enabled: false,
        }
    }
}

impl MclConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: MclConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply named numeric parameters, then validate
    pub fn configure(&mut self, params: &HashMap<String, f64>) -> Result<()> {
        for (name, &value) in params {
            match name.as_str() {
                "particle_count" => self.particle_count = as_count(name, value)?,
                "poll_interval_ms" => self.poll_interval_ms = as_count(name, value)? as u64,
                "translation_noise_std" => self.translation_noise_std = value,
                "rotation_noise_std" => self.rotation_noise_std = value,
                "position_jitter_std" => self.position_jitter_std = value,
                "roughening_std" => self.roughening_std = value,
                "resample_ratio" => self.resample_ratio = value,
                "refine_divisor" => self.refine_divisor = as_count(name, value)?,
                "hill_climb_iterations" => self.hill_climb_iterations = as_count(name, value)?,
                "hill_climb_step" => self.hill_climb_step = value,
                "log_likelihood_floor" => self.log_likelihood_floor = value,
                "divergence_variance" => self.divergence_variance = value,
                "odometry_reset_threshold" => self.odometry_reset_threshold = value,
                "enabled" => self.enabled = value != 0.0,
                _ => return Err(LocalizationError::invalid(name, "unknown parameter")),
            }
        }

        self.validate()
    }

    /// Check every tunable for a usable value
    pub fn validate(&self) -> Result<()> {
        if self.particle_count == 0 {
            return Err(LocalizationError::invalid("particle_count", "must be positive"));
        }
        if self.poll_interval_ms == 0 {
            return Err(LocalizationError::invalid("poll_interval_ms", "must be positive"));
        }
        if self.refine_divisor == 0 {
            return Err(LocalizationError::invalid("refine_divisor", "must be positive"));
        }

        non_negative("translation_noise_std", self.translation_noise_std)?;
        non_negative("rotation_noise_std", self.rotation_noise_std)?;
        non_negative("position_jitter_std", self.position_jitter_std)?;
        non_negative("roughening_std", self.roughening_std)?;
        non_negative("hill_climb_step", self.hill_climb_step)?;
        positive("divergence_variance", self.divergence_variance)?;
        positive("odometry_reset_threshold", self.odometry_reset_threshold)?;

        if !(self.resample_ratio > 0.0 && self.resample_ratio <= 1.0) {
            return Err(LocalizationError::invalid("resample_ratio", "must be in (0, 1]"));
        }
        if !(self.log_likelihood_floor.is_finite() && self.log_likelihood_floor <= 0.0) {
            return Err(LocalizationError::invalid(
                "log_likelihood_floor",
                "must be finite and not positive",
            ));
        }
        if self.odometry_reset_threshold >= self.divergence_variance {
            return Err(LocalizationError::invalid(
                "odometry_reset_threshold",
                "must be below divergence_variance",
            ));
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Number of particles refined by hill climbing after a resample
    pub fn refined_count(&self) -> usize {
        self.particle_count / self.refine_divisor
    }
}

fn as_count(name: &str, value: f64) -> Result<usize> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        return Err(LocalizationError::invalid(name, "must be a non-negative integer"));
    }
    Ok(value as usize)
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(LocalizationError::invalid(name, "must be non-negative"));
    }
    Ok(())
}

fn positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(LocalizationError::invalid(name, "must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = MclConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.refined_count(), 10);
        assert_eq!(config.poll_interval(), Duration::from_millis(2));
    }

    #[test]
    fn test_from_toml_keeps_missing_defaults() {
        let config = MclConfig::from_toml_str("particle_count = 400\nenabled = true\n").unwrap();
        assert_eq!(config.particle_count, 400);
        assert!(config.enabled);
        assert_eq!(config.divergence_variance, 14.0);
    }

    #[test]
    fn test_from_toml_rejects_garbage() {
        let err = MclConfig::from_toml_str("particle_count = \"many\"").unwrap_err();
        assert!(matches!(err, LocalizationError::Config(_)));
    }

    #[test]
    fn test_configure_applies_params() {
        let mut config = MclConfig::default();
        let mut params = HashMap::new();
        params.insert("odometry_reset_threshold".to_string(), 0.5);
        params.insert("particle_count".to_string(), 900.0);
        params.insert("enabled".to_string(), 1.0);

        config.configure(&params).unwrap();
        assert_eq!(config.odometry_reset_threshold, 0.5);
        assert_eq!(config.particle_count, 900);
        assert!(config.enabled);
    }

    #[test]
    fn test_configure_rejects_unknown_and_invalid() {
        let mut config = MclConfig::default();
        let mut params = HashMap::new();
        params.insert("lookahead_distance".to_string(), 0.8);
        assert!(config.configure(&params).is_err());

        let mut params = HashMap::new();
        params.insert("particle_count".to_string(), 12.5);
        assert!(config.configure(&params).is_err());

        let mut params = HashMap::new();
        params.insert("resample_ratio".to_string(), 1.5);
        assert!(config.configure(&params).is_err());
    }

    #[test]
    fn test_threshold_must_stay_below_divergence() {
        let config = MclConfig {
            odometry_reset_threshold: 20.0,
            ..MclConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
