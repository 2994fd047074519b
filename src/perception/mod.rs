//! Perception module: field model, distance sensors and localization
pub mod field;
pub mod localization;
pub mod sensors;
