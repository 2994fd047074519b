//! Static field geometry
//!
//! The play area is an axis-aligned rectangle. The only query the localizer
//! needs is the distance along a ray from a point inside the field to the
//! first wall it hits.

use crate::common::Point;
use crate::error::{LocalizationError, Result};

/// Direction components at or below this magnitude skip the matching walls
const DIRECTION_EPSILON: f64 = 1e-9;

/// An axis-aligned rectangular field, read-only after construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
    min: Point,
    max: Point,
}

impl Field {
    /// Create a field from its minimum and maximum corners
    pub fn new(min: Point, max: Point) -> Result<Self> {
        let finite = [min.x, min.y, max.x, max.y].iter().all(|v| v.is_finite());
        if !finite || min.x >= max.x || min.y >= max.y {
            return Err(LocalizationError::InvalidField {
                min_x: min.x,
                min_y: min.y,
                max_x: max.x,
                max_y: max.y,
            });
        }
        Ok(Field { min, max })
    }

    pub fn get_min_point(&self) -> Point {
        self.min
    }

    pub fn get_max_point(&self) -> Point {
        self.max
    }

    /// Whether the point lies inside the rectangle, edges included
    pub fn contains(&self, point: Point) -> bool {
        (self.min.x..=self.max.x).contains(&point.x) && (self.min.y..=self.max.y).contains(&point.y)
    }

    /// Distance from `point` along `(cached_cos, cached_sin)` to the nearest wall.
    ///
    /// Each wall is intersected parametrically, `t = (edge - origin) / direction`,
    /// and a hit counts only when `t >= 0` and the crossing lies within the
    /// perpendicular extent of that wall. Returns `f64::INFINITY` when nothing
    /// is hit, which only happens for points outside the field.
    pub fn get_distance_to_wall(&self, point: Point, cached_cos: f64, cached_sin: f64) -> f64 {
        let mut nearest = f64::INFINITY;

        if cached_cos.abs() > DIRECTION_EPSILON {
            for edge_x in [self.max.x, self.min.x] {
                let t = (edge_x - point.x) / cached_cos;
                if t >= 0.0 {
                    let y = point.y + t * cached_sin;
                    if y >= self.min.y && y <= self.max.y {
                        nearest = nearest.min(t);
                    }
                }
            }
        }

        if cached_sin.abs() > DIRECTION_EPSILON {
            for edge_y in [self.max.y, self.min.y] {
                let t = (edge_y - point.y) / cached_sin;
                if t >= 0.0 {
                    let x = point.x + t * cached_cos;
                    if x >= self.min.x && x <= self.max.x {
                        nearest = nearest.min(t);
                    }
                }
            }
        }

        nearest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_1_SQRT_2;

    fn field() -> Field {
        Field::new(Point::new(1.0, 1.0), Point::new(143.0, 143.0)).unwrap()
    }

    #[test]
    fn test_ray_toward_positive_y() {
        assert_eq!(field().get_distance_to_wall(Point::new(72.0, 72.0), 0.0, 1.0), 71.0);
    }

    #[test]
    fn test_axis_rays() {
        let f = field();
        let p = Point::new(30.0, 100.0);
        assert_relative_eq!(f.get_distance_to_wall(p, 1.0, 0.0), 113.0);
        assert_relative_eq!(f.get_distance_to_wall(p, -1.0, 0.0), 29.0);
        assert_relative_eq!(f.get_distance_to_wall(p, 0.0, -1.0), 99.0);
    }

    #[test]
    fn test_diagonal_ray_hits_nearest_wall() {
        let f = field();
        // From (72, 122) heading up-right the top wall is 21in away vertically.
        let d = f.get_distance_to_wall(Point::new(72.0, 122.0), FRAC_1_SQRT_2, FRAC_1_SQRT_2);
        assert_relative_eq!(d, 21.0 / FRAC_1_SQRT_2, epsilon = 1e-9);
    }

    #[test]
    fn test_near_zero_components_are_skipped() {
        let f = field();
        // A cosine of 1e-12 would otherwise produce a huge vertical-wall t.
        let d = f.get_distance_to_wall(Point::new(72.0, 72.0), 1e-12, 1.0);
        assert_relative_eq!(d, 71.0, epsilon = 1e-9);
    }

    #[test]
    fn test_outside_point_pointing_away_is_infinite() {
        let f = field();
        let d = f.get_distance_to_wall(Point::new(150.0, 72.0), 1.0, 0.0);
        assert!(d.is_infinite());
    }

    #[test]
    fn test_rejects_inverted_corners() {
        assert!(Field::new(Point::new(10.0, 0.0), Point::new(5.0, 10.0)).is_err());
        assert!(Field::new(Point::new(0.0, 0.0), Point::new(f64::NAN, 10.0)).is_err());
    }

    #[test]
    fn test_contains() {
        let f = field();
        assert!(f.contains(Point::new(1.0, 143.0)));
        assert!(!f.contains(Point::new(0.5, 72.0)));
    }
}
