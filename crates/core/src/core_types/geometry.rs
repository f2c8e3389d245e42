//! 2-D geometry kernel for the vertical plane along the wind direction.
//!
//! All geometry is expressed in a single vertical slice: x horizontal and
//! positive downwind, y vertical above the surface at x = 0. Angles are
//! radians measured anticlockwise from the positive x axis.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::core_types::numerics;
use crate::error::{ModelError, Result};

/// A point in the vertical plane.
pub type Coord = Point2<f64>;

/// Direction vector in the vertical plane.
pub type Vec2 = Vector2<f64>;

/// Shorthand constructor.
#[inline]
pub fn coord(x: f64, y: f64) -> Coord {
    Point2::new(x, y)
}

/// Unit vector for an angle.
#[inline]
pub fn unit_vector(angle: f64) -> Vec2 {
    Vector2::new(angle.cos(), angle.sin())
}

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: Coord, b: Coord) -> f64 {
    (b - a).norm()
}

/// Angle of the vector from `a` to `b`.
#[inline]
pub fn angle_between(a: Coord, b: Coord) -> f64 {
    (b.y - a.y).atan2(b.x - a.x)
}

/// The point `dist` along `angle` from `origin`.
#[inline]
pub fn point_at(origin: Coord, angle: f64, dist: f64) -> Coord {
    origin + unit_vector(angle) * dist
}

/// 2-D cross product (z component of the 3-D cross).
#[inline]
fn cross(a: Vec2, b: Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// An infinite line through a point at a given angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    point: Coord,
    angle: f64,
}

impl Line {
    pub fn new(point: Coord, angle: f64) -> Self {
        Line { point, angle }
    }

    pub fn point(&self) -> Coord {
        self.point
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// The point on this line from which a ray at `angle` passes through
    /// `target`. Fails when `angle` is parallel to the line, in which case
    /// no such origin exists (or every point qualifies).
    pub fn origin_on_line(&self, target: Coord, angle: f64) -> Result<Coord> {
        let u = unit_vector(self.angle);
        let v = unit_vector(angle);
        let det = cross(u, v);
        if numerics::almost_zero(det) {
            return Err(ModelError::geometry(format!(
                "ray angle {angle:.6} rad is parallel to line at {:.6} rad",
                self.angle
            )));
        }
        // point + s·u lies on the line; solve s from point + s·u + t·v = target
        let w = target - self.point;
        let s = cross(w, v) / det;
        Ok(self.point + u * s)
    }

    /// Intersection of this line with a ray, if the ray reaches it.
    pub fn intersection(&self, ray: &Ray) -> Option<Coord> {
        let u = unit_vector(self.angle);
        let v = unit_vector(ray.angle);
        let det = cross(v, u);
        if numerics::almost_zero(det) {
            return None;
        }
        let w = self.point - ray.origin;
        let t = cross(w, u) / det;
        if t < -numerics::DEFAULT_TOLERANCE {
            return None;
        }
        Some(point_at(ray.origin, ray.angle, t.max(0.0)))
    }
}

/// A half-line from an origin at a given angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Coord,
    pub angle: f64,
}

impl Ray {
    pub fn new(origin: Coord, angle: f64) -> Self {
        Ray { origin, angle }
    }

    /// The point `dist` along the ray.
    pub fn point_at(&self, dist: f64) -> Coord {
        point_at(self.origin, self.angle, dist)
    }

    /// Ray parameter of the intersection with the segment `a`–`b`, if any.
    pub(crate) fn intersect_edge(&self, a: Coord, b: Coord) -> Option<f64> {
        let v = unit_vector(self.angle);
        let e = b - a;
        let det = cross(v, e);
        if numerics::almost_zero(det) {
            return None;
        }
        let w = a - self.origin;
        let t = cross(w, e) / det;
        let s = cross(w, v) / det;
        let tol = numerics::DEFAULT_TOLERANCE;
        if t >= -tol && s >= -tol && s <= 1.0 + tol {
            Some(t.max(0.0))
        } else {
            None
        }
    }
}

/// A directed line segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Coord,
    pub end: Coord,
}

impl Segment {
    pub fn new(start: Coord, end: Coord) -> Self {
        Segment { start, end }
    }

    pub fn length(&self) -> f64 {
        distance(self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    #[test]
    fn test_origin_on_line_vertical_ray() {
        // Horizontal line through the origin; a vertical ray through (3, 5)
        // must start at (3, 0).
        let line = Line::new(coord(0.0, 0.0), 0.0);
        let origin = line.origin_on_line(coord(3.0, 5.0), FRAC_PI_2).unwrap();
        assert_relative_eq!(origin.x, 3.0, epsilon = 1e-12);
        assert_relative_eq!(origin.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_origin_on_line_oblique() {
        // 45° ray through (2, 1) from a flat line: origin at (1, 0).
        let line = Line::new(coord(0.0, 0.0), 0.0);
        let origin = line.origin_on_line(coord(2.0, 1.0), FRAC_PI_4).unwrap();
        assert_relative_eq!(origin.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(origin.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_origin_on_line_parallel_fails() {
        let line = Line::new(coord(0.0, 0.0), 0.1);
        assert!(line.origin_on_line(coord(2.0, 1.0), 0.1).is_err());
    }

    #[test]
    fn test_line_ray_intersection() {
        let line = Line::new(coord(0.0, 2.0), 0.0);
        let ray = Ray::new(coord(0.0, 0.0), FRAC_PI_2);
        let p = line.intersection(&ray).unwrap();
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-12);

        // Ray pointing away never reaches the line.
        let away = Ray::new(coord(0.0, 0.0), -FRAC_PI_2);
        assert!(line.intersection(&away).is_none());
    }

    #[test]
    fn test_ray_edge_intersection() {
        let ray = Ray::new(coord(0.0, 0.0), 0.0);
        let t = ray.intersect_edge(coord(2.0, -1.0), coord(2.0, 1.0)).unwrap();
        assert_relative_eq!(t, 2.0, epsilon = 1e-12);
        assert!(ray.intersect_edge(coord(-1.0, -1.0), coord(-1.0, 1.0)).is_none());
    }

    #[test]
    fn test_angle_between() {
        assert_relative_eq!(
            angle_between(coord(0.0, 0.0), coord(1.0, 1.0)),
            FRAC_PI_4,
            epsilon = 1e-12
        );
    }
}
