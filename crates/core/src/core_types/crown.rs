//! Crown polygons.
//!
//! A crown is the closed 2-D silhouette of a plant's foliage in the vertical
//! plane along the wind direction. Plant crowns are hexagonal, built from
//! five scalars: `hc` the height of the lower apex, `he` the height of the
//! lower edge, `ht` the height of the upper edge, `hp` the height of the
//! upper apex, and `w` the width. Stratum runs use a slope-sheared
//! rectangular pseudo-crown instead.

use serde::{Deserialize, Serialize};

use crate::core_types::geometry::{coord, Coord, Ray, Segment};
use crate::core_types::numerics;
use crate::error::{ModelError, Result};

/// A closed, convex crown polygon with anticlockwise vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrownPoly {
    vertices: Vec<Coord>,
}

impl CrownPoly {
    /// Hexagonal plant crown.
    ///
    /// Invariants: `hp > hc`, `ht >= he`, `w > 0`. Violations fail with
    /// [`ModelError::InvalidInput`]; no partially-built crown escapes.
    pub fn hexagonal(hc: f64, he: f64, ht: f64, hp: f64, w: f64) -> Result<Self> {
        if !(w > 0.0) {
            return Err(ModelError::invalid(format!("crown width must be positive, got {w}")));
        }
        if !(hp > hc) {
            return Err(ModelError::invalid(format!(
                "crown top apex must be above bottom apex (hp {hp} <= hc {hc})"
            )));
        }
        if ht < he {
            return Err(ModelError::invalid(format!(
                "crown upper edge must not be below lower edge (ht {ht} < he {he})"
            )));
        }
        let half = w / 2.0;
        Ok(CrownPoly {
            vertices: vec![
                coord(0.0, hc),
                coord(half, he),
                coord(half, ht),
                coord(0.0, hp),
                coord(-half, ht),
                coord(-half, he),
            ],
        })
    }

    /// Rectangular crown spanning `x0..x1`, sheared so that its bottom and
    /// top edges run parallel to a surface of the given slope.
    pub fn sheared_rectangle(x0: f64, x1: f64, bottom: f64, top: f64, slope: f64) -> Result<Self> {
        if !(x1 > x0) {
            return Err(ModelError::invalid(format!(
                "rectangle must have positive width (x0 {x0}, x1 {x1})"
            )));
        }
        if !(top > bottom) {
            return Err(ModelError::invalid(format!(
                "rectangle top {top} must be above bottom {bottom}"
            )));
        }
        let t = slope.tan();
        Ok(CrownPoly {
            vertices: vec![
                coord(x0, bottom + x0 * t),
                coord(x1, bottom + x1 * t),
                coord(x1, top + x1 * t),
                coord(x0, top + x0 * t),
            ],
        })
    }

    pub fn vertices(&self) -> &[Coord] {
        &self.vertices
    }

    fn edges(&self) -> impl Iterator<Item = (Coord, Coord)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    pub fn left(&self) -> f64 {
        self.vertices.iter().map(|p| p.x).fold(f64::INFINITY, f64::min)
    }

    pub fn right(&self) -> f64 {
        self.vertices.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn bottom(&self) -> f64 {
        self.vertices.iter().map(|p| p.y).fold(f64::INFINITY, f64::min)
    }

    pub fn top(&self) -> f64 {
        self.vertices.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn width(&self) -> f64 {
        self.right() - self.left()
    }

    pub fn height(&self) -> f64 {
        self.top() - self.bottom()
    }

    /// Signed shoelace sum (positive for anticlockwise vertices).
    fn signed_area(&self) -> f64 {
        self.edges().map(|(a, b)| a.x * b.y - b.x * a.y).sum::<f64>() / 2.0
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn centroid(&self) -> Coord {
        let a = self.signed_area();
        let (mut cx, mut cy) = (0.0, 0.0);
        for (p, q) in self.edges() {
            let c = p.x * q.y - q.x * p.y;
            cx += (p.x + q.x) * c;
            cy += (p.y + q.y) * c;
        }
        coord(cx / (6.0 * a), cy / (6.0 * a))
    }

    /// Largest horizontal offset of the polygon at height `y`.
    fn radius_at(&self, y: f64) -> f64 {
        let tol = numerics::DEFAULT_TOLERANCE;
        let mut r = f64::NEG_INFINITY;
        for (a, b) in self.edges() {
            let (ylo, yhi) = (a.y.min(b.y), a.y.max(b.y));
            if y < ylo - tol || y > yhi + tol {
                continue;
            }
            if numerics::almost_eq(a.y, b.y) {
                r = r.max(a.x.max(b.x));
            } else {
                let f = (y - a.y) / (b.y - a.y);
                r = r.max(a.x + f.clamp(0.0, 1.0) * (b.x - a.x));
            }
        }
        r.max(0.0)
    }

    /// Volume of the solid of revolution of the crown about its central
    /// vertical axis, computed as a stack of conical frustums between
    /// vertex heights.
    pub fn volume_of_revolution(&self) -> f64 {
        let mut levels: Vec<f64> = self.vertices.iter().map(|p| p.y).collect();
        levels.sort_by(f64::total_cmp);
        levels.dedup_by(|a, b| numerics::almost_eq(*a, *b));
        let mut volume = 0.0;
        for pair in levels.windows(2) {
            let (y1, y2) = (pair[0], pair[1]);
            let (r1, r2) = (self.radius_at(y1), self.radius_at(y2));
            volume += std::f64::consts::PI * (y2 - y1) * (r1 * r1 + r1 * r2 + r2 * r2) / 3.0;
        }
        volume
    }

    /// The point on the lower hull of the crown at horizontal offset `x`
    /// (clamped into the crown's horizontal extent).
    pub fn point_in_base(&self, x: f64) -> Coord {
        let x = x.clamp(self.left(), self.right());
        let tol = numerics::DEFAULT_TOLERANCE;
        let mut y = f64::INFINITY;
        for (a, b) in self.edges() {
            let (xlo, xhi) = (a.x.min(b.x), a.x.max(b.x));
            if x < xlo - tol || x > xhi + tol {
                continue;
            }
            if numerics::almost_eq(a.x, b.x) {
                y = y.min(a.y.min(b.y));
            } else {
                let f = (x - a.x) / (b.x - a.x);
                y = y.min(a.y + f.clamp(0.0, 1.0) * (b.y - a.y));
            }
        }
        coord(x, if y.is_finite() { y } else { self.bottom() })
    }

    /// Even-odd containment test.
    pub fn contains(&self, p: Coord) -> bool {
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// The portion of a ray inside the crown: entry point to exit point.
    /// `None` when the ray misses the crown or only grazes it.
    pub fn intersection(&self, ray: &Ray) -> Option<Segment> {
        let mut ts: Vec<f64> = self
            .edges()
            .filter_map(|(a, b)| ray.intersect_edge(a, b))
            .collect();
        if self.contains(ray.origin) {
            ts.push(0.0);
        }
        if ts.is_empty() {
            return None;
        }
        let t_min = ts.iter().copied().fold(f64::INFINITY, f64::min);
        let t_max = ts.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if numerics::almost_zero(t_max - t_min) {
            return None;
        }
        Some(Segment::new(ray.point_at(t_min), ray.point_at(t_max)))
    }
}
