//! Flame geometry and plume thermodynamics.
//!
//! A flame is a straight plume from an origin: uniformly hot over the flame
//! length, cooling with inverse distance beyond the tip. Flames tilt under
//! wind following a Froude-number relation, merge laterally across
//! neighbouring plants, and fuse vertically when a lower flame series
//! drives an upper one.
//!
//! # Scientific References
//! - Byram, G.M. (1959). "Combustion of forest fuels", in Forest Fire:
//!   Control and Use
//! - Albini, F.A. (1981). "A model for the wind-blown flame from a line
//!   fire", Combustion and Flame, 43, 155-174

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

use crate::constants;
use crate::core_types::geometry::{self, Coord, Ray};
use crate::core_types::numerics;
use crate::error::{ModelError, Result};

/// One flame: geometry plus its temperature increase over ambient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flame {
    flame_length: f64,
    angle: f64,
    origin: Coord,
    depth_ignited: f64,
    delta_temperature: f64,
}

impl Flame {
    pub fn new(
        flame_length: f64,
        angle: f64,
        origin: Coord,
        depth_ignited: f64,
        delta_temperature: f64,
    ) -> Result<Self> {
        if !(flame_length > 0.0) {
            return Err(ModelError::invalid(format!(
                "flame length must be positive, got {flame_length}"
            )));
        }
        if depth_ignited < 0.0 || depth_ignited > flame_length + numerics::DEFAULT_TOLERANCE {
            return Err(ModelError::invalid(format!(
                "depth ignited {depth_ignited} must lie within the flame length {flame_length}"
            )));
        }
        if !(delta_temperature > 0.0) {
            return Err(ModelError::invalid(format!(
                "flame delta temperature must be positive, got {delta_temperature}"
            )));
        }
        Ok(Flame {
            flame_length,
            angle,
            origin,
            depth_ignited: depth_ignited.min(flame_length),
            delta_temperature,
        })
    }

    pub fn flame_length(&self) -> f64 {
        self.flame_length
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn origin(&self) -> Coord {
        self.origin
    }

    pub fn depth_ignited(&self) -> f64 {
        self.depth_ignited
    }

    pub fn delta_temperature(&self) -> f64 {
        self.delta_temperature
    }

    /// The flame tip.
    pub fn tip(&self) -> Coord {
        geometry::point_at(self.origin, self.angle, self.flame_length)
    }

    /// The plume ray from the flame origin.
    pub fn plume(&self) -> Ray {
        Ray::new(self.origin, self.angle)
    }

    /// Temperature increase over ambient at `dist` from the origin along
    /// the plume: the full delta within the flame, inverse-distance decay
    /// beyond the tip.
    pub fn plume_delta_temperature(&self, dist: f64) -> f64 {
        if dist <= self.flame_length {
            self.delta_temperature
        } else {
            self.delta_temperature * self.flame_length / dist
        }
    }

    /// Absolute plume temperature at `dist` from the origin.
    pub fn plume_temperature(&self, dist: f64, ambient: f64) -> f64 {
        ambient + self.plume_delta_temperature(dist)
    }

    /// The greatest distance from the origin at which the plume still
    /// reaches `target`. `None` when the flame can never reach it;
    /// unbounded when the target is at or below ambient.
    pub fn distance_for_temperature(&self, target: f64, ambient: f64) -> Option<f64> {
        let needed = target - ambient;
        if needed > self.delta_temperature {
            return None;
        }
        if needed <= 0.0 {
            return Some(f64::INFINITY);
        }
        Some(self.flame_length * self.delta_temperature / needed)
    }

    /// A copy with the same thermal attributes at a new origin and angle.
    pub fn reoriented(&self, origin: Coord, angle: f64) -> Flame {
        Flame { origin, angle, ..self.clone() }
    }
}

/// Flame angle (radians from horizontal) under wind on a slope.
///
/// Still air leaves the flame vertical. Wind tilts it downwind with
/// `tan(tilt) = U / sqrt(g·L)` (Albini); the flame never lies below the
/// surface line. Negative wind mirrors the tilt upwind.
pub fn wind_effect_flame_angle(flame_length: f64, wind_speed: f64, slope: f64) -> f64 {
    if numerics::almost_zero(flame_length) {
        return 0.0;
    }
    if numerics::almost_zero(wind_speed) {
        return FRAC_PI_2;
    }
    let tilt = ((constants::GRAVITY * flame_length).sqrt() / wind_speed.abs()).atan();
    if wind_speed > 0.0 {
        tilt.max(slope)
    } else {
        (PI - tilt).min(PI + slope)
    }
}

/// Horizontal coordinate of a flame tip for the given segment geometry.
///
/// Shared by plant-flame creation and the stratum connection test so the
/// two can never disagree.
pub fn flame_tip_x(origin_x: f64, flame_length: f64, wind_speed: f64, slope: f64) -> f64 {
    origin_x + flame_length * wind_effect_flame_angle(flame_length, wind_speed, slope).cos()
}

/// Flame length after lateral merging of flames from neighbouring plants
/// along the fire line.
///
/// The effective number of simultaneously burning plants grows with the
/// fire line length and plant width and shrinks with separation; merged
/// flames follow the fourth-power law.
pub fn lateral_merged_flame_length(
    flame_length: f64,
    fire_line_length: f64,
    plant_width: f64,
    plant_sep: f64,
) -> f64 {
    if numerics::almost_zero(flame_length) {
        return 0.0;
    }
    if plant_sep <= 0.0 || plant_width <= 0.0 || fire_line_length <= 0.0 {
        return flame_length;
    }
    let burners = (fire_line_length * plant_width / (plant_sep * plant_sep)).max(1.0);
    flame_length * burners.powf(0.25)
}

/// Maximum flame length of a series, zero for an empty one.
pub fn max_flame_length(flames: &[Flame]) -> f64 {
    flames.iter().map(Flame::flame_length).fold(0.0, f64::max)
}

/// The longest flame of a series.
pub fn longest_flame(flames: &[Flame]) -> Option<&Flame> {
    flames
        .iter()
        .max_by(|a, b| a.flame_length.total_cmp(&b.flame_length))
}

/// Fuse an upper flame series with the series driving it from below.
///
/// Index-wise over the longer series: where both are present, the combined
/// flame runs from the lower origin to the upper tip (never shorter than
/// either contributor, capped at the fire line length), carries the
/// length-weighted delta temperature, and takes its angle from the
/// flame-weighted wind.
pub fn combine_flames(
    upper: &[Flame],
    lower: &[Flame],
    weighted_wind: f64,
    slope: f64,
    fire_line_length: f64,
) -> Result<Vec<Flame>> {
    let n = upper.len().max(lower.len());
    let mut combined = Vec::with_capacity(n);
    for i in 0..n {
        match (upper.get(i), lower.get(i)) {
            (Some(u), Some(l)) => {
                let (lo, hi) = if l.origin.y <= u.origin.y { (l, u) } else { (u, l) };
                let reach = geometry::distance(lo.origin, hi.tip());
                let length = reach
                    .max(lo.flame_length)
                    .max(hi.flame_length)
                    .min(fire_line_length.max(lo.flame_length));
                let total = lo.flame_length + hi.flame_length;
                let delta_t = (lo.flame_length * lo.delta_temperature
                    + hi.flame_length * hi.delta_temperature)
                    / total;
                let depth = lo.depth_ignited.max(hi.depth_ignited).min(length);
                let angle = wind_effect_flame_angle(length, weighted_wind, slope);
                combined.push(Flame::new(length, angle, lo.origin, depth, delta_t)?);
            }
            (Some(f), None) | (None, Some(f)) => combined.push(f.clone()),
            (None, None) => unreachable!("index bounded by the longer series"),
        }
    }
    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::geometry::coord;
    use approx::assert_relative_eq;

    fn flame(length: f64) -> Flame {
        Flame::new(length, FRAC_PI_2, coord(0.0, 0.0), length / 2.0, 950.0).unwrap()
    }

    #[test]
    fn test_plume_temperature_profile() {
        let f = flame(2.0);
        assert_relative_eq!(f.plume_temperature(0.5, 30.0), 980.0);
        assert_relative_eq!(f.plume_temperature(2.0, 30.0), 980.0);
        // Beyond the tip the delta halves at twice the flame length.
        assert_relative_eq!(f.plume_temperature(4.0, 30.0), 30.0 + 475.0);
    }

    #[test]
    fn test_distance_for_temperature_inverts_plume() {
        let f = flame(2.0);
        let d = f.distance_for_temperature(505.0, 30.0).unwrap();
        assert_relative_eq!(f.plume_temperature(d, 30.0), 505.0, epsilon = 1e-9);
        // Hotter than the flame itself is unreachable.
        assert!(f.distance_for_temperature(1200.0, 30.0).is_none());
        // At or below ambient every distance qualifies.
        assert!(f.distance_for_temperature(20.0, 30.0).unwrap().is_infinite());
    }

    #[test]
    fn test_wind_effect_angle() {
        // Still air: vertical.
        assert_relative_eq!(wind_effect_flame_angle(2.0, 0.0, 0.0), FRAC_PI_2);
        // Stronger wind tilts the flame closer to horizontal.
        let calm = wind_effect_flame_angle(2.0, 2.0, 0.0);
        let windy = wind_effect_flame_angle(2.0, 10.0, 0.0);
        assert!(windy < calm);
        assert!(windy > 0.0);
        // The flame never dips below an upslope surface.
        let steep = 0.6;
        assert!(wind_effect_flame_angle(2.0, 50.0, steep) >= steep);
        // Negative wind mirrors the tilt upwind.
        assert!(wind_effect_flame_angle(2.0, -10.0, 0.0) > FRAC_PI_2);
    }

    #[test]
    fn test_zero_length_flame_angle() {
        assert_relative_eq!(wind_effect_flame_angle(0.0, 5.0, 0.1), 0.0);
    }

    #[test]
    fn test_lateral_merging_monotone() {
        let single = lateral_merged_flame_length(2.0, 1.0, 2.0, 5.0);
        assert_relative_eq!(single, 2.0);
        let line = lateral_merged_flame_length(2.0, 100.0, 2.0, 5.0);
        assert!(line > single);
        // Wider separation weakens merging.
        let sparse = lateral_merged_flame_length(2.0, 100.0, 2.0, 10.0);
        assert!(sparse < line);
        assert!(sparse >= 2.0);
    }

    #[test]
    fn test_combine_flames_spans_both() {
        let lower = vec![flame(2.0)];
        let upper =
            vec![Flame::new(1.5, FRAC_PI_2, coord(0.0, 3.0), 0.5, 950.0).unwrap()];
        let combined = combine_flames(&upper, &lower, 5.0, 0.0, 100.0).unwrap();
        assert_eq!(combined.len(), 1);
        // Lower origin to upper tip: 3.0 + 1.5.
        assert_relative_eq!(combined[0].flame_length(), 4.5, epsilon = 1e-9);
        assert_relative_eq!(combined[0].origin().y, 0.0);
    }

    #[test]
    fn test_combine_flames_unequal_series() {
        let lower = vec![flame(2.0), flame(2.0), flame(2.0)];
        let upper = vec![Flame::new(1.5, FRAC_PI_2, coord(0.0, 3.0), 0.5, 950.0).unwrap()];
        let combined = combine_flames(&upper, &lower, 5.0, 0.0, 100.0).unwrap();
        assert_eq!(combined.len(), 3);
        // Unpaired entries pass through untouched.
        assert_relative_eq!(combined[2].flame_length(), 2.0);
    }

    #[test]
    fn test_max_flame_length() {
        assert_relative_eq!(max_flame_length(&[]), 0.0);
        assert_relative_eq!(max_flame_length(&[flame(1.0), flame(3.0), flame(2.0)]), 3.0);
    }
}
