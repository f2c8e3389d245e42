//! Pre-heating flames: thermal exposure before direct flame contact.

use serde::{Deserialize, Serialize};

use crate::model::stratum::StratumLevel;
use crate::physics::flame::Flame;

/// A flame whose heat dries fuel in a higher stratum over an active time
/// window `[start, end)`. `level` is the stratum that produced it, `None`
/// for the surface fire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreHeatingFlame {
    flame: Flame,
    level: Option<StratumLevel>,
    start_time: f64,
    end_time: f64,
}

impl PreHeatingFlame {
    pub fn new(flame: Flame, level: Option<StratumLevel>, start_time: f64, end_time: f64) -> Self {
        PreHeatingFlame { flame, level, start_time, end_time: end_time.max(start_time) }
    }

    pub fn flame(&self) -> &Flame {
        &self.flame
    }

    pub fn level(&self) -> Option<StratumLevel> {
        self.level
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    /// Effective exposure time: the window truncated at the pre-heating
    /// end time. A `None` end time leaves the window whole; a negative end
    /// time is masked to zero.
    pub fn duration(&self, pre_heating_end_time: Option<f64>) -> f64 {
        let end = match pre_heating_end_time {
            Some(t) => self.end_time.min(t.max(0.0)),
            None => self.end_time,
        };
        (end - self.start_time).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::geometry::coord;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn phf(start: f64, end: f64) -> PreHeatingFlame {
        let flame = Flame::new(2.0, FRAC_PI_2, coord(0.0, 0.0), 1.0, 950.0).unwrap();
        PreHeatingFlame::new(flame, None, start, end)
    }

    #[test]
    fn test_full_window_duration() {
        assert_relative_eq!(phf(2.0, 10.0).duration(None), 8.0);
    }

    #[test]
    fn test_truncated_duration() {
        assert_relative_eq!(phf(2.0, 10.0).duration(Some(6.0)), 4.0);
        // Truncation before the window starts leaves no exposure.
        assert_relative_eq!(phf(5.0, 10.0).duration(Some(3.0)), 0.0);
    }

    #[test]
    fn test_negative_end_time_masked() {
        assert_relative_eq!(phf(0.0, 10.0).duration(Some(-1.0)), 0.0);
    }
}
