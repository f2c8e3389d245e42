//! Site description: the vegetation column, surface fuel, and weather.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::model::stratum::{Stratum, StratumLevel};

/// Declared overlap relation between two strata.
///
/// `Undefined` defers to geometry: the strata are treated as vertically
/// associated when the lower one reaches up to the upper one's crown space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StratumOverlapType {
    Overlapping,
    NotOverlapping,
    Undefined,
}

impl StratumOverlapType {
    /// Canonical lowercase, spaceless name; `parse(name())` is identity.
    pub fn name(self) -> &'static str {
        match self {
            StratumOverlapType::Overlapping => "overlapped",
            StratumOverlapType::NotOverlapping => "notoverlapped",
            StratumOverlapType::Undefined => "automatic",
        }
    }

    /// Case-insensitive; whitespace and hyphens are ignored.
    pub fn parse(name: &str) -> Result<Self> {
        match crate::model::normalize_name(name).as_str() {
            "overlapped" => Ok(StratumOverlapType::Overlapping),
            "notoverlapped" => Ok(StratumOverlapType::NotOverlapping),
            "automatic" => Ok(StratumOverlapType::Undefined),
            _ => Err(ModelError::InvalidOverlapType(name.to_string())),
        }
    }
}

/// An overlap declaration between a lower and an upper stratum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StratumOverlap {
    pub lower: StratumLevel,
    pub upper: StratumLevel,
    pub kind: StratumOverlapType,
}

impl StratumOverlap {
    pub fn new(lower: StratumLevel, upper: StratumLevel, kind: StratumOverlapType) -> Result<Self> {
        if lower >= upper {
            return Err(ModelError::invalid(format!(
                "overlap must name a lower and an upper stratum, got `{lower}` and `{upper}`"
            )));
        }
        Ok(StratumOverlap { lower, upper, kind })
    }
}

/// The vegetation column: strata ordered from the ground up plus their
/// overlap declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vegetation {
    strata: Vec<Stratum>,
    overlaps: Vec<StratumOverlap>,
}

impl Vegetation {
    pub fn new(mut strata: Vec<Stratum>, overlaps: Vec<StratumOverlap>) -> Result<Self> {
        strata.sort_by_key(Stratum::level);
        for pair in strata.windows(2) {
            if pair[0].level() == pair[1].level() {
                return Err(ModelError::invalid(format!(
                    "duplicate stratum level `{}`",
                    pair[0].level()
                )));
            }
        }
        Ok(Vegetation { strata, overlaps })
    }

    /// Strata in ascending level order.
    pub fn strata(&self) -> &[Stratum] {
        &self.strata
    }

    pub fn stratum(&self, level: StratumLevel) -> Option<&Stratum> {
        self.strata.iter().find(|s| s.level() == level)
    }

    /// Whether flames from `lower` act on `upper` by vertical association:
    /// a declared overlap wins; otherwise the strata are associated when
    /// the lower crown space reaches the upper one.
    pub fn vertically_associated(&self, lower: StratumLevel, upper: StratumLevel) -> bool {
        if lower >= upper {
            return false;
        }
        let declared = self
            .overlaps
            .iter()
            .find(|o| o.lower == lower && o.upper == upper)
            .map(|o| o.kind)
            .unwrap_or(StratumOverlapType::Undefined);
        match declared {
            StratumOverlapType::Overlapping => true,
            StratumOverlapType::NotOverlapping => false,
            StratumOverlapType::Undefined => match (self.stratum(lower), self.stratum(upper)) {
                (Some(lo), Some(up)) => lo.average_top() >= up.average_bottom(),
                _ => false,
            },
        }
    }
}

/// Weather acting on the site. Constant weather is the only model so far;
/// the variants keep call sites exhaustive when more are added.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WeatherModel {
    Constant {
        /// Air temperature (°C).
        air_temperature: f64,
        /// Incident wind speed at the reference height (m/s).
        wind_speed: f64,
    },
}

impl WeatherModel {
    /// Constant weather, wind given in km/h as read from parameter files.
    pub fn constant_from_kmh(air_temperature: f64, wind_speed_kmh: f64) -> Self {
        WeatherModel::Constant { air_temperature, wind_speed: wind_speed_kmh / 3.6 }
    }

    pub fn air_temperature(&self) -> f64 {
        match *self {
            WeatherModel::Constant { air_temperature, .. } => air_temperature,
        }
    }

    /// Wind speed at the reference height (m/s).
    pub fn reference_wind_speed(&self) -> f64 {
        match *self {
            WeatherModel::Constant { wind_speed, .. } => wind_speed,
        }
    }
}

/// Surface fuel bed description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    /// Surface slope along the wind direction (radians).
    slope: f64,
    /// Dead fuel moisture content (fraction of dry weight).
    dead_fuel_moisture: f64,
    /// Fine fuel load (kg/m²).
    fuel_load: f64,
    /// Mean diameter of surface fuel particles (m).
    mean_fuel_diameter: f64,
    /// Mean thickness of litter leaves (m).
    mean_fineness_leaves: f64,
}

impl Surface {
    pub fn new(
        slope: f64,
        dead_fuel_moisture: f64,
        fuel_load: f64,
        mean_fuel_diameter: f64,
        mean_fineness_leaves: f64,
    ) -> Result<Self> {
        if !(-std::f64::consts::FRAC_PI_2..=std::f64::consts::FRAC_PI_2).contains(&slope) {
            return Err(ModelError::invalid(format!("slope must be within ±π/2, got {slope}")));
        }
        if dead_fuel_moisture < 0.0 {
            return Err(ModelError::invalid(format!(
                "dead fuel moisture must not be negative, got {dead_fuel_moisture}"
            )));
        }
        if !(fuel_load > 0.0) {
            return Err(ModelError::invalid(format!(
                "fuel load must be positive, got {fuel_load}"
            )));
        }
        if !(mean_fuel_diameter > 0.0) || !(mean_fineness_leaves > 0.0) {
            return Err(ModelError::invalid(
                "mean fuel diameter and fineness must be positive".to_string(),
            ));
        }
        Ok(Surface { slope, dead_fuel_moisture, fuel_load, mean_fuel_diameter, mean_fineness_leaves })
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn dead_fuel_moisture(&self) -> f64 {
        self.dead_fuel_moisture
    }

    pub fn fuel_load(&self) -> f64 {
        self.fuel_load
    }

    pub fn mean_fuel_diameter(&self) -> f64 {
        self.mean_fuel_diameter
    }

    pub fn mean_fineness_leaves(&self) -> f64 {
        self.mean_fineness_leaves
    }
}

/// A complete site: everything the fire model needs for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    vegetation: Vegetation,
    surface: Surface,
    weather: WeatherModel,
    fire_line_length: f64,
}

impl Site {
    pub fn new(
        vegetation: Vegetation,
        surface: Surface,
        weather: WeatherModel,
        fire_line_length: f64,
    ) -> Result<Self> {
        if !(fire_line_length > 0.0) {
            return Err(ModelError::invalid(format!(
                "fire line length must be positive, got {fire_line_length}"
            )));
        }
        Ok(Site { vegetation, surface, weather, fire_line_length })
    }

    pub fn vegetation(&self) -> &Vegetation {
        &self.vegetation
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn weather(&self) -> &WeatherModel {
        &self.weather
    }

    pub fn fire_line_length(&self) -> f64 {
        self.fire_line_length
    }

    pub fn temperature(&self) -> f64 {
        self.weather.air_temperature()
    }

    pub fn slope(&self) -> f64 {
        self.surface.slope()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_parsing() {
        assert_eq!(
            StratumOverlapType::parse("Not - Overlapped").unwrap(),
            StratumOverlapType::NotOverlapping
        );
        assert_eq!(
            StratumOverlapType::parse("notoverlapped").unwrap(),
            StratumOverlapType::NotOverlapping
        );
        assert_eq!(
            StratumOverlapType::parse("auto matic").unwrap(),
            StratumOverlapType::Undefined
        );
        assert!(StratumOverlapType::parse("weird").is_err());
    }

    #[test]
    fn test_overlap_name_round_trip() {
        for kind in [
            StratumOverlapType::Overlapping,
            StratumOverlapType::NotOverlapping,
            StratumOverlapType::Undefined,
        ] {
            assert_eq!(StratumOverlapType::parse(kind.name()).unwrap(), kind);
        }
    }

    #[test]
    fn test_overlap_requires_order() {
        assert!(StratumOverlap::new(
            StratumLevel::Canopy,
            StratumLevel::MidStorey,
            StratumOverlapType::Overlapping
        )
        .is_err());
    }

    #[test]
    fn test_weather_wind_conversion() {
        let w = WeatherModel::constant_from_kmh(30.0, 36.0);
        assert!((w.reference_wind_speed() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_surface_validation() {
        assert!(Surface::new(0.0, 0.07, 1.73, 0.005, 0.00025).is_ok());
        assert!(Surface::new(2.0, 0.07, 1.73, 0.005, 0.00025).is_err());
        assert!(Surface::new(0.0, 0.07, 0.0, 0.005, 0.00025).is_err());
    }
}
