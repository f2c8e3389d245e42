//! Surface fire parameters.
//!
//! The surface fire is not simulated: its behaviour is fixed by the fuel
//! bed and the weather, computed once per run, and drives everything above
//! it. Spread and flame dimensions follow the Australian empirical models
//! the rest of the repository builds on.
//!
//! # Scientific References
//! - McArthur, A.G. (1967). "Fire behaviour in eucalypt forests",
//!   Commonwealth of Australia Forestry and Timber Bureau Leaflet 107
//! - Byram, G.M. (1959). "Combustion of forest fuels" (flame length from
//!   fireline intensity)
//! - Burrows, N.D. (2001). "Flame residence times and rates of weight loss
//!   of eucalypt forest fuel particles", Int. J. Wildland Fire, 10, 137-143

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::core_types::geometry::coord;
use crate::error::Result;
use crate::model::site::Site;
use crate::physics::flame::{self, Flame};
use crate::physics::pre_heating::PreHeatingFlame;
use crate::physics::wind;

/// Fixed surface fire behaviour for one site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceParams {
    wind_speed: f64,
    ros: f64,
    flame_length: f64,
    flame_angle: f64,
    flame_depth: f64,
    flame_residence_time: f64,
}

impl SurfaceParams {
    /// Compute the surface fire from the site's fuel bed and weather.
    /// `include_canopy` matters because the near-surface wind is sheltered
    /// by everything above it.
    pub fn from_site(site: &Site, include_canopy: bool) -> Result<SurfaceParams> {
        let surface = site.surface();
        let wind_speed =
            wind::wind_speed_at_height(constants::SURFACE_WIND_HEIGHT, site, include_canopy);

        // Moisture damping of the spread rate, relaxed for finer litter.
        let moisture_pct = surface.dead_fuel_moisture() * 100.0;
        let fineness_factor = (surface.mean_fineness_leaves() / 0.000_25).clamp(0.5, 2.0);
        let moisture_factor = (-0.108 * moisture_pct).exp();

        // McArthur-style spread rate from fuel load and wind (m/s).
        let fuel_t_ha = surface.fuel_load() * 10.0;
        let wind_kmh = wind_speed * 3.6;
        let ros = 0.0012 * fuel_t_ha * (3.0 + wind_kmh) * moisture_factor / fineness_factor;

        // Byram: flame length from fireline intensity.
        let intensity = constants::HEAT_OF_COMBUSTION * surface.fuel_load() * ros;
        let flame_length = 0.0775 * intensity.powf(0.46);

        let flame_residence_time = 0.87 * (surface.mean_fuel_diameter() * 1000.0).powf(1.875);
        let flame_depth = (ros * flame_residence_time).min(flame_length);
        let flame_angle = flame::wind_effect_flame_angle(flame_length, wind_speed, surface.slope());

        Ok(SurfaceParams {
            wind_speed,
            ros,
            flame_length,
            flame_angle,
            flame_depth,
            flame_residence_time,
        })
    }

    /// Wind speed felt by the surface fire (m/s).
    pub fn wind_speed(&self) -> f64 {
        self.wind_speed
    }

    /// Rate of spread (m/s).
    pub fn ros(&self) -> f64 {
        self.ros
    }

    pub fn flame_length(&self) -> f64 {
        self.flame_length
    }

    pub fn flame_angle(&self) -> f64 {
        self.flame_angle
    }

    pub fn flame_depth(&self) -> f64 {
        self.flame_depth
    }

    pub fn flame_residence_time(&self) -> f64 {
        self.flame_residence_time
    }

    /// One identical surface flame per computation step over the residence
    /// time, anchored at the fire front.
    pub fn flame_series(&self) -> Result<Vec<Flame>> {
        let steps = (self.flame_residence_time / constants::COMPUTATION_TIME_INTERVAL).ceil()
            as usize;
        let flame = Flame::new(
            self.flame_length,
            self.flame_angle,
            coord(0.0, 0.0),
            self.flame_depth,
            constants::MAIN_FLAME_DELTA_TEMPERATURE,
        )?;
        Ok(vec![flame; steps.max(1)])
    }

    /// The surface fire as a pre-heating flame, active from ignition of the
    /// site until its residence time runs out.
    pub fn pre_heating_flame(&self) -> Result<PreHeatingFlame> {
        let flame = Flame::new(
            self.flame_length,
            self.flame_angle,
            coord(0.0, 0.0),
            self.flame_depth,
            constants::MAIN_FLAME_DELTA_TEMPERATURE,
        )?;
        Ok(PreHeatingFlame::new(flame, None, 0.0, self.flame_residence_time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::crown::CrownPoly;
    use crate::model::site::{Surface, Vegetation, WeatherModel};
    use crate::model::species::{LeafForm, Species, SpeciesComponent};
    use crate::model::stratum::{Stratum, StratumLevel};

    fn bare_site(wind_kmh: f64, moisture: f64) -> Site {
        let species = Species::new(
            "shrub",
            CrownPoly::hexagonal(0.5, 1.0, 2.0, 2.5, 2.0).unwrap(),
            1.0,
            0.1,
            0.3,
            LeafForm::Flat,
            0.0003,
            0.02,
            0.05,
            0.01,
            3.0,
            0.4,
            0.2,
            Some(260.0),
            None,
        )
        .unwrap();
        let stratum = Stratum::new(
            StratumLevel::Elevated,
            vec![SpeciesComponent::new(species, 1.0).unwrap()],
            3.0,
        )
        .unwrap();
        Site::new(
            Vegetation::new(vec![stratum], vec![]).unwrap(),
            Surface::new(0.0, moisture, 1.73, 0.005, 0.00025).unwrap(),
            WeatherModel::constant_from_kmh(29.2, wind_kmh),
            100.0,
        )
        .unwrap()
    }

    #[test]
    fn test_surface_fire_plausible() {
        let p = SurfaceParams::from_site(&bare_site(10.0, 0.07), true).unwrap();
        assert!(p.ros() > 0.0);
        assert!(p.flame_length() > 0.2 && p.flame_length() < 10.0);
        assert!(p.flame_residence_time() > 1.0);
        assert!(p.flame_depth() <= p.flame_length());
    }

    #[test]
    fn test_moisture_damps_spread() {
        let dry = SurfaceParams::from_site(&bare_site(10.0, 0.05), true).unwrap();
        let damp = SurfaceParams::from_site(&bare_site(10.0, 0.15), true).unwrap();
        assert!(dry.ros() > damp.ros());
        assert!(dry.flame_length() > damp.flame_length());
    }

    #[test]
    fn test_wind_drives_spread_and_tilts_flames() {
        let calm = SurfaceParams::from_site(&bare_site(5.0, 0.07), true).unwrap();
        let windy = SurfaceParams::from_site(&bare_site(40.0, 0.07), true).unwrap();
        assert!(windy.ros() > calm.ros());
        assert!(windy.flame_angle() < calm.flame_angle());
    }

    #[test]
    fn test_flame_series_spans_residence_time() {
        let p = SurfaceParams::from_site(&bare_site(10.0, 0.07), true).unwrap();
        let series = p.flame_series().unwrap();
        assert_eq!(
            series.len(),
            (p.flame_residence_time() / constants::COMPUTATION_TIME_INTERVAL).ceil() as usize
        );
        assert!(series.iter().all(|f| f.flame_length() == p.flame_length()));
    }

    #[test]
    fn test_pre_heating_window_starts_at_zero() {
        let p = SurfaceParams::from_site(&bare_site(10.0, 0.07), true).unwrap();
        let phf = p.pre_heating_flame().unwrap();
        assert_eq!(phf.start_time(), 0.0);
        assert_eq!(phf.end_time(), p.flame_residence_time());
    }
}
