//! Wind profile through layered vegetation.
//!
//! The incident wind is measured at a reference height in the open. Above
//! the vegetation a logarithmic profile applies; descending into the
//! vegetation, each stratum attenuates the wind exponentially with the leaf
//! area it places above the query height.
//!
//! # Scientific References
//! - Inoue, E. (1963). "On the turbulent structure of airflow within crop
//!   canopies", J. Meteorol. Soc. Japan, 41, 317-326
//! - Cionco, R.M. (1965). "A mathematical model for air flow in a
//!   vegetative canopy", J. Applied Meteorology, 4, 517-522

use crate::constants;
use crate::model::site::Site;
use crate::model::stratum::StratumLevel;

/// Wind speed (m/s) at `height` above the surface.
///
/// `include_canopy = false` removes the canopy stratum from the
/// attenuation product, for runs that model a burnt-through canopy.
pub fn wind_speed_at_height(height: f64, site: &Site, include_canopy: bool) -> f64 {
    let reference = site.weather().reference_wind_speed();
    let z0 = constants::ROUGHNESS_LENGTH;
    // Log profile, clamped so that heights inside the roughness layer keep
    // a small positive wind rather than a negative logarithm.
    let h = height.max(z0 * std::f64::consts::E);
    let mut speed = reference * (h / z0).ln() / (constants::WIND_REFERENCE_HEIGHT / z0).ln();

    for stratum in site.vegetation().strata() {
        if !include_canopy && stratum.level() == StratumLevel::Canopy {
            continue;
        }
        let top = stratum.average_top();
        let bottom = stratum.average_bottom();
        if top <= bottom {
            continue;
        }
        let fraction_above = ((top - height.max(bottom)) / (top - bottom)).clamp(0.0, 1.0);
        if fraction_above > 0.0 {
            speed *= (-constants::WIND_EXTINCTION_COEF
                * stratum.leaf_area_index()
                * fraction_above)
                .exp();
        }
    }
    speed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::crown::CrownPoly;
    use crate::model::site::{Surface, Vegetation, WeatherModel};
    use crate::model::species::{LeafForm, Species, SpeciesComponent};
    use crate::model::stratum::Stratum;

    fn site_with_canopy() -> Site {
        let species = Species::new(
            "tall eucalypt",
            CrownPoly::hexagonal(8.0, 10.0, 18.0, 20.0, 6.0).unwrap(),
            1.2,
            0.1,
            0.2,
            LeafForm::Flat,
            0.0004,
            0.02,
            0.08,
            0.01,
            4.0,
            0.6,
            0.3,
            Some(260.0),
            None,
        )
        .unwrap();
        let canopy = Stratum::new(
            StratumLevel::Canopy,
            vec![SpeciesComponent::new(species, 1.0).unwrap()],
            8.0,
        )
        .unwrap();
        Site::new(
            Vegetation::new(vec![canopy], vec![]).unwrap(),
            Surface::new(0.0, 0.07, 1.73, 0.005, 0.00025).unwrap(),
            WeatherModel::constant_from_kmh(29.2, 30.0),
            100.0,
        )
        .unwrap()
    }

    #[test]
    fn test_wind_decreases_downward() {
        let site = site_with_canopy();
        let high = wind_speed_at_height(25.0, &site, true);
        let mid = wind_speed_at_height(14.0, &site, true);
        let low = wind_speed_at_height(2.0, &site, true);
        assert!(high > mid);
        assert!(mid > low);
        assert!(low > 0.0);
    }

    #[test]
    fn test_excluding_canopy_raises_wind_below_it() {
        let site = site_with_canopy();
        let with = wind_speed_at_height(12.0, &site, true);
        let without = wind_speed_at_height(12.0, &site, false);
        assert!(without > with);
    }

    #[test]
    fn test_above_vegetation_matches_log_profile() {
        let site = site_with_canopy();
        let u = wind_speed_at_height(constants::WIND_REFERENCE_HEIGHT * 3.0, &site, true);
        // No foliage above: pure log profile, above reference speed.
        assert!(u > site.weather().reference_wind_speed());
    }
}
