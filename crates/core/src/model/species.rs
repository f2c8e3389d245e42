//! Plant species and their derived leaf, clump, and flame quantities.
//!
//! A species is immutable after validated construction. The flammability
//! quantities follow Zylstra's biophysical forest flammability model:
//! leaf-scale ignition delay times, leaf flames merging into clump and
//! segment flames (the fourth-power merging law of Eq. 5.76), and an
//! ignition temperature either measured or modelled from the silica-free
//! ash content of the foliage.
//!
//! # Scientific References
//! - Zylstra, P. (2011). "Forest flammability: modelling and managing a
//!   complex system", PhD Thesis, UNSW @ ADFA
//! - Zylstra, P. et al. (2016). "Biophysical mechanistic modelling
//!   quantifies the effects of plant traits on fire severity"

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::core_types::crown::CrownPoly;
use crate::core_types::numerics;
use crate::error::{ModelError, Result};
use crate::model::stratum::StratumLevel;

/// Gross morphology of a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeafForm {
    Round,
    Flat,
    Dendritic,
}

impl LeafForm {
    /// Moisture-geometry divisor of the ignition delay time: round leaves
    /// expose half the surface per unit mass of flat ones.
    pub fn leaf_factor(self) -> f64 {
        match self {
            LeafForm::Round => 4.0,
            LeafForm::Flat | LeafForm::Dendritic => 2.0,
        }
    }

    pub fn parse(name: &str) -> Result<Self> {
        match crate::model::normalize_name(name).as_str() {
            "round" => Ok(LeafForm::Round),
            "flat" => Ok(LeafForm::Flat),
            "dendritic" => Ok(LeafForm::Dendritic),
            other => Err(ModelError::invalid(format!("unknown leaf form `{other}`"))),
        }
    }
}

/// An immutable species description with its crown geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    name: String,
    crown: CrownPoly,
    live_leaf_moisture: f64,
    dead_leaf_moisture: f64,
    prop_dead: f64,
    leaf_form: LeafForm,
    leaf_thickness: f64,
    leaf_width: f64,
    leaf_length: f64,
    leaf_separation: f64,
    stem_order: f64,
    clump_diameter: f64,
    clump_separation: f64,
    ignition_temperature: f64,
}

impl Species {
    /// Validated constructor. Exactly one of `ignition_temperature` and
    /// `silica_free_ash` must be supplied; when only the ash proportion is
    /// known the ignition temperature is modelled from it.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        crown: CrownPoly,
        live_leaf_moisture: f64,
        dead_leaf_moisture: f64,
        prop_dead: f64,
        leaf_form: LeafForm,
        leaf_thickness: f64,
        leaf_width: f64,
        leaf_length: f64,
        leaf_separation: f64,
        stem_order: f64,
        clump_diameter: f64,
        clump_separation: f64,
        ignition_temperature: Option<f64>,
        silica_free_ash: Option<f64>,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ModelError::invalid("species name must not be blank"));
        }
        for (label, v) in [
            ("live leaf moisture", live_leaf_moisture),
            ("dead leaf moisture", dead_leaf_moisture),
            ("leaf thickness", leaf_thickness),
            ("leaf width", leaf_width),
            ("leaf length", leaf_length),
            ("leaf separation", leaf_separation),
            ("stem order", stem_order),
            ("clump diameter", clump_diameter),
            ("clump separation", clump_separation),
        ] {
            if v < 0.0 {
                return Err(ModelError::invalid(format!(
                    "{label} of `{name}` must not be negative, got {v}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&prop_dead) {
            return Err(ModelError::invalid(format!(
                "proportion dead of `{name}` must be within [0, 1], got {prop_dead}"
            )));
        }
        let ignition_temperature = match (ignition_temperature, silica_free_ash) {
            (Some(t), _) => {
                if t <= 0.0 {
                    return Err(ModelError::invalid(format!(
                        "ignition temperature of `{name}` must be positive, got {t}"
                    )));
                }
                t
            }
            (None, Some(p)) => {
                if p <= 0.0 || p >= 1.0 {
                    return Err(ModelError::invalid(format!(
                        "silica-free ash proportion of `{name}` must be within (0, 1), got {p}"
                    )));
                }
                modelled_ignition_temperature(p)
            }
            (None, None) => {
                return Err(ModelError::invalid(format!(
                    "`{name}` needs an ignition temperature or a silica-free ash proportion"
                )));
            }
        };
        Ok(Species {
            name,
            crown,
            live_leaf_moisture,
            dead_leaf_moisture,
            prop_dead,
            leaf_form,
            leaf_thickness,
            leaf_width,
            leaf_length,
            leaf_separation,
            stem_order,
            clump_diameter,
            clump_separation,
            ignition_temperature,
        })
    }

    /// A proxy species for a stratum run: same foliage, but spread through
    /// the given pseudo-crown with crown-sized clumps.
    pub(crate) fn stratum_run_proxy(&self, crown: CrownPoly, clump_separation: f64) -> Species {
        Species {
            clump_diameter: self.crown.width(),
            clump_separation,
            crown,
            ..self.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn crown(&self) -> &CrownPoly {
        &self.crown
    }

    pub fn leaf_form(&self) -> LeafForm {
        self.leaf_form
    }

    pub fn leaf_thickness(&self) -> f64 {
        self.leaf_thickness
    }

    pub fn clump_diameter(&self) -> f64 {
        self.clump_diameter
    }

    pub fn clump_separation(&self) -> f64 {
        self.clump_separation
    }

    pub fn ignition_temperature(&self) -> f64 {
        self.ignition_temperature
    }

    pub fn prop_dead(&self) -> f64 {
        self.prop_dead
    }

    pub fn prop_live(&self) -> f64 {
        1.0 - self.prop_dead
    }

    /// One-sided area of a single leaf (half the bounding rectangle).
    pub fn leaf_area(&self) -> f64 {
        self.leaf_width * self.leaf_length / 2.0
    }

    /// Live/dead weighted leaf moisture (fraction of dry weight).
    pub fn leaf_moisture(&self) -> f64 {
        self.prop_live() * self.live_leaf_moisture + self.prop_dead * self.dead_leaf_moisture
    }

    /// Burn-out time of an ignited leaf (s), never shorter than one
    /// computation interval.
    pub fn flame_duration(&self) -> f64 {
        let d = 1.37 * self.leaf_width * self.leaf_thickness * 1.0e6 + 1.61 * self.leaf_moisture()
            - 0.027;
        d.max(constants::COMPUTATION_TIME_INTERVAL)
    }

    /// Flame length of a single burning leaf (m); drier foliage flames
    /// longer.
    pub fn leaf_flame_length(&self) -> f64 {
        let dry = 2.0 * self.leaf_area().sqrt();
        let m = self.leaf_moisture();
        if m <= 0.2 {
            dry
        } else {
            dry * (1.0 - 0.45 * (m - 0.2)).max(0.25)
        }
    }

    /// Mean number of leaves per foliage clump.
    pub fn leaves_per_clump(&self) -> f64 {
        if self.leaf_separation <= 0.0 {
            return 0.0;
        }
        0.88 * (self.clump_diameter * self.stem_order / self.leaf_separation).powf(1.18)
    }

    /// Leaf area index of one plant: total leaf area of the crown over the
    /// area of its base disc.
    pub fn leaf_area_index(&self) -> f64 {
        if self.clump_diameter <= 0.0 {
            return 0.0;
        }
        let clump_volume = std::f64::consts::PI / 6.0 * self.clump_diameter.powi(3);
        let clumps = self.crown.volume_of_revolution() / clump_volume;
        let ground = std::f64::consts::PI * (self.crown.width() / 2.0).powi(2);
        self.leaves_per_clump() * clumps * self.leaf_area() / ground
    }

    /// Flame length produced by an ignited segment of length `len` within
    /// the crown: leaf flames merge over the clumps spanned by the segment
    /// (Zylstra Eq. 5.76). Always at least `len`.
    pub fn flame_length(&self, len: f64) -> f64 {
        if numerics::almost_zero(len) {
            return 0.0;
        }
        let spacing = self.clump_diameter + self.clump_separation;
        if spacing <= 0.0 {
            return len;
        }
        let n_leaves = self.leaves_per_clump() * len / spacing;
        let term1 = (self.leaf_flame_length() * n_leaves.powf(0.4) + len).powi(4);
        let term2 = len.powi(4);
        len.max((term1 + term2).powf(0.25))
    }

    /// Ignition delay time (s) of the foliage under a plume of temperature
    /// `temp` (°C). Strictly decreasing in temperature; unreachable
    /// temperatures give an unbounded delay.
    pub fn ignition_delay_time(&self, temp: f64) -> f64 {
        if temp <= 0.0 {
            return f64::INFINITY;
        }
        let moisture_term =
            100.0 * self.leaf_moisture() * self.leaf_thickness * 1000.0 / self.leaf_form.leaf_factor();
        100_168.23 * temp.powf(-2.11) * moisture_term + 6_018_087.86 * temp.powf(-2.39)
    }

    /// Grass rule: near-surface, mostly dead, very thin-leaved.
    pub fn is_grass(&self, level: StratumLevel) -> bool {
        level == StratumLevel::NearSurface
            && self.prop_dead > constants::GRASS_PROP_DEAD
            && self.leaf_thickness < constants::GRASS_LEAF_THICKNESS
    }
}

/// Ignition temperature (°C) modelled from the silica-free ash proportion
/// of the foliage.
fn modelled_ignition_temperature(prop_silica_free_ash: f64) -> f64 {
    let x = (100.0 * prop_silica_free_ash).ln();
    354.0 - 13.9 * x - 2.91 * x * x
}

/// A species with its compositional weight within a stratum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesComponent {
    pub species: Species,
    pub weighting: f64,
}

impl SpeciesComponent {
    pub fn new(species: Species, weighting: f64) -> Result<Self> {
        if !(weighting > 0.0) {
            return Err(ModelError::invalid(format!(
                "weighting of `{}` must be positive, got {weighting}",
                species.name()
            )));
        }
        Ok(SpeciesComponent { species, weighting })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn test_species(prop_dead: f64, leaf_thickness: f64) -> Species {
        Species::new(
            "Eucalyptus test",
            CrownPoly::hexagonal(1.0, 1.5, 2.5, 3.0, 2.0).unwrap(),
            1.0,
            0.1,
            prop_dead,
            LeafForm::Flat,
            leaf_thickness,
            0.02,
            0.05,
            0.01,
            3.0,
            0.4,
            0.2,
            Some(260.0),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_derived_leaf_quantities() {
        let sp = test_species(0.3, 0.0003);
        assert_relative_eq!(sp.prop_live(), 0.7);
        assert_relative_eq!(sp.leaf_area(), 0.0005);
        assert_relative_eq!(sp.leaf_moisture(), 0.7 * 1.0 + 0.3 * 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_flame_duration_floor() {
        // Tiny dry leaves burn out faster than one step; the duration is
        // floored at the computation interval.
        let sp = Species::new(
            "thin grass",
            CrownPoly::hexagonal(0.0, 0.1, 0.4, 0.5, 0.5).unwrap(),
            0.2,
            0.05,
            0.8,
            LeafForm::Flat,
            0.0001,
            0.002,
            0.1,
            0.01,
            1.0,
            0.2,
            0.1,
            Some(220.0),
            None,
        )
        .unwrap();
        assert_relative_eq!(sp.flame_duration(), constants::COMPUTATION_TIME_INTERVAL);
    }

    #[test]
    fn test_ignition_delay_time_strictly_decreasing() {
        let sp = test_species(0.3, 0.0003);
        let temps = [150.0, 250.0, 350.0, 500.0, 800.0];
        for pair in temps.windows(2) {
            assert!(sp.ignition_delay_time(pair[0]) > sp.ignition_delay_time(pair[1]));
        }
        assert!(sp.ignition_delay_time(-5.0).is_infinite());
    }

    #[test]
    fn test_flame_length_dominates_segment_length() {
        let sp = test_species(0.3, 0.0003);
        for len in [0.0, 0.05, 0.3, 1.0, 2.0] {
            assert!(sp.flame_length(len) >= len);
        }
        assert_eq!(sp.flame_length(0.0), 0.0);
    }

    #[test]
    fn test_modelled_ignition_temperature() {
        // 2% silica-free ash: 354 − 13.9·ln(2) − 2.91·ln(2)².
        let sp = Species::new(
            "ash species",
            CrownPoly::hexagonal(1.0, 1.5, 2.5, 3.0, 2.0).unwrap(),
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
            None,
            Some(0.02),
        )
        .unwrap();
        let x = 2.0f64.ln();
        assert_relative_eq!(
            sp.ignition_temperature(),
            354.0 - 13.9 * x - 2.91 * x * x,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_grass_classification_boundary() {
        let grass = test_species(0.6, 0.0003);
        assert!(grass.is_grass(StratumLevel::NearSurface));
        assert!(!grass.is_grass(StratumLevel::MidStorey));
        // Thick-leaved or mostly-live species never count as grass.
        assert!(!test_species(0.6, 0.0004).is_grass(StratumLevel::NearSurface));
        assert!(!test_species(0.5, 0.0003).is_grass(StratumLevel::NearSurface));
    }

    #[test]
    fn test_construction_validation() {
        let crown = CrownPoly::hexagonal(1.0, 1.5, 2.5, 3.0, 2.0).unwrap();
        // Blank name.
        assert!(Species::new(
            "  ", crown.clone(), 1.0, 0.1, 0.3, LeafForm::Flat, 0.0003, 0.02, 0.05, 0.01, 3.0,
            0.4, 0.2, Some(260.0), None
        )
        .is_err());
        // Neither ignition temperature nor ash.
        assert!(Species::new(
            "x", crown.clone(), 1.0, 0.1, 0.3, LeafForm::Flat, 0.0003, 0.02, 0.05, 0.01, 3.0,
            0.4, 0.2, None, None
        )
        .is_err());
        // Proportion dead outside [0, 1].
        assert!(Species::new(
            "x", crown, 1.0, 0.1, 1.3, LeafForm::Flat, 0.0003, 0.02, 0.05, 0.01, 3.0, 0.4, 0.2,
            Some(260.0), None
        )
        .is_err());
    }

    #[test]
    fn test_leaf_form_parsing() {
        assert_eq!(LeafForm::parse("Round").unwrap(), LeafForm::Round);
        assert_eq!(LeafForm::parse("den-dritic").unwrap(), LeafForm::Dendritic);
        assert!(LeafForm::parse("spiky").is_err());
    }
}
