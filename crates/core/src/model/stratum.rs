//! Vegetation strata: horizontal layers of the plant community.

use serde::{Deserialize, Serialize};

use crate::core_types::numerics;
use crate::error::{ModelError, Result};
use crate::model::species::SpeciesComponent;

/// Vertical position of a stratum, totally ordered from the ground up.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum StratumLevel {
    NearSurface,
    Elevated,
    MidStorey,
    Canopy,
}

impl StratumLevel {
    pub const ALL: [StratumLevel; 4] = [
        StratumLevel::NearSurface,
        StratumLevel::Elevated,
        StratumLevel::MidStorey,
        StratumLevel::Canopy,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StratumLevel::NearSurface => "near surface",
            StratumLevel::Elevated => "elevated",
            StratumLevel::MidStorey => "midstorey",
            StratumLevel::Canopy => "canopy",
        }
    }

    pub fn parse(name: &str) -> Result<Self> {
        match crate::model::normalize_name(name).as_str() {
            "nearsurface" => Ok(StratumLevel::NearSurface),
            "elevated" => Ok(StratumLevel::Elevated),
            "midstorey" | "midstory" => Ok(StratumLevel::MidStorey),
            "canopy" => Ok(StratumLevel::Canopy),
            other => Err(ModelError::invalid(format!("unknown stratum level `{other}`"))),
        }
    }
}

impl std::fmt::Display for StratumLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One vegetation layer: weighted species plus plant spacing.
///
/// Species weightings are normalized to sum to one at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stratum {
    level: StratumLevel,
    species: Vec<SpeciesComponent>,
    plant_separation: f64,
}

impl Stratum {
    pub fn new(
        level: StratumLevel,
        species: Vec<SpeciesComponent>,
        plant_separation: f64,
    ) -> Result<Self> {
        if species.is_empty() {
            return Err(ModelError::invalid(format!(
                "stratum `{level}` must contain at least one species"
            )));
        }
        if plant_separation < 0.0 {
            return Err(ModelError::invalid(format!(
                "plant separation of `{level}` must not be negative, got {plant_separation}"
            )));
        }
        let total: f64 = species.iter().map(|c| c.weighting).sum();
        if numerics::almost_zero(total) {
            return Err(ModelError::invalid(format!(
                "species weightings of `{level}` sum to zero"
            )));
        }
        let species = species
            .into_iter()
            .map(|mut c| {
                c.weighting /= total;
                c
            })
            .collect();
        Ok(Stratum { level, species, plant_separation })
    }

    pub fn level(&self) -> StratumLevel {
        self.level
    }

    pub fn species(&self) -> &[SpeciesComponent] {
        &self.species
    }

    pub fn plant_separation(&self) -> f64 {
        self.plant_separation
    }

    fn weighted(&self, f: impl Fn(&SpeciesComponent) -> f64) -> f64 {
        self.species.iter().map(|c| c.weighting * f(c)).sum()
    }

    /// Composition-weighted average crown width.
    pub fn average_width(&self) -> f64 {
        self.weighted(|c| c.species.crown().width())
    }

    pub fn average_top(&self) -> f64 {
        self.weighted(|c| c.species.crown().top())
    }

    pub fn average_bottom(&self) -> f64 {
        self.weighted(|c| c.species.crown().bottom())
    }

    pub fn average_mid_height(&self) -> f64 {
        self.weighted(|c| (c.species.crown().top() + c.species.crown().bottom()) / 2.0)
    }

    /// Plant separation used by the model: plants cannot be packed closer
    /// than their own crowns are wide.
    pub fn model_plant_sep(&self) -> f64 {
        self.plant_separation.max(self.average_width())
    }

    /// Fraction of ground covered by crowns.
    pub fn cover(&self) -> f64 {
        let sep = self.model_plant_sep();
        if sep <= 0.0 {
            return 0.0;
        }
        (self.average_width() / sep).powi(2)
    }

    /// Leaf area index of the stratum as a whole.
    pub fn leaf_area_index(&self) -> f64 {
        self.cover() * self.weighted(|c| c.species.leaf_area_index())
    }
}
