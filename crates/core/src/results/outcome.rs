//! Result records: per-stratum outcomes and whole-run results.
//!
//! All records here are values built by appending; the with-methods return
//! new copies and never mutate shared state.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::ignition::path::IgnitionPath;
use crate::model::stratum::{Stratum, StratumLevel};
use crate::physics::flame::{self, Flame};
use crate::physics::surface::SurfaceParams;

/// Everything one stratum produced: best plant paths per species, the
/// merged plant flame series, and the stratum run's paths and flames when
/// it happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StratumOutcome {
    stratum: Stratum,
    plant_paths: Vec<IgnitionPath>,
    plant_flames: Vec<Flame>,
    stratum_paths: Vec<IgnitionPath>,
    stratum_flames: Option<Vec<Flame>>,
}

impl StratumOutcome {
    /// A stratum where no species ignited: paths kept for diagnostics.
    pub fn non_ignition(stratum: Stratum, plant_paths: Vec<IgnitionPath>) -> Self {
        StratumOutcome {
            stratum,
            plant_paths,
            plant_flames: Vec::new(),
            stratum_paths: Vec::new(),
            stratum_flames: None,
        }
    }

    pub fn with_flames(
        stratum: Stratum,
        plant_paths: Vec<IgnitionPath>,
        plant_flames: Vec<Flame>,
        stratum_paths: Vec<IgnitionPath>,
        stratum_flames: Option<Vec<Flame>>,
    ) -> Self {
        StratumOutcome { stratum, plant_paths, plant_flames, stratum_paths, stratum_flames }
    }

    pub fn stratum(&self) -> &Stratum {
        &self.stratum
    }

    pub fn level(&self) -> StratumLevel {
        self.stratum.level()
    }

    pub fn plant_paths(&self) -> &[IgnitionPath] {
        &self.plant_paths
    }

    pub fn plant_flames(&self) -> &[Flame] {
        &self.plant_flames
    }

    pub fn stratum_paths(&self) -> &[IgnitionPath] {
        &self.stratum_paths
    }

    pub fn stratum_flames(&self) -> Option<&Vec<Flame>> {
        self.stratum_flames.as_ref()
    }

    /// The flame series the caller's comparator ranks highest, out of the
    /// plant and stratum series. `None` when neither exists.
    pub fn largest_flame_series<F>(&self, compare: F) -> Option<&Vec<Flame>>
    where
        F: Fn(&[Flame], &[Flame]) -> Ordering,
    {
        let plant = (!self.plant_flames.is_empty()).then_some(&self.plant_flames);
        let stratum = self.stratum_flames.as_ref().filter(|f| !f.is_empty());
        match (plant, stratum) {
            (Some(p), Some(s)) => {
                if compare(p, s) == Ordering::Less {
                    Some(s)
                } else {
                    Some(p)
                }
            }
            (p, s) => p.or(s),
        }
    }

    /// The series with the greater maximum flame length.
    pub fn largest_by_max_flame_length(&self) -> Option<&Vec<Flame>> {
        self.largest_flame_series(|a, b| {
            flame::max_flame_length(a).total_cmp(&flame::max_flame_length(b))
        })
    }
}

/// One complete pass of the fire model over a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireModelRunResult {
    surface_params: SurfaceParams,
    stratum_outcomes: Vec<StratumOutcome>,
    combined_flames: Vec<Flame>,
}

impl FireModelRunResult {
    pub fn new(surface_params: SurfaceParams) -> Self {
        FireModelRunResult {
            surface_params,
            stratum_outcomes: Vec::new(),
            combined_flames: Vec::new(),
        }
    }

    /// Copy with an outcome appended.
    pub fn with_outcome(&self, outcome: StratumOutcome) -> Self {
        let mut next = self.clone();
        next.stratum_outcomes.push(outcome);
        next
    }

    /// Copy with the combined flames set.
    pub fn with_combined_flames(&self, combined_flames: Vec<Flame>) -> Self {
        FireModelRunResult { combined_flames, ..self.clone() }
    }

    pub fn surface_params(&self) -> &SurfaceParams {
        &self.surface_params
    }

    pub fn stratum_outcomes(&self) -> &[StratumOutcome] {
        &self.stratum_outcomes
    }

    pub fn combined_flames(&self) -> &[Flame] {
        &self.combined_flames
    }

    pub fn outcome(&self, level: StratumLevel) -> Option<&StratumOutcome> {
        self.stratum_outcomes.iter().find(|o| o.level() == level)
    }

    /// The flame series of a stratum: whichever of its outcome's series has
    /// the greater maximum flame length.
    pub fn flame_series(&self, level: StratumLevel) -> Option<&Vec<Flame>> {
        self.outcome(level)
            .and_then(StratumOutcome::largest_by_max_flame_length)
    }
}

/// Both runs of the model over one site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireModelResult {
    pub run1: FireModelRunResult,
    pub run2: FireModelRunResult,
    pub has_second_run: bool,
}
