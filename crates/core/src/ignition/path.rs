//! Ignition paths: the record of one species' ignition simulation.

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::core_types::geometry::{self, Coord};
use crate::model::species::SpeciesComponent;
use crate::model::stratum::StratumLevel;
use crate::physics::flame::Flame;
use crate::physics::pre_heating::PreHeatingFlame;

/// Which crown the simulator runs in: the real per-species crown or the
/// artificial stratum-wide pseudo-crown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnitionRunType {
    PlantRun,
    StratumRun,
}

/// Everything the simulator needs besides the species and start point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IgnitionContext {
    pub run_type: IgnitionRunType,
    pub stratum_level: StratumLevel,
    /// Ambient air temperature (°C).
    pub air_temperature: f64,
    /// Surface slope (radians).
    pub slope: f64,
    /// One incident flame per time step.
    pub incident_flames: Vec<Flame>,
    /// Flames drying the stratum from below, each with its active window.
    pub pre_heating_flames: Vec<PreHeatingFlame>,
    /// When direct heating of this stratum began, if it has.
    pub pre_heating_end_time: Option<f64>,
    /// Horizontal extent of sufficient canopy pre-heating (m).
    pub canopy_heating_distance: f64,
    /// Wind speed within the stratum (m/s).
    pub stratum_wind_speed: f64,
}

/// A stretch of crown ignited at one time step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IgnitedSegment {
    pub time_step: usize,
    pub start: Coord,
    pub end: Coord,
}

impl IgnitedSegment {
    pub fn length(&self) -> f64 {
        geometry::distance(self.start, self.end)
    }
}

/// A drying event recorded before ignition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PreIgnitionData {
    /// Exposure to a pre-heating flame over its active window.
    PreHeatingDrying {
        time_step: usize,
        flame: Flame,
        distance: f64,
        drying_factor: f64,
        drying_temperature: f64,
        duration: f64,
    },
    /// One step of exposure to an incident flame.
    IncidentDrying {
        time_step: usize,
        flame: Flame,
        distance: f64,
        drying_factor: f64,
        drying_temperature: f64,
        ignition_delay_time: f64,
    },
}

impl PreIgnitionData {
    pub fn drying_temperature(&self) -> f64 {
        match self {
            PreIgnitionData::PreHeatingDrying { drying_temperature, .. }
            | PreIgnitionData::IncidentDrying { drying_temperature, .. } => *drying_temperature,
        }
    }

    pub fn drying_factor(&self) -> f64 {
        match self {
            PreIgnitionData::PreHeatingDrying { drying_factor, .. }
            | PreIgnitionData::IncidentDrying { drying_factor, .. } => *drying_factor,
        }
    }

    pub fn time_step(&self) -> usize {
        match self {
            PreIgnitionData::PreHeatingDrying { time_step, .. }
            | PreIgnitionData::IncidentDrying { time_step, .. } => *time_step,
        }
    }
}

/// The complete result of one ignition simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IgnitionPath {
    context: IgnitionContext,
    species_component: SpeciesComponent,
    initial_point: Coord,
    pre_ignition: Vec<PreIgnitionData>,
    segments: Vec<IgnitedSegment>,
}

impl IgnitionPath {
    pub fn new(
        context: IgnitionContext,
        species_component: SpeciesComponent,
        initial_point: Coord,
    ) -> Self {
        IgnitionPath {
            context,
            species_component,
            initial_point,
            pre_ignition: Vec::new(),
            segments: Vec::new(),
        }
    }

    pub fn context(&self) -> &IgnitionContext {
        &self.context
    }

    pub fn species_component(&self) -> &SpeciesComponent {
        &self.species_component
    }

    pub fn initial_point(&self) -> Coord {
        self.initial_point
    }

    pub fn pre_ignition(&self) -> &[PreIgnitionData] {
        &self.pre_ignition
    }

    pub fn segments(&self) -> &[IgnitedSegment] {
        &self.segments
    }

    /// Record a drying event. Recording after ignition is a programming
    /// error and aborts the run.
    pub fn add_pre_ignition(&mut self, data: PreIgnitionData) {
        assert!(
            self.segments.is_empty(),
            "pre-ignition data may not be recorded after ignition"
        );
        self.pre_ignition.push(data);
    }

    /// Append an ignited segment. Time steps must be strictly increasing;
    /// a violation is a programming error and aborts the run.
    pub fn add_segment(&mut self, time_step: usize, start: Coord, end: Coord) {
        if let Some(last) = self.segments.last() {
            assert!(
                time_step > last.time_step,
                "segment time steps must be strictly increasing ({} after {})",
                time_step,
                last.time_step
            );
        }
        self.segments.push(IgnitedSegment { time_step, start, end });
    }

    pub fn has_ignition(&self) -> bool {
        !self.segments.is_empty()
    }

    /// Time step of first ignition.
    pub fn ignition_step(&self) -> Option<usize> {
        self.segments.first().map(|s| s.time_step)
    }

    /// Time of first ignition (s).
    pub fn ignition_time(&self) -> Option<f64> {
        self.ignition_step()
            .map(|s| s as f64 * constants::COMPUTATION_TIME_INTERVAL)
    }

    pub fn max_segment_length(&self) -> f64 {
        self.segments.iter().map(IgnitedSegment::length).fold(0.0, f64::max)
    }

    /// Hottest plume temperature seen while drying, before any ignition.
    pub fn max_drying_temperature(&self) -> f64 {
        self.pre_ignition
            .iter()
            .map(PreIgnitionData::drying_temperature)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Segments ordered longest-first, ties by earlier time step.
    pub fn segments_by_length_and_time(&self) -> Vec<IgnitedSegment> {
        let mut sorted = self.segments.clone();
        sorted.sort_by(|a, b| {
            b.length()
                .total_cmp(&a.length())
                .then(a.time_step.cmp(&b.time_step))
        });
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::crown::CrownPoly;
    use crate::core_types::geometry::coord;
    use crate::model::species::{LeafForm, Species};
    use approx::assert_relative_eq;

    fn path() -> IgnitionPath {
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
        let context = IgnitionContext {
            run_type: IgnitionRunType::PlantRun,
            stratum_level: StratumLevel::Elevated,
            air_temperature: 30.0,
            slope: 0.0,
            incident_flames: vec![],
            pre_heating_flames: vec![],
            pre_heating_end_time: None,
            canopy_heating_distance: 0.0,
            stratum_wind_speed: 2.0,
        };
        IgnitionPath::new(
            context,
            SpeciesComponent::new(species, 1.0).unwrap(),
            coord(0.0, 0.5),
        )
    }

    #[test]
    fn test_ignition_queries() {
        let mut p = path();
        assert!(!p.has_ignition());
        assert_eq!(p.ignition_time(), None);
        p.add_segment(3, coord(0.0, 0.5), coord(0.0, 0.9));
        p.add_segment(4, coord(0.0, 0.7), coord(0.0, 1.5));
        assert!(p.has_ignition());
        assert_eq!(p.ignition_step(), Some(3));
        assert_relative_eq!(p.max_segment_length(), 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_segments_sorted_by_length_then_time() {
        let mut p = path();
        p.add_segment(1, coord(0.0, 0.0), coord(0.0, 0.4));
        p.add_segment(2, coord(0.0, 0.0), coord(0.0, 0.8));
        p.add_segment(3, coord(0.0, 0.4), coord(0.0, 1.2));
        let sorted = p.segments_by_length_and_time();
        assert_eq!(sorted[0].time_step, 2);
        assert_eq!(sorted[1].time_step, 3);
        assert_eq!(sorted[2].time_step, 1);
    }

    #[test]
    #[should_panic(expected = "strictly increasing")]
    fn test_non_monotonic_time_steps_abort() {
        let mut p = path();
        p.add_segment(2, coord(0.0, 0.0), coord(0.0, 0.4));
        p.add_segment(2, coord(0.0, 0.4), coord(0.0, 0.8));
    }

    #[test]
    #[should_panic(expected = "after ignition")]
    fn test_pre_ignition_after_ignition_aborts() {
        let mut p = path();
        p.add_segment(1, coord(0.0, 0.0), coord(0.0, 0.4));
        let flame = crate::physics::flame::Flame::new(
            1.0,
            std::f64::consts::FRAC_PI_2,
            coord(0.0, 0.0),
            0.5,
            950.0,
        )
        .unwrap();
        p.add_pre_ignition(PreIgnitionData::IncidentDrying {
            time_step: 2,
            flame,
            distance: 1.0,
            drying_factor: 0.9,
            drying_temperature: 300.0,
            ignition_delay_time: 10.0,
        });
    }
}
