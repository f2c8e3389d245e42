//! Weighted flame attributes: per-species ignition paths aggregated into a
//! single stratum flame series.

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::core_types::geometry::{coord, Coord};
use crate::ignition::path::IgnitionPath;
use crate::ignition::simulator::PlantFlameModel;
use crate::model::stratum::StratumLevel;

/// One aggregated time step of a stratum's flames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedFlameEntry {
    pub flame_length: f64,
    pub depth_ignited: f64,
    pub origin: Coord,
    pub temperature: f64,
}

/// The time-indexed aggregation of the best per-species ignition paths,
/// aligned at each species' own ignition step and weighted by composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedFlameAttributes {
    /// First time (s) any species ignites.
    pub ignition_time: f64,
    /// Time (s) from ignition to the longest aggregated flame.
    pub time_to_longest_flame: f64,
    pub entries: Vec<WeightedFlameEntry>,
}

impl WeightedFlameAttributes {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }
}

/// Aggregate the paths that ignited. An empty or ignition-free input yields
/// the empty attribute set.
pub fn weighted_flame_attributes(
    paths: &[IgnitionPath],
    level: StratumLevel,
    plant_flame_model: &dyn PlantFlameModel,
) -> WeightedFlameAttributes {
    let ignited: Vec<&IgnitionPath> = paths.iter().filter(|p| p.has_ignition()).collect();
    if ignited.is_empty() {
        return WeightedFlameAttributes {
            ignition_time: 0.0,
            time_to_longest_flame: 0.0,
            entries: Vec::new(),
        };
    }

    let ignition_time = ignited
        .iter()
        .filter_map(|p| p.ignition_time())
        .fold(f64::INFINITY, f64::min);
    let steps = ignited.iter().map(|p| p.segments().len()).max().unwrap_or(0);

    let mut entries = Vec::with_capacity(steps);
    for k in 0..steps {
        let mut weight = 0.0;
        let mut length = 0.0;
        let mut depth = 0.0;
        let mut origin_x = 0.0;
        let mut origin_y = 0.0;
        let mut temperature = 0.0;
        for path in &ignited {
            let Some(segment) = path.segments().get(k) else { continue };
            let component = path.species_component();
            let species = &component.species;
            let w = component.weighting;
            let seg_len = segment.length();
            weight += w;
            length += w * plant_flame_model.flame_length(species, seg_len);
            depth += w * seg_len;
            origin_x += w * segment.start.x;
            origin_y += w * segment.start.y;
            temperature += w
                * if species.is_grass(level) {
                    constants::GRASS_FLAME_DELTA_TEMPERATURE
                } else {
                    constants::MAIN_FLAME_DELTA_TEMPERATURE
                };
        }
        if weight > 0.0 {
            entries.push(WeightedFlameEntry {
                flame_length: length / weight,
                depth_ignited: depth / weight,
                origin: coord(origin_x / weight, origin_y / weight),
                temperature: temperature / weight,
            });
        }
    }

    let longest = entries
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.flame_length.total_cmp(&b.flame_length))
        .map(|(k, _)| k)
        .unwrap_or(0);

    WeightedFlameAttributes {
        ignition_time,
        time_to_longest_flame: longest as f64 * constants::COMPUTATION_TIME_INTERVAL,
        entries,
    }
}
