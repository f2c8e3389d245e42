//! The ignition-path simulator.
//!
//! A discrete-time state machine that walks ignition through a crown. Each
//! step the fire may advance along whichever flame (the species' own plant
//! flame or the incident flame from below) can carry ignition furthest;
//! advance requires both a hot enough plume and fuel dried far enough that
//! its ignition delay fits within one time step. Earlier exposure to
//! pre-heating, incident, and plant flames shortens the delay through the
//! drying factor.

use tracing::debug;

use crate::constants;
use crate::core_types::geometry::{self, Coord, Line, Ray};
use crate::core_types::numerics;
use crate::error::Result;
use crate::ignition::path::{
    IgnitionContext, IgnitionPath, IgnitionRunType, PreIgnitionData,
};
use crate::model::species::{Species, SpeciesComponent};
use crate::model::stratum::StratumLevel;
use crate::physics::flame::{self, Flame};

/// How a species turns an ignited segment into a flame.
pub trait PlantFlameModel {
    fn flame_length(&self, species: &Species, segment_length: f64) -> f64;
}

/// The fourth-power leaf-merging law carried by [`Species`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPlantFlameModel;

impl PlantFlameModel for DefaultPlantFlameModel {
    fn flame_length(&self, species: &Species, segment_length: f64) -> f64 {
        species.flame_length(segment_length)
    }
}

/// Strategy seam for the ignition simulation itself.
pub trait IgnitionPathModel {
    fn generate_path(
        &self,
        context: &IgnitionContext,
        component: &SpeciesComponent,
        initial_point: Coord,
        plant_flame_model: &dyn PlantFlameModel,
    ) -> Result<IgnitionPath>;
}

/// The simulator described above.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultIgnitionPathModel;

impl IgnitionPathModel for DefaultIgnitionPathModel {
    fn generate_path(
        &self,
        context: &IgnitionContext,
        component: &SpeciesComponent,
        initial_point: Coord,
        plant_flame_model: &dyn PlantFlameModel,
    ) -> Result<IgnitionPath> {
        simulate(context, component, initial_point, plant_flame_model)
    }
}

/// Ignition delay time with the grass shortcut applied.
fn calculate_idt(species: &Species, level: StratumLevel, temp: f64) -> f64 {
    let idt = species.ignition_delay_time(temp);
    if species.is_grass(level) {
        idt * constants::GRASS_IDT_REDUCTION
    } else {
        idt
    }
}

/// Where a flame's plume effectively starts: stratum runs keep the true
/// origin; plant runs place the flame on the surface line so that its ray
/// passes through the current ignition point. Fails hard when the flame
/// angle is parallel to the surface.
fn effective_origin(
    surface_line: &Line,
    flame: &Flame,
    run_type: IgnitionRunType,
    cur_point: Coord,
) -> Result<Coord> {
    match run_type {
        IgnitionRunType::PlantRun => surface_line.origin_on_line(cur_point, flame.angle()),
        IgnitionRunType::StratumRun => Ok(flame.origin()),
    }
}

/// How far along `flame`'s direction from `cur_point` ignition could reach:
/// bounded by the crown and by where the plume cools below the ignition
/// temperature.
fn candidate_path_length(
    species: &Species,
    cur_point: Coord,
    flame: &Flame,
    ambient: f64,
) -> f64 {
    let Some(chord) = species.crown().intersection(&Ray::new(cur_point, flame.angle())) else {
        return 0.0;
    };
    match flame.distance_for_temperature(species.ignition_temperature(), ambient) {
        Some(reach) => chord.length().min(reach),
        None => 0.0,
    }
}

/// Stratum runs feel less wind once the fire races ahead: the advance speed
/// of the last ignited segment is subtracted from the stratum wind.
fn modified_wind_speed(context: &IgnitionContext, path: &IgnitionPath, initial_point: Coord) -> f64 {
    let base = context.stratum_wind_speed;
    if context.run_type != IgnitionRunType::StratumRun || !path.has_ignition() {
        return base;
    }
    let segments = path.segments();
    let dx = if segments.len() == 1 {
        segments[0].end.x - initial_point.x
    } else {
        let last = &segments[segments.len() - 1];
        last.end.x - last.start.x
    };
    base - dx.max(0.0) / constants::COMPUTATION_TIME_INTERVAL
}

/// The multiplicative drying factor at a test point, recording pre-ignition
/// drying events along the way. Short-circuits at zero.
#[allow(clippy::too_many_arguments)]
fn drying_factor(
    time_step: usize,
    context: &IgnitionContext,
    species: &Species,
    surface_line: &Line,
    cur_point: Coord,
    test_point: Coord,
    plant_flames: &[Flame],
    path: &mut IgnitionPath,
) -> Result<f64> {
    let dt = constants::COMPUTATION_TIME_INTERVAL;
    let pre_ignition = !path.has_ignition();
    let mut product = 1.0;

    // Pre-heating flames, skipping the most recent: that one heats
    // directly rather than drying.
    let phfs = &context.pre_heating_flames;
    if phfs.len() >= 2 {
        for phf in &phfs[..phfs.len() - 1] {
            let origin = surface_line.origin_on_line(cur_point, phf.flame().angle())?;
            let dist = geometry::distance(origin, test_point);
            let temp = phf.flame().plume_temperature(dist, context.air_temperature);
            let idt = calculate_idt(species, context.stratum_level, temp);
            let duration = phf.duration(context.pre_heating_end_time);
            let contribution = (1.0 - duration / idt).max(0.0);
            product *= contribution;
            if pre_ignition && idt.is_finite() {
                path.add_pre_ignition(PreIgnitionData::PreHeatingDrying {
                    time_step,
                    flame: phf.flame().clone(),
                    distance: dist,
                    drying_factor: contribution,
                    drying_temperature: temp,
                    duration,
                });
            }
            if product == 0.0 {
                return Ok(0.0);
            }
        }
    }

    // Incident flames already seen by this path.
    let seen = (time_step - 1).min(context.incident_flames.len());
    for i in 1..=seen {
        let incident = &context.incident_flames[i - 1];
        let origin = effective_origin(surface_line, incident, context.run_type, cur_point)?;
        let dist = geometry::distance(origin, test_point);
        let temp = incident.plume_temperature(dist, context.air_temperature);
        let idt = calculate_idt(species, context.stratum_level, temp);
        let contribution = (1.0 - dt / idt).max(0.0);
        product *= contribution;
        if pre_ignition && idt.is_finite() {
            path.add_pre_ignition(PreIgnitionData::IncidentDrying {
                time_step,
                flame: incident.clone(),
                distance: dist,
                drying_factor: contribution,
                drying_temperature: temp,
                ignition_delay_time: idt,
            });
        }
        if product == 0.0 {
            return Ok(0.0);
        }
    }

    // The path's own earlier plant flames.
    for plant in plant_flames {
        let dist = geometry::distance(plant.origin(), test_point);
        let temp = plant.plume_temperature(dist, context.air_temperature);
        let idt = calculate_idt(species, context.stratum_level, temp);
        product *= (1.0 - dt / idt).max(0.0);
        if product == 0.0 {
            return Ok(0.0);
        }
    }

    Ok(product)
}

/// Hottest plume temperature over the step's plant and incident flames.
fn max_plume_temperature(
    test_point: Coord,
    incident: Option<(&Flame, Coord)>,
    plant: Option<&Flame>,
    ambient: f64,
) -> f64 {
    let mut max_temp = f64::NEG_INFINITY;
    if let Some((flame, origin)) = incident {
        max_temp = max_temp.max(flame.plume_temperature(geometry::distance(origin, test_point), ambient));
    }
    if let Some(flame) = plant {
        max_temp = max_temp
            .max(flame.plume_temperature(geometry::distance(flame.origin(), test_point), ambient));
    }
    max_temp
}

fn simulate(
    context: &IgnitionContext,
    component: &SpeciesComponent,
    initial_point: Coord,
    plant_flame_model: &dyn PlantFlameModel,
) -> Result<IgnitionPath> {
    let species = &component.species;
    let dt = constants::COMPUTATION_TIME_INTERVAL;
    let mut path = IgnitionPath::new(context.clone(), component.clone(), initial_point);
    let mut plant_flames: Vec<Flame> = Vec::new();
    let mut cur_point = initial_point;

    let mut t = 0usize;
    loop {
        t += 1;
        if let Some(first) = path.ignition_step() {
            if t - first > constants::MAX_IGNITION_TIME_STEPS {
                break;
            }
        }

        let modified_wind = modified_wind_speed(context, &path, initial_point);
        let plant_flame = plant_flames.last().cloned();
        let incident_flame = context.incident_flames.get(t - 1).cloned();
        if plant_flame.is_none() && incident_flame.is_none() {
            break;
        }

        let surface_line = Line::new(geometry::coord(0.0, 0.0), context.slope);
        let incident_origin = match &incident_flame {
            Some(f) => Some(effective_origin(&surface_line, f, context.run_type, cur_point)?),
            None => None,
        };

        // Candidate ignition paths along each available flame; the longer
        // one wins.
        let mut path_length = 0.0;
        let mut path_angle = 0.0;
        if let Some(pf) = &plant_flame {
            let len = candidate_path_length(species, cur_point, pf, context.air_temperature);
            if len > path_length {
                path_length = len;
                path_angle = pf.angle();
            }
        }
        if let Some(inc) = &incident_flame {
            let len = candidate_path_length(species, cur_point, inc, context.air_temperature);
            if len > path_length {
                path_length = len;
                path_angle = inc.angle();
            }
        }
        if numerics::almost_zero(path_length) {
            break;
        }

        // Walk the candidate path in equal steps; ignition reaches the last
        // test point that is both hot enough and dry enough.
        let mut next_point: Option<Coord> = None;
        for i in 1..=constants::NUM_PENETRATION_STEPS {
            let test_point = geometry::point_at(
                cur_point,
                path_angle,
                path_length * i as f64 / constants::NUM_PENETRATION_STEPS as f64,
            );
            let drying = drying_factor(
                t,
                context,
                species,
                &surface_line,
                cur_point,
                test_point,
                &plant_flames,
                &mut path,
            )?;
            let max_temp = max_plume_temperature(
                test_point,
                incident_flame.as_ref().map(|f| (f, incident_origin.unwrap_or(f.origin()))),
                plant_flame.as_ref(),
                context.air_temperature,
            );
            let ignites = max_temp >= species.ignition_temperature()
                && drying * calculate_idt(species, context.stratum_level, max_temp) <= dt;
            if !ignites {
                break;
            }
            next_point = Some(test_point);
        }
        let Some(next) = next_point else { break };

        // The new segment starts where the flame front still burns: look
        // back one flame duration through the ignited segments.
        let seg_start = if let Some(first) = path.segments().first() {
            let residence = if context.run_type == IgnitionRunType::StratumRun
                && context.stratum_level == StratumLevel::Canopy
                && cur_point.x > context.canopy_heating_distance
            {
                constants::REDUCED_CANOPY_FLAME_RESIDENCE_TIME
            } else {
                species.flame_duration()
            };
            let lookback = (residence / dt).ceil().max(1.0) as usize;
            let segments = path.segments();
            if segments.len() < lookback {
                first.start
            } else {
                segments[segments.len() - lookback].end
            }
        } else {
            cur_point
        };
        if numerics::almost_zero(geometry::distance(seg_start, next)) {
            break;
        }

        path.add_segment(t, seg_start, next);
        let seg_len = geometry::distance(seg_start, next);
        let flame_len = plant_flame_model.flame_length(species, seg_len);
        if flame_len > 0.0 {
            let delta_t = if species.is_grass(context.stratum_level) {
                constants::GRASS_FLAME_DELTA_TEMPERATURE
            } else {
                constants::MAIN_FLAME_DELTA_TEMPERATURE
            };
            plant_flames.push(Flame::new(
                flame_len,
                flame::wind_effect_flame_angle(flame_len, modified_wind, context.slope),
                seg_start,
                seg_len.min(flame_len),
                delta_t,
            )?);
        }
        cur_point = next;
    }

    debug!(
        species = species.name(),
        run_type = ?context.run_type,
        segments = path.segments().len(),
        "ignition path simulated"
    );
    Ok(path)
}
