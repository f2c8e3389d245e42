//! The stratum orchestrator.
//!
//! Strata are processed from the ground up. Each stratum receives incident
//! flames composed from the surface fire and any connected lower strata,
//! runs the per-species plant simulation from five crown-base start points,
//! merges the winners into a stratum flame series, runs the stratum-wide
//! simulation in an artificial pseudo-crown, and seeds a pre-heating flame
//! for the strata above. After the top stratum, flames of everything
//! connected to the canopy are combined. A second pass without canopy wind
//! attenuation runs whenever the first pass set the canopy alight.

use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::constants;
use crate::core_types::crown::CrownPoly;
use crate::core_types::geometry::{self, coord, Coord, Line};
use crate::error::Result;
use crate::ignition::path::{IgnitionContext, IgnitionPath, IgnitionRunType};
use crate::ignition::simulator::{
    DefaultIgnitionPathModel, DefaultPlantFlameModel, IgnitionPathModel, PlantFlameModel,
};
use crate::model::site::Site;
use crate::model::species::SpeciesComponent;
use crate::model::stratum::{Stratum, StratumLevel};
use crate::physics::flame::{self, Flame};
use crate::physics::pre_heating::PreHeatingFlame;
use crate::physics::surface::SurfaceParams;
use crate::physics::wind;
use crate::results::outcome::{FireModelResult, FireModelRunResult, StratumOutcome};
use crate::results::weighted::{weighted_flame_attributes, WeightedFlameAttributes};

/// Candidate ignition start offsets across the crown base, as proportions
/// of the half width.
const START_PROPORTIONS: [f64; 5] = [-1.0, -0.5, 0.0, 0.5, 1.0];

/// Run the full fire model: the primary pass, and a second pass with the
/// canopy removed from the wind computation whenever the primary pass
/// produced a canopy flame series.
pub fn run(
    site: &Site,
    fire_line_length: f64,
    path_model: &dyn IgnitionPathModel,
    plant_flame_model: &dyn PlantFlameModel,
) -> Result<FireModelResult> {
    let run1 = run_pass(site, fire_line_length, path_model, plant_flame_model, true)?;
    let canopy_burned = run1
        .flame_series(StratumLevel::Canopy)
        .is_some_and(|s| !s.is_empty());
    if canopy_burned {
        info!("canopy alight; re-running without canopy wind attenuation");
        let run2 = run_pass(site, fire_line_length, path_model, plant_flame_model, false)?;
        Ok(FireModelResult { run1, run2, has_second_run: true })
    } else {
        let run2 = FireModelRunResult::new(SurfaceParams::from_site(site, true)?);
        Ok(FireModelResult { run1, run2, has_second_run: false })
    }
}

/// [`run`] with the default path and plant-flame models.
pub fn run_with_defaults(site: &Site, fire_line_length: f64) -> Result<FireModelResult> {
    run(
        site,
        fire_line_length,
        &DefaultIgnitionPathModel,
        &DefaultPlantFlameModel,
    )
}

/// One bottom-to-top pass over the strata.
fn run_pass(
    site: &Site,
    fire_line_length: f64,
    path_model: &dyn IgnitionPathModel,
    plant_flame_model: &dyn PlantFlameModel,
    include_canopy: bool,
) -> Result<FireModelRunResult> {
    let surface = SurfaceParams::from_site(site, include_canopy)?;
    let surface_series = surface.flame_series()?;
    let mut pre_heating = vec![surface.pre_heating_flame()?];
    let mut pre_heating_end_time: Option<f64> = None;
    let mut connections: BTreeSet<StratumLevel> = BTreeSet::new();
    let mut result = FireModelRunResult::new(surface.clone());

    for stratum in site.vegetation().strata() {
        let level = stratum.level();
        debug!(%level, include_canopy, "running stratum");

        let incident = incident_flames_for(
            stratum,
            site,
            &surface,
            &surface_series,
            &result,
            &connections,
            include_canopy,
            fire_line_length,
        )?;
        let stratum_wind =
            wind::wind_speed_at_height(stratum.average_mid_height(), site, include_canopy);

        let plant_context = IgnitionContext {
            run_type: IgnitionRunType::PlantRun,
            stratum_level: level,
            air_temperature: site.temperature(),
            slope: site.slope(),
            incident_flames: incident,
            pre_heating_flames: pre_heating.clone(),
            pre_heating_end_time,
            canopy_heating_distance: 0.0,
            stratum_wind_speed: stratum_wind,
        };
        let plant_paths = plant_run(&plant_context, stratum, site, path_model, plant_flame_model)?;

        if !plant_paths.iter().any(IgnitionPath::has_ignition) {
            debug!(%level, "no species ignited");
            result = result.with_outcome(StratumOutcome::non_ignition(
                stratum.clone(),
                plant_paths,
            ));
            continue;
        }

        let plant_attrs = weighted_flame_attributes(&plant_paths, level, plant_flame_model);
        let plant_flames = plant_attrs
            .entries
            .iter()
            .map(|e| {
                let merged = flame::lateral_merged_flame_length(
                    e.flame_length,
                    fire_line_length,
                    stratum.average_width(),
                    stratum.model_plant_sep(),
                );
                Flame::new(
                    merged,
                    flame::wind_effect_flame_angle(merged, stratum_wind, site.slope()),
                    e.origin,
                    e.depth_ignited.min(merged),
                    e.temperature,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        let canopy_heating = if level == StratumLevel::Canopy {
            canopy_heating_distance(stratum, &result, site)
        } else {
            0.0
        };

        let (stratum_paths, stratum_series) = stratum_run(
            stratum,
            site,
            &plant_flames,
            &pre_heating,
            pre_heating_end_time,
            canopy_heating,
            stratum_wind,
            path_model,
            plant_flame_model,
        )?;

        // Seed the pre-heating flame for the strata above from whichever
        // series carries the longer flames.
        let plant_max = flame::max_flame_length(&plant_flames);
        let (series, timing): (&[Flame], &WeightedFlameAttributes) = match &stratum_series {
            Some((flames, attrs)) if flame::max_flame_length(flames) > plant_max => {
                (flames.as_slice(), attrs)
            }
            _ => (plant_flames.as_slice(), &plant_attrs),
        };
        if let Some(longest) = flame::longest_flame(series) {
            let base = pre_heating_end_time.map(|t| t.max(0.0)).unwrap_or(0.0);
            let start = base + timing.ignition_time + timing.time_to_longest_flame;
            let end = start + series.len() as f64 * constants::COMPUTATION_TIME_INTERVAL;
            pre_heating.push(PreHeatingFlame::new(longest.clone(), Some(level), start, end));
            pre_heating_end_time = Some(start);
        }

        // A stratum whose plant flames reach beyond their own crowns can
        // carry fire to the strata above.
        if plant_flames_escape_crown(&plant_paths, stratum_wind, site.slope(), plant_flame_model) {
            debug!(%level, "plant flames extend beyond the crown; stratum connected upward");
            connections.insert(level);
        }

        let stratum_flames = stratum_series.map(|(flames, _)| flames);
        result = result.with_outcome(StratumOutcome::with_flames(
            stratum.clone(),
            plant_paths,
            plant_flames,
            stratum_paths,
            stratum_flames,
        ));
    }

    let combined = combined_flames(
        site,
        &surface,
        &result,
        &connections,
        include_canopy,
        fire_line_length,
    )?;
    Ok(result.with_combined_flames(combined))
}

/// Incident flames for a stratum: the surface flames alone, or the surface
/// flames fused with every connected lower flame series under the
/// flame-weighted wind.
#[allow(clippy::too_many_arguments)]
fn incident_flames_for(
    stratum: &Stratum,
    site: &Site,
    surface: &SurfaceParams,
    surface_series: &[Flame],
    result: &FireModelRunResult,
    connections: &BTreeSet<StratumLevel>,
    include_canopy: bool,
    fire_line_length: f64,
) -> Result<Vec<Flame>> {
    let mut lower: Vec<(&Stratum, &Vec<Flame>)> = Vec::new();
    for outcome in result.stratum_outcomes() {
        let level = outcome.level();
        if level >= stratum.level() {
            continue;
        }
        let Some(series) = result.flame_series(level) else { continue };
        let connected = connections.contains(&level)
            || site.vegetation().vertically_associated(level, stratum.level());
        if connected {
            lower.push((outcome.stratum(), series));
        }
    }
    if lower.is_empty() {
        return Ok(surface_series.to_vec());
    }

    let weighted_wind = flame_weighted_wind(site, surface, &lower, include_canopy);
    let mut incident = surface_series.to_vec();
    for (_, series) in &lower {
        incident = flame::combine_flames(
            series,
            &incident,
            weighted_wind,
            site.slope(),
            fire_line_length,
        )?;
    }
    Ok(incident)
}

/// Wind speed averaged over the contributing flames, weighted by their
/// lengths; the surface fire contributes its own wind at its own flame
/// length.
fn flame_weighted_wind(
    site: &Site,
    surface: &SurfaceParams,
    lower: &[(&Stratum, &Vec<Flame>)],
    include_canopy: bool,
) -> f64 {
    let mut weight = surface.flame_length();
    let mut total = surface.wind_speed() * surface.flame_length();
    for (stratum, series) in lower {
        let len = flame::max_flame_length(series);
        let speed = wind::wind_speed_at_height(stratum.average_mid_height(), site, include_canopy);
        total += speed * len;
        weight += len;
    }
    if weight > 0.0 {
        total / weight
    } else {
        surface.wind_speed()
    }
}

/// Plant run: one best path per species, chosen over five start points
/// across the crown base.
fn plant_run(
    context: &IgnitionContext,
    stratum: &Stratum,
    site: &Site,
    path_model: &dyn IgnitionPathModel,
    plant_flame_model: &dyn PlantFlameModel,
) -> Result<Vec<IgnitionPath>> {
    let mut best_paths = Vec::with_capacity(stratum.species().len());
    for component in stratum.species() {
        let start = ignition_start_point(component, site, START_PROPORTIONS[0]);
        let mut best = path_model.generate_path(context, component, start, plant_flame_model)?;
        for &prop in &START_PROPORTIONS[1..] {
            let start = ignition_start_point(component, site, prop);
            let path = path_model.generate_path(context, component, start, plant_flame_model)?;
            best = select_best_path(best, path);
        }
        best_paths.push(best);
    }
    Ok(best_paths)
}

/// Candidate start point at a proportion of the half crown width. Crowns
/// reaching below the surface ignite at the surface line instead.
fn ignition_start_point(component: &SpeciesComponent, site: &Site, prop: f64) -> Coord {
    let crown = component.species.crown();
    let x = prop * crown.width() / 2.0;
    let start = crown.point_in_base(x);
    let surface_y = x * site.slope().tan();
    if start.y < surface_y {
        coord(x, surface_y)
    } else {
        start
    }
}

/// Best-path rule: ignition beats none; between ignitions the longer
/// maximum segment wins; between failures the hotter drying wins.
fn select_best_path(a: IgnitionPath, b: IgnitionPath) -> IgnitionPath {
    match (a.has_ignition(), b.has_ignition()) {
        (true, false) => a,
        (false, true) => b,
        (true, true) => {
            if b.max_segment_length() > a.max_segment_length() {
                b
            } else {
                a
            }
        }
        (false, false) => {
            if b.max_drying_temperature() > a.max_drying_temperature() {
                b
            } else {
                a
            }
        }
    }
}

/// Stratum run: fire spreading from plant to plant through an artificial
/// stratum-wide crown, entered where the first plant flame's plume meets
/// it. Species become proxies with crown-sized clumps spaced at the gap
/// between plants.
#[allow(clippy::too_many_arguments)]
fn stratum_run(
    stratum: &Stratum,
    site: &Site,
    plant_flames: &[Flame],
    pre_heating: &[PreHeatingFlame],
    pre_heating_end_time: Option<f64>,
    canopy_heating_distance: f64,
    stratum_wind: f64,
    path_model: &dyn IgnitionPathModel,
    plant_flame_model: &dyn PlantFlameModel,
) -> Result<(Vec<IgnitionPath>, Option<(Vec<Flame>, WeightedFlameAttributes)>)> {
    let Some(reference) = plant_flames.first() else {
        return Ok((Vec::new(), None));
    };
    let x0 = stratum.model_plant_sep() - stratum.average_width() / 2.0;
    let pseudo_crown = CrownPoly::sheared_rectangle(
        x0,
        x0 + constants::STRATUM_BIG_CROWN_WIDTH,
        stratum.average_bottom(),
        stratum.average_top(),
        site.slope(),
    )?;
    let Some(entry) = pseudo_crown.intersection(&reference.plume()) else {
        debug!(level = %stratum.level(), "reference flame misses the stratum crown");
        return Ok((Vec::new(), None));
    };

    let context = IgnitionContext {
        run_type: IgnitionRunType::StratumRun,
        stratum_level: stratum.level(),
        air_temperature: site.temperature(),
        slope: site.slope(),
        incident_flames: plant_flames.to_vec(),
        pre_heating_flames: pre_heating.to_vec(),
        pre_heating_end_time,
        canopy_heating_distance,
        stratum_wind_speed: stratum_wind,
    };

    let mut paths = Vec::with_capacity(stratum.species().len());
    for component in stratum.species() {
        let clump_separation = component
            .species
            .clump_separation()
            .max(stratum.model_plant_sep() - stratum.average_width());
        let proxy = SpeciesComponent {
            species: component
                .species
                .stratum_run_proxy(pseudo_crown.clone(), clump_separation),
            weighting: component.weighting,
        };
        paths.push(path_model.generate_path(&context, &proxy, entry.start, plant_flame_model)?);
    }

    let attrs = weighted_flame_attributes(&paths, stratum.level(), plant_flame_model);
    if attrs.is_empty() {
        return Ok((paths, None));
    }
    let flames = attrs
        .entries
        .iter()
        .map(|e| {
            Flame::new(
                e.flame_length,
                flame::wind_effect_flame_angle(e.flame_length, stratum_wind, site.slope()),
                e.origin,
                e.depth_ignited.min(e.flame_length),
                e.temperature,
            )
        })
        .collect::<Result<Vec<_>>>()?;
    Ok((paths, Some((flames, attrs))))
}

/// Whether any plant-run flame tip reaches beyond its species' crown.
fn plant_flames_escape_crown(
    plant_paths: &[IgnitionPath],
    stratum_wind: f64,
    slope: f64,
    plant_flame_model: &dyn PlantFlameModel,
) -> bool {
    plant_paths.iter().any(|path| {
        let species = &path.species_component().species;
        let half_width = species.crown().width() / 2.0;
        path.segments().iter().any(|segment| {
            let len = plant_flame_model.flame_length(species, segment.length());
            flame::flame_tip_x(segment.start.x, len, stratum_wind, slope) > half_width
        })
    })
}

/// Horizontal extent of canopy pre-heating: how far along the lower canopy
/// edge the plumes of lower strata still arrive hot enough.
fn canopy_heating_distance(canopy: &Stratum, result: &FireModelRunResult, site: &Site) -> f64 {
    let edge = Line::new(coord(0.0, canopy.average_bottom()), site.slope());
    let mut best = 0.0f64;
    for outcome in result.stratum_outcomes() {
        if outcome.level() == StratumLevel::Canopy {
            continue;
        }
        let Some(series) = result.flame_series(outcome.level()) else { continue };
        let Some(longest) = flame::longest_flame(series) else { continue };
        let point = edge
            .intersection(&longest.plume())
            .unwrap_or_else(|| longest.origin());
        let dist = geometry::distance(longest.origin(), point);
        if longest.plume_temperature(dist, site.temperature())
            >= constants::MIN_TEMP_FOR_CANOPY_HEATING
        {
            best = best.max(point.x);
        }
    }
    best
}

/// Flames of all strata connected to the canopy, fused bottom to top.
fn combined_flames(
    site: &Site,
    surface: &SurfaceParams,
    result: &FireModelRunResult,
    connections: &BTreeSet<StratumLevel>,
    include_canopy: bool,
    fire_line_length: f64,
) -> Result<Vec<Flame>> {
    let mut contributing: Vec<(&Stratum, &Vec<Flame>)> = Vec::new();
    for outcome in result.stratum_outcomes() {
        let level = outcome.level();
        let connected = level == StratumLevel::Canopy
            || connections.contains(&level)
            || site.vegetation().vertically_associated(level, StratumLevel::Canopy);
        if !connected {
            continue;
        }
        if let Some(series) = result.flame_series(level) {
            contributing.push((outcome.stratum(), series));
        }
    }
    if contributing.is_empty() {
        return Ok(Vec::new());
    }

    let weighted_wind = flame_weighted_wind(site, surface, &contributing, include_canopy);
    let mut combined: Vec<Flame> = Vec::new();
    for (_, series) in &contributing {
        if combined.is_empty() {
            combined = (*series).clone();
        } else {
            combined = flame::combine_flames(
                series,
                &combined,
                weighted_wind,
                site.slope(),
                fire_line_length,
            )?;
        }
    }
    Ok(combined)
}
