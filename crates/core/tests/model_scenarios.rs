//! End-to-end scenarios for the fire model: whole sites built from
//! parameter files, run through both passes, checked against the expected
//! ignition outcomes.

use flammability_core::params::site_from_text;
use flammability_core::physics::flame;
use flammability_core::{run_with_defaults, StratumLevel};

/// A single canopy stratum high above the surface: nothing below can drive
/// it, so the canopy must not ignite and no second run happens.
const CANOPY_ONLY: &str = "\
fireline length = 100
incident wind speed = 10
air temperature = 29.2
slope = 0
surface dead fuel moisture content = 0.07
fuel load tonnes per hectare = 17.3
mean fuel diameter = 0.005
mean fineness leaves = 0.00025

begin stratum
level = canopy
plant separation = 8.5
begin species
composition = 100
name = Eucalyptus delegatensis
live leaf moisture = 1.0
dead leaf moisture = 0.1
proportion dead = 0.1
leaf form = flat
leaf thickness = 0.0004
leaf width = 0.02
leaf length = 0.08
leaf separation = 0.01
stem order = 4
clump diameter = 0.6
clump separation = 0.3
ignition temperature = 260
hc = 12
he = 13
ht = 19
hp = 20
w = 6
end species
end stratum
";

/// Midstorey (2-8 m) under a canopy (5-20 m) with overlapping heights and a
/// strong wind: fire climbs the whole column.
const TWO_STRATA: &str = "\
fireline length = 100
incident wind speed = 30
air temperature = 30
slope = 0
surface dead fuel moisture content = 0.06
fuel load tonnes per hectare = 20
mean fuel diameter = 0.005
mean fineness leaves = 0.00025
overlapping = midstorey, canopy, automatic

begin stratum
level = midstorey
plant separation = 4
begin species
composition = 100
name = Acacia obliquinervia
live leaf moisture = 1.0
dead leaf moisture = 0.1
proportion dead = 0.3
leaf form = flat
leaf thickness = 0.0002
leaf width = 0.015
leaf length = 0.05
leaf separation = 0.008
stem order = 3
clump diameter = 0.4
clump separation = 0.2
ignition temperature = 260
hc = 2
he = 3
ht = 7
hp = 8
w = 3
end species
end stratum

begin stratum
level = canopy
plant separation = 8
begin species
composition = 100
name = Eucalyptus delegatensis
live leaf moisture = 1.1
dead leaf moisture = 0.1
proportion dead = 0.1
leaf form = flat
leaf thickness = 0.0003
leaf width = 0.02
leaf length = 0.08
leaf separation = 0.01
stem order = 4
clump diameter = 0.6
clump separation = 0.3
ignition temperature = 260
hc = 5
he = 7
ht = 18
hp = 20
w = 6
end species
end stratum
";

#[test]
fn canopy_only_site_does_not_ignite() {
    let site = site_from_text(CANOPY_ONLY).unwrap();
    let result = run_with_defaults(&site, site.fire_line_length()).unwrap();

    // Surface fire exists regardless.
    assert!(result.run1.surface_params().flame_length() > 0.0);
    assert!(!result.run1.surface_params().flame_series().unwrap().is_empty());

    // The canopy is far above anything that could heat it.
    let canopy = result.run1.outcome(StratumLevel::Canopy).unwrap();
    assert!(canopy.plant_paths().iter().all(|p| !p.has_ignition()));
    assert!(result.run1.flame_series(StratumLevel::Canopy).is_none());

    // No canopy flames, no second run.
    assert!(!result.has_second_run);
    assert!(result.run2.stratum_outcomes().is_empty());
}

#[test]
fn canopy_only_site_is_deterministic() {
    let site = site_from_text(CANOPY_ONLY).unwrap();
    let a = run_with_defaults(&site, site.fire_line_length()).unwrap();
    let b = run_with_defaults(&site, site.fire_line_length()).unwrap();
    assert_eq!(a.run1, b.run1);
    assert_eq!(a.has_second_run, b.has_second_run);
}

#[test]
fn two_strata_propagate_to_canopy() {
    let site = site_from_text(TWO_STRATA).unwrap();
    let result = run_with_defaults(&site, site.fire_line_length()).unwrap();

    // Both strata ignite.
    let midstorey = result.run1.outcome(StratumLevel::MidStorey).unwrap();
    assert!(midstorey.plant_paths().iter().any(|p| p.has_ignition()));
    assert!(result.run1.flame_series(StratumLevel::MidStorey).is_some());

    let canopy = result.run1.outcome(StratumLevel::Canopy).unwrap();
    assert!(canopy.plant_paths().iter().any(|p| p.has_ignition()));
    let canopy_series_1 = result.run1.flame_series(StratumLevel::Canopy).unwrap();
    assert!(!canopy_series_1.is_empty());

    // A canopy flame series triggers the second run.
    assert!(result.has_second_run);

    // Combined flames exist: the canopy itself carries a series.
    assert!(!result.run1.combined_flames().is_empty());
}

#[test]
fn second_run_tilts_canopy_flames_toward_horizontal() {
    let site = site_from_text(TWO_STRATA).unwrap();
    let result = run_with_defaults(&site, site.fire_line_length()).unwrap();
    assert!(result.has_second_run);

    let angle = |run: &flammability_core::FireModelRunResult| {
        let series = run.flame_series(StratumLevel::Canopy).unwrap();
        flame::longest_flame(series).unwrap().angle()
    };
    let angle1 = angle(&result.run1);
    let angle2 = angle(&result.run2);

    // Without canopy attenuation the wind at canopy mid-height is larger,
    // so the second run's flames lean further from the vertical.
    assert!(angle2 < angle1, "run2 angle {angle2} should be below run1 angle {angle1}");
}

#[test]
fn ignition_paths_keep_their_invariants() {
    let site = site_from_text(TWO_STRATA).unwrap();
    let result = run_with_defaults(&site, site.fire_line_length()).unwrap();

    for outcome in result.run1.stratum_outcomes() {
        for path in outcome.plant_paths().iter().chain(outcome.stratum_paths()) {
            let steps: Vec<_> = path.segments().iter().map(|s| s.time_step).collect();
            assert!(steps.windows(2).all(|w| w[0] < w[1]));
            if let Some(first) = path.ignition_step() {
                assert!(path.pre_ignition().iter().all(|d| d.time_step() <= first));
            }
        }
        // Species weightings still sum to one after every transformation.
        let total: f64 = outcome.stratum().species().iter().map(|c| c.weighting).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }
}

#[test]
fn pre_heating_accumulates_up_the_column() {
    let site = site_from_text(TWO_STRATA).unwrap();
    let result = run_with_defaults(&site, site.fire_line_length()).unwrap();

    // The canopy plant run saw the surface and midstorey pre-heating
    // flames.
    let canopy = result.run1.outcome(StratumLevel::Canopy).unwrap();
    let context = canopy.plant_paths()[0].context();
    assert!(context.pre_heating_flames.len() >= 2);
    assert!(context
        .pre_heating_flames
        .iter()
        .any(|p| p.level() == Some(StratumLevel::MidStorey)));
    // Direct heating of the canopy began when the midstorey flames peaked.
    assert!(context.pre_heating_end_time.is_some());
}
