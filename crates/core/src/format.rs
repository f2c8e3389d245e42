//! Plain-text report of a fire model result.

use std::fmt::Write;

use crate::ignition::path::{IgnitionPath, PreIgnitionData};
use crate::physics::flame::{self, Flame};
use crate::results::outcome::{FireModelResult, FireModelRunResult};

/// Render the full result, with a "Second run" section when one was
/// performed.
pub fn format_result(result: &FireModelResult) -> String {
    let mut out = String::new();
    format_run(&mut out, &result.run1);
    if result.has_second_run {
        out.push_str("\n=== Second run (canopy excluded from wind) ===\n\n");
        format_run(&mut out, &result.run2);
    }
    out
}

fn format_run(out: &mut String, run: &FireModelRunResult) {
    let surface = run.surface_params();
    let _ = writeln!(out, "Surface fire:");
    let _ = writeln!(out, "  wind speed          {:8.2} m/s", surface.wind_speed());
    let _ = writeln!(out, "  rate of spread      {:8.3} m/s", surface.ros());
    let _ = writeln!(out, "  flame length        {:8.2} m", surface.flame_length());
    let _ = writeln!(out, "  flame angle         {:8.1}°", surface.flame_angle().to_degrees());
    let _ = writeln!(out, "  residence time      {:8.1} s", surface.flame_residence_time());

    for outcome in run.stratum_outcomes() {
        let _ = writeln!(out, "\nStratum: {}", outcome.level());
        match run.flame_series(outcome.level()) {
            Some(series) => format_series(out, series),
            None => {
                let _ = writeln!(out, "  no ignition");
            }
        }
        for path in outcome.plant_paths() {
            format_path(out, path);
        }
    }

    if !run.combined_flames().is_empty() {
        let _ = writeln!(out, "\nCombined flames (canopy-connected strata):");
        format_series(out, run.combined_flames());
    }
}

fn format_series(out: &mut String, series: &[Flame]) {
    let Some(longest) = flame::longest_flame(series) else { return };
    let tip = longest.tip();
    let _ = writeln!(out, "  flames              {:8}", series.len());
    let _ = writeln!(out, "  max flame length    {:8.2} m", longest.flame_length());
    let _ = writeln!(out, "  flame angle         {:8.1}°", longest.angle().to_degrees());
    let _ = writeln!(out, "  flame height        {:8.2} m", tip.y);
}

fn format_path(out: &mut String, path: &IgnitionPath) {
    let species = &path.species_component().species;
    let _ = writeln!(
        out,
        "  path: {} ({} segments{})",
        species.name(),
        path.segments().len(),
        match path.ignition_time() {
            Some(t) => format!(", ignition at {t:.0} s"),
            None => String::new(),
        }
    );
    for segment in path.segments() {
        let _ = writeln!(
            out,
            "    t={:<3} ({:6.2}, {:6.2}) -> ({:6.2}, {:6.2})  len {:5.2} m",
            segment.time_step,
            segment.start.x,
            segment.start.y,
            segment.end.x,
            segment.end.y,
            segment.length()
        );
    }
    if !path.pre_ignition().is_empty() {
        // One drying row per flame per step is verbose; report the driest.
        let hottest = path
            .pre_ignition()
            .iter()
            .map(PreIgnitionData::drying_temperature)
            .fold(f64::NEG_INFINITY, f64::max);
        let driest = path
            .pre_ignition()
            .iter()
            .map(PreIgnitionData::drying_factor)
            .fold(f64::INFINITY, f64::min);
        let _ = writeln!(
            out,
            "    pre-ignition: {} drying records, max temp {:.0} °C, min factor {:.3}",
            path.pre_ignition().len(),
            hottest,
            driest
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::builder::site_from_text;
    use crate::runner::run_with_defaults;

    const CANOPY_ONLY: &str = "\
fireline length = 100
incident wind speed = 10
air temperature = 29.2
surface dead fuel moisture content = 0.07
fuel load tonnes per hectare = 17.3

begin stratum
level = canopy
plant separation = 8.5
begin species
composition = 100
name = Eucalyptus delegatensis
live leaf moisture = 1.0
proportion dead = 0.1
leaf form = flat
leaf thickness = 0.0004
leaf width = 0.02
leaf length = 0.08
leaf separation = 0.01
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

    #[test]
    fn test_report_sections() {
        let site = site_from_text(CANOPY_ONLY).unwrap();
        let result = run_with_defaults(&site, site.fire_line_length()).unwrap();
        let report = format_result(&result);
        assert!(report.contains("Surface fire:"));
        assert!(report.contains("Stratum: canopy"));
        // No second run without canopy flames.
        assert!(!result.has_second_run);
        assert!(!report.contains("Second run"));
    }
}
