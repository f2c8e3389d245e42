//! Construction factories: parameter file to validated [`Site`].
//!
//! All unit conversion happens here: wind arrives in km/h, fuel load in
//! tonnes per hectare; everything else is SI already.

use crate::core_types::crown::CrownPoly;
use crate::error::{ModelError, Result};
use crate::model::site::{
    Site, StratumOverlap, StratumOverlapType, Surface, Vegetation, WeatherModel,
};
use crate::model::species::{LeafForm, Species, SpeciesComponent};
use crate::model::stratum::{Stratum, StratumLevel};
use crate::params::fallback::{FallbackProvider, ValueAssignments};
use crate::params::loader::{ParamBlock, RawParams, RawStratum};

/// Build a validated site from parsed parameters.
pub fn build_site(raw: &RawParams) -> Result<Site> {
    let fallback = FallbackProvider::standard();
    let site_values = ValueAssignments::new(&raw.site, &fallback);

    let surface = Surface::new(
        site_values.f64("slope")?,
        site_values.f64("surface dead fuel moisture content")?,
        site_values.f64("fuel load tonnes per hectare")? * 0.1,
        site_values.f64("mean fuel diameter")?,
        site_values.f64("mean fineness leaves")?,
    )?;
    let weather = WeatherModel::constant_from_kmh(
        site_values.f64("air temperature")?,
        site_values.f64("incident wind speed")?,
    );
    let fire_line_length = site_values.f64("fireline length")?;

    let strata = raw
        .strata
        .iter()
        .map(|s| build_stratum(s, &fallback))
        .collect::<Result<Vec<_>>>()?;
    let overlaps = build_overlaps(&raw.site)?;

    Site::new(Vegetation::new(strata, overlaps)?, surface, weather, fire_line_length)
}

fn build_stratum(raw: &RawStratum, fallback: &FallbackProvider) -> Result<Stratum> {
    let values = ValueAssignments::new(&raw.params, fallback);
    let level = StratumLevel::parse(values.str("level")?)?;
    let plant_separation = values.f64("plant separation")?;
    let species = raw
        .species
        .iter()
        .map(|block| build_species_component(block, fallback))
        .collect::<Result<Vec<_>>>()?;
    Stratum::new(level, species, plant_separation)
}

fn build_species_component(
    block: &ParamBlock,
    fallback: &FallbackProvider,
) -> Result<SpeciesComponent> {
    let values = ValueAssignments::new(block, fallback);
    let crown = CrownPoly::hexagonal(
        values.f64("hc")?,
        values.f64("he")?,
        values.f64("ht")?,
        values.f64("hp")?,
        values.f64("w")?,
    )?;
    let species = Species::new(
        values.str("name")?,
        crown,
        values.f64("live leaf moisture")?,
        values.f64("dead leaf moisture")?,
        values.f64("proportion dead")?,
        LeafForm::parse(values.str("leaf form")?)?,
        values.f64("leaf thickness")?,
        values.f64("leaf width")?,
        values.f64("leaf length")?,
        values.f64("leaf separation")?,
        values.f64("stem order")?,
        values.f64("clump diameter")?,
        values.f64("clump separation")?,
        values.f64_opt("ignition temperature")?,
        values.f64_opt("silica free ash proportion")?,
    )?;
    SpeciesComponent::new(species, values.f64("composition")?)
}

/// `overlapping = lower, upper, kind` lines.
fn build_overlaps(site: &ParamBlock) -> Result<Vec<StratumOverlap>> {
    site.all("overlapping")
        .iter()
        .map(|(line, values)| {
            let [lower, upper, kind] = values.as_slice() else {
                return Err(ModelError::Params {
                    line: *line,
                    message: format!(
                        "`overlapping` needs `lower, upper, kind`, got {} values",
                        values.len()
                    ),
                });
            };
            StratumOverlap::new(
                StratumLevel::parse(lower)?,
                StratumLevel::parse(upper)?,
                StratumOverlapType::parse(kind)?,
            )
        })
        .collect()
}

/// Parse a parameter file's text straight to a site.
pub fn site_from_text(text: &str) -> Result<Site> {
    build_site(&crate::params::loader::parse(text)?)
}
