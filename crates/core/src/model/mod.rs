//! The vegetation data model: species, strata, and sites.

pub mod site;
pub mod species;
pub mod stratum;

pub use site::{Site, StratumOverlap, StratumOverlapType, Surface, Vegetation, WeatherModel};
pub use species::{LeafForm, Species, SpeciesComponent};
pub use stratum::{Stratum, StratumLevel};

/// Normalize a keyword for parsing: lowercase with whitespace and hyphens
/// removed.
pub(crate) fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}
