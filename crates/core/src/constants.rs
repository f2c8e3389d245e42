//! Model constants.
//!
//! Every tuning constant of the fire model lives here so that a change to
//! the computation interval or to a flame temperature is made in exactly one
//! place. All values are SI unless noted.

/// Time step of the ignition simulation (s).
pub const COMPUTATION_TIME_INTERVAL: f64 = 1.0;

/// Number of equal subdivisions tested along a candidate ignition path.
pub const NUM_PENETRATION_STEPS: usize = 10;

/// Hard bound on simulation steps after the first ignition.
pub const MAX_IGNITION_TIME_STEPS: usize = 20;

/// Width of the artificial crown used for stratum runs (m). Wide enough
/// that fire spread within a stratum is never cut short by the far edge.
pub const STRATUM_BIG_CROWN_WIDTH: f64 = 100.0;

/// Flame residence time used for canopy segments beyond the canopy heating
/// distance (s), where fuel has not been pre-heated to sustain full
/// residence.
pub const REDUCED_CANOPY_FLAME_RESIDENCE_TIME: f64 = 5.0;

/// Multiplier applied to ignition delay time for grass-like species.
pub const GRASS_IDT_REDUCTION: f64 = 0.5;

/// Temperature increase over ambient within a grass flame (°C).
pub const GRASS_FLAME_DELTA_TEMPERATURE: f64 = 750.0;

/// Temperature increase over ambient within a woody-fuel flame (°C).
pub const MAIN_FLAME_DELTA_TEMPERATURE: f64 = 950.0;

/// Minimum plume temperature for a lower flame to count as heating the
/// canopy (°C).
pub const MIN_TEMP_FOR_CANOPY_HEATING: f64 = 100.0;

/// Gravitational acceleration (m/s²), used by the flame-angle tilt model.
pub const GRAVITY: f64 = 9.81;

/// Height of the incident wind measurement (m).
pub const WIND_REFERENCE_HEIGHT: f64 = 10.0;

/// Aerodynamic roughness length of vegetated terrain (m).
pub const ROUGHNESS_LENGTH: f64 = 0.3;

/// Extinction coefficient of wind attenuation per unit leaf area index.
pub const WIND_EXTINCTION_COEF: f64 = 0.6;

/// Height at which the surface fire feels the wind (m).
pub const SURFACE_WIND_HEIGHT: f64 = 1.5;

/// Heat yield of dry fine fuel (kJ/kg), Byram's intensity calculation.
pub const HEAT_OF_COMBUSTION: f64 = 18_600.0;

/// Grass classification thresholds: a near-surface species counts as grass
/// when mostly dead and thinner-leaved than this (m).
pub const GRASS_LEAF_THICKNESS: f64 = 0.000_35;
pub const GRASS_PROP_DEAD: f64 = 0.5;
