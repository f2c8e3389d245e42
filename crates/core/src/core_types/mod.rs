//! Core geometric types and numeric utilities.

pub mod crown;
pub mod geometry;
pub mod numerics;

pub use crown::CrownPoly;
pub use geometry::{coord, Coord, Line, Ray, Segment};
