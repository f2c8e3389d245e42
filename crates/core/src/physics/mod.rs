//! Fire physics: flames, plumes, wind, and the surface fire.

pub mod flame;
pub mod pre_heating;
pub mod surface;
pub mod wind;

pub use flame::Flame;
pub use pre_heating::PreHeatingFlame;
pub use surface::SurfaceParams;
