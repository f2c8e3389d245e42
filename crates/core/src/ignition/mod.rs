//! The ignition-path simulation: data model and state machine.

pub mod path;
pub mod simulator;

pub use path::{
    IgnitedSegment, IgnitionContext, IgnitionPath, IgnitionRunType, PreIgnitionData,
};
pub use simulator::{
    DefaultIgnitionPathModel, DefaultPlantFlameModel, IgnitionPathModel, PlantFlameModel,
};
