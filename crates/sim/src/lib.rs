pub mod city;
pub mod components;
pub mod core;
pub mod messages;
pub mod systems;

pub use crate::core::{
    attach_channels, ActivePlanner, CityModel, ControlChannel, SessionIo, SimParams, SimSet,
    SimState, SimulationPlugin, StateChannel, TickRate,
};
