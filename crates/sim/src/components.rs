use std::collections::VecDeque;

use bevy::prelude::*;
use nav::model::Vec3;

/// Client-assigned drone identifier; also the deterministic sort key for
/// planning and emission order.
#[derive(Component, Debug, Clone)]
pub struct DroneId(pub String);

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Position(pub Vec3);

/// Realized velocity, written by the integrator each tick.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Velocity(pub Vec3);

/// Waypoint queue the active planner writes and the integrator consumes.
/// Empty means no plan, or target reached.
#[derive(Component, Debug, Clone, Default)]
pub struct FlightPath {
    pub waypoints: VecDeque<Vec3>,
}

/// High-level goal; `None` parks the drone.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct NavTarget(pub Option<Vec3>);
