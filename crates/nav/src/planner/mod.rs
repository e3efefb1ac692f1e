use std::collections::VecDeque;

use crate::model::{Vec3, World};
use crate::params::Params;

pub mod bandit;
pub mod grid_astar;
pub mod registry;
pub mod straight_line;

/// Mutable planner-side view of one drone: position and target are read,
/// the waypoint queue is written in place.
pub struct DroneNav<'a> {
    pub id: &'a str,
    pub pos: Vec3,
    pub target: Option<Vec3>,
    pub path: &'a mut VecDeque<Vec3>,
}

/// Everything a planning pass sees. The world and params are immutable for
/// the duration of the pass; drones are visited in the order given.
pub struct PlanContext<'a, 'w> {
    pub world: &'w World,
    pub params: &'w Params,
    pub drones: Vec<DroneNav<'a>>,
}

/// A path-planning algorithm. Implementations keep their own per-session
/// state (grid caches, replan bookkeeping); all per-plan search state is
/// discarded before `plan_paths` returns.
pub trait Planner: Send + Sync {
    fn name(&self) -> &'static str;

    /// Replan whichever drones need it, mutating their waypoint queues.
    /// Must be deterministic for identical inputs and idempotent across
    /// repeated calls with identical state.
    fn plan_paths(&mut self, ctx: &mut PlanContext<'_, '_>);

    /// The world was replaced: drop any cached rasterization so the next
    /// pass rebuilds against the new obstacles.
    fn invalidate(&mut self) {}
}
