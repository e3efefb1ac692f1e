use bevy::prelude::*;
use tracing::{debug, info, warn};

use nav::model::{Drone, Vec3};
use nav::planner::{registry, DroneNav, PlanContext};
use utils::tick::TickCount;

use crate::components::{DroneId, FlightPath, NavTarget, Position, Velocity};
use crate::core::{
    ActivePlanner, CityModel, ControlChannel, SimParams, SimState, StateChannel, TickRate,
};
use crate::messages::{ClientMsg, ServerMsg};

/// Waypoints closer than this are treated as reached.
const WAYPOINT_EPS_M: f64 = 1e-3;

fn spawn_fleet(commands: &mut Commands, drones: Vec<Drone>) {
    for d in drones {
        commands.spawn((
            DroneId(d.id),
            Position(d.pos),
            Velocity(d.vel),
            FlightPath { waypoints: d.path },
            NavTarget(d.target),
        ));
    }
}

/// Drain the control channel and apply every message. Runs unconditionally at
/// the head of the tick, so control is observed strictly between ticks.
#[allow(clippy::too_many_arguments)]
pub fn apply_control(
    mut commands: Commands,
    control: Res<ControlChannel>,
    state_tx: Res<StateChannel>,
    mut city: ResMut<CityModel>,
    mut params: ResMut<SimParams>,
    mut planner: ResMut<ActivePlanner>,
    mut tick_rate: ResMut<TickRate>,
    mut tick: ResMut<TickCount>,
    mut next_state: ResMut<NextState<SimState>>,
    fleet: Query<Entity, With<DroneId>>,
) {
    let Ok(rx) = control.0.lock() else {
        return;
    };
    while let Ok(msg) = rx.try_recv() {
        match msg {
            ClientMsg::SetWorld { world } => {
                info!(buildings = world.obstacles.len(), "world replaced");
                city.0 = world;
                planner.0.invalidate();
            }
            ClientMsg::SetAlgorithm { algorithm } => match registry::build(&algorithm) {
                Ok(p) => {
                    info!(algorithm = algorithm.as_str(), "planner replaced");
                    planner.0 = p;
                }
                Err(e) => {
                    warn!("{e}");
                    let _ = state_tx.0.send(ServerMsg::Error { message: e.to_string() });
                }
            },
            ClientMsg::SetParams { params: patch } => {
                debug!(keys = patch.len(), "params merged");
                params.0.merge(&patch);
            }
            ClientMsg::SetDrones { drones } => {
                for e in fleet.iter() {
                    commands.entity(e).despawn();
                }
                info!(count = drones.len(), "fleet replaced");
                spawn_fleet(&mut commands, drones);
            }
            ClientMsg::TickRate { tick_rate_hz } => {
                tick_rate.0 = tick_rate_hz.max(1);
            }
            ClientMsg::Start => next_state.set(SimState::Running),
            ClientMsg::Pause => next_state.set(SimState::Paused),
            ClientMsg::Reset => {
                // Whatever the last pass planned is discarded with the fleet.
                tick.tick = 0;
                for e in fleet.iter() {
                    commands.entity(e).despawn();
                }
                next_state.set(SimState::Paused);
                info!("session reset");
            }
        }
    }
}

/// Hand the fleet to the active planner. Drones are visited in id order so a
/// pass is deterministic regardless of ECS iteration order.
pub fn plan_paths(
    city: Res<CityModel>,
    mut params: ResMut<SimParams>,
    tick: Res<TickCount>,
    mut planner: ResMut<ActivePlanner>,
    mut query: Query<(&DroneId, &Position, &NavTarget, &mut FlightPath)>,
) {
    params.0.tick = tick.tick;

    let mut rows: Vec<_> = query.iter_mut().collect();
    rows.sort_by(|a, b| a.0 .0.cmp(&b.0 .0));

    let drones: Vec<DroneNav> = rows
        .into_iter()
        .map(|(id, pos, target, path)| DroneNav {
            id: id.0.as_str(),
            pos: pos.0,
            target: target.0,
            path: &mut path.into_inner().waypoints,
        })
        .collect();

    let mut ctx = PlanContext { world: &city.0, params: &params.0, drones };
    planner.0.plan_paths(&mut ctx);
}

/// Advance every drone toward its next waypoint at `params.speed`. A waypoint
/// within [`WAYPOINT_EPS_M`] is snapped to and popped (one per tick).
pub fn integrate(
    params: Res<SimParams>,
    rate: Res<TickRate>,
    mut query: Query<(&mut Position, &mut Velocity, &mut FlightPath)>,
) {
    let dt = 1.0 / f64::from(rate.0.max(1));
    let speed = params.0.f64_pos("speed", 30.0);

    for (mut pos, mut vel, mut path) in query.iter_mut() {
        let Some(&wp) = path.waypoints.front() else {
            vel.0 = Vec3::ZERO;
            continue;
        };
        let to = wp - pos.0;
        let dist = to.length();
        if dist < WAYPOINT_EPS_M {
            pos.0 = wp;
            path.waypoints.pop_front();
            vel.0 = Vec3::ZERO;
            continue;
        }
        let step = (speed * dt).min(dist);
        let dir = to * (1.0 / dist);
        pos.0 = pos.0 + dir * step;
        vel.0 = dir * (step / dt);
    }
}

/// Emit the `{tick, drones}` snapshot for this tick.
pub fn emit_state(
    tick: Res<TickCount>,
    state_tx: Res<StateChannel>,
    query: Query<(&DroneId, &Position, &Velocity, &FlightPath, &NavTarget)>,
) {
    let mut drones: Vec<Drone> = query
        .iter()
        .map(|(id, pos, vel, path, target)| Drone {
            id: id.0.clone(),
            pos: pos.0,
            vel: vel.0,
            path: path.waypoints.clone(),
            target: target.0,
        })
        .collect();
    drones.sort_by(|a, b| a.id.cmp(&b.id));

    if state_tx.0.send(ServerMsg::State { tick: tick.tick, drones }).is_err() {
        debug!("state receiver dropped");
    }
}

pub fn advance_tick(mut tick: ResMut<TickCount>) {
    tick.tick += 1;
}

/// One-shot session greeting: the algorithm catalogue and the boot world,
/// mirroring what a client expects on connect. Quietly skipped when no state
/// channel is attached.
pub fn emit_meta(state_tx: Option<Res<StateChannel>>, city: Res<CityModel>) {
    let Some(tx) = state_tx else { return };
    let algorithms = registry::algorithms().into_iter().map(String::from).collect();
    let _ = tx.0.send(ServerMsg::Meta { algorithms, world: city.0.clone() });
}
