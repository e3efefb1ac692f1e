//! Engine wiring: resources, states, system sets, channel plumbing.
//!
//! The session model is single-threaded cooperative: one `App::update()` is
//! one tick. Control messages drain at the head of the tick, the planner runs
//! synchronously inside it, and the state snapshot leaves before the counter
//! advances. Wall-clock pacing is the session driver's problem.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;

use bevy::prelude::*;

use nav::model::World as WorldModel;
use nav::params::Params;
use nav::planner::registry;
use nav::planner::straight_line::StraightLine;
use nav::planner::Planner;
use utils::tick::TickCount;

use crate::messages::{ClientMsg, ServerMsg};
use crate::systems;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum SimState {
    /// Boot state; control messages are still applied.
    #[default]
    Paused,
    Running,
}

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum SimSet {
    Control,
    Plan,
    Integrate,
    Emit,
    Tick,
}

/// The world the planners rasterize. Replaced atomically by `set_world`.
#[derive(Resource, Debug, Clone, Default)]
pub struct CityModel(pub WorldModel);

/// Engine + planner parameter map (`set_params` merges into it).
#[derive(Resource, Default)]
pub struct SimParams(pub Params);

/// The planner instance currently serving `plan_paths`.
#[derive(Resource)]
pub struct ActivePlanner(pub Box<dyn Planner>);

impl Default for ActivePlanner {
    fn default() -> Self {
        // Boot default mirrors the registry's cheapest entry.
        Self(registry::build(StraightLine::NAME).expect("default planner is registered"))
    }
}

/// Integration rate in Hz; `dt = 1 / hz`.
#[derive(Resource, Debug, Clone, Copy)]
pub struct TickRate(pub u32);

impl Default for TickRate {
    fn default() -> Self {
        Self(20)
    }
}

/// Control ingress. The mutex only serializes the engine against itself; the
/// transport side holds the matching `Sender`.
#[derive(Resource)]
pub struct ControlChannel(pub Mutex<Receiver<ClientMsg>>);

/// State egress toward the session layer.
#[derive(Resource, Clone)]
pub struct StateChannel(pub Sender<ServerMsg>);

/// The transport-facing ends of a session's channel pair.
pub struct SessionIo {
    pub control_tx: Sender<ClientMsg>,
    pub state_rx: Receiver<ServerMsg>,
}

/// Wire a fresh control/state channel pair into the app and hand back the
/// far ends.
pub fn attach_channels(app: &mut App) -> SessionIo {
    let (control_tx, control_rx) = channel();
    let (state_tx, state_rx) = channel();
    app.insert_resource(ControlChannel(Mutex::new(control_rx)));
    app.insert_resource(StateChannel(state_tx));
    SessionIo { control_tx, state_rx }
}

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<SimState>();

        app.init_resource::<CityModel>();
        app.init_resource::<SimParams>();
        app.init_resource::<ActivePlanner>();
        app.init_resource::<TickRate>();
        app.init_resource::<TickCount>();

        app.configure_sets(
            Update,
            (SimSet::Control, SimSet::Plan, SimSet::Integrate, SimSet::Emit, SimSet::Tick)
                .chain(),
        );

        app.add_systems(Startup, systems::emit_meta);
        app.add_systems(Update, systems::apply_control.in_set(SimSet::Control));
        app.add_systems(
            Update,
            (
                systems::plan_paths.in_set(SimSet::Plan),
                systems::integrate.in_set(SimSet::Integrate),
                systems::emit_state.in_set(SimSet::Emit),
                systems::advance_tick.in_set(SimSet::Tick),
            )
                .run_if(in_state(SimState::Running)),
        );
    }
}
