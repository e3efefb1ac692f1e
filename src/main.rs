//! Headless demo session: synthesize (or load) a city, seed a drone ring,
//! and drive the engine for a fixed number of ticks through the same control
//! channel a remote client would use. Fast-forwards as quickly as the CPU
//! allows; wall-clock pacing belongs to whatever transport fronts a session.

use std::fs;
use std::path::PathBuf;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use clap::Parser;
use tracing::{info, warn};

use nav::model::{Drone, Vec3, World as WorldModel};
use nav::planner::registry;
use sim::city::{synth_city, CityConfig};
use sim::messages::{ClientMsg, ServerMsg};
use sim::SimulationPlugin;

#[derive(Parser)]
#[command(name = "nuee", about = "Headless drone fleet simulator")]
struct Opt {
    /// World description JSON; a city is synthesized when omitted
    #[clap(long)]
    world: Option<PathBuf>,
    #[clap(long, default_value = "bandit_mha_star")]
    algorithm: String,
    #[clap(short, long, default_value_t = 8)]
    drones: usize,
    #[clap(short, long, default_value_t = 240)]
    ticks: u64,
    #[clap(long, default_value_t = 20)]
    tick_rate: u32,
    #[clap(short, long, default_value_t = 7)]
    seed: u64,
    /// Side length of the synthesized city in meters
    #[clap(long, default_value_t = 1000.0)]
    world_size: f64,
    /// Extra engine/planner params as inline JSON, e.g. '{"neighbors8": true}'
    #[clap(short, long)]
    params: Option<String>,
    #[clap(long)]
    list_algorithms: bool,
    #[clap(long)]
    log_suffix: Option<String>,
}

/// Ring fleet: drones on a circle around the city center, each targeting the
/// diametrically opposite point, so every route crosses downtown.
fn seed_fleet(world: &WorldModel, count: usize) -> Vec<Drone> {
    let (w, h, _) = world.size;
    let center = Vec3::new(w * 0.5, h * 0.5, 0.0);
    let radius = 0.45 * w.min(h);
    (0..count)
        .map(|i| {
            let angle = i as f64 / count.max(1) as f64 * std::f64::consts::TAU;
            let offset = Vec3::new(radius * angle.cos(), radius * angle.sin(), 0.0);
            Drone {
                id: format!("drone-{i:02}"),
                pos: center + offset,
                vel: Vec3::ZERO,
                path: Default::default(),
                target: Some(center + offset * -1.0),
            }
        })
        .collect()
}

fn main() {
    let opt = Opt::parse();

    if opt.list_algorithms {
        for name in registry::algorithms() {
            println!("{name}");
        }
        return;
    }

    let _guard = utils::logs::setup_logging(opt.log_suffix.clone()).expect("logging setup");

    let world: WorldModel = match &opt.world {
        Some(path) => {
            let raw = fs::read_to_string(path).expect("readable world file");
            serde_json::from_str(&raw).expect("valid world JSON")
        }
        None => synth_city(
            opt.seed,
            &CityConfig { width: opt.world_size, height: opt.world_size, ..Default::default() },
        ),
    };
    info!(buildings = world.obstacles.len(), size = ?world.size, "world ready");

    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin, SimulationPlugin));
    let io = sim::attach_channels(&mut app);

    let tx = &io.control_tx;
    tx.send(ClientMsg::SetWorld { world: world.clone() }).expect("control channel open");
    tx.send(ClientMsg::SetAlgorithm { algorithm: opt.algorithm.clone() }).expect("control channel open");
    if let Some(raw) = &opt.params {
        match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(raw) {
            Ok(map) => {
                tx.send(ClientMsg::SetParams { params: map }).expect("control channel open")
            }
            Err(e) => warn!("ignoring malformed --params: {e}"),
        }
    }
    tx.send(ClientMsg::TickRate { tick_rate_hz: opt.tick_rate }).expect("control channel open");
    tx.send(ClientMsg::SetDrones { drones: seed_fleet(&world, opt.drones) })
        .expect("control channel open");
    tx.send(ClientMsg::Start).expect("control channel open");

    // One update to absorb the control burst; ticking begins on the next.
    app.update();

    let report_every = (opt.ticks / 8).max(1);
    let mut last_state: Option<(u64, Vec<Drone>)> = None;
    for _ in 0..opt.ticks {
        app.update();
        while let Ok(msg) = io.state_rx.try_recv() {
            match msg {
                ServerMsg::State { tick, drones } => {
                    if tick % report_every == 0 {
                        let en_route = drones.iter().filter(|d| !d.path.is_empty()).count();
                        info!(tick, en_route, "tick");
                    }
                    last_state = Some((tick, drones));
                }
                ServerMsg::Error { message } => warn!("engine error: {message}"),
                ServerMsg::Meta { .. } => {}
            }
        }
    }

    let Some((tick, drones)) = last_state else {
        warn!("session produced no state");
        return;
    };
    info!(tick, "final state");
    for d in &drones {
        let dist_to_target = d
            .target
            .map(|t| (t.x - d.pos.x).hypot(t.y - d.pos.y))
            .unwrap_or(0.0);
        info!(
            id = d.id.as_str(),
            x = d.pos.x,
            y = d.pos.y,
            dist_to_target,
            waypoints = d.path.len(),
            "drone"
        );
    }
}
