//! Control-plane and state-plane message set.
//!
//! The transport that carries these is not the engine's business; whatever
//! session layer exists feeds `ClientMsg` values in through the control
//! channel and drains `ServerMsg` values from the state channel.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use nav::model::{Drone, World};

/// Inbound control messages, observed strictly between ticks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    SetWorld { world: World },
    SetAlgorithm { algorithm: String },
    SetParams { params: Map<String, Value> },
    SetDrones { drones: Vec<Drone> },
    TickRate { tick_rate_hz: u32 },
    Start,
    Pause,
    Reset,
}

/// Outbound session messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    State { tick: u64, drones: Vec<Drone> },
    Meta { algorithms: Vec<String>, world: World },
    Error { message: String },
}
