//! Planning core for the nuee simulator.
//!
//! A [`grid::GridCache`] turns an immutable [`model::World`] of axis-aligned
//! buildings into a blocked mask plus an L1 clearance field. Planners consume
//! that cache through the [`planner::Planner`] trait and write waypoint
//! sequences back into each drone. The interesting one is
//! [`planner::bandit::BanditMhaStar`]: four best-first queues (one admissible
//! anchor, three inadmissible hints) scheduled by a UCB1 bandit on a progress
//! reward, with clearance-modulated edge times.

pub mod error;
pub mod grid;
pub mod model;
pub mod params;
pub mod planner;

pub use error::NavError;
pub use model::{Building, Drone, Vec3, World};
pub use params::Params;
