//! Procedural city synthesis.
//!
//! Lays buildings out on a Manhattan-style lattice of lots separated by
//! roads, with jittered footprints and level-derived heights. Deterministic
//! for a given seed, so a session can be reproduced from its CLI invocation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use nav::model::{Building, Vec3, World};

pub struct CityConfig {
    pub width: f64,
    pub height: f64,
    /// Lot side length; building footprints jitter inside it.
    pub block: f64,
    /// Road width between lots.
    pub road: f64,
    pub max_levels: u32,
    pub floor_height_m: f64,
    /// Probability that a lot actually holds a building.
    pub fill: f64,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 1000.0,
            block: 60.0,
            road: 20.0,
            max_levels: 12,
            floor_height_m: 3.0,
            fill: 0.85,
        }
    }
}

pub fn synth_city(seed: u64, cfg: &CityConfig) -> World {
    let mut rng = StdRng::seed_from_u64(seed);
    let pitch = cfg.block + cfg.road;
    let mut obstacles = Vec::new();
    let mut max_h = 0.0f64;

    let mut cy = cfg.road + cfg.block * 0.5;
    while cy + cfg.block * 0.5 <= cfg.height {
        let mut cx = cfg.road + cfg.block * 0.5;
        while cx + cfg.block * 0.5 <= cfg.width {
            if rng.gen::<f64>() < cfg.fill {
                let w = rng.gen_range(0.35..0.85) * cfg.block;
                let d = rng.gen_range(0.35..0.85) * cfg.block;
                let levels = rng.gen_range(1..=cfg.max_levels.max(1));
                // Even single-storey structures get a 6 m planning height.
                let h = (f64::from(levels) * cfg.floor_height_m).max(6.0);
                obstacles.push(Building {
                    id: format!("bldg-{:04}", obstacles.len()),
                    center: Vec3::new(cx, cy, h * 0.5),
                    size: Vec3::new(w, d, h),
                });
                max_h = max_h.max(h);
            }
            cx += pitch;
        }
        cy += pitch;
    }

    info!(buildings = obstacles.len(), ceiling = max_h + 30.0, "synthesized city");
    World { size: (cfg.width, cfg.height, max_h + 30.0), obstacles }
}
