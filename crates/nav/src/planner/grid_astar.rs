//! Plain best-first grid A*: Manhattan heuristic, uniform step costs, no
//! clearance model. Shares the bandit planner's grid cache and facade
//! contract but replans on a tighter 10-tick cadence.

use std::collections::{HashMap, VecDeque};

use pathfinding::prelude::astar;
use tracing::debug;

use crate::grid::{Coord, GridCache};
use crate::model::Vec3;
use crate::planner::{PlanContext, Planner};

// Integer step costs keep the search ordering total: 10 per axial move,
// 14 (~10 * sqrt(2)) per diagonal.
const COST_AXIAL: u32 = 10;
const COST_DIAGONAL: u32 = 14;

const N4: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const N8: [(i32, i32); 8] =
    [(-1, 0), (1, 0), (0, -1), (0, 1), (-1, -1), (1, -1), (-1, 1), (1, 1)];

pub struct GridAStar {
    grid: Option<GridCache>,
    replan_every: u64,
    last_tick: HashMap<String, u64>,
    last_goal: HashMap<String, (f64, f64)>,
}

impl Default for GridAStar {
    fn default() -> Self {
        Self { grid: None, replan_every: 10, last_tick: HashMap::new(), last_goal: HashMap::new() }
    }
}

impl GridAStar {
    pub const NAME: &'static str = "a_star_grid";

    fn plan_one(grid: &GridCache, start: Vec3, goal: Vec3, z: f64, diagonal: bool) -> VecDeque<Vec3> {
        let s = grid.from_world(start.x, start.y);
        let mut g = grid.from_world(goal.x, goal.y);
        if grid.is_blocked(g) {
            g = grid.nearest_free(g);
        }

        let neigh: &[(i32, i32)] = if diagonal { &N8 } else { &N4 };
        let result = astar(
            &s,
            |&(x, y)| {
                neigh
                    .iter()
                    .filter_map(move |&(dx, dy)| {
                        let n = (x + dx, y + dy);
                        if grid.is_blocked(n) {
                            return None;
                        }
                        let cost = if dx == 0 || dy == 0 { COST_AXIAL } else { COST_DIAGONAL };
                        Some((n, cost))
                    })
                    .collect::<Vec<_>>()
            },
            |&(x, y)| ((x - g.0).abs() + (y - g.1).abs()) as u32 * COST_AXIAL,
            |&n| n == g,
        );

        match result {
            Some((cells, _)) => cells.into_iter().map(|c| grid.to_world(c, z)).collect(),
            None => {
                // No route on the raster: aim straight at the goal and let
                // the next replan try again.
                debug!("grid A* found no route, emitting direct waypoint");
                VecDeque::from([Vec3::new(goal.x, goal.y, z)])
            }
        }
    }
}

impl Planner for GridAStar {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn plan_paths(&mut self, ctx: &mut PlanContext<'_, '_>) {
        let p = ctx.params;
        let cell = p.f64_pos("grid_cell_m", 10.0);
        let inflate = p.f64("clearance_m", 6.0);
        let cruise_alt = p.f64("cruise_alt_m", 60.0);
        let diagonal = p.bool("allow_diagonal", true);

        if self.grid.as_ref().map_or(true, |g| g.cell != cell) {
            self.grid = Some(GridCache::build_degraded(ctx.world, cell, inflate));
        }
        let grid = self.grid.take().expect("grid built above");

        let tick = p.tick;
        for d in ctx.drones.iter_mut() {
            let Some(target) = d.target else { continue };
            let goal_xy = (target.x, target.y);
            let need = !self.last_tick.contains_key(d.id)
                || self.last_goal.get(d.id) != Some(&goal_xy)
                || tick.saturating_sub(self.last_tick[d.id]) >= self.replan_every
                || d.path.is_empty();
            if !need {
                continue;
            }
            *d.path = Self::plan_one(&grid, d.pos, target, cruise_alt, diagonal);
            self.last_goal.insert(d.id.to_string(), goal_xy);
            self.last_tick.insert(d.id.to_string(), tick);
        }
        self.grid = Some(grid);
    }

    fn invalidate(&mut self) {
        self.grid = None;
        self.last_tick.clear();
        self.last_goal.clear();
    }
}
