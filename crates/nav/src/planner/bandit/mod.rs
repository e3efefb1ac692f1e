//! Multi-queue weighted A* scheduled by a UCB1 bandit.
//!
//! Four open sets race over one shared g-score map: queue 0 orders by the
//! admissible anchor f-value and guarantees completeness plus the bounded
//! suboptimality early-out; queues 1..3 are inadmissible hints (clearance
//! time, ALT landmarks, bearing bias). Every committed expansion the bandit
//! picks which queue pops next, fed by a progress reward, with a forced
//! anchor pop every `anchor_period` expansions.

use std::collections::{HashMap, HashSet, VecDeque};
use std::f64::consts::SQRT_2;

use tracing::debug;

use crate::grid::{Coord, GridCache};
use crate::model::Vec3;
use crate::params::Params;
use crate::planner::{PlanContext, Planner};

pub mod heuristics;
pub mod queues;
pub mod ucb;

use heuristics::{HeuristicPack, SpeedModel, QUEUES};
use queues::OpenSet;
use ucb::Ucb1;

const N4: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const N8: [(i32, i32); 8] =
    [(-1, 0), (1, 0), (0, -1), (0, 1), (-1, -1), (1, -1), (-1, 1), (1, 1)];

const EPS_G: f64 = 1e-12;

/// Outcome accounting for one plan, logged at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchStats {
    pub expansions: usize,
    pub pulls: [u32; QUEUES],
    pub goal_reached: bool,
}

pub struct BanditMhaStar {
    grid: Option<GridCache>,
    replan_every: u64,
    last_tick: HashMap<String, u64>,
    last_goal: HashMap<String, (f64, f64)>,
    last_stats: Option<SearchStats>,
}

impl Default for BanditMhaStar {
    fn default() -> Self {
        Self {
            grid: None,
            replan_every: 20,
            last_tick: HashMap::new(),
            last_goal: HashMap::new(),
            last_stats: None,
        }
    }
}

impl BanditMhaStar {
    pub const NAME: &'static str = "bandit_mha_star";

    pub fn last_stats(&self) -> Option<SearchStats> {
        self.last_stats
    }

    fn plan_one(grid: &GridCache, start: Vec3, goal: Vec3, z: f64, p: &Params) -> (VecDeque<Vec3>, SearchStats) {
        let v_max = p.f64_pos("v_max", 20.0);
        let v_min = p.f64_pos("v_min", 4.0);
        let clr_k = p.f64("clr_kappa_m", 8.0);
        let samples = p.usize("edge_samples", 2);

        let neigh: &[(i32, i32)] = if p.bool("neighbors8", false) { &N8 } else { &N4 };

        let w_clear = p.f64("w_clear", 1.15);
        let w_landmark = p.f64("w_landmark", 1.0);
        let w_bearing = p.f64("w_bearing", 1.1);
        let gamma = p.f64("bearing_gamma", 0.2);
        let ucb_c = p.f64("ucb_c", 0.8);
        let anchor_period = p.usize_pos("anchor_period", 6);
        let max_expansions = p.usize_pos("max_expansions", 2500);
        let subopt_w = p.f64_pos("accept_suboptimal_w", 1.05);

        let mut stats = SearchStats::default();

        // Both endpoints snap to the nearest free cell before anything else.
        let mut s = grid.from_world(start.x, start.y);
        let mut t = grid.from_world(goal.x, goal.y);
        if grid.is_blocked(t) {
            t = grid.nearest_free(t);
        }
        if grid.is_blocked(s) {
            s = grid.nearest_free(s);
        }
        if s == t {
            return (VecDeque::from([grid.to_world(s, z)]), stats);
        }

        let speed = SpeedModel { v_min, v_max, kappa: clr_k };
        let heur = HeuristicPack::new(grid, s, t, speed, w_clear, w_landmark, w_bearing, gamma);

        let mut g_cost: HashMap<Coord, f64> = HashMap::from([(s, 0.0)]);
        let mut parent: HashMap<Coord, Coord> = HashMap::new();
        let mut closed: HashSet<Coord> = HashSet::new();
        let mut open: [OpenSet; QUEUES] = Default::default();
        let mut seq: u64 = 0;
        for (k, set) in open.iter_mut().enumerate() {
            seq += 1;
            set.push(heur.f(k, s, 0.0), seq, s);
        }

        let mut bandit = Ucb1::new();
        let mut last_progress = heur.h_anchor(s);
        let mut goal_node: Option<Coord> = None;

        while stats.expansions < max_expansions {
            stats.expansions += 1;
            let forced_anchor = stats.expansions % anchor_period == 0;
            let avail = [
                !open[0].is_empty(),
                !open[1].is_empty(),
                !open[2].is_empty(),
                !open[3].is_empty(),
            ];
            let k = bandit.choose(forced_anchor, avail, ucb_c);

            let Some(u) = pop_valid(&mut open[k], k, &closed, &g_cost, &heur) else {
                break;
            };

            if u == t {
                goal_node = Some(u);
                stats.goal_reached = true;
                if k == 0 {
                    break;
                }
                let g_t = g_cost.get(&u).copied().unwrap_or(f64::INFINITY);
                if g_t <= subopt_w * heur.h_anchor(s) {
                    break;
                }
            }

            if !closed.insert(u) {
                continue;
            }

            let g_u = g_cost.get(&u).copied().unwrap_or(f64::INFINITY);
            for &(dx, dy) in neigh {
                let v = (u.0 + dx, u.1 + dy);
                if grid.is_blocked(v) {
                    continue;
                }
                let length = if dx == 0 || dy == 0 { grid.cell } else { SQRT_2 * grid.cell };
                let v_eff = edge_speed(grid, &speed, u, v, samples);
                let edge_time = length / v_eff.max(1e-6);
                let cand = g_u + edge_time;
                if cand + EPS_G < g_cost.get(&v).copied().unwrap_or(f64::INFINITY) {
                    g_cost.insert(v, cand);
                    parent.insert(v, u);
                    for (k2, set) in open.iter_mut().enumerate() {
                        seq += 1;
                        set.push(heur.f(k2, v, cand), seq, v);
                    }
                }
            }

            // Progress reward: any reduction of the admissible distance-to-goal
            // since the last expansion, credited to the arm that popped.
            let cur = heur.h_anchor(u);
            let reward = (last_progress - cur).max(0.0);
            last_progress = cur;
            bandit.record(k, reward);
        }

        stats.pulls = bandit.pulls;

        let goal_node = match goal_node {
            Some(n) => n,
            None if parent.contains_key(&t) => t,
            None => {
                // Hard failure: degenerate single-segment path toward the
                // goal cell; the next replan retries.
                return (VecDeque::from([grid.to_world(t, z)]), stats);
            }
        };

        if !parent.contains_key(&goal_node) && goal_node != s {
            return (
                VecDeque::from([grid.to_world(s, z), grid.to_world(goal_node, z)]),
                stats,
            );
        }

        let mut chain: Vec<Coord> = vec![];
        let mut cur = goal_node;
        while cur != s {
            chain.push(cur);
            cur = parent.get(&cur).copied().unwrap_or(s);
            if cur == s {
                chain.push(s);
                break;
            }
        }
        chain.reverse();
        (chain.into_iter().map(|c| grid.to_world(c, z)).collect(), stats)
    }
}

/// Effective speed along an edge: the worst clearance seen wins.
///
/// With `samples <= 2` only the endpoints are consulted; otherwise the edge
/// is sampled uniformly (cell-rounded) and any out-of-bounds sample forces
/// clearance zero.
fn edge_speed(grid: &GridCache, speed: &SpeedModel, u: Coord, v: Coord, samples: usize) -> f64 {
    if samples <= 2 {
        return speed.at(grid.clearance(u)).min(speed.at(grid.clearance(v)));
    }
    let mut min_clr = f64::INFINITY;
    for i in 0..samples {
        let frac = i as f64 / (samples - 1) as f64;
        let sx = (u.0 as f64 + frac * (v.0 - u.0) as f64).round() as i32;
        let sy = (u.1 as f64 + frac * (v.1 - u.1) as f64).round() as i32;
        if !grid.in_bounds((sx, sy)) {
            min_clr = 0.0;
            break;
        }
        min_clr = min_clr.min(grid.clearance((sx, sy)));
    }
    speed.at(min_clr)
}

/// Pop entries until one is still live: not closed, and its pushed key has
/// not been beaten by a later g improvement (`current f <= key + eps`).
fn pop_valid(
    open: &mut OpenSet,
    k: usize,
    closed: &HashSet<Coord>,
    g_cost: &HashMap<Coord, f64>,
    heur: &HeuristicPack<'_>,
) -> Option<Coord> {
    while let Some(e) = open.pop() {
        if closed.contains(&e.node) {
            continue;
        }
        let g = g_cost.get(&e.node).copied().unwrap_or(f64::INFINITY);
        if heur.f(k, e.node, g) > e.f + EPS_G {
            continue;
        }
        return Some(e.node);
    }
    None
}

impl Planner for BanditMhaStar {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn plan_paths(&mut self, ctx: &mut PlanContext<'_, '_>) {
        let p = ctx.params;
        let cell = p.f64_pos("grid_cell_m", 20.0);
        let inflate = p.f64("clearance_m", 6.0);
        let cruise_alt = p.f64("cruise_alt_m", 60.0);

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
            let (path, stats) = Self::plan_one(&grid, d.pos, target, cruise_alt, p);
            if !stats.goal_reached && stats.expansions > 0 {
                debug!(
                    drone = d.id,
                    expansions = stats.expansions,
                    "expansion budget hit or frontier drained before goal"
                );
            }
            debug!(
                drone = d.id,
                expansions = stats.expansions,
                pulls = ?stats.pulls,
                goal_reached = stats.goal_reached,
                waypoints = path.len(),
                "replanned"
            );
            *d.path = path;
            self.last_stats = Some(stats);
            self.last_goal.insert(d.id.to_string(), goal_xy);
            self.last_tick.insert(d.id.to_string(), tick);
        }
        self.grid = Some(grid);
    }

    fn invalidate(&mut self) {
        if self.grid.take().is_some() {
            debug!("world replaced, dropping grid cache");
        }
        self.last_tick.clear();
        self.last_goal.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Building, World};
    use crate::planner::DroneNav;
    use serde_json::json;

    fn scenario_params() -> Params {
        // The literal constants of the scenario suite: cell 10, no inflate,
        // flat 10 m/s speed, 4-connected, 1000 expansions, anchor every 6.
        let mut p = Params::new();
        let patch = json!({
            "grid_cell_m": 10.0,
            "clearance_m": 0.0,
            "cruise_alt_m": 10.0,
            "v_max": 10.0,
            "v_min": 10.0,
            "clr_kappa_m": 0.0,
            "max_expansions": 1000,
            "anchor_period": 6
        });
        if let serde_json::Value::Object(map) = patch {
            p.merge(&map);
        }
        p
    }

    fn wall_world() -> World {
        World {
            size: (100.0, 100.0, 50.0),
            obstacles: vec![Building {
                id: "wall".into(),
                center: Vec3::new(50.0, 50.0, 10.0),
                size: Vec3::new(80.0, 10.0, 20.0),
            }],
        }
    }

    fn plan(
        planner: &mut BanditMhaStar,
        world: &World,
        p: &Params,
        pos: Vec3,
        target: Vec3,
    ) -> VecDeque<Vec3> {
        let mut path = VecDeque::new();
        {
            let mut ctx = PlanContext {
                world,
                params: p,
                drones: vec![DroneNav { id: "d0", pos, target: Some(target), path: &mut path }],
            };
            planner.plan_paths(&mut ctx);
        }
        path
    }

    #[test]
    fn s1_empty_world_reaches_the_goal_cell() {
        let world = World { size: (100.0, 100.0, 50.0), obstacles: vec![] };
        let p = scenario_params();
        let mut planner = BanditMhaStar::default();
        let path = plan(&mut planner, &world, &p, Vec3::new(5.0, 5.0, 0.0), Vec3::new(95.0, 95.0, 0.0));
        assert!(!path.is_empty());
        let grid = GridCache::build(&world, 10.0, 0.0).unwrap();
        assert_eq!(grid.from_world(path.front().unwrap().x, path.front().unwrap().y), (0, 0));
        assert_eq!(grid.from_world(path.back().unwrap().x, path.back().unwrap().y), (9, 9));
        for wp in &path {
            assert!(wp.x >= 0.0 && wp.x <= 100.0 && wp.y >= 0.0 && wp.y <= 100.0);
            assert_eq!(wp.z, 10.0);
        }
        // 4-connected shortest route: 18 axial steps, 19 cells, 18 s of travel.
        assert_eq!(path.len(), 19);
        let stats = planner.last_stats().unwrap();
        assert!(stats.goal_reached);
    }

    #[test]
    fn s1_diagonal_variant_cuts_travel_time() {
        let world = World { size: (100.0, 100.0, 50.0), obstacles: vec![] };
        let mut p = scenario_params();
        p.set("neighbors8", json!(true));
        let mut planner = BanditMhaStar::default();
        let path = plan(&mut planner, &world, &p, Vec3::new(5.0, 5.0, 0.0), Vec3::new(95.0, 95.0, 0.0));
        // Pure diagonal run: 9 steps, 10 cells, hypot(90,90)/10 ~ 12.73 s.
        assert_eq!(path.len(), 10);
    }

    #[test]
    fn s2_wall_forces_a_detour() {
        let world = wall_world();
        let p = scenario_params();
        let mut planner = BanditMhaStar::default();
        let path = plan(&mut planner, &world, &p, Vec3::new(10.0, 10.0, 0.0), Vec3::new(10.0, 90.0, 0.0));
        assert!(path.len() > 1);
        let grid = GridCache::build(&world, 10.0, 0.0).unwrap();
        let cells: Vec<Coord> = path.iter().map(|w| grid.from_world(w.x, w.y)).collect();
        for c in &cells {
            assert!(!grid.is_blocked(*c), "waypoint on blocked cell {c:?}");
        }
        // Path connectivity: consecutive cells one 4-neighbor step apart.
        for pair in cells.windows(2) {
            let d = (pair[1].0 - pair[0].0).abs() + (pair[1].1 - pair[0].1).abs();
            assert_eq!(d, 1, "non-adjacent cells {pair:?}");
        }
        assert_eq!(*cells.last().unwrap(), grid.from_world(10.0, 90.0));
    }

    #[test]
    fn s3_blocked_target_snaps_to_a_free_cell() {
        let world = wall_world();
        let p = scenario_params();
        let mut planner = BanditMhaStar::default();
        // Aim exactly at the wall's center.
        let path = plan(&mut planner, &world, &p, Vec3::new(10.0, 10.0, 0.0), Vec3::new(50.0, 50.0, 0.0));
        assert!(!path.is_empty());
        let grid = GridCache::build(&world, 10.0, 0.0).unwrap();
        let end = path.back().unwrap();
        assert!(!grid.is_blocked(grid.from_world(end.x, end.y)));
    }

    #[test]
    fn s4_replan_cadence_is_honored() {
        let world = World { size: (100.0, 100.0, 50.0), obstacles: vec![] };
        let mut p = scenario_params();
        let mut planner = BanditMhaStar::default();
        let pos = Vec3::new(5.0, 5.0, 0.0);
        let target = Vec3::new(95.0, 95.0, 0.0);

        p.tick = 0;
        let planned = plan(&mut planner, &world, &p, pos, target);
        assert!(!planned.is_empty());

        // Same goal at tick 10: under the 20-tick cadence, a sentinel path
        // must survive untouched.
        let sentinel = VecDeque::from([Vec3::new(1.0, 2.0, 3.0)]);
        let mut path = sentinel.clone();
        p.tick = 10;
        {
            let mut ctx = PlanContext {
                world: &world,
                params: &p,
                drones: vec![DroneNav { id: "d0", pos, target: Some(target), path: &mut path }],
            };
            planner.plan_paths(&mut ctx);
        }
        assert_eq!(path, sentinel);

        // Tick 20: cadence fires and the sentinel is replaced.
        p.tick = 20;
        {
            let mut ctx = PlanContext {
                world: &world,
                params: &p,
                drones: vec![DroneNav { id: "d0", pos, target: Some(target), path: &mut path }],
            };
            planner.plan_paths(&mut ctx);
        }
        assert_ne!(path, sentinel);
    }

    #[test]
    fn goal_change_replans_immediately() {
        let world = World { size: (100.0, 100.0, 50.0), obstacles: vec![] };
        let mut p = scenario_params();
        let mut planner = BanditMhaStar::default();
        let pos = Vec3::new(5.0, 5.0, 0.0);

        p.tick = 0;
        plan(&mut planner, &world, &p, pos, Vec3::new(95.0, 95.0, 0.0));

        let sentinel = VecDeque::from([Vec3::new(1.0, 2.0, 3.0)]);
        let mut path = sentinel.clone();
        p.tick = 1;
        {
            let mut ctx = PlanContext {
                world: &world,
                params: &p,
                drones: vec![DroneNav {
                    id: "d0",
                    pos,
                    target: Some(Vec3::new(95.0, 5.0, 0.0)),
                    path: &mut path,
                }],
            };
            planner.plan_paths(&mut ctx);
        }
        assert_ne!(path, sentinel);
    }

    #[test]
    fn s5_forced_anchor_cadence_shows_in_pull_counts() {
        let world = wall_world();
        let mut p = scenario_params();
        p.set("anchor_period", json!(2));
        let mut planner = BanditMhaStar::default();
        plan(&mut planner, &world, &p, Vec3::new(10.0, 10.0, 0.0), Vec3::new(10.0, 90.0, 0.0));
        let stats = planner.last_stats().unwrap();
        // Every second expansion is forced onto the anchor queue (it never
        // drains before the goal here), so it takes at least half the pulls.
        // The final goal pop breaks before committing, hence the +1 slack.
        assert!(
            stats.pulls[0] as usize + 1 >= stats.expansions / 2,
            "anchor pulls {} of {} expansions",
            stats.pulls[0],
            stats.expansions
        );
    }

    #[test]
    fn s6_oversized_world_degrades_and_still_plans() {
        let world = World {
            size: (2000.0, 2000.0, 50.0),
            obstacles: vec![Building {
                id: "tower".into(),
                center: Vec3::new(1000.0, 1000.0, 20.0),
                size: Vec3::new(60.0, 60.0, 40.0),
            }],
        };
        let mut p = scenario_params();
        p.set("grid_cell_m", json!(1.0));
        let mut planner = BanditMhaStar::default();
        let path =
            plan(&mut planner, &world, &p, Vec3::new(20.0, 20.0, 0.0), Vec3::new(1980.0, 1980.0, 0.0));
        assert!(!path.is_empty());
        let grid = planner.grid.as_ref().unwrap();
        assert_eq!(grid.cell, crate::grid::COARSE_CELL_M);
        for wp in &path {
            assert!(!grid.is_blocked(grid.from_world(wp.x, wp.y)));
        }
    }

    #[test]
    fn identical_inputs_give_identical_paths() {
        let world = wall_world();
        let mut p = scenario_params();
        p.set("neighbors8", json!(true));
        let run = || {
            let mut planner = BanditMhaStar::default();
            plan(&mut planner, &world, &p, Vec3::new(10.0, 10.0, 0.0), Vec3::new(90.0, 90.0, 0.0))
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn bounded_suboptimal_early_out_respects_the_bound() {
        // Flat speed, open world: any accepted goal cost must sit within
        // w_subopt of the anchor estimate from the start.
        let world = World { size: (100.0, 100.0, 50.0), obstacles: vec![] };
        let mut p = scenario_params();
        p.set("neighbors8", json!(true));
        p.set("accept_suboptimal_w", json!(1.05));
        let mut planner = BanditMhaStar::default();
        let path = plan(&mut planner, &world, &p, Vec3::new(5.0, 5.0, 0.0), Vec3::new(95.0, 95.0, 0.0));
        // Reconstruct travel time along the returned path at v_max = 10.
        let mut time = 0.0;
        for pair in path.iter().collect::<Vec<_>>().windows(2) {
            let dx = pair[1].x - pair[0].x;
            let dy = pair[1].y - pair[0].y;
            time += dx.hypot(dy) / 10.0;
        }
        let h0 = (90.0f64).hypot(90.0) / 10.0;
        assert!(time <= 1.05 * h0 + 1e-9, "time {time} vs bound {}", 1.05 * h0);
    }

    #[test]
    fn monotone_g_along_the_returned_path() {
        // Travel time accumulates strictly along the path; with flat speed
        // each hop costs exactly one cell of time.
        let world = wall_world();
        let p = scenario_params();
        let mut planner = BanditMhaStar::default();
        let path = plan(&mut planner, &world, &p, Vec3::new(10.0, 10.0, 0.0), Vec3::new(10.0, 90.0, 0.0));
        let mut last = -1.0;
        let mut acc = 0.0;
        let pts: Vec<_> = path.iter().collect();
        for pair in pts.windows(2) {
            acc += (pair[1].x - pair[0].x).hypot(pair[1].y - pair[0].y) / 10.0;
            assert!(acc > last);
            last = acc;
        }
    }

    #[test]
    fn fully_walled_goal_yields_degenerate_path() {
        // Goal region sealed on all sides: the search drains without reaching
        // it and the planner falls back to a single waypoint at the goal cell.
        let mut obstacles = vec![];
        // Ring of walls around cells (6..9, 6..9).
        for (i, (cx, cy, sx, sy)) in [
            (75.0, 55.0, 50.0, 10.0),
            (75.0, 95.0, 50.0, 10.0),
            (55.0, 75.0, 10.0, 50.0),
            (95.0, 75.0, 10.0, 50.0),
        ]
        .iter()
        .enumerate()
        {
            obstacles.push(Building {
                id: format!("w{i}"),
                center: Vec3::new(*cx, *cy, 10.0),
                size: Vec3::new(*sx, *sy, 20.0),
            });
        }
        let world = World { size: (100.0, 100.0, 50.0), obstacles };
        let p = scenario_params();
        let mut planner = BanditMhaStar::default();
        let path = plan(&mut planner, &world, &p, Vec3::new(5.0, 5.0, 0.0), Vec3::new(75.0, 75.0, 0.0));
        assert_eq!(path.len(), 1);
        let stats = planner.last_stats().unwrap();
        assert!(!stats.goal_reached);
    }

    #[test]
    fn narrow_corridor_is_slower_than_open_ground() {
        // Clearance modulation: with kappa on, a corridor squeezed between
        // walls costs more time per meter than open terrain, so the planner
        // prefers the open route when lengths tie.
        let world = World {
            size: (150.0, 100.0, 50.0),
            obstacles: vec![
                Building {
                    id: "n".into(),
                    center: Vec3::new(75.0, 65.0, 10.0),
                    size: Vec3::new(90.0, 10.0, 20.0),
                },
                Building {
                    id: "s".into(),
                    center: Vec3::new(75.0, 35.0, 10.0),
                    size: Vec3::new(90.0, 10.0, 20.0),
                },
            ],
        };
        let grid = GridCache::build(&world, 10.0, 0.0).unwrap();
        let speed = SpeedModel { v_min: 4.0, v_max: 20.0, kappa: 8.0 };
        // Mid-corridor cell vs far-field cell.
        let corridor = grid.from_world(75.0, 50.0);
        let open_cell = grid.from_world(75.0, 5.0);
        assert!(grid.clearance(corridor) < grid.clearance(open_cell));
        assert!(speed.at(grid.clearance(corridor)) < speed.at(grid.clearance(open_cell)));
    }

    #[test]
    fn stale_heap_entries_are_skipped_on_pop() {
        let world = World { size: (100.0, 100.0, 50.0), obstacles: vec![] };
        let grid = GridCache::build(&world, 10.0, 0.0).unwrap();
        let speed = SpeedModel { v_min: 10.0, v_max: 10.0, kappa: 0.0 };
        let heur = HeuristicPack::new(&grid, (0, 0), (9, 9), speed, 1.0, 1.0, 1.0, 0.0);
        let mut open = OpenSet::default();
        let closed = HashSet::new();
        let mut g = HashMap::new();

        // Entry pushed when g((3,3)) was 5.0 ...
        g.insert((3, 3), 5.0);
        open.push(heur.f(0, (3, 3), 5.0), 1, (3, 3));
        // ... later improved to 2.0 and re-pushed.
        g.insert((3, 3), 2.0);
        open.push(heur.f(0, (3, 3), 2.0), 2, (3, 3));

        // The fresh entry pops first (smaller f) and is valid.
        assert_eq!(pop_valid(&mut open, 0, &closed, &g, &heur), Some((3, 3)));
        // The stale one remains; with the node now closed it is discarded.
        let mut closed2 = HashSet::new();
        closed2.insert((3, 3));
        assert_eq!(pop_valid(&mut open, 0, &closed2, &g, &heur), None);
    }

    #[test]
    fn grown_key_is_discarded_even_when_not_closed() {
        // Lazy-pop soundness: a popped entry whose recorded key undercuts the
        // current f (g worsened relative to push time cannot happen, but a
        // manually planted optimistic key models a stale duplicate) is skipped.
        let world = World { size: (100.0, 100.0, 50.0), obstacles: vec![] };
        let grid = GridCache::build(&world, 10.0, 0.0).unwrap();
        let speed = SpeedModel { v_min: 10.0, v_max: 10.0, kappa: 0.0 };
        let heur = HeuristicPack::new(&grid, (0, 0), (9, 9), speed, 1.0, 1.0, 1.0, 0.0);
        let mut open = OpenSet::default();
        let closed = HashSet::new();
        let mut g = HashMap::new();
        g.insert((4, 4), 7.0);
        // Key recorded from a phantom g of 1.0; current f is far larger.
        open.push(heur.f(0, (4, 4), 1.0), 1, (4, 4));
        assert_eq!(pop_valid(&mut open, 0, &closed, &g, &heur), None);
    }
}
