use thiserror::Error;
use tracing::warn;

use crate::model::{Vec3, World};

/// Grid cell coordinate. Signed so neighbor/ring arithmetic can step outside
/// the grid; every accessor treats out-of-bounds as blocked.
pub type Coord = (i32, i32);

/// Exact rasterization refuses grids past this many cells; callers fall back
/// to the center-only raster instead.
pub const MAX_EXACT_CELLS: usize = 4_000_000;

/// Past either fine-build threshold the cell coarsens to at least this.
pub const COARSE_CELL_M: f64 = 24.0;
const MAX_FINE_CELLS: i64 = 300_000;
const MAX_FINE_OBSTACLES: usize = 5_000;

const INF_CELLS: i64 = 1_000_000_000;

#[derive(Debug, Error)]
pub enum GridBuildError {
    #[error("grid of {cells} cells exceeds exact-build capacity")]
    TooLarge { cells: usize },
}

/// Does the inflated building footprint overlap the cell's square?
/// Half-open on all four axes so a shared edge does not count as overlap.
fn rect_overlaps_cell(cx: f64, cy: f64, w: f64, d: f64, gx: i64, gy: i64, cell: f64) -> bool {
    let (rx0, rx1) = (cx - w * 0.5, cx + w * 0.5);
    let (ry0, ry1) = (cy - d * 0.5, cy + d * 0.5);
    let (cx0, cx1) = (gx as f64 * cell, (gx + 1) as f64 * cell);
    let (cy0, cy1) = (gy as f64 * cell, (gy + 1) as f64 * cell);
    !(rx1 <= cx0 || rx0 >= cx1 || ry1 <= cy0 || ry0 >= cy1)
}

/// Rasterized world: inflated blocked mask plus meters-to-nearest-blocked.
#[derive(Debug, Clone)]
pub struct GridCache {
    pub cell: f64,
    pub w: i32,
    pub h: i32,
    blocked: Vec<bool>,
    clearance_m: Vec<f64>,
}

impl GridCache {
    fn extents(world: &World, cell: f64) -> (i32, i32) {
        let w = ((world.size.0 / cell).floor() as i64).clamp(1, i32::MAX as i64);
        let h = ((world.size.1 / cell).floor() as i64).clamp(1, i32::MAX as i64);
        (w as i32, h as i32)
    }

    /// Exact build: mark every cell whose square overlaps an obstacle
    /// footprint inflated by `inflate` meters, then run the two-pass L1
    /// Chamfer transform for the clearance field.
    pub fn build(world: &World, cell: f64, inflate: f64) -> Result<GridCache, GridBuildError> {
        let (w_cells, h_cells) = Self::extents(world, cell);
        let n = w_cells as usize * h_cells as usize;
        if n > MAX_EXACT_CELLS {
            return Err(GridBuildError::TooLarge { cells: n });
        }

        let mut blocked = vec![false; n];
        for b in &world.obstacles {
            let (cx, cy) = (b.center.x, b.center.y);
            let (bw, bd) = (b.size.x + 2.0 * inflate, b.size.y + 2.0 * inflate);
            let xmin = (((cx - bw * 0.5) / cell).floor() as i64).max(0);
            let xmax = (((cx + bw * 0.5) / cell).floor() as i64).min(w_cells as i64 - 1);
            let ymin = (((cy - bd * 0.5) / cell).floor() as i64).max(0);
            let ymax = (((cy + bd * 0.5) / cell).floor() as i64).min(h_cells as i64 - 1);
            for gy in ymin..=ymax {
                for gx in xmin..=xmax {
                    if rect_overlaps_cell(cx, cy, bw, bd, gx, gy, cell) {
                        blocked[(gy * w_cells as i64 + gx) as usize] = true;
                    }
                }
            }
        }

        // Two-pass Chamfer: exact L1 cell-distance to the nearest blocked cell.
        let w = w_cells as usize;
        let h = h_cells as usize;
        let mut dist: Vec<i64> = blocked.iter().map(|&b| if b { 0 } else { INF_CELLS }).collect();

        for y in 0..h {
            let row = y * w;
            for x in 0..w {
                let i = row + x;
                if dist[i] == 0 {
                    continue;
                }
                let mut best = dist[i];
                if x > 0 {
                    best = best.min(dist[i - 1] + 1);
                }
                if y > 0 {
                    best = best.min(dist[i - w] + 1);
                }
                dist[i] = best;
            }
        }
        for y in (0..h).rev() {
            let row = y * w;
            for x in (0..w).rev() {
                let i = row + x;
                if dist[i] == 0 {
                    continue;
                }
                let mut best = dist[i];
                if x + 1 < w {
                    best = best.min(dist[i + 1] + 1);
                }
                if y + 1 < h {
                    best = best.min(dist[i + w] + 1);
                }
                dist[i] = best;
            }
        }

        let clearance_m = dist.iter().map(|&d| d as f64 * cell).collect();
        Ok(GridCache { cell, w: w_cells, h: h_cells, blocked, clearance_m })
    }

    /// Degraded raster for worlds the exact build refuses: one blocked cell
    /// per obstacle center and a flat two-cell clearance estimate.
    pub fn build_fallback(world: &World, cell: f64, _inflate: f64) -> GridCache {
        let (w_cells, h_cells) = Self::extents(world, cell);
        let n = w_cells as usize * h_cells as usize;
        let mut blocked = vec![false; n];
        for b in &world.obstacles {
            let gx = ((b.center.x / cell).floor() as i64).clamp(0, w_cells as i64 - 1);
            let gy = ((b.center.y / cell).floor() as i64).clamp(0, h_cells as i64 - 1);
            blocked[(gy * w_cells as i64 + gx) as usize] = true;
        }
        let clearance_m = vec![cell * 2.0; n];
        GridCache { cell, w: w_cells, h: h_cells, blocked, clearance_m }
    }

    /// Grid-rebuild policy shared by the planner facades: coarsen the cell
    /// when the requested resolution or obstacle count is out of budget, and
    /// drop to the center-only raster if even the exact build refuses.
    pub fn build_degraded(world: &World, cell: f64, inflate: f64) -> GridCache {
        let (w_cells, h_cells) = Self::extents(world, cell.max(1.0));
        let too_big = w_cells as i64 * h_cells as i64 > MAX_FINE_CELLS
            || world.obstacles.len() > MAX_FINE_OBSTACLES;
        let use_cell = if too_big {
            let coarse = cell.max(COARSE_CELL_M);
            warn!(
                cells = w_cells as i64 * h_cells as i64,
                obstacles = world.obstacles.len(),
                coarse_cell_m = coarse,
                "grid out of budget, coarsening"
            );
            coarse
        } else {
            cell
        };
        match GridCache::build(world, use_cell, inflate) {
            Ok(g) => g,
            Err(e) => {
                warn!("exact grid build failed ({e}), using center-only raster");
                GridCache::build_fallback(world, use_cell, inflate)
            }
        }
    }

    fn idx(&self, g: Coord) -> usize {
        g.1 as usize * self.w as usize + g.0 as usize
    }

    pub fn in_bounds(&self, g: Coord) -> bool {
        g.0 >= 0 && g.1 >= 0 && g.0 < self.w && g.1 < self.h
    }

    /// Blocked, with everything outside the grid counting as blocked.
    pub fn is_blocked(&self, g: Coord) -> bool {
        !self.in_bounds(g) || self.blocked[self.idx(g)]
    }

    /// Meters to the nearest blocked cell; zero on blocked and out-of-bounds
    /// cells.
    pub fn clearance(&self, g: Coord) -> f64 {
        if self.in_bounds(g) {
            self.clearance_m[self.idx(g)]
        } else {
            0.0
        }
    }

    /// Cell center at altitude `z`.
    pub fn to_world(&self, g: Coord, z: f64) -> Vec3 {
        Vec3::new((g.0 as f64 + 0.5) * self.cell, (g.1 as f64 + 0.5) * self.cell, z)
    }

    /// Containing cell, clamped into the grid.
    pub fn from_world(&self, x: f64, y: f64) -> Coord {
        let gx = ((x / self.cell).floor() as i64).clamp(0, self.w as i64 - 1);
        let gy = ((y / self.cell).floor() as i64).clamp(0, self.h as i64 - 1);
        (gx as i32, gy as i32)
    }

    /// Spiral outward in expanding rings looking for a free cell. Scan order
    /// is fixed, so snapping is deterministic. Returns the input unchanged
    /// when 49 rings come up empty.
    pub fn nearest_free(&self, g0: Coord) -> Coord {
        if !self.is_blocked(g0) {
            return g0;
        }
        for r in 1..50 {
            for dx in -r..=r {
                for dy in [-r, r] {
                    let c = (g0.0 + dx, g0.1 + dy);
                    if !self.is_blocked(c) {
                        return c;
                    }
                }
            }
            for dy in (-r + 1)..r {
                for dx in [-r, r] {
                    let c = (g0.0 + dx, g0.1 + dy);
                    if !self.is_blocked(c) {
                        return c;
                    }
                }
            }
        }
        g0
    }
}
