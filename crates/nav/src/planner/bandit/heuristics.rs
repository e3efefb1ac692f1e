use crate::grid::{Coord, GridCache};

/// Number of open queues: the admissible anchor plus three inadmissible hints.
pub const QUEUES: usize = 4;

/// Monotone speed-from-clearance curve:
/// `v = v_min + (v_max - v_min) * clr / (clr + kappa)`, clamped to the bounds.
/// `kappa <= 0` disables the model entirely and cruises at `v_max`.
#[derive(Debug, Clone, Copy)]
pub struct SpeedModel {
    pub v_min: f64,
    pub v_max: f64,
    pub kappa: f64,
}

impl SpeedModel {
    pub fn at(&self, clr_m: f64) -> f64 {
        if self.kappa <= 0.0 {
            return self.v_max;
        }
        let frac = clr_m / (clr_m + self.kappa);
        (self.v_min + (self.v_max - self.v_min) * frac).min(self.v_max).max(self.v_min)
    }
}

/// The four f-value heads of the search, precomputed per plan.
///
/// Every head returns *time* (meters over m/s) so f-values compare directly
/// with `g`. Head 0 is the admissible anchor; 1..3 are weighted hints.
pub struct HeuristicPack<'g> {
    grid: &'g GridCache,
    start: Coord,
    goal: Coord,
    speed: SpeedModel,
    w_clear: f64,
    w_landmark: f64,
    w_bearing: f64,
    gamma: f64,
    landmarks: [Coord; 4],
    goal_lm_d: [f64; 4],
}

impl<'g> HeuristicPack<'g> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        grid: &'g GridCache,
        start: Coord,
        goal: Coord,
        speed: SpeedModel,
        w_clear: f64,
        w_landmark: f64,
        w_bearing: f64,
        gamma: f64,
    ) -> Self {
        let landmarks = [(0, 0), (grid.w - 1, 0), (0, grid.h - 1), (grid.w - 1, grid.h - 1)];
        let mut goal_lm_d = [0.0; 4];
        for (i, &(lx, ly)) in landmarks.iter().enumerate() {
            goal_lm_d[i] = ((lx - goal.0) as f64).hypot((ly - goal.1) as f64) * grid.cell;
        }
        Self { grid, start, goal, speed, w_clear, w_landmark, w_bearing, gamma, landmarks, goal_lm_d }
    }

    fn dist_m(&self, a: Coord, b: Coord) -> f64 {
        ((a.0 - b.0) as f64).hypot((a.1 - b.1) as f64) * self.grid.cell
    }

    /// Admissible: straight-line distance at full cruise speed.
    pub fn h_anchor(&self, n: Coord) -> f64 {
        self.dist_m(n, self.goal) / self.speed.v_max.max(1e-6)
    }

    /// Inadmissible hint: the same distance at the *local* speed estimate, so
    /// cramped cells look expensive.
    pub fn h_clear(&self, n: Coord) -> f64 {
        let v_est = self.speed.at(self.grid.clearance(n));
        self.dist_m(n, self.goal) / v_est.max(1e-6)
    }

    /// ALT landmark bound: `max_lm |d(n,lm) - d(goal,lm)|` over the four grid
    /// corners, divided by `v_max`. A lower bound by the triangle inequality.
    pub fn h_landmark(&self, n: Coord) -> f64 {
        let mut best = 0.0f64;
        for (i, &lm) in self.landmarks.iter().enumerate() {
            best = best.max((self.dist_m(n, lm) - self.goal_lm_d[i]).abs());
        }
        best / self.speed.v_max.max(1e-6)
    }

    /// Cosine between start->goal and n->goal, clamped to [-1, 1]. Negative
    /// alignment is allowed through and inflates the bearing head.
    fn bearing_alignment(&self, n: Coord) -> f64 {
        let g1 = ((self.goal.0 - self.start.0) as f64, (self.goal.1 - self.start.1) as f64);
        let g2 = ((self.goal.0 - n.0) as f64, (self.goal.1 - n.1) as f64);
        let norm = |v: (f64, f64)| v.0.hypot(v.1) + 1e-9;
        ((g1.0 * g2.0 + g1.1 * g2.1) / (norm(g1) * norm(g2))).clamp(-1.0, 1.0)
    }

    /// Inadmissible hint: anchor discounted where the onward direction agrees
    /// with the initial bearing.
    pub fn h_bearing(&self, n: Coord) -> f64 {
        let h = self.h_anchor(n);
        (h * (1.0 - self.gamma * self.bearing_alignment(n))).max(0.0)
    }

    /// f-value for queue `k` at node `n` with best-known cost `g`.
    pub fn f(&self, k: usize, n: Coord, g: f64) -> f64 {
        match k {
            0 => g + self.h_anchor(n),
            1 => g + self.w_clear * self.h_clear(n),
            2 => g + self.w_landmark * self.h_landmark(n),
            _ => g + self.w_bearing * self.h_bearing(n),
        }
    }
}
