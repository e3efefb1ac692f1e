use crate::planner::{PlanContext, Planner};

/// Degenerate planner: fly straight at the target, obstacles be damned.
/// Useful as a baseline and as the session's boot-time default.
#[derive(Default)]
pub struct StraightLine;

impl StraightLine {
    pub const NAME: &'static str = "straight_line";
}

impl Planner for StraightLine {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn plan_paths(&mut self, ctx: &mut PlanContext<'_, '_>) {
        for d in ctx.drones.iter_mut() {
            if let Some(target) = d.target {
                d.path.clear();
                d.path.push_back(target);
            }
        }
    }
}
